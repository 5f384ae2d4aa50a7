// Chain data collaborators
//
// The verifier only consumes bytes. Fetching headers, receipts and witnesses
// happens behind these traits so callers can plug in an RPC client, a fixture
// store or a cache without touching verification code.

use crate::block::header::BlockHeader;
use crate::block::receipt::{receipts_trie, Receipt};
use crate::error::DecodeError;
use crate::utils::hex_prefix::{receipt_key, receipt_path};
use crate::verifier::{encode_witness, ReceiptProofInput};
use alloy_primitives::{Bytes, B256};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Block {0} not found")]
    BlockNotFound(BlockId),

    #[error("Transaction {0} not found")]
    TransactionNotFound(B256),

    #[error("Block {block} has no receipt at index {index}")]
    ReceiptIndexOutOfRange { block: B256, index: u64 },

    #[error("Invalid chain data: {0}")]
    Decode(#[from] DecodeError),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Block reference accepted by providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockId {
    Number(u64),
    Hash(B256),
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockId::Number(number) => write!(f, "#{number}"),
            BlockId::Hash(hash) => write!(f, "{hash}"),
        }
    }
}

/// Receipt together with its position in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub block_hash: B256,
    pub transaction_index: u64,
    pub receipt: Receipt,
}

/// Source of headers and receipts
pub trait ChainDataProvider {
    fn header(&self, block: BlockId) -> Result<BlockHeader, ProviderError>;

    fn receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, ProviderError>;

    /// All receipts of a block, in transaction order
    fn block_receipts(&self, block_hash: B256) -> Result<Vec<Receipt>, ProviderError>;
}

impl<P: ChainDataProvider + ?Sized> ChainDataProvider for &P {
    fn header(&self, block: BlockId) -> Result<BlockHeader, ProviderError> {
        (**self).header(block)
    }

    fn receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, ProviderError> {
        (**self).receipt(tx_hash)
    }

    fn block_receipts(&self, block_hash: B256) -> Result<Vec<Receipt>, ProviderError> {
        (**self).block_receipts(block_hash)
    }
}

/// Witness for one receipt in its block's receipts trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptProof {
    pub block_hash: B256,
    pub tx_index: u64,
    /// Raw node encodings, root first
    pub witness: Vec<Vec<u8>>,
}

impl ReceiptProof {
    /// HP-encoded trie path of the receipt
    pub fn path(&self) -> Vec<u8> {
        receipt_path(self.tx_index)
    }
}

/// Source of receipt inclusion witnesses
pub trait ProofFetcher {
    fn receipt_proof(&self, tx_hash: B256) -> Result<ReceiptProof, ProviderError>;
}

/// Fixture store holding whole blocks in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    headers: HashMap<B256, BlockHeader>,
    numbers: HashMap<u64, B256>,
    receipts: HashMap<B256, Vec<Receipt>>,
    transactions: HashMap<B256, (B256, u64)>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block with its receipts, keyed by transaction hash; returns the block hash
    pub fn insert_block(
        &mut self,
        header: BlockHeader,
        receipts: impl IntoIterator<Item = (B256, Receipt)>,
    ) -> B256 {
        let block_hash = header.hash();
        let mut block_receipts = Vec::new();
        for (index, (tx_hash, receipt)) in receipts.into_iter().enumerate() {
            self.transactions.insert(tx_hash, (block_hash, index as u64));
            block_receipts.push(receipt);
        }

        log::trace!(
            "stored block {} ({block_hash}) with {} receipts",
            header.number,
            block_receipts.len()
        );
        self.numbers.insert(header.number, block_hash);
        self.headers.insert(block_hash, header);
        self.receipts.insert(block_hash, block_receipts);
        block_hash
    }
}

impl ChainDataProvider for MemoryProvider {
    fn header(&self, block: BlockId) -> Result<BlockHeader, ProviderError> {
        let hash = match block {
            BlockId::Hash(hash) => hash,
            BlockId::Number(number) => *self
                .numbers
                .get(&number)
                .ok_or(ProviderError::BlockNotFound(block))?,
        };
        self.headers
            .get(&hash)
            .cloned()
            .ok_or(ProviderError::BlockNotFound(block))
    }

    fn receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, ProviderError> {
        let &(block_hash, transaction_index) = self
            .transactions
            .get(&tx_hash)
            .ok_or(ProviderError::TransactionNotFound(tx_hash))?;
        let receipt = self
            .receipts
            .get(&block_hash)
            .and_then(|receipts| receipts.get(transaction_index as usize))
            .cloned()
            .ok_or(ProviderError::ReceiptIndexOutOfRange {
                block: block_hash,
                index: transaction_index,
            })?;

        Ok(TransactionReceipt {
            block_hash,
            transaction_index,
            receipt,
        })
    }

    fn block_receipts(&self, block_hash: B256) -> Result<Vec<Receipt>, ProviderError> {
        self.receipts
            .get(&block_hash)
            .cloned()
            .ok_or(ProviderError::BlockNotFound(BlockId::Hash(block_hash)))
    }
}

/// Memoizing decorator; each distinct request reaches the inner provider once
///
/// Only successful responses are cached.
#[derive(Debug)]
pub struct CachingProvider<P> {
    inner: P,
    headers: Mutex<HashMap<BlockId, BlockHeader>>,
    receipts: Mutex<HashMap<B256, TransactionReceipt>>,
    block_receipts: Mutex<HashMap<B256, Vec<Receipt>>>,
}

impl<P: ChainDataProvider> CachingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            headers: Mutex::default(),
            receipts: Mutex::default(),
            block_receipts: Mutex::default(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

fn cached<K, V, F>(cache: &Mutex<HashMap<K, V>>, key: K, fetch: F) -> Result<V, ProviderError>
where
    K: Eq + std::hash::Hash,
    V: Clone,
    F: FnOnce() -> Result<V, ProviderError>,
{
    if let Some(hit) = cache.lock().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return Ok(hit.clone());
    }
    let value = fetch()?;
    cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, value.clone());
    Ok(value)
}

impl<P: ChainDataProvider> ChainDataProvider for CachingProvider<P> {
    fn header(&self, block: BlockId) -> Result<BlockHeader, ProviderError> {
        cached(&self.headers, block, || self.inner.header(block))
    }

    fn receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, ProviderError> {
        cached(&self.receipts, tx_hash, || self.inner.receipt(tx_hash))
    }

    fn block_receipts(&self, block_hash: B256) -> Result<Vec<Receipt>, ProviderError> {
        cached(&self.block_receipts, block_hash, || {
            self.inner.block_receipts(block_hash)
        })
    }
}

/// Builds witnesses by rebuilding the receipts trie of the transaction's block
#[derive(Debug, Clone)]
pub struct TrieProofFetcher<P> {
    provider: P,
}

impl<P: ChainDataProvider> TrieProofFetcher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ChainDataProvider> ProofFetcher for TrieProofFetcher<P> {
    fn receipt_proof(&self, tx_hash: B256) -> Result<ReceiptProof, ProviderError> {
        let located = self.provider.receipt(tx_hash)?;
        let receipts = self.provider.block_receipts(located.block_hash)?;
        let trie = receipts_trie(&receipts);

        let header = self.provider.header(BlockId::Hash(located.block_hash))?;
        if trie.root() != header.receipts_root {
            log::warn!(
                "rebuilt receipts root {} differs from header {} of block {}",
                trie.root(),
                header.receipts_root,
                located.block_hash
            );
        }

        let witness = trie
            .proof(&receipt_key(located.transaction_index))
            .ok_or(ProviderError::ReceiptIndexOutOfRange {
                block: located.block_hash,
                index: located.transaction_index,
            })?;

        log::debug!(
            "receipt proof for {tx_hash}: index {}, {} nodes",
            located.transaction_index,
            witness.len()
        );
        Ok(ReceiptProof {
            block_hash: located.block_hash,
            tx_index: located.transaction_index,
            witness,
        })
    }
}

/// Gather everything `prove_receipt_inclusion` needs for `tx_hash`
pub fn receipt_proof_input<P, F>(
    provider: &P,
    fetcher: &F,
    tx_hash: B256,
) -> Result<ReceiptProofInput, ProviderError>
where
    P: ChainDataProvider,
    F: ProofFetcher,
{
    let proof = fetcher.receipt_proof(tx_hash)?;
    let located = provider.receipt(tx_hash)?;
    let header = provider.header(BlockId::Hash(proof.block_hash))?;

    Ok(ReceiptProofInput {
        block_hash: proof.block_hash,
        header: Bytes::from(header.encode_to_vec()),
        receipt: Bytes::from(located.receipt.encode_to_vec()),
        path: Bytes::from(proof.path()),
        witness: Bytes::from(encode_witness(&proof.witness)?),
    })
}
