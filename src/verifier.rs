// Event proof facade
//
// Ties header hashing, field extraction, receipts-trie inclusion and chain
// linking together behind the calls a light client makes:
//   1. hash(header) must equal a block hash the caller already trusts
//   2. the header's receiptsRoot anchors an inclusion proof for the receipt
//   3. a run of headers can be linked back to a trusted block by parent hashes

use crate::block::chain::ChainValidator;
use crate::block::header::{self, BlockHeader};
use crate::constants::limits;
use crate::error::{DecodeError, ProofError, Rejection};
use crate::utils::keccak::{Keccak256Hasher, NodeHasher};
use crate::utils::mpt::MptVerifier;
use crate::utils::rlp::{self, RlpItem};
use alloy_primitives::{Bytes, B256};
use serde::{Deserialize, Serialize};

/// Resource limits applied while verifying untrusted proofs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Maximum number of nodes in one witness
    pub max_witness_nodes: usize,
    /// Maximum encoded size of one witness node, in bytes
    pub max_node_len: usize,
    /// Maximum number of headers in one chain check
    pub max_chain_len: usize,
    /// Reject witnesses with nodes left over after the proven value
    pub require_exact_witness: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_witness_nodes: limits::MAX_WITNESS_NODES,
            max_node_len: limits::MAX_NODE_LEN,
            max_chain_len: limits::MAX_CHAIN_LEN,
            require_exact_witness: true,
        }
    }
}

/// Light-client verifier for receipts (and so events) and header chains
///
/// Boolean operations return `Ok(true)` for a valid proof, `Ok(false)` for a
/// proof that parses but does not hold, and `Err` when an input cannot be
/// decoded. The `check_*` variants report the reason a proof was rejected.
#[derive(Debug, Clone)]
pub struct EventProof<H = Keccak256Hasher> {
    config: VerifierConfig,
    hasher: H,
}

impl EventProof<Keccak256Hasher> {
    pub fn new(config: VerifierConfig) -> Self {
        Self::with_hasher(config, Keccak256Hasher)
    }
}

impl Default for EventProof<Keccak256Hasher> {
    fn default() -> Self {
        Self::new(VerifierConfig::default())
    }
}

impl<H: NodeHasher> EventProof<H> {
    pub fn with_hasher(config: VerifierConfig, hasher: H) -> Self {
        Self { config, hasher }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn extract_receipts_root(&self, rlp_header: &[u8]) -> Result<B256, DecodeError> {
        header::extract_receipts_root(rlp_header)
    }

    pub fn extract_parent_hash(&self, rlp_header: &[u8]) -> Result<B256, DecodeError> {
        header::extract_parent_hash(rlp_header)
    }

    /// Verify `value` is stored under the HP-encoded `path` of the trie at `root`
    ///
    /// `rlp_witness` is the RLP list of proof nodes, root first.
    pub fn merkle_proof(
        &self,
        value: &[u8],
        path: &[u8],
        rlp_witness: &[u8],
        root: B256,
    ) -> Result<bool, DecodeError> {
        ProofError::into_verdict(self.check_merkle_proof(value, path, rlp_witness, root))
    }

    pub fn check_merkle_proof(
        &self,
        value: &[u8],
        path: &[u8],
        rlp_witness: &[u8],
        root: B256,
    ) -> Result<(), ProofError> {
        let witness = decode_witness(rlp_witness)?;
        self.mpt_verifier().verify(root, path, value, &witness)
    }

    /// Prove that `rlp_receipt` belongs to the block whose hash is trusted
    pub fn prove_receipt_inclusion(
        &self,
        trusted_block_hash: B256,
        rlp_header: &[u8],
        rlp_receipt: &[u8],
        path: &[u8],
        rlp_witness: &[u8],
    ) -> Result<bool, DecodeError> {
        ProofError::into_verdict(self.check_receipt_inclusion(
            trusted_block_hash,
            rlp_header,
            rlp_receipt,
            path,
            rlp_witness,
        ))
    }

    pub fn check_receipt_inclusion(
        &self,
        trusted_block_hash: B256,
        rlp_header: &[u8],
        rlp_receipt: &[u8],
        path: &[u8],
        rlp_witness: &[u8],
    ) -> Result<(), ProofError> {
        let witness = decode_witness(rlp_witness)?;

        let computed = self.hasher.hash(rlp_header);
        if computed != trusted_block_hash {
            log::debug!("header hashes to {computed}, trusted block is {trusted_block_hash}");
            return Err(Rejection::HashMismatch {
                context: "block header",
                expected: trusted_block_hash,
                computed,
            }
            .into());
        }

        let receipts_root = header::extract_receipts_root(rlp_header)?;
        log::debug!(
            "verifying {}-node receipt witness against receipts root {receipts_root}",
            witness.len()
        );
        self.mpt_verifier().verify(receipts_root, path, rlp_receipt, &witness)
    }

    /// Check that RLP-encoded headers, oldest first, form a parent-hash chain
    ///
    /// With an `anchor`, the first header must also hash to it.
    pub fn prove_blocks<T: AsRef<[u8]>>(
        &self,
        rlp_headers: &[T],
        anchor: Option<B256>,
    ) -> Result<bool, DecodeError> {
        ProofError::into_verdict(self.check_blocks(rlp_headers, anchor))
    }

    pub fn check_blocks<T: AsRef<[u8]>>(
        &self,
        rlp_headers: &[T],
        anchor: Option<B256>,
    ) -> Result<(), ProofError> {
        let headers = rlp_headers
            .iter()
            .map(|raw| BlockHeader::decode(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        ChainValidator::new(&self.hasher)
            .with_max_len(self.config.max_chain_len)
            .verify(&headers, anchor)?;
        Ok(())
    }

    fn mpt_verifier(&self) -> MptVerifier<&H> {
        MptVerifier::new(&self.hasher)
            .with_limits(self.config.max_witness_nodes, self.config.max_node_len)
            .with_exact_witness(self.config.require_exact_witness)
    }
}

/// Split an RLP witness list into raw node encodings
///
/// Entries may be nodes embedded as lists, as proof tooling emits them, or
/// node encodings wrapped as byte strings.
pub fn decode_witness(rlp_witness: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    let nodes = rlp::decode_list(rlp_witness)?;
    nodes
        .into_iter()
        .map(|node| match node {
            RlpItem::List(items) => Ok(RlpItem::List(items).encoded()),
            RlpItem::Bytes(raw) => {
                rlp::decode_exact(&raw)?;
                Ok(raw)
            }
        })
        .collect()
}

/// Encode raw node encodings as an RLP witness list of embedded nodes
pub fn encode_witness<W: AsRef<[u8]>>(nodes: &[W]) -> Result<Vec<u8>, DecodeError> {
    let items = nodes
        .iter()
        .map(|node| rlp::decode_exact(node.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RlpItem::List(items).encoded())
}

/// Inputs of a receipt inclusion proof, hex-encoded in JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptProofInput {
    pub block_hash: B256,
    pub header: Bytes,
    pub receipt: Bytes,
    pub path: Bytes,
    pub witness: Bytes,
}

/// Inputs of a header chain proof, hex-encoded in JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainProofInput {
    #[serde(default)]
    pub anchor: Option<B256>,
    pub headers: Vec<Bytes>,
}
