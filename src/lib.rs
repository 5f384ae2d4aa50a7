// Ethereum event proofs for light clients
// Verifies that a receipt (and so the events it logs) is part of a block whose
// hash is trusted, and that headers link to each other by parent hash.

pub mod block;
pub mod constants;
pub mod error;
pub mod provider;
pub mod utils;
pub mod verifier;

// Re-export commonly used types
pub use constants::*;
pub use error::{DecodeError, LimitExceeded, ProofError, Rejection};

pub use block::{
    extract_field, extract_parent_hash, extract_receipts_root, receipts_root, verify_chain,
    BlockHeader, ChainValidator, HeaderField, Log, Receipt,
};
pub use utils::hex_prefix::{receipt_key, receipt_path};
pub use utils::keccak::{keccak256, Keccak256Hasher, NodeHasher};
pub use utils::mpt::{verify_inclusion, MptVerifier};
pub use utils::trie::MerkleTrie;

pub use provider::{
    BlockId, CachingProvider, ChainDataProvider, MemoryProvider, ProofFetcher, ProviderError,
    ReceiptProof, TrieProofFetcher,
};
pub use verifier::{EventProof, VerifierConfig};
