// Keccak256 hash utilities
// Wrapper around sha3 crate for Ethereum-compatible Keccak256, plus the
// `NodeHasher` capability that trie and header code is generic over

use alloy_primitives::B256;
use sha3::{Digest, Keccak256};

/// Compute Keccak256 hash of input bytes
/// Returns 32-byte hash
pub fn keccak256(input: &[u8]) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    B256::from_slice(&hasher.finalize())
}

/// Compute Keccak256 and return as hex string
pub fn keccak256_hex(input: &[u8]) -> String {
    hex::encode(keccak256(input))
}

/// Hash function used to reference trie nodes and block headers.
///
/// Verification code never calls Keccak directly; it takes a `NodeHasher` so
/// tests can swap in a different digest and check the walk logic in isolation.
pub trait NodeHasher {
    fn hash(&self, data: &[u8]) -> B256;
}

/// The Ethereum hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keccak256Hasher;

impl NodeHasher for Keccak256Hasher {
    fn hash(&self, data: &[u8]) -> B256 {
        keccak256(data)
    }
}

impl<H: NodeHasher + ?Sized> NodeHasher for &H {
    fn hash(&self, data: &[u8]) -> B256 {
        (**self).hash(data)
    }
}
