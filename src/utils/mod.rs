// Encoding, hashing and trie primitives

pub mod hex_prefix;
pub mod keccak;
pub mod mpt;
pub mod rlp;
pub mod trie;
