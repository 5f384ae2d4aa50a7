// Block-level data: headers, receipts and header chains

pub mod chain;
pub mod header;
pub mod receipt;

pub use chain::{verify_chain, ChainValidator};
pub use header::{extract_field, extract_parent_hash, extract_receipts_root, BlockHeader, HeaderField};
pub use receipt::{receipts_root, receipts_trie, Log, Receipt};
