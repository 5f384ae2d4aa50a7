// Constants for Ethereum data structures and verification limits

use alloy_primitives::{b256, B256};

/// Root of an empty Merkle-Patricia-Trie, keccak256(rlp(""))
pub const EMPTY_TRIE_ROOT: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");

/// Hash of an empty uncle list, keccak256(rlp([]))
pub const EMPTY_UNCLES_HASH: B256 =
    b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");

/// Number of fields in a pre-London block header
pub const HEADER_FIELD_COUNT: usize = 15;

/// Number of fields in a post-Byzantium receipt
pub const RECEIPT_FIELD_COUNT: usize = 4;

/// Branch nodes have 16 children plus a value slot
pub const BRANCH_NODE_LEN: usize = 17;

/// Leaf and extension nodes are [path, value-or-child]
pub const SHORT_NODE_LEN: usize = 2;

/// Nodes whose encoding is shorter than this are embedded in their parent
/// instead of being referenced by hash
pub const INLINE_NODE_THRESHOLD: usize = 32;

/// Logs bloom width in bytes
pub const BLOOM_LEN: usize = 256;

/// Default verification limits
pub mod limits {
    /// Receipts trie keys are a few nibbles long, real witnesses have a handful of nodes
    pub const MAX_WITNESS_NODES: usize = 64;

    /// Leaf nodes carry whole receipts. Log data costs 8 gas per byte, so even a
    /// 30M gas block cannot fill a receipt of this size.
    pub const MAX_NODE_LEN: usize = 4 * 1024 * 1024;

    /// Maximum number of headers accepted by one chain check, about a day of blocks
    pub const MAX_CHAIN_LEN: usize = 8192;

    /// Deepest list nesting accepted by the RLP decoder
    pub const MAX_RLP_DEPTH: usize = 16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        use limits::*;

        assert_eq!(MAX_WITNESS_NODES, 64);
        assert!(MAX_NODE_LEN > 532); // a full branch node
        assert!(MAX_NODE_LEN > 30_000_000 / 8); // log data of a full 30M gas block
        assert!(MAX_RLP_DEPTH >= 4); // witness list > node > inline node > child
    }

    #[test]
    fn test_node_shapes() {
        assert_eq!(BRANCH_NODE_LEN, 16 + 1);
        assert_eq!(SHORT_NODE_LEN, 2);
        assert_eq!(INLINE_NODE_THRESHOLD, 32);
    }
}
