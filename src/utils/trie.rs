// In-memory Merkle-Patricia-Trie builder
//
// Builds the trie from scratch out of sorted key/value pairs, which is all a
// receipts trie needs: compute the root and hand out inclusion witnesses in
// the same shape an Ethereum node returns them.

use crate::utils::hex_prefix::{bytes_to_nibbles, receipt_key};
use crate::utils::keccak::{Keccak256Hasher, NodeHasher};
use crate::utils::mpt::{MptNode, NodeRef};
use alloy_primitives::B256;
use std::collections::BTreeMap;

/// Key/value store that can compute its trie root and inclusion witnesses
#[derive(Debug, Clone, Default)]
pub struct MerkleTrie<H = Keccak256Hasher> {
    // nibble path -> value; byte order and nibble order agree, so iteration is sorted
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    hasher: H,
}

type Entry = (Vec<u8>, Vec<u8>);

impl MerkleTrie<Keccak256Hasher> {
    pub fn new() -> Self {
        Self::with_hasher(Keccak256Hasher)
    }

    /// Trie keyed by RLP(index), the layout of transaction and receipt tries
    pub fn ordered<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut trie = Self::new();
        for (index, value) in values.into_iter().enumerate() {
            trie.insert(&receipt_key(index as u64), value);
        }
        trie
    }
}

impl<H: NodeHasher> MerkleTrie<H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            entries: BTreeMap::new(),
            hasher,
        }
    }

    /// Store `value` under `key`; an empty value removes the key
    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) {
        let path = bytes_to_nibbles(key);
        if value.is_empty() {
            self.entries.remove(&path);
        } else {
            self.entries.insert(path, value);
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(&bytes_to_nibbles(key)).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Root hash; the empty trie hashes rlp("")
    pub fn root(&self) -> B256 {
        let entries = self.sorted_entries();
        if entries.is_empty() {
            return self.hasher.hash(&[alloy_rlp::EMPTY_STRING_CODE]);
        }
        let root = self.build(&entries, 0, None, &mut Vec::new());
        self.hasher.hash(&root.encoded())
    }

    /// Witness for `key`, root node first, or `None` if the key is absent
    ///
    /// Nodes embedded in their parent are not listed separately.
    pub fn proof(&self, key: &[u8]) -> Option<Vec<Vec<u8>>> {
        let target = bytes_to_nibbles(key);
        if !self.entries.contains_key(&target) {
            return None;
        }

        let entries = self.sorted_entries();
        let mut witness = Vec::new();
        let root = self.build(&entries, 0, Some(&target), &mut witness);
        witness.push(root.encoded());
        witness.reverse();

        log::trace!("built {}-node witness for key {}", witness.len(), hex::encode(key));
        Some(witness)
    }

    fn sorted_entries(&self) -> Vec<Entry> {
        self.entries
            .iter()
            .map(|(path, value)| (path.clone(), value.clone()))
            .collect()
    }

    // `target` is set while building the subtree that holds the proof target;
    // hashed nodes on its path are collected deepest first
    fn build(
        &self,
        entries: &[Entry],
        depth: usize,
        target: Option<&[u8]>,
        witness: &mut Vec<Vec<u8>>,
    ) -> MptNode {
        if let [(path, value)] = entries {
            return MptNode::Leaf {
                path: path[depth..].to_vec(),
                value: value.clone(),
            };
        }

        let shared = common_prefix_len(entries, depth);
        if shared > 0 {
            let child = self.build(entries, depth + shared, target, witness);
            return MptNode::Extension {
                path: entries[0].0[depth..depth + shared].to_vec(),
                child: self.reference(child, target.is_some(), witness),
            };
        }

        let mut children: [Option<NodeRef>; 16] = Default::default();
        let mut value = None;
        let mut rest = entries;

        // A key ending here is a prefix of every other key, so it sorts first
        if rest[0].0.len() == depth {
            value = Some(rest[0].1.clone());
            rest = &rest[1..];
        }

        for nibble in 0..16u8 {
            let len = rest.iter().take_while(|(path, _)| path[depth] == nibble).count();
            let (group, tail) = rest.split_at(len);
            rest = tail;
            if group.is_empty() {
                continue;
            }
            let child_target = target.filter(|path| path.get(depth) == Some(&nibble));
            let child = self.build(group, depth + 1, child_target, witness);
            children[usize::from(nibble)] =
                Some(self.reference(child, child_target.is_some(), witness));
        }

        MptNode::Branch { children, value }
    }

    fn reference(&self, child: MptNode, on_path: bool, witness: &mut Vec<Vec<u8>>) -> NodeRef {
        let encoded = child.encoded();
        let node_ref = NodeRef::for_encoded(encoded.clone(), &self.hasher);
        if on_path && matches!(node_ref, NodeRef::Hash(_)) {
            witness.push(encoded);
        }
        node_ref
    }
}

fn common_prefix_len(entries: &[Entry], depth: usize) -> usize {
    let first = &entries[0].0[depth..];
    entries[1..].iter().fold(first.len(), |shared, (path, _)| {
        let rest = &path[depth..];
        first
            .iter()
            .zip(rest)
            .take(shared)
            .take_while(|(a, b)| a == b)
            .count()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EMPTY_TRIE_ROOT;
    use crate::utils::hex_prefix;
    use crate::utils::mpt::{verify_inclusion, MptVerifier};

    fn path_for(key: &[u8]) -> Vec<u8> {
        hex_prefix::encode(&bytes_to_nibbles(key), true)
    }

    #[test]
    fn test_empty_root() {
        assert_eq!(MerkleTrie::new().root(), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_single_entry_root() {
        let mut trie = MerkleTrie::new();
        trie.insert(b"key", vec![0x42; 40]);

        let leaf = MptNode::Leaf {
            path: bytes_to_nibbles(b"key"),
            value: vec![0x42; 40],
        };
        assert_eq!(trie.root(), crate::utils::keccak::keccak256(&leaf.encoded()));
        assert_eq!(trie.proof(b"key"), Some(vec![leaf.encoded()]));
    }

    #[test]
    fn test_known_root() {
        // Classic vectors from the Ethereum trie test suite
        let mut trie = MerkleTrie::new();
        trie.insert(b"doe", b"reindeer".to_vec());
        trie.insert(b"dog", b"puppy".to_vec());
        trie.insert(b"dogglesworth", b"cat".to_vec());

        assert_eq!(
            hex::encode(trie.root()),
            "8aad789dff2f538bca5d8ea56e8abe10f4c7ba3a5dea95fea4cd6e7c3a1168d3"
        );
    }

    #[test]
    fn test_proofs_verify_for_every_key() {
        let keys: Vec<&[u8]> = vec![&b"do"[..], &b"dog"[..], &b"doge"[..], &b"horse"[..], &b"h"[..]];
        let mut trie = MerkleTrie::new();
        for key in &keys {
            trie.insert(key, [*key, &b"-value"[..]].concat());
        }
        let root = trie.root();

        for key in &keys {
            let witness = trie.proof(key).unwrap();
            let value = trie.get(key).unwrap();
            assert_eq!(
                verify_inclusion(root, &path_for(key), value, &witness),
                Ok(true),
                "key {:?}",
                String::from_utf8_lossy(key)
            );
        }
    }

    #[test]
    fn test_absent_key_has_no_proof() {
        let trie = MerkleTrie::ordered(vec![vec![1; 40], vec![2; 40]]);
        assert!(trie.proof(&receipt_key(5)).is_none());
    }

    #[test]
    fn test_ordered_trie_large() {
        let values: Vec<Vec<u8>> = (0..300u32).map(|i| i.to_be_bytes().repeat(10)).collect();
        let trie = MerkleTrie::ordered(values.clone());
        let root = trie.root();
        let verifier = MptVerifier::default();

        for index in [0u64, 1, 15, 16, 127, 128, 255, 299] {
            let key = receipt_key(index);
            let witness = trie.proof(&key).unwrap();
            let path = hex_prefix::receipt_path(index);
            verifier
                .verify(root, &path, &values[index as usize], &witness)
                .unwrap();
        }
    }

    #[test]
    fn test_insert_empty_value_removes() {
        let mut trie = MerkleTrie::new();
        trie.insert(b"a", b"1".to_vec());
        trie.insert(b"a", Vec::new());
        assert!(trie.is_empty());
        assert_eq!(trie.root(), EMPTY_TRIE_ROOT);
    }
}
