// Merkle-Patricia-Trie inclusion proof verification
//
// Walks a witness (raw RLP nodes, root first) along an HP-encoded path and
// checks that every node is committed to by its parent and that the path ends
// at the expected value.

use crate::constants::{
    limits, BRANCH_NODE_LEN, INLINE_NODE_THRESHOLD, SHORT_NODE_LEN,
};
use crate::error::{DecodeError, LimitExceeded, ProofError, Rejection};
use crate::utils::hex_prefix;
use crate::utils::keccak::{Keccak256Hasher, NodeHasher};
use crate::utils::rlp::{self, RlpItem};
use alloy_primitives::B256;
use alloy_rlp::{BufMut, Encodable, EMPTY_STRING_CODE};

/// How a parent node points at a child
///
/// Children whose encoding is at least 32 bytes are referenced by hash and
/// must be supplied in the witness. Smaller children are embedded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    Hash(B256),
    Inline(Vec<u8>),
}

impl NodeRef {
    /// Reference to an encoded node, applying the inlining rule
    pub fn for_encoded<H: NodeHasher>(encoded: Vec<u8>, hasher: &H) -> Self {
        if encoded.len() < INLINE_NODE_THRESHOLD {
            NodeRef::Inline(encoded)
        } else {
            NodeRef::Hash(hasher.hash(&encoded))
        }
    }

    /// Interpret a child slot; the empty string means no child
    pub fn from_item(item: &RlpItem) -> Result<Option<Self>, DecodeError> {
        match item {
            RlpItem::Bytes(b) if b.is_empty() => Ok(None),
            RlpItem::Bytes(_) => Ok(Some(NodeRef::Hash(B256::from(
                item.as_fixed::<32>("child reference")?,
            )))),
            RlpItem::List(_) => {
                let encoded = item.encoded();
                if encoded.len() >= INLINE_NODE_THRESHOLD {
                    return Err(alloy_rlp::Error::Custom("embedded node of 32 bytes or more").into());
                }
                Ok(Some(NodeRef::Inline(encoded)))
            }
        }
    }
}

impl Encodable for NodeRef {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            NodeRef::Hash(hash) => hash.as_slice().encode(out),
            NodeRef::Inline(raw) => out.put_slice(raw),
        }
    }

    fn length(&self) -> usize {
        match self {
            NodeRef::Hash(hash) => hash.as_slice().length(),
            NodeRef::Inline(raw) => raw.len(),
        }
    }
}

/// A decoded trie node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MptNode {
    Leaf {
        path: Vec<u8>,
        value: Vec<u8>,
    },
    Extension {
        path: Vec<u8>,
        child: NodeRef,
    },
    Branch {
        children: [Option<NodeRef>; 16],
        value: Option<Vec<u8>>,
    },
}

impl MptNode {
    /// Decode a raw node: a list of 2 (leaf/extension) or 17 (branch) items
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let items = rlp::decode_list(raw)?;

        match items.len() {
            BRANCH_NODE_LEN => {
                let mut children: [Option<NodeRef>; 16] = Default::default();
                for (slot, item) in children.iter_mut().zip(&items) {
                    *slot = NodeRef::from_item(item)?;
                }
                let value = items[16].as_bytes()?;
                let value = (!value.is_empty()).then(|| value.to_vec());
                Ok(MptNode::Branch { children, value })
            }
            SHORT_NODE_LEN => {
                let (path, is_leaf) = hex_prefix::decode(items[0].as_bytes()?)?;
                if is_leaf {
                    Ok(MptNode::Leaf {
                        path,
                        value: items[1].as_bytes()?.to_vec(),
                    })
                } else {
                    let child = NodeRef::from_item(&items[1])?
                        .ok_or(alloy_rlp::Error::Custom("extension without child"))?;
                    Ok(MptNode::Extension { path, child })
                }
            }
            _ => Err(alloy_rlp::Error::Custom("trie node must have 2 or 17 items").into()),
        }
    }

    /// Canonical encoding of this node
    pub fn encoded(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        buf
    }

    fn payload_length(&self) -> usize {
        match self {
            MptNode::Leaf { path, value } => {
                hex_prefix::encode(path, true).as_slice().length() + value.as_slice().length()
            }
            MptNode::Extension { path, child } => {
                hex_prefix::encode(path, false).as_slice().length() + child.length()
            }
            MptNode::Branch { children, value } => {
                let children_len: usize = children
                    .iter()
                    .map(|child| child.as_ref().map_or(1, |child| child.length()))
                    .sum();
                children_len + value.as_deref().unwrap_or_default().length()
            }
        }
    }
}

impl Encodable for MptNode {
    fn encode(&self, out: &mut dyn BufMut) {
        alloy_rlp::Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);

        match self {
            MptNode::Leaf { path, value } => {
                hex_prefix::encode(path, true).as_slice().encode(out);
                value.as_slice().encode(out);
            }
            MptNode::Extension { path, child } => {
                hex_prefix::encode(path, false).as_slice().encode(out);
                child.encode(out);
            }
            MptNode::Branch { children, value } => {
                for child in children {
                    match child {
                        Some(child) => child.encode(out),
                        None => out.put_u8(EMPTY_STRING_CODE),
                    }
                }
                value.as_deref().unwrap_or_default().encode(out);
            }
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

/// Verifies inclusion proofs against a trusted trie root
#[derive(Debug, Clone)]
pub struct MptVerifier<H = Keccak256Hasher> {
    hasher: H,
    max_witness_nodes: usize,
    max_node_len: usize,
    require_exact_witness: bool,
}

impl Default for MptVerifier<Keccak256Hasher> {
    fn default() -> Self {
        Self::new(Keccak256Hasher)
    }
}

impl<H: NodeHasher> MptVerifier<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            max_witness_nodes: limits::MAX_WITNESS_NODES,
            max_node_len: limits::MAX_NODE_LEN,
            require_exact_witness: true,
        }
    }

    pub fn with_limits(mut self, max_witness_nodes: usize, max_node_len: usize) -> Self {
        self.max_witness_nodes = max_witness_nodes;
        self.max_node_len = max_node_len;
        self
    }

    /// Whether witness nodes left over after the terminal node reject the proof
    pub fn with_exact_witness(mut self, exact: bool) -> Self {
        self.require_exact_witness = exact;
        self
    }

    /// Check that `expected_value` is stored under `path` in the trie rooted at `root`
    ///
    /// `path` is HP-encoded; only its nibbles are used, the leaf flag is ignored.
    /// A witness over the configured limits is a decode error, not a rejection.
    /// Embedded child nodes are read from their parent, and are also accepted
    /// when a witness lists them as separate entries.
    pub fn verify<W: AsRef<[u8]>>(
        &self,
        root: B256,
        path: &[u8],
        expected_value: &[u8],
        witness: &[W],
    ) -> Result<(), ProofError> {
        let (nibbles, _) = hex_prefix::decode(path)?;

        if witness.len() > self.max_witness_nodes {
            return Err(LimitExceeded::WitnessNodes {
                len: witness.len(),
                max: self.max_witness_nodes,
            }
            .into());
        }

        let mut remaining = nibbles.as_slice();
        let mut current = NodeRef::Hash(root);
        let mut pos = 0;
        let mut step = 0;

        loop {
            let raw = match &current {
                NodeRef::Hash(expected) => {
                    let node: &[u8] = witness
                        .get(pos)
                        .ok_or(Rejection::IncompleteWitness { consumed: pos })?
                        .as_ref();
                    if node.len() > self.max_node_len {
                        return Err(LimitExceeded::NodeLen {
                            node: pos,
                            len: node.len(),
                            max: self.max_node_len,
                        }
                        .into());
                    }

                    let computed = self.hasher.hash(node);
                    if computed != *expected {
                        log::debug!("witness node {pos} hash {computed} does not match {expected}");
                        return Err(Rejection::HashMismatch {
                            context: "witness node",
                            expected: *expected,
                            computed,
                        }
                        .into());
                    }
                    pos += 1;
                    node.to_vec()
                }
                NodeRef::Inline(raw) => {
                    let listed = witness.get(pos).map(|node| node.as_ref());
                    if listed == Some(raw.as_slice()) {
                        pos += 1;
                    }
                    raw.clone()
                }
            };

            let node = MptNode::decode(&raw)?;
            log::trace!("step {step}: {} nibbles left", remaining.len());

            match node {
                MptNode::Branch { children, value } => match remaining.split_first() {
                    None => {
                        let value = value.ok_or(Rejection::PathNotFound { node: step })?;
                        if value != expected_value {
                            return Err(Rejection::ValueMismatch { node: step }.into());
                        }
                        return self.finish(pos, witness.len());
                    }
                    Some((&nibble, rest)) => {
                        current = children[usize::from(nibble)]
                            .clone()
                            .ok_or(Rejection::PathNotFound { node: step })?;
                        remaining = rest;
                    }
                },
                MptNode::Leaf { path, value } => {
                    if path != remaining {
                        return Err(Rejection::PathMismatch { node: step }.into());
                    }
                    if value != expected_value {
                        return Err(Rejection::ValueMismatch { node: step }.into());
                    }
                    return self.finish(pos, witness.len());
                }
                MptNode::Extension { path, child } => {
                    if !remaining.starts_with(&path) {
                        return Err(Rejection::PathMismatch { node: step }.into());
                    }
                    remaining = &remaining[path.len()..];
                    current = child;
                }
            }

            step += 1;
        }
    }

    fn finish(&self, consumed: usize, total: usize) -> Result<(), ProofError> {
        if self.require_exact_witness && consumed < total {
            return Err(Rejection::UnusedWitness { unused: total - consumed }.into());
        }
        Ok(())
    }
}

/// Verify an inclusion proof with Keccak-256 and default limits
///
/// `Ok(true)` for a valid proof, `Ok(false)` for a rejected one, `Err` when an
/// input cannot be decoded.
pub fn verify_inclusion<W: AsRef<[u8]>>(
    root: B256,
    path: &[u8],
    expected_value: &[u8],
    witness: &[W],
) -> Result<bool, DecodeError> {
    ProofError::into_verdict(MptVerifier::default().verify(root, path, expected_value, witness))
}
