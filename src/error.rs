// Error types shared by the codecs, the trie verifier and the chain validator
//
// `DecodeError` means the input could not be parsed at all, or is larger than
// the configured limits allow. `Rejection` means the input parsed but does not
// prove what it claims to. The two never mix: callers treat the first as input
// they could not judge and the second as an invalid proof.

use alloy_primitives::B256;

/// Input bytes are structurally invalid or non-canonical
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed RLP encoding: {0}")]
    MalformedEncoding(#[from] alloy_rlp::Error),

    #[error("Malformed hex-prefix path: {reason}")]
    MalformedPath { reason: &'static str },

    #[error("Truncated header: expected 15 fields, found {found}")]
    TruncatedHeader { found: usize },

    #[error("Unsupported header layout: expected 15 fields, found {found}")]
    UnsupportedHeader { found: usize },

    #[error("Truncated receipt: expected 4 fields, found {found}")]
    TruncatedReceipt { found: usize },

    #[error("Unsupported receipt: {reason}")]
    UnsupportedReceipt { reason: &'static str },

    #[error("Invalid receipt status byte {0:#04x}")]
    InvalidStatus(u8),

    #[error("Field {field} has length {found}, expected {expected}")]
    FieldLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Expected an RLP string, found a list")]
    UnexpectedList,

    #[error("Expected an RLP list, found a string")]
    UnexpectedString,

    #[error("{0} trailing bytes after RLP item")]
    TrailingBytes(usize),

    #[error("Input exceeds verification limits: {0}")]
    LimitExceeded(#[from] LimitExceeded),
}

/// Input too large for the configured limits; says nothing about validity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitExceeded {
    #[error("witness has {len} nodes, limit is {max}")]
    WitnessNodes { len: usize, max: usize },

    #[error("witness node {node} is {len} bytes, limit is {max}")]
    NodeLen { node: usize, len: usize, max: usize },

    #[error("chain has {len} headers, limit is {max}")]
    ChainLen { len: usize, max: usize },
}

/// A well-formed proof that fails verification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Hash mismatch at {context}: expected {expected}, computed {computed}")]
    HashMismatch {
        context: &'static str,
        expected: B256,
        computed: B256,
    },

    #[error("Path mismatch at witness node {node}")]
    PathMismatch { node: usize },

    #[error("Path not found at witness node {node}")]
    PathNotFound { node: usize },

    #[error("Value mismatch at witness node {node}")]
    ValueMismatch { node: usize },

    #[error("Witness exhausted after {consumed} nodes without reaching a value")]
    IncompleteWitness { consumed: usize },

    #[error("{unused} witness nodes left over after the proof terminated")]
    UnusedWitness { unused: usize },

    #[error("Broken chain at header {index}")]
    BrokenChain { index: usize },

    #[error("Empty header chain")]
    EmptyChain,
}

/// Either outcome of a verification call that did not succeed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProofError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Rejected(#[from] Rejection),
}

impl ProofError {
    /// True when the input parsed and the proof is simply invalid
    pub fn is_rejection(&self) -> bool {
        matches!(self, ProofError::Rejected(_))
    }

    /// True when the input was too large to verify under the current limits
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, ProofError::Decode(DecodeError::LimitExceeded(_)))
    }

    /// Folds a verification result into the boolean contract: valid proofs are
    /// `Ok(true)`, rejected proofs `Ok(false)`, unparseable input stays an error.
    pub fn into_verdict(result: Result<(), ProofError>) -> Result<bool, DecodeError> {
        match result {
            Ok(()) => Ok(true),
            Err(ProofError::Rejected(reason)) => {
                log::debug!("proof rejected: {reason}");
                Ok(false)
            }
            Err(ProofError::Decode(err)) => Err(err),
        }
    }
}

impl From<LimitExceeded> for ProofError {
    fn from(err: LimitExceeded) -> Self {
        ProofError::Decode(err.into())
    }
}

impl From<alloy_rlp::Error> for ProofError {
    fn from(err: alloy_rlp::Error) -> Self {
        ProofError::Decode(DecodeError::MalformedEncoding(err))
    }
}
