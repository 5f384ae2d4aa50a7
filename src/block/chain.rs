// Parent-hash chain validation over consecutive block headers

use crate::block::header::BlockHeader;
use crate::constants::limits;
use crate::error::{LimitExceeded, ProofError, Rejection};
use crate::utils::keccak::{Keccak256Hasher, NodeHasher};
use alloy_primitives::B256;
use itertools::Itertools;

/// Checks that every header names its predecessor as parent
#[derive(Debug, Clone)]
pub struct ChainValidator<H = Keccak256Hasher> {
    hasher: H,
    max_chain_len: usize,
}

impl Default for ChainValidator<Keccak256Hasher> {
    fn default() -> Self {
        Self::new(Keccak256Hasher)
    }
}

impl<H: NodeHasher> ChainValidator<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            max_chain_len: limits::MAX_CHAIN_LEN,
        }
    }

    pub fn with_max_len(mut self, max_chain_len: usize) -> Self {
        self.max_chain_len = max_chain_len;
        self
    }

    /// Validate `headers` as a contiguous chain, oldest first
    ///
    /// With an `anchor`, the first header must hash to it and is reported as
    /// index 0 on mismatch. Otherwise a broken link reports the index of the
    /// header whose `parent_hash` is wrong. More headers than the configured
    /// maximum is a decode error, since nothing was checked.
    pub fn verify(&self, headers: &[BlockHeader], anchor: Option<B256>) -> Result<(), ProofError> {
        let first = headers.first().ok_or(Rejection::EmptyChain)?;
        if headers.len() > self.max_chain_len {
            return Err(LimitExceeded::ChainLen {
                len: headers.len(),
                max: self.max_chain_len,
            }
            .into());
        }

        if let Some(anchor) = anchor {
            if first.hash_with(&self.hasher) != anchor {
                log::debug!("first header does not hash to anchor {anchor}");
                return Err(Rejection::BrokenChain { index: 0 }.into());
            }
        }

        let broken = headers
            .iter()
            .tuple_windows()
            .position(|(parent, child)| child.parent_hash != parent.hash_with(&self.hasher));

        match broken {
            Some(position) => {
                log::debug!("header {} does not link to its predecessor", position + 1);
                Err(Rejection::BrokenChain { index: position + 1 }.into())
            }
            None => Ok(()),
        }
    }
}

/// Validate a header chain with Keccak-256 and the default length limit
pub fn verify_chain(headers: &[BlockHeader], anchor: Option<B256>) -> Result<(), ProofError> {
    ChainValidator::default().verify(headers, anchor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> Vec<BlockHeader> {
        let mut headers: Vec<BlockHeader> = Vec::with_capacity(len);
        for number in 0..len as u64 {
            let parent_hash = headers.last().map(BlockHeader::hash).unwrap_or_default();
            headers.push(BlockHeader {
                parent_hash,
                number,
                gas_limit: 5000,
                timestamp: number * 15,
                ..Default::default()
            });
        }
        headers
    }

    #[test]
    fn test_valid_chain() {
        let headers = chain(5);
        assert_eq!(verify_chain(&headers, None), Ok(()));
        assert_eq!(verify_chain(&headers, Some(headers[0].hash())), Ok(()));
    }

    #[test]
    fn test_single_header() {
        let headers = chain(1);
        assert_eq!(verify_chain(&headers, None), Ok(()));
        assert_eq!(
            verify_chain(&headers, Some(B256::repeat_byte(1))),
            Err(Rejection::BrokenChain { index: 0 }.into())
        );
    }

    #[test]
    fn test_empty_chain() {
        assert_eq!(verify_chain(&[], None), Err(Rejection::EmptyChain.into()));
    }

    #[test]
    fn test_broken_link_index() {
        for broken in 1..4 {
            let mut headers = chain(4);
            headers[broken].parent_hash = B256::repeat_byte(0xee);
            assert_eq!(
                verify_chain(&headers, None),
                Err(Rejection::BrokenChain { index: broken }.into())
            );
        }
    }

    #[test]
    fn test_mutated_header_breaks_next_link() {
        let mut headers = chain(3);
        headers[1].timestamp += 1;
        assert_eq!(
            verify_chain(&headers, None),
            Err(Rejection::BrokenChain { index: 2 }.into())
        );
    }

    #[test]
    fn test_chain_too_long() {
        let headers = chain(4);
        let validator = ChainValidator::default().with_max_len(3);
        assert_eq!(
            validator.verify(&headers, None),
            Err(LimitExceeded::ChainLen { len: 4, max: 3 }.into())
        );
        assert_eq!(validator.verify(&headers[..3], None), Ok(()));
    }
}
