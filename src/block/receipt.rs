// Post-Byzantium transaction receipt
// RLP encoding: [status, cumulativeGasUsed, logsBloom, [[address, [topics...], data]...]]

use crate::constants::{BLOOM_LEN, RECEIPT_FIELD_COUNT};
use crate::error::DecodeError;
use crate::utils::rlp::{self, RlpItem};
use crate::utils::trie::MerkleTrie;
use alloy_primitives::{Address, Bloom, Bytes, B256};
use alloy_rlp::{BufMut, Encodable};
use serde::{Deserialize, Serialize};

/// Event emitted by a contract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl Log {
    fn payload_length(&self) -> usize {
        self.address.length() + self.topics.length() + self.data.length()
    }

    fn from_item(item: &RlpItem) -> Result<Self, DecodeError> {
        let [address, topics, data] = item.as_list()? else {
            return Err(DecodeError::UnsupportedReceipt {
                reason: "log entry must have 3 fields",
            });
        };

        Ok(Self {
            address: Address::from(address.as_fixed::<20>("address")?),
            topics: topics
                .as_list()?
                .iter()
                .map(|topic| topic.as_fixed::<32>("topic").map(B256::from))
                .collect::<Result<_, _>>()?,
            data: Bytes::copy_from_slice(data.as_bytes()?),
        })
    }
}

impl Encodable for Log {
    fn encode(&self, out: &mut dyn BufMut) {
        alloy_rlp::Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        self.address.encode(out);
        self.topics.encode(out);
        self.data.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

/// Receipt of an executed transaction
///
/// A successful status encodes as the single byte 0x01, a failed one as the
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub status: bool,
    pub cumulative_gas_used: u64,
    pub logs_bloom: Bloom,
    pub logs: Vec<Log>,
}

impl Receipt {
    fn payload_length(&self) -> usize {
        self.status.length()
            + self.cumulative_gas_used.length()
            + self.logs_bloom.length()
            + self.logs.length()
    }

    /// Encode receipt to RLP bytes
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        buf
    }

    /// Strictly decode an RLP-encoded receipt
    ///
    /// Typed (EIP-2718) envelopes and pre-Byzantium receipts carrying a state
    /// root are reported as unsupported.
    pub fn decode(rlp_receipt: &[u8]) -> Result<Self, DecodeError> {
        if rlp_receipt.first().is_some_and(|&b| b < alloy_rlp::EMPTY_STRING_CODE) {
            return Err(DecodeError::UnsupportedReceipt {
                reason: "typed receipt envelope",
            });
        }

        let fields = rlp::decode_list(rlp_receipt)?;
        let [status, cumulative_gas_used, logs_bloom, logs] = fields.as_slice() else {
            return Err(DecodeError::TruncatedReceipt { found: fields.len() });
        };
        debug_assert_eq!(fields.len(), RECEIPT_FIELD_COUNT);

        let status = match status.as_bytes()? {
            [] => false,
            [0x01] => true,
            root if root.len() == 32 => {
                return Err(DecodeError::UnsupportedReceipt {
                    reason: "pre-Byzantium state root in place of status",
                })
            }
            [byte, ..] => return Err(DecodeError::InvalidStatus(*byte)),
        };

        Ok(Self {
            status,
            cumulative_gas_used: cumulative_gas_used.as_u64()?,
            logs_bloom: Bloom::from(logs_bloom.as_fixed::<BLOOM_LEN>("logsBloom")?),
            logs: logs
                .as_list()?
                .iter()
                .map(Log::from_item)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Bloom filter accrued from this receipt's logs
    pub fn compute_bloom(&self) -> Bloom {
        let mut bloom = Bloom::default();
        for log in &self.logs {
            bloom.accrue_raw_log(log.address, &log.topics);
        }
        bloom
    }
}

impl Encodable for Receipt {
    fn encode(&self, out: &mut dyn BufMut) {
        alloy_rlp::Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        self.status.encode(out);
        self.cumulative_gas_used.encode(out);
        self.logs_bloom.encode(out);
        self.logs.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

/// Receipts trie of a block, receipt `i` stored under RLP(i)
pub fn receipts_trie(receipts: &[Receipt]) -> MerkleTrie {
    MerkleTrie::ordered(receipts.iter().map(Receipt::encode_to_vec))
}

/// `receiptsRoot` a header commits to for these receipts
pub fn receipts_root(receipts: &[Receipt]) -> B256 {
    receipts_trie(receipts).root()
}
