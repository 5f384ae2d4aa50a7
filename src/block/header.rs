// Ethereum block header (pre-London, 15 fields)
// RLP encoding: [parentHash, sha3Uncles, miner, stateRoot, transactionsRoot,
//                receiptsRoot, logsBloom, difficulty, number, gasLimit,
//                gasUsed, timestamp, extraData, mixHash, nonce]

use crate::constants::HEADER_FIELD_COUNT;
use crate::error::DecodeError;
use crate::utils::keccak::{Keccak256Hasher, NodeHasher};
use crate::utils::rlp::{self, RlpItem};
use alloy_primitives::{Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{BufMut, Encodable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Block header as hashed by the network
///
/// Scalars are encoded minimally, so a zero `gas_used` (or `number`) is the
/// empty string 0x80 and never a 0x00 byte. `number`, `gas_limit`, `gas_used`
/// and `timestamp` are bounded to 64 bits (EIP-1985); a wider value does not
/// decode. Field extraction works on the raw list and has no such bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub parent_hash: B256,
    #[serde(rename = "sha3Uncles")]
    pub uncles_hash: B256,
    pub miner: Address,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Bytes,
    pub mix_hash: B256,
    pub nonce: B64,
}

impl BlockHeader {
    fn payload_length(&self) -> usize {
        self.parent_hash.length()
            + self.uncles_hash.length()
            + self.miner.length()
            + self.state_root.length()
            + self.transactions_root.length()
            + self.receipts_root.length()
            + self.logs_bloom.length()
            + self.difficulty.length()
            + self.number.length()
            + self.gas_limit.length()
            + self.gas_used.length()
            + self.timestamp.length()
            + self.extra_data.length()
            + self.mix_hash.length()
            + self.nonce.length()
    }

    /// Encode header to RLP bytes
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        buf
    }

    /// Keccak256 of the RLP encoding
    pub fn hash(&self) -> B256 {
        self.hash_with(&Keccak256Hasher)
    }

    pub fn hash_with<H: NodeHasher>(&self, hasher: &H) -> B256 {
        hasher.hash(&self.encode_to_vec())
    }

    /// Strictly decode an RLP-encoded header
    pub fn decode(rlp_header: &[u8]) -> Result<Self, DecodeError> {
        let fields = rlp::decode_list(rlp_header)?;
        if fields.len() < HEADER_FIELD_COUNT {
            return Err(DecodeError::TruncatedHeader { found: fields.len() });
        }
        if fields.len() > HEADER_FIELD_COUNT {
            return Err(DecodeError::UnsupportedHeader { found: fields.len() });
        }

        let hash = |field: HeaderField| -> Result<B256, DecodeError> {
            Ok(B256::from(fields[field.index()].as_fixed::<32>(field.name())?))
        };

        Ok(Self {
            parent_hash: hash(HeaderField::ParentHash)?,
            uncles_hash: hash(HeaderField::UnclesHash)?,
            miner: Address::from(fields[2].as_fixed::<20>(HeaderField::Miner.name())?),
            state_root: hash(HeaderField::StateRoot)?,
            transactions_root: hash(HeaderField::TransactionsRoot)?,
            receipts_root: hash(HeaderField::ReceiptsRoot)?,
            logs_bloom: Bloom::from(fields[6].as_fixed::<256>(HeaderField::LogsBloom.name())?),
            difficulty: fields[7].as_u256()?,
            number: fields[8].as_u64()?,
            gas_limit: fields[9].as_u64()?,
            gas_used: fields[10].as_u64()?,
            timestamp: fields[11].as_u64()?,
            extra_data: Bytes::copy_from_slice(fields[12].as_bytes()?),
            mix_hash: hash(HeaderField::MixHash)?,
            nonce: B64::from(fields[14].as_fixed::<8>(HeaderField::Nonce.name())?),
        })
    }
}

impl Encodable for BlockHeader {
    fn encode(&self, out: &mut dyn BufMut) {
        alloy_rlp::Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);

        self.parent_hash.encode(out);
        self.uncles_hash.encode(out);
        self.miner.encode(out);
        self.state_root.encode(out);
        self.transactions_root.encode(out);
        self.receipts_root.encode(out);
        self.logs_bloom.encode(out);
        self.difficulty.encode(out);
        self.number.encode(out);
        self.gas_limit.encode(out);
        self.gas_used.encode(out);
        self.timestamp.encode(out);
        self.extra_data.encode(out);
        self.mix_hash.encode(out);
        self.nonce.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

/// Header fields in encoding order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    ParentHash,
    UnclesHash,
    Miner,
    StateRoot,
    TransactionsRoot,
    ReceiptsRoot,
    LogsBloom,
    Difficulty,
    Number,
    GasLimit,
    GasUsed,
    Timestamp,
    ExtraData,
    MixHash,
    Nonce,
}

impl HeaderField {
    pub const ALL: [HeaderField; HEADER_FIELD_COUNT] = [
        HeaderField::ParentHash,
        HeaderField::UnclesHash,
        HeaderField::Miner,
        HeaderField::StateRoot,
        HeaderField::TransactionsRoot,
        HeaderField::ReceiptsRoot,
        HeaderField::LogsBloom,
        HeaderField::Difficulty,
        HeaderField::Number,
        HeaderField::GasLimit,
        HeaderField::GasUsed,
        HeaderField::Timestamp,
        HeaderField::ExtraData,
        HeaderField::MixHash,
        HeaderField::Nonce,
    ];

    /// Position in the RLP list
    pub fn index(self) -> usize {
        self as usize
    }

    /// JSON-RPC name of the field
    pub fn name(self) -> &'static str {
        match self {
            HeaderField::ParentHash => "parentHash",
            HeaderField::UnclesHash => "sha3Uncles",
            HeaderField::Miner => "miner",
            HeaderField::StateRoot => "stateRoot",
            HeaderField::TransactionsRoot => "transactionsRoot",
            HeaderField::ReceiptsRoot => "receiptsRoot",
            HeaderField::LogsBloom => "logsBloom",
            HeaderField::Difficulty => "difficulty",
            HeaderField::Number => "number",
            HeaderField::GasLimit => "gasLimit",
            HeaderField::GasUsed => "gasUsed",
            HeaderField::Timestamp => "timestamp",
            HeaderField::ExtraData => "extraData",
            HeaderField::MixHash => "mixHash",
            HeaderField::Nonce => "nonce",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeaderField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeaderField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown header field: {s}"))
    }
}

/// Read one field out of an RLP-encoded header without building a `BlockHeader`
///
/// Only the first 15 fields are addressable; later additions are ignored.
pub fn extract_field(rlp_header: &[u8], field: HeaderField) -> Result<Vec<u8>, DecodeError> {
    let fields = header_fields(rlp_header)?;
    Ok(fields[field.index()].as_bytes()?.to_vec())
}

/// The `receiptsRoot` of an RLP-encoded header
pub fn extract_receipts_root(rlp_header: &[u8]) -> Result<B256, DecodeError> {
    extract_hash(rlp_header, HeaderField::ReceiptsRoot)
}

/// The `parentHash` of an RLP-encoded header
pub fn extract_parent_hash(rlp_header: &[u8]) -> Result<B256, DecodeError> {
    extract_hash(rlp_header, HeaderField::ParentHash)
}

fn extract_hash(rlp_header: &[u8], field: HeaderField) -> Result<B256, DecodeError> {
    let fields = header_fields(rlp_header)?;
    Ok(B256::from(fields[field.index()].as_fixed::<32>(field.name())?))
}

fn header_fields(rlp_header: &[u8]) -> Result<Vec<RlpItem>, DecodeError> {
    let fields = rlp::decode_list(rlp_header)?;
    if fields.len() < HEADER_FIELD_COUNT {
        return Err(DecodeError::TruncatedHeader { found: fields.len() });
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EMPTY_TRIE_ROOT, EMPTY_UNCLES_HASH};

    #[test]
    fn test_scalar_wider_than_64_bits() {
        let header = sample_header();
        let mut fields = rlp::decode_list(&header.encode_to_vec()).unwrap();
        fields[HeaderField::Number.index()] = RlpItem::bytes(vec![0x01; 9]);
        let wide = RlpItem::List(fields).encoded();

        assert!(matches!(
            BlockHeader::decode(&wide),
            Err(DecodeError::MalformedEncoding(_))
        ));
        assert_eq!(extract_receipts_root(&wide).unwrap(), header.receipts_root);
        assert_eq!(extract_field(&wide, HeaderField::Number).unwrap(), vec![0x01; 9]);
    }

    fn sample_header() -> BlockHeader {
        BlockHeader {
            parent_hash: B256::repeat_byte(0x11),
            uncles_hash: EMPTY_UNCLES_HASH,
            miner: Address::repeat_byte(0x22),
            state_root: B256::repeat_byte(0x33),
            transactions_root: B256::repeat_byte(0x44),
            receipts_root: B256::repeat_byte(0x55),
            logs_bloom: Bloom::repeat_byte(0x01),
            difficulty: U256::from(2_000_000_000_000u64),
            number: 6_339_082,
            gas_limit: 8_000_000,
            gas_used: 7_950_000,
            timestamp: 1_537_000_000,
            extra_data: Bytes::from_static(b"miner pool"),
            mix_hash: B256::repeat_byte(0x66),
            nonce: B64::repeat_byte(0x77),
        }
    }

    #[test]
    fn test_encode_decode() {
        let header = sample_header();
        let encoded = header.encode_to_vec();

        assert_eq!(encoded.len(), header.length());
        assert_eq!(BlockHeader::decode(&encoded).unwrap(), header);
    }

    #[test]
    fn test_zero_gas_used_is_empty_string() {
        let mut header = sample_header();
        header.gas_used = 0;

        let fields = rlp::decode_list(&header.encode_to_vec()).unwrap();
        assert_eq!(fields[HeaderField::GasUsed.index()], RlpItem::empty());

        // A header carrying 0x00 for gasUsed is a different (non-canonical) header
        let mut items = fields.clone();
        items[HeaderField::GasUsed.index()] = RlpItem::bytes(vec![0x00]);
        let padded = RlpItem::List(items).encoded();
        assert_ne!(padded, header.encode_to_vec());
        assert!(BlockHeader::decode(&padded).is_err());
    }

    #[test]
    fn test_hash_deterministic_and_sensitive() {
        let header = sample_header();
        assert_eq!(header.hash(), header.hash());

        let mut changed = header.clone();
        changed.nonce = B64::repeat_byte(0x78);
        assert_ne!(changed.hash(), header.hash());

        let mut changed = header.clone();
        changed.gas_used += 1;
        assert_ne!(changed.hash(), header.hash());
    }

    #[test]
    fn test_extract_fields() {
        let header = sample_header();
        let encoded = header.encode_to_vec();

        assert_eq!(extract_parent_hash(&encoded).unwrap(), header.parent_hash);
        assert_eq!(extract_receipts_root(&encoded).unwrap(), header.receipts_root);
        assert_eq!(
            extract_field(&encoded, HeaderField::Miner).unwrap(),
            header.miner.to_vec()
        );
        assert_eq!(
            extract_field(&encoded, HeaderField::Number).unwrap(),
            vec![0x60, 0xba, 0x0a]
        );
    }

    #[test]
    fn test_extract_tolerates_extra_fields() {
        let mut fields = rlp::decode_list(&sample_header().encode_to_vec()).unwrap();
        fields.push(RlpItem::uint(7)); // base fee
        let encoded = RlpItem::List(fields).encoded();

        assert_eq!(extract_receipts_root(&encoded).unwrap(), B256::repeat_byte(0x55));
        assert_eq!(
            BlockHeader::decode(&encoded),
            Err(DecodeError::UnsupportedHeader { found: 16 })
        );
    }

    #[test]
    fn test_truncated_header() {
        let fields = rlp::decode_list(&sample_header().encode_to_vec()).unwrap();
        let encoded = RlpItem::List(fields[..14].to_vec()).encoded();

        assert_eq!(
            extract_parent_hash(&encoded),
            Err(DecodeError::TruncatedHeader { found: 14 })
        );
        assert_eq!(
            BlockHeader::decode(&encoded),
            Err(DecodeError::TruncatedHeader { found: 14 })
        );
    }

    #[test]
    fn test_field_width_checked() {
        let mut fields = rlp::decode_list(&sample_header().encode_to_vec()).unwrap();
        fields[HeaderField::ReceiptsRoot.index()] = RlpItem::bytes(vec![0x55; 31]);
        let encoded = RlpItem::List(fields).encoded();

        assert_eq!(
            extract_receipts_root(&encoded),
            Err(DecodeError::FieldLength { field: "receiptsRoot", expected: 32, found: 31 })
        );
    }

    #[test]
    fn test_field_names() {
        for (position, field) in HeaderField::ALL.into_iter().enumerate() {
            assert_eq!(field.index(), position);
            assert_eq!(field.name().parse::<HeaderField>().unwrap(), field);
        }
        assert!("baseFeePerGas".parse::<HeaderField>().is_err());
    }

    #[test]
    fn test_empty_roots_roundtrip() {
        let header = BlockHeader {
            transactions_root: EMPTY_TRIE_ROOT,
            receipts_root: EMPTY_TRIE_ROOT,
            ..sample_header()
        };
        assert_eq!(BlockHeader::decode(&header.encode_to_vec()).unwrap(), header);
    }
}
