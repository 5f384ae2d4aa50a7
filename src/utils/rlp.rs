// RLP encoding utilities for Ethereum data structures
// Generic item tree on top of alloy-rlp headers: headers, receipts and trie
// nodes are all parsed into `RlpItem` first, then interpreted.

use crate::constants::limits::MAX_RLP_DEPTH;
use crate::error::DecodeError;
use alloy_primitives::U256;
use alloy_rlp::{BufMut, Encodable, Header};

/// One RLP value: a byte string or a list of values
///
/// Decoding is strict. Every length prefix must be in its shortest form,
/// single bytes below 0x80 must not carry a prefix and long lengths must not
/// start with a zero byte, so re-encoding a decoded item reproduces the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Byte string item
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        RlpItem::Bytes(data.into())
    }

    /// The empty byte string (0x80)
    pub fn empty() -> Self {
        RlpItem::Bytes(Vec::new())
    }

    /// Scalar as minimal big-endian bytes; zero becomes the empty string
    pub fn uint(value: u64) -> Self {
        RlpItem::Bytes(trim_leading_zeros(&value.to_be_bytes()).to_vec())
    }

    /// Big scalar as minimal big-endian bytes; zero becomes the empty string
    pub fn uint256(value: U256) -> Self {
        RlpItem::Bytes(trim_leading_zeros(&value.to_be_bytes::<32>()).to_vec())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, RlpItem::List(_))
    }

    /// True for the empty byte string, not for the empty list
    pub fn is_empty_string(&self) -> bool {
        matches!(self, RlpItem::Bytes(b) if b.is_empty())
    }

    pub fn as_bytes(&self) -> Result<&[u8], DecodeError> {
        match self {
            RlpItem::Bytes(b) => Ok(b),
            RlpItem::List(_) => Err(DecodeError::UnexpectedList),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem], DecodeError> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(DecodeError::UnexpectedString),
        }
    }

    /// Fixed-width byte string such as a hash or an address
    pub fn as_fixed<const N: usize>(&self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let bytes = self.as_bytes()?;
        bytes.try_into().map_err(|_| DecodeError::FieldLength {
            field,
            expected: N,
            found: bytes.len(),
        })
    }

    /// Canonical scalar that must fit in 64 bits
    pub fn as_u64(&self) -> Result<u64, DecodeError> {
        let bytes = self.as_canonical_scalar()?;
        if bytes.len() > 8 {
            return Err(alloy_rlp::Error::Overflow.into());
        }
        let mut buf = [0u8; 8];
        buf[8 - bytes.len()..].copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    /// Canonical scalar up to 256 bits
    pub fn as_u256(&self) -> Result<U256, DecodeError> {
        let bytes = self.as_canonical_scalar()?;
        if bytes.len() > 32 {
            return Err(alloy_rlp::Error::Overflow.into());
        }
        Ok(U256::from_be_slice(bytes))
    }

    fn as_canonical_scalar(&self) -> Result<&[u8], DecodeError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(alloy_rlp::Error::LeadingZero.into());
        }
        Ok(bytes)
    }

    /// Canonical encoding of this item
    pub fn encoded(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        buf
    }

    fn payload_length(&self) -> usize {
        match self {
            RlpItem::Bytes(b) => b.len(),
            RlpItem::List(items) => items.iter().map(|item| item.length()).sum(),
        }
    }
}

impl Encodable for RlpItem {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            RlpItem::Bytes(b) => b.as_slice().encode(out),
            RlpItem::List(items) => {
                // List length is the byte length of the encoded children
                alloy_rlp::Header {
                    list: true,
                    payload_length: self.payload_length(),
                }
                .encode(out);

                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    fn length(&self) -> usize {
        match self {
            RlpItem::Bytes(b) => b.as_slice().length(),
            RlpItem::List(_) => {
                let payload_length = self.payload_length();
                payload_length + alloy_rlp::length_of_length(payload_length)
            }
        }
    }
}

impl From<Vec<u8>> for RlpItem {
    fn from(data: Vec<u8>) -> Self {
        RlpItem::Bytes(data)
    }
}

impl From<&[u8]> for RlpItem {
    fn from(data: &[u8]) -> Self {
        RlpItem::Bytes(data.to_vec())
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(items: Vec<RlpItem>) -> Self {
        RlpItem::List(items)
    }
}

/// Decode the first item in `buf`, returning it with the number of bytes consumed
pub fn decode(buf: &[u8]) -> Result<(RlpItem, usize), DecodeError> {
    let mut cursor = buf;
    let item = decode_item(&mut cursor, 0)?;
    Ok((item, buf.len() - cursor.len()))
}

/// Decode a buffer that must hold exactly one item
pub fn decode_exact(buf: &[u8]) -> Result<RlpItem, DecodeError> {
    let (item, consumed) = decode(buf)?;
    if consumed != buf.len() {
        return Err(DecodeError::TrailingBytes(buf.len() - consumed));
    }
    Ok(item)
}

/// Decode a buffer that must hold exactly one list, returning its elements
pub fn decode_list(buf: &[u8]) -> Result<Vec<RlpItem>, DecodeError> {
    match decode_exact(buf)? {
        RlpItem::List(items) => Ok(items),
        RlpItem::Bytes(_) => Err(DecodeError::UnexpectedString),
    }
}

fn decode_item(buf: &mut &[u8], depth: usize) -> Result<RlpItem, DecodeError> {
    if depth > MAX_RLP_DEPTH {
        return Err(alloy_rlp::Error::Custom("list nesting too deep").into());
    }

    // Rejects non-canonical single bytes, short lengths in long form and
    // zero-padded length fields
    let header = Header::decode(buf)?;
    let data = *buf;
    if data.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort.into());
    }
    let (mut payload, rest) = data.split_at(header.payload_length);
    *buf = rest;

    if !header.list {
        return Ok(RlpItem::Bytes(payload.to_vec()));
    }

    let mut items = Vec::new();
    while !payload.is_empty() {
        items.push(decode_item(&mut payload, depth + 1)?);
    }
    Ok(RlpItem::List(items))
}

/// Strip leading zero bytes from a big-endian integer
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
