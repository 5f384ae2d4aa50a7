// Hex-prefix (HP) path encoding used for Merkle-Patricia-Trie keys
//
// First nibble carries two flags: bit 1 = leaf (terminator), bit 0 = odd
// length. Odd paths pack their first nibble next to the flags, even paths pad
// with a zero nibble.

use crate::error::DecodeError;
use crate::utils::rlp::RlpItem;

const LEAF_FLAG: u8 = 0x2;
const ODD_FLAG: u8 = 0x1;

/// Encode a nibble path with its leaf/extension flag
pub fn encode(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let odd = nibbles.len() % 2 == 1;
    let mut flags = 0;
    if is_leaf {
        flags |= LEAF_FLAG;
    }
    if odd {
        flags |= ODD_FLAG;
    }

    let mut out = Vec::with_capacity(nibbles.len() / 2 + 1);
    let rest = if odd {
        out.push((flags << 4) | (nibbles[0] & 0x0f));
        &nibbles[1..]
    } else {
        out.push(flags << 4);
        nibbles
    };
    out.extend(nibbles_to_bytes(rest));
    out
}

/// Decode an HP path into its nibbles and leaf flag
pub fn decode(encoded: &[u8]) -> Result<(Vec<u8>, bool), DecodeError> {
    let (&first, rest) = encoded
        .split_first()
        .ok_or(DecodeError::MalformedPath { reason: "empty path" })?;

    let flags = first >> 4;
    if flags > (LEAF_FLAG | ODD_FLAG) {
        return Err(DecodeError::MalformedPath { reason: "unknown flag nibble" });
    }
    let is_leaf = flags & LEAF_FLAG != 0;
    let odd = flags & ODD_FLAG != 0;

    let mut nibbles = Vec::with_capacity(rest.len() * 2 + 1);
    if odd {
        nibbles.push(first & 0x0f);
    } else if first & 0x0f != 0 {
        return Err(DecodeError::MalformedPath { reason: "non-zero padding nibble" });
    }
    nibbles.extend(bytes_to_nibbles(rest));

    Ok((nibbles, is_leaf))
}

/// Convert bytes to nibbles (4-bit values), high nibble first
pub fn bytes_to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    for byte in bytes {
        nibbles.push(byte >> 4);        // High nibble
        nibbles.push(byte & 0x0F);      // Low nibble
    }
    nibbles
}

/// Convert an even-length nibble sequence back to bytes
pub fn nibbles_to_bytes(nibbles: &[u8]) -> Vec<u8> {
    nibbles
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | (pair[1] & 0x0F))
        .collect()
}

/// Key of transaction `index` in the receipts (and transactions) trie: RLP(index)
pub fn receipt_key(index: u64) -> Vec<u8> {
    RlpItem::uint(index).encoded()
}

/// HP-encoded trie path for transaction `index`
///
/// The flag is that of an extension path; the verifier only reads the nibbles.
pub fn receipt_path(index: u64) -> Vec<u8> {
    encode(&bytes_to_nibbles(&receipt_key(index)), false)
}
