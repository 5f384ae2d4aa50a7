// Shared fixtures for integration tests
#![allow(dead_code)]

use alloy_primitives::{address, b256, bytes, Address, Bloom, Bytes, B256, B64, U256};
use eth_event_proof::{BlockHeader, Log, MerkleTrie, Receipt, EMPTY_TRIE_ROOT, EMPTY_UNCLES_HASH};

/// Mainnet block 0
pub const GENESIS_HASH: B256 =
    b256!("d4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3");

pub fn genesis_header() -> BlockHeader {
    BlockHeader {
        parent_hash: B256::ZERO,
        uncles_hash: EMPTY_UNCLES_HASH,
        miner: Address::ZERO,
        state_root: b256!("d7f8974fb5ac78d9ac099b9ad5018bedc2ce0a72dad1827a1709da30580f0544"),
        transactions_root: EMPTY_TRIE_ROOT,
        receipts_root: EMPTY_TRIE_ROOT,
        logs_bloom: Bloom::ZERO,
        difficulty: U256::from(0x4_0000_0000u64),
        number: 0,
        gas_limit: 5000,
        gas_used: 0,
        timestamp: 0,
        extra_data: bytes!("11bbe8db4e347b4e8c937c1c8370e4b5ed33adb3db69cbdb7a38e1e50b1b82fa"),
        mix_hash: B256::ZERO,
        nonce: B64::from(0x42u64.to_be_bytes()),
    }
}

/// Mainnet receipt of tx 0x3b4cfcf4dc6c43e444528b8a26138992e58020b250a804b6b3e510f75439ea0d
pub const FIXTURE_RECEIPT_HEX: [&str; 8] = [
    "f9016601837925c3b9010000100000000000000000000000000000000000000000000000000000000000000000000000",
    "004000000000000000000000000000000000000000002000000000000000000000000040000000000000000000000000",
    "000000000000002000000000000000000000000000000000000000000000000000040000000000000000000000000000",
    "000000000000000000000000000001000000000000000000000000000000000000000000000000000000000000000000",
    "000000000000000000000000000000000000000000000000000000000000000000000000008000000000000000000000",
    "000000000000000000000000000000000020000000000000000000f85cf85a947ae0c8ea75428cd62fa48aca8738cff5",
    "10125f2df842a0934b615ac45ae983959e39bac5d942944fe163a5b1e2b846f603224108d1f56ca00000000000000000",
    "00000000dba031ef165613ced730319c5f37ec8e316425ce80",
];

pub fn fixture_receipt_rlp() -> Vec<u8> {
    hex::decode(FIXTURE_RECEIPT_HEX.concat()).unwrap()
}

pub fn fixture_receipt() -> Receipt {
    let mut bloom = Bloom::ZERO;
    for (index, byte) in [
        (1usize, 0x10u8),
        (38, 0x40),
        (59, 0x20),
        (72, 0x40),
        (92, 0x20),
        (118, 0x04),
        (147, 0x01),
        (218, 0x80),
        (246, 0x20),
    ] {
        bloom.0[index] = byte;
    }

    Receipt {
        status: true,
        cumulative_gas_used: 0x7925c3,
        logs_bloom: bloom,
        logs: vec![Log {
            address: address!("7ae0c8ea75428cd62fa48aca8738cff510125f2d"),
            topics: vec![
                b256!("934b615ac45ae983959e39bac5d942944fe163a5b1e2b846f603224108d1f56c"),
                b256!("000000000000000000000000dba031ef165613ced730319c5f37ec8e316425ce"),
            ],
            data: Bytes::new(),
        }],
    }
}

/// Filler receipt for position `index` of a synthetic block
pub fn filler_receipt(index: u64) -> Receipt {
    Receipt {
        status: index % 5 != 4,
        cumulative_gas_used: 21_000 * (index + 1),
        logs_bloom: Bloom::ZERO,
        logs: vec![Log {
            address: Address::with_last_byte(index as u8),
            topics: vec![B256::with_last_byte(index as u8)],
            data: Bytes::from(index.to_be_bytes().to_vec()),
        }],
    }
}

/// Synthetic block holding the mainnet fixture receipt at `fixture_index`
///
/// Only the receipt is real. The header (numbered 6339082), the filler receipts
/// and so the receipts root are made up, so this is not the mainnet block.
pub fn fixture_block(tx_count: u64, fixture_index: u64) -> (BlockHeader, Vec<Receipt>, MerkleTrie) {
    let receipts: Vec<Receipt> = (0..tx_count)
        .map(|i| if i == fixture_index { fixture_receipt() } else { filler_receipt(i) })
        .collect();
    let trie = eth_event_proof::block::receipts_trie(&receipts);

    let header = BlockHeader {
        parent_hash: B256::repeat_byte(0x5a),
        uncles_hash: EMPTY_UNCLES_HASH,
        miner: address!("ea674fdde714fd979de3edf0f56aa9716b898ec8"),
        state_root: B256::repeat_byte(0x3c),
        transactions_root: B256::repeat_byte(0x7e),
        receipts_root: trie.root(),
        logs_bloom: Bloom::ZERO,
        difficulty: U256::from(3_117_075_000_000_000u64),
        number: 6_339_082,
        gas_limit: 8_000_000,
        gas_used: 7_987_243,
        timestamp: 1_537_450_000,
        extra_data: Bytes::from_static(b"ethermine-eu1"),
        mix_hash: B256::repeat_byte(0x9d),
        nonce: B64::repeat_byte(0x13),
    };
    (header, receipts, trie)
}
