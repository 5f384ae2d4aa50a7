// Verification benchmarks: receipt inclusion and header chains

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use eth_event_proof::verifier::encode_witness;
use eth_event_proof::{
    receipt_key, receipt_path, BlockHeader, EventProof, Log, MerkleTrie, MptVerifier, Receipt,
};
use alloy_primitives::{Address, Bloom, Bytes, B256};

fn receipts(count: u64) -> Vec<Receipt> {
    (0..count)
        .map(|i| Receipt {
            status: true,
            cumulative_gas_used: 21_000 * (i + 1),
            logs_bloom: Bloom::ZERO,
            logs: vec![Log {
                address: Address::with_last_byte(i as u8),
                topics: vec![B256::with_last_byte(i as u8); 3],
                data: Bytes::from(vec![0xab; 64]),
            }],
        })
        .collect()
}

fn bench_inclusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("receipt_inclusion");

    for count in [16u64, 200, 1000] {
        let receipts = receipts(count);
        let trie = MerkleTrie::ordered(receipts.iter().map(Receipt::encode_to_vec));
        let index = count / 2;
        let value = receipts[index as usize].encode_to_vec();
        let witness = trie.proof(&receipt_key(index)).expect("index present");
        let path = receipt_path(index);
        let root = trie.root();
        let verifier = MptVerifier::default();

        group.bench_with_input(BenchmarkId::new("mpt_verify", count), &count, |b, _| {
            b.iter(|| verifier.verify(black_box(root), &path, &value, black_box(&witness)))
        });

        let header = BlockHeader {
            number: 6_339_082,
            receipts_root: root,
            ..Default::default()
        };
        let rlp_header = header.encode_to_vec();
        let rlp_witness = encode_witness(&witness).expect("valid nodes");
        let proof = EventProof::default();

        group.bench_with_input(BenchmarkId::new("prove_receipt", count), &count, |b, _| {
            b.iter(|| {
                proof.prove_receipt_inclusion(
                    black_box(header.hash()),
                    &rlp_header,
                    &value,
                    &path,
                    &rlp_witness,
                )
            })
        });
    }

    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut headers = vec![BlockHeader::default()];
    for number in 1..128u64 {
        let parent_hash = headers[headers.len() - 1].hash();
        headers.push(BlockHeader {
            parent_hash,
            number,
            ..Default::default()
        });
    }
    let encoded: Vec<Vec<u8>> = headers.iter().map(BlockHeader::encode_to_vec).collect();
    let proof = EventProof::default();

    c.bench_function("prove_blocks_128", |b| {
        b.iter(|| proof.prove_blocks(black_box(&encoded), None))
    });
}

criterion_group!(benches, bench_inclusion, bench_chain);
criterion_main!(benches);
