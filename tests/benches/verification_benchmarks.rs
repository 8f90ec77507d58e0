//! # Peg Core Benchmarks
//!
//! | Path | Cost driver |
//! |------|-------------|
//! | pg-01 checkpoint encoding | committee size, batch size |
//! | pg-02 threshold verification | one secp256k1 recovery per present slot |
//! | pg-04 batch relay | verification plus state clone and commit |

use std::sync::Arc;
use std::time::Duration;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use pg_01_checkpoint_encoder::{batch_digest, CheckpointEncoder, DomainTag};
use pg_02_signature_verification::test_helpers::{committee_of, sign_slots, signing_keys};
use pg_02_signature_verification::ThresholdVerifier;
use pg_04_batch_relay::{BridgeConfig, BridgeService, InMemoryCustodyLedger, InMemoryStateStore};
use shared_types::{Batch, Threshold, TransferInstruction};

const COMMITTEE_SIZES: [usize; 3] = [10, 50, 100];

fn domain() -> DomainTag {
    DomainTag::from_label("bench").expect("valid label")
}

fn batch(sequence: u64, size: usize) -> Batch {
    let transfers = (0..size)
        .map(|i| {
            let mut destination = [0u8; 20];
            destination[12..].copy_from_slice(&(i as u64).to_be_bytes());
            TransferInstruction::new(destination, 1, 1)
        })
        .collect();
    Batch::new([0xAA; 20], sequence, transfers).expect("valid batch")
}

fn bench_checkpoint_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("pg-01-checkpoint-encoder");
    let encoder = CheckpointEncoder::new(domain());

    for size in COMMITTEE_SIZES {
        let keys = signing_keys(0, size);
        let committee = committee_of(&keys, &vec![1; size], 1);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("rotation", size), &committee, |b, committee| {
            b.iter(|| black_box(encoder.rotation(committee)))
        });
    }

    let large = batch(1, 100);
    group.bench_function("batch_digest_100", |b| {
        b.iter(|| black_box(batch_digest(&large)))
    });

    group.finish();
}

fn bench_threshold_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("pg-02-threshold-verification");
    group.measurement_time(Duration::from_secs(10));
    let verifier = ThresholdVerifier::new(Threshold::new(2, 3).expect("valid threshold"));
    let encoder = CheckpointEncoder::new(domain());

    for size in COMMITTEE_SIZES {
        let keys = signing_keys(0, size);
        let committee = committee_of(&keys, &vec![1; size], 1);
        let digest = encoder.rotation(&committee);
        let signers: Vec<usize> = (0..size).collect();
        let slots = sign_slots(&digest, &keys, &signers);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("all_signed", size), &slots, |b, slots| {
            b.iter(|| black_box(verifier.verify(&committee, &digest, slots)))
        });
    }

    group.finish();
}

fn bench_batch_relay(c: &mut Criterion) {
    let mut group = c.benchmark_group("pg-04-batch-relay");
    let keys = signing_keys(0, 20);
    let config = BridgeConfig::new(domain(), Threshold::new(2, 3).expect("valid threshold"));
    let encoder = CheckpointEncoder::new(domain());
    let signers: Vec<usize> = (0..20).collect();

    group.bench_function("relay_100_transfers", |b| {
        let custody = Arc::new(InMemoryCustodyLedger::funded([0xAA; 20], u128::MAX));
        let mut service = BridgeService::bootstrap(
            config,
            committee_of(&keys, &[1; 20], 0),
            custody,
            Arc::new(InMemoryStateStore::new()),
        )
        .expect("bootstrap");
        let committee = service.committee().clone();
        let mut sequence = 0;

        b.iter_batched(
            || {
                sequence += 1;
                let next = batch(sequence, 100);
                let slots = sign_slots(&encoder.batch(&committee, &next), &keys, &signers);
                (next, slots)
            },
            |(next, slots)| black_box(service.relay_batch(&[0xAA; 20], &next, &slots).expect("relay")),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_checkpoint_encoding,
    bench_threshold_verification,
    bench_batch_relay
);
criterion_main!(benches);
