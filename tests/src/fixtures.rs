//! # Shared Test Fixtures
//!
//! A bridge wired to in-memory custody, deterministic committee keys and
//! helpers that sign each kind of claim the way off-chain signers do.

use std::sync::{Arc, Once};

use anyhow::Context;
use k256::ecdsa::SigningKey;
use pg_01_checkpoint_encoder::{CheckpointEncoder, DomainTag};
use pg_02_signature_verification::test_helpers::{committee_of, sign_slots, signing_keys};
use pg_02_signature_verification::SignatureSlots;
use pg_04_batch_relay::{
    BridgeConfig, BridgeService, InMemoryCustodyLedger, InMemoryStateStore, StateStore,
};
use shared_types::{Address, AssetId, Batch, Committee, Threshold, TransferInstruction};
use tracing_subscriber::EnvFilter;

/// Asset used by single-asset scenarios.
pub const ASSET: AssetId = [0xE2; 20];
/// A second asset, for per-asset isolation checks.
pub const OTHER_ASSET: AssetId = [0x7C; 20];

/// Seed of the first genesis signer key.
pub const GENESIS_SEED: u64 = 1_000;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn config(numerator: u32, denominator: u32) -> anyhow::Result<BridgeConfig> {
    Ok(BridgeConfig::new(
        DomainTag::from_label("peg-core-test")?,
        Threshold::new(numerator, denominator)?,
    ))
}

/// `count` transfers of `amount` with `fee` each, to distinct destinations.
pub fn uniform_batch(
    asset: AssetId,
    sequence: u64,
    count: usize,
    amount: u128,
    fee: u128,
) -> anyhow::Result<Batch> {
    let transfers = (0..count)
        .map(|i| TransferInstruction::new(destination(i), amount, fee))
        .collect();
    Ok(Batch::new(asset, sequence, transfers)?)
}

/// Deterministic destination address `i`.
pub fn destination(i: usize) -> Address {
    let mut address = [0x11u8; 20];
    address[12..].copy_from_slice(&(i as u64).to_be_bytes());
    address
}

/// A bridge with its signer keys and adapters.
pub struct Bridge<S: StateStore = InMemoryStateStore> {
    /// Keys of the current committee, in committee order.
    pub keys: Vec<SigningKey>,
    pub service: BridgeService<InMemoryCustodyLedger, S>,
    pub custody: Arc<InMemoryCustodyLedger>,
    pub store: Arc<S>,
}

impl Bridge<InMemoryStateStore> {
    /// Genesis bridge with one signer per power, in memory.
    pub fn genesis(powers: &[u64], threshold: (u32, u32)) -> anyhow::Result<Self> {
        Self::with_store(powers, threshold, Arc::new(InMemoryStateStore::new()))
    }
}

impl<S: StateStore> Bridge<S> {
    /// Genesis bridge over `store`; resumes if `store` already holds state.
    pub fn with_store(
        powers: &[u64],
        threshold: (u32, u32),
        store: Arc<S>,
    ) -> anyhow::Result<Self> {
        init_tracing();
        let keys = signing_keys(GENESIS_SEED, powers.len());
        let custody = Arc::new(InMemoryCustodyLedger::new());
        let service = BridgeService::bootstrap(
            config(threshold.0, threshold.1)?,
            committee_of(&keys, powers, 0),
            custody.clone(),
            store.clone(),
        )
        .context("bootstrap bridge")?;

        Ok(Self {
            keys,
            service,
            custody,
            store,
        })
    }

    pub fn encoder(&self) -> CheckpointEncoder {
        CheckpointEncoder::new(self.service.config().domain_tag)
    }

    /// Committee over `keys` at the next generation.
    pub fn next_committee(&self, keys: &[SigningKey], powers: &[u64]) -> Committee {
        committee_of(keys, powers, self.service.generation() + 1)
    }

    /// Current committee members `signers` sign the rotation to `new_committee`.
    pub fn sign_rotation(&self, new_committee: &Committee, signers: &[usize]) -> SignatureSlots {
        let digest = self.encoder().rotation(new_committee);
        sign_slots(&digest, &self.keys, signers)
    }

    /// Current committee members `signers` sign `batch`.
    pub fn sign_batch(&self, batch: &Batch, signers: &[usize]) -> SignatureSlots {
        let digest = self.encoder().batch(self.service.committee(), batch);
        sign_slots(&digest, &self.keys, signers)
    }

    /// Current committee members `signers` sign the joint rotation and batch.
    pub fn sign_joint(
        &self,
        new_committee: &Committee,
        batch: &Batch,
        signers: &[usize],
    ) -> SignatureSlots {
        let digest = self.encoder().rotation_and_batch(new_committee, batch);
        sign_slots(&digest, &self.keys, signers)
    }

    /// Deposit `amount` of `asset` so batches have something to release.
    pub fn fund(&mut self, asset: AssetId, amount: u128) -> anyhow::Result<()> {
        self.service
            .record_deposit(&asset, amount, &[0xDE; 20], &[0xAD; 32])?;
        Ok(())
    }
}

/// Fresh signer keys for a committee that has never signed anything.
pub fn fresh_keys(count: usize) -> Vec<SigningKey> {
    signing_keys(GENESIS_SEED + 10_000, count)
}
