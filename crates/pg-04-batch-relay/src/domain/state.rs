//! # Bridge State
//!
//! The single owned state object: the validator registry plus the relay's
//! replay floors, deposit counter and fee pools. Persisted as one snapshot.

use std::collections::BTreeMap;

use pg_01_checkpoint_encoder::DomainTag;
use pg_03_validator_registry::ValidatorSetRegistry;
use serde::{Deserialize, Serialize};
use shared_types::{
    Address, AssetId, Batch, BridgeError, BridgeResult, DepositEvent, ForeignAddress, Threshold,
};

/// Replay floors, deposit counter and fee pools.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayState {
    /// Highest relayed batch sequence per asset; absent means 0.
    last_sequence: BTreeMap<AssetId, u64>,
    /// Last assigned deposit sequence, shared by all assets.
    deposit_sequence: u64,
    /// Batch fees credited to relayers, per asset.
    accrued_fees: BTreeMap<AssetId, u128>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest relayed sequence for `asset` (0 if none).
    pub fn last_sequence(&self, asset: &AssetId) -> u64 {
        self.last_sequence.get(asset).copied().unwrap_or(0)
    }

    pub fn deposit_sequence(&self) -> u64 {
        self.deposit_sequence
    }

    pub fn accrued_fees(&self, asset: &AssetId) -> u128 {
        self.accrued_fees.get(asset).copied().unwrap_or(0)
    }

    /// Replay check: `proposed` must exceed the floor for `asset`.
    pub fn check_sequence(&self, asset: &AssetId, proposed: u64) -> BridgeResult<()> {
        let last = self.last_sequence(asset);
        if proposed <= last {
            return Err(BridgeError::StaleBatchSequence {
                asset: *asset,
                last,
                proposed,
            });
        }
        Ok(())
    }

    /// Raise the floor to the batch's sequence and credit its fees.
    pub fn record_batch(&mut self, batch: &Batch) -> BridgeResult<()> {
        self.check_sequence(batch.asset(), batch.sequence())?;

        let pool = self.accrued_fees.entry(*batch.asset()).or_insert(0);
        *pool = pool
            .checked_add(batch.total_fee())
            .ok_or_else(|| BridgeError::malformed("fee pool overflows"))?;
        self.last_sequence.insert(*batch.asset(), batch.sequence());
        Ok(())
    }

    /// Assign the next global deposit sequence.
    pub fn record_deposit(
        &mut self,
        asset: AssetId,
        amount: u128,
        source: Address,
        destination: ForeignAddress,
    ) -> BridgeResult<DepositEvent> {
        let sequence = self
            .deposit_sequence
            .checked_add(1)
            .ok_or_else(|| BridgeError::malformed("deposit sequence exhausted"))?;
        self.deposit_sequence = sequence;

        Ok(DepositEvent {
            sequence,
            asset,
            amount,
            source,
            destination,
        })
    }
}

/// Everything the bridge persists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeState {
    pub domain_tag: DomainTag,
    /// Acceptance threshold fixed when the deployment was initialised.
    pub threshold: Threshold,
    pub registry: ValidatorSetRegistry,
    pub relay: RelayState,
}

impl BridgeState {
    /// Fresh state seeded with a genesis registry.
    pub fn genesis(
        domain_tag: DomainTag,
        threshold: Threshold,
        registry: ValidatorSetRegistry,
    ) -> Self {
        Self {
            domain_tag,
            threshold,
            registry,
            relay: RelayState::new(),
        }
    }
}
