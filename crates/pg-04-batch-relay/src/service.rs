//! Bridge Service - the operation surface
//!
//! Owns the bridge state and drives the custody ledger and state store.
//!
//! Every operation follows the same shape:
//! 1. input shape checks (`MalformedInput`)
//! 2. staleness checks (`StaleGeneration`, `StaleBatchSequence`)
//! 3. one threshold verification against the *stored* committee
//! 4. stage the new state on a copy
//! 5. persist, move funds, then swap the copy in
//!
//! An error at any step leaves the in-memory state and the store as they
//! were. Outbound transfers are released only after the advanced state is
//! durable, so a crash can lose a release but never repeat one.

use std::sync::Arc;

use pg_01_checkpoint_encoder::CheckpointEncoder;
use pg_02_signature_verification::{
    SignatureSlots, ThresholdVerificationApi, ThresholdVerifier, VerificationTally,
};
use pg_03_validator_registry::{RotationReceipt, ValidatorSetRegistry};
use shared_types::{
    Address, AssetId, Batch, BridgeError, BridgeResult, Committee, DepositEvent, ForeignAddress,
    Hash, TransferInstruction,
};
use tracing::{error, info, warn};

use crate::config::BridgeConfig;
use crate::domain::{BridgeEvent, BridgeState};
use crate::ports::inbound::BridgeApi;
use crate::ports::outbound::{CustodyLedger, StateStore};

/// Outcome of a relayed batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReceipt {
    pub asset: AssetId,
    pub sequence: u64,
    pub transfers: usize,
    pub total_amount: u128,
    pub total_fee: u128,
    pub tally: VerificationTally,
}

/// Outcome of a joint rotation and batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotationAndBatchReceipt {
    pub rotation: RotationReceipt,
    pub batch: BatchReceipt,
}

/// Bridge verification core.
pub struct BridgeService<C, S>
where
    C: CustodyLedger,
    S: StateStore,
{
    config: BridgeConfig,
    verifier: ThresholdVerifier,
    encoder: CheckpointEncoder,
    state: BridgeState,
    custody: Arc<C>,
    store: Arc<S>,
    events: Vec<BridgeEvent>,
}

impl<C, S> BridgeService<C, S>
where
    C: CustodyLedger,
    S: StateStore,
{
    /// Resume from `store`, or start from `genesis_committee` if the store
    /// is empty. A stored state from another domain, or initialised with a
    /// different threshold, is refused.
    pub fn bootstrap(
        config: BridgeConfig,
        genesis_committee: Committee,
        custody: Arc<C>,
        store: Arc<S>,
    ) -> BridgeResult<Self> {
        config.validate()?;

        let state = match store.load()? {
            Some(state) => {
                if state.domain_tag != config.domain_tag {
                    return Err(BridgeError::Config {
                        reason: format!(
                            "stored state belongs to domain {}, configured {}",
                            state.domain_tag, config.domain_tag
                        ),
                    });
                }
                if state.threshold != config.threshold {
                    return Err(BridgeError::Config {
                        reason: format!(
                            "stored state was initialised with threshold {}, configured {}",
                            state.threshold, config.threshold
                        ),
                    });
                }
                info!(
                    "[pg-04] Resumed at generation {}, deposit sequence {}",
                    state.registry.generation(),
                    state.relay.deposit_sequence()
                );
                state
            }
            None => {
                let registry = ValidatorSetRegistry::genesis(&config.domain_tag, genesis_committee);
                let state = BridgeState::genesis(config.domain_tag, config.threshold, registry);
                store.commit(&state)?;
                info!(
                    "[pg-04] Initialised domain {} with threshold {}",
                    config.domain_tag, config.threshold
                );
                state
            }
        };

        Ok(Self {
            verifier: ThresholdVerifier::new(config.threshold),
            encoder: CheckpointEncoder::new(config.domain_tag),
            config,
            state,
            custody,
            store,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Replace the committee, authorized by the current committee.
    pub fn rotate_validator_set(
        &mut self,
        new_committee: Committee,
        signatures: &SignatureSlots,
    ) -> BridgeResult<RotationReceipt> {
        let mut staged = self.state.clone();
        let receipt = staged.registry.rotate(
            &self.config.domain_tag,
            &self.verifier,
            new_committee,
            signatures,
        )?;

        self.commit(staged)?;
        self.emit(rotation_event(&receipt));
        Ok(receipt)
    }

    /// Release `batch` of `asset` from custody, authorized by the current
    /// committee.
    pub fn relay_batch(
        &mut self,
        asset: &AssetId,
        batch: &Batch,
        signatures: &SignatureSlots,
    ) -> BridgeResult<BatchReceipt> {
        if batch.asset() != asset {
            return Err(BridgeError::malformed(format!(
                "batch is for asset 0x{}, relayed as 0x{}",
                hex::encode(batch.asset()),
                hex::encode(asset)
            )));
        }
        self.state.registry.check_slots(signatures)?;
        self.check_batch_sequence(batch)?;

        let committee = self.state.registry.committee();
        let digest = self.encoder.batch(committee, batch);
        let tally = self.require(committee, &digest, signatures, "batch")?;

        let mut staged = self.state.clone();
        staged.relay.record_batch(batch)?;

        self.commit_and_release(staged, batch.asset(), batch.transfers())?;

        let receipt = batch_receipt(batch, tally);
        self.emit(batch_event(&receipt, self.generation()));
        Ok(receipt)
    }

    /// Rotate the committee and release `batch` under one digest signed by
    /// the current committee. Both take effect or neither does.
    pub fn rotate_and_relay_batch(
        &mut self,
        new_committee: Committee,
        batch: &Batch,
        signatures: &SignatureSlots,
    ) -> BridgeResult<RotationAndBatchReceipt> {
        let registry = &self.state.registry;
        registry.check_slots(signatures)?;
        registry.check_generation(&new_committee)?;
        self.check_batch_sequence(batch)?;

        let signed_by = self.generation();
        let digest = self.encoder.rotation_and_batch(&new_committee, batch);

        let mut staged = self.state.clone();
        let rotation = staged.registry.stage_rotation(
            &self.config.domain_tag,
            &self.verifier,
            new_committee,
            &digest,
            signatures,
        )?;
        let tally = rotation.tally().clone();
        staged.relay.record_batch(batch)?;
        let rotation = staged.registry.commit(rotation);

        self.commit_and_release(staged, batch.asset(), batch.transfers())?;

        let receipt = RotationAndBatchReceipt {
            rotation,
            batch: batch_receipt(batch, tally),
        };
        self.emit(rotation_event(&receipt.rotation));
        self.emit(batch_event(&receipt.batch, signed_by));
        Ok(receipt)
    }

    /// Lock `amount` of `asset` from `source` into custody and number the
    /// deposit for the other chain.
    pub fn record_deposit(
        &mut self,
        asset: &AssetId,
        amount: u128,
        source: &Address,
        destination: &ForeignAddress,
    ) -> BridgeResult<DepositEvent> {
        let mut staged = self.state.clone();
        let deposit = staged
            .relay
            .record_deposit(*asset, amount, *source, *destination)?;

        self.custody
            .lock_in(asset, source, amount)
            .inspect_err(|e| warn!("[pg-04] Deposit refused by custody: {}", e))?;

        if let Err(e) = self.store.commit(&staged) {
            error!(
                "[pg-04] Deposit of {} 0x{} locked but not recorded: {}",
                amount,
                hex::encode(asset),
                e
            );
            return Err(e.into());
        }
        self.state = staged;

        info!(
            "[pg-04] Deposit #{}: {} of 0x{} from 0x{}",
            deposit.sequence,
            amount,
            hex::encode(asset),
            hex::encode(source)
        );
        self.emit(BridgeEvent::DepositRecorded(deposit));
        Ok(deposit)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    pub fn committee(&self) -> &Committee {
        self.state.registry.committee()
    }

    pub fn generation(&self) -> u64 {
        self.state.registry.generation()
    }

    pub fn checkpoint(&self) -> &Hash {
        self.state.registry.checkpoint()
    }

    pub fn last_batch_sequence(&self, asset: &AssetId) -> u64 {
        self.state.relay.last_sequence(asset)
    }

    pub fn deposit_sequence(&self) -> u64 {
        self.state.relay.deposit_sequence()
    }

    pub fn accrued_fees(&self, asset: &AssetId) -> u128 {
        self.state.relay.accrued_fees(asset)
    }

    pub fn custody(&self) -> &Arc<C> {
        &self.custody
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<BridgeEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_batch_sequence(&self, batch: &Batch) -> BridgeResult<()> {
        self.state
            .relay
            .check_sequence(batch.asset(), batch.sequence())
            .inspect_err(|e| warn!("[pg-04] Rejected batch: {}", e))
    }

    fn require(
        &self,
        committee: &Committee,
        digest: &Hash,
        signatures: &SignatureSlots,
        what: &str,
    ) -> BridgeResult<VerificationTally> {
        self.verifier
            .require(committee, digest, signatures)
            .inspect_err(|e| warn!("[pg-04] Rejected {}: {}", what, e))
    }

    fn commit(&mut self, staged: BridgeState) -> BridgeResult<()> {
        self.store.commit(&staged)?;
        self.state = staged;
        Ok(())
    }

    /// Persist `staged`, then release `transfers`. If custody refuses, the
    /// previous state is restored in the store.
    fn commit_and_release(
        &mut self,
        staged: BridgeState,
        asset: &AssetId,
        transfers: &[TransferInstruction],
    ) -> BridgeResult<()> {
        self.store.commit(&staged)?;

        if let Err(e) = self.custody.transfer_out(asset, transfers) {
            warn!("[pg-04] Custody refused batch release: {}", e);
            if let Err(restore) = self.store.commit(&self.state) {
                // The batch stays consumed without a release; never replayable.
                error!(
                    "[pg-04] Could not restore state after custody failure: {}",
                    restore
                );
                self.state = staged;
                return Err(restore.into());
            }
            return Err(e.into());
        }

        self.state = staged;
        Ok(())
    }

    fn emit(&mut self, event: BridgeEvent) {
        self.events.push(event);
    }
}

impl<C, S> BridgeApi for BridgeService<C, S>
where
    C: CustodyLedger,
    S: StateStore,
{
    fn rotate_validator_set(
        &mut self,
        new_committee: Committee,
        signatures: &SignatureSlots,
    ) -> BridgeResult<RotationReceipt> {
        BridgeService::rotate_validator_set(self, new_committee, signatures)
    }

    fn relay_batch(
        &mut self,
        asset: &AssetId,
        batch: &Batch,
        signatures: &SignatureSlots,
    ) -> BridgeResult<BatchReceipt> {
        BridgeService::relay_batch(self, asset, batch, signatures)
    }

    fn rotate_and_relay_batch(
        &mut self,
        new_committee: Committee,
        batch: &Batch,
        signatures: &SignatureSlots,
    ) -> BridgeResult<RotationAndBatchReceipt> {
        BridgeService::rotate_and_relay_batch(self, new_committee, batch, signatures)
    }

    fn record_deposit(
        &mut self,
        asset: &AssetId,
        amount: u128,
        source: &Address,
        destination: &ForeignAddress,
    ) -> BridgeResult<DepositEvent> {
        BridgeService::record_deposit(self, asset, amount, source, destination)
    }

    fn generation(&self) -> u64 {
        BridgeService::generation(self)
    }

    fn checkpoint(&self) -> Hash {
        *BridgeService::checkpoint(self)
    }

    fn last_batch_sequence(&self, asset: &AssetId) -> u64 {
        BridgeService::last_batch_sequence(self, asset)
    }
}

fn batch_receipt(batch: &Batch, tally: VerificationTally) -> BatchReceipt {
    BatchReceipt {
        asset: *batch.asset(),
        sequence: batch.sequence(),
        transfers: batch.len(),
        total_amount: batch.total_amount(),
        total_fee: batch.total_fee(),
        tally,
    }
}

fn rotation_event(receipt: &RotationReceipt) -> BridgeEvent {
    BridgeEvent::ValidatorSetRotated {
        previous_generation: receipt.previous_generation,
        generation: receipt.generation,
        checkpoint: receipt.checkpoint,
        signed_power: receipt.tally.power,
        total_power: receipt.tally.total_power,
    }
}

fn batch_event(receipt: &BatchReceipt, signed_by: u64) -> BridgeEvent {
    info!(
        "[pg-04] Relayed batch {} of 0x{}: {} transfers, amount {}, fees {}",
        receipt.sequence,
        hex::encode(receipt.asset),
        receipt.transfers,
        receipt.total_amount,
        receipt.total_fee
    );
    BridgeEvent::BatchRelayed {
        asset: receipt.asset,
        sequence: receipt.sequence,
        transfers: receipt.transfers,
        total_amount: receipt.total_amount,
        total_fee: receipt.total_fee,
        signed_by,
    }
}
