//! # Inbound Ports (Driving Ports / API)
//!
//! The operation surface exposed to relayers and depositors.

use pg_02_signature_verification::SignatureSlots;
use pg_03_validator_registry::RotationReceipt;
use shared_types::{
    Address, AssetId, Batch, BridgeResult, Committee, DepositEvent, ForeignAddress, Hash,
};

use crate::service::{BatchReceipt, RotationAndBatchReceipt};

/// Bridge operations.
///
/// Mutating operations take `&mut self`: the bridge is a sequential state
/// machine. Share it behind a `parking_lot::Mutex`; the loser of a race sees
/// the advanced state and fails with a stale error.
pub trait BridgeApi {
    /// Replace the committee, signed by the current committee.
    fn rotate_validator_set(
        &mut self,
        new_committee: Committee,
        signatures: &SignatureSlots,
    ) -> BridgeResult<RotationReceipt>;

    /// Release a batch of transfers, signed by the current committee.
    fn relay_batch(
        &mut self,
        asset: &AssetId,
        batch: &Batch,
        signatures: &SignatureSlots,
    ) -> BridgeResult<BatchReceipt>;

    /// Rotate and release a batch under one joint digest.
    fn rotate_and_relay_batch(
        &mut self,
        new_committee: Committee,
        batch: &Batch,
        signatures: &SignatureSlots,
    ) -> BridgeResult<RotationAndBatchReceipt>;

    /// Lock a deposit into custody and assign its global sequence number.
    fn record_deposit(
        &mut self,
        asset: &AssetId,
        amount: u128,
        source: &Address,
        destination: &ForeignAddress,
    ) -> BridgeResult<DepositEvent>;

    fn generation(&self) -> u64;

    fn checkpoint(&self) -> Hash;

    fn last_batch_sequence(&self, asset: &AssetId) -> u64;
}
