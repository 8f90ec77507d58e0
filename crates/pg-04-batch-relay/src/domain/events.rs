//! # Bridge Events
//!
//! Committed state changes, in commit order.

use serde::{Deserialize, Serialize};
use shared_types::{AssetId, DepositEvent, Hash};

/// A committed state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeEvent {
    /// The current committee was replaced.
    ValidatorSetRotated {
        previous_generation: u64,
        generation: u64,
        checkpoint: Hash,
        signed_power: u128,
        total_power: u128,
    },
    /// A batch was released to the custody ledger.
    BatchRelayed {
        asset: AssetId,
        sequence: u64,
        transfers: usize,
        total_amount: u128,
        total_fee: u128,
        /// Generation of the committee that signed the batch.
        signed_by: u64,
    },
    /// A deposit was locked into custody and numbered.
    DepositRecorded(DepositEvent),
}
