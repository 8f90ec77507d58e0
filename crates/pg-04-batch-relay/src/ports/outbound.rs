//! # Outbound Ports
//!
//! Dependencies the bridge drives: the custody ledger that actually holds
//! funds, and durable storage for the bridge state.

use shared_types::{Address, AssetId, BridgeError, TransferInstruction};
use thiserror::Error;

use crate::domain::BridgeState;

/// Errors reported by a custody ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CustodyError {
    #[error(
        "insufficient custody balance for asset 0x{}: have {available}, need {required}",
        hex::encode(.asset)
    )]
    InsufficientBalance {
        asset: AssetId,
        available: u128,
        required: u128,
    },

    #[error("balance overflow for asset 0x{}", hex::encode(.asset))]
    Overflow { asset: AssetId },

    #[error("custody ledger rejected the request: {0}")]
    Rejected(String),
}

impl From<CustodyError> for BridgeError {
    fn from(e: CustodyError) -> Self {
        BridgeError::CustodyTransferFailed {
            reason: e.to_string(),
        }
    }
}

/// Custody ledger - outbound port.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait CustodyLedger: Send + Sync {
    /// Take `amount` of `asset` from `source` into custody.
    fn lock_in(&self, asset: &AssetId, source: &Address, amount: u128) -> Result<(), CustodyError>;

    /// Issue one outbound transfer per instruction.
    ///
    /// All-or-nothing: on error no transfer has been made.
    fn transfer_out(
        &self,
        asset: &AssetId,
        transfers: &[TransferInstruction],
    ) -> Result<(), CustodyError>;
}

/// Errors reported by a state store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state snapshot codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("state directory already in use ({0})")]
    Locked(String),
}

impl From<StoreError> for BridgeError {
    fn from(e: StoreError) -> Self {
        BridgeError::Storage {
            reason: e.to_string(),
        }
    }
}

/// Durable bridge state - outbound port.
pub trait StateStore: Send + Sync {
    /// Last committed state, if any.
    fn load(&self) -> Result<Option<BridgeState>, StoreError>;

    /// Replace the committed state.
    ///
    /// Atomic: after an error the previously committed state is still what
    /// [`load`](Self::load) returns.
    fn commit(&self, state: &BridgeState) -> Result<(), StoreError>;
}
