//! # Error Types
//!
//! The single error type returned by every bridge operation.
//!
//! Every variant is a local rejection: the operation that produced it has not
//! changed any state, and the core is ready for the next operation.

use thiserror::Error;

use crate::entities::AssetId;

/// Errors returned by bridge operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// Input is structurally invalid (length mismatch, empty committee,
    /// duplicate identity, empty batch, arithmetic overflow).
    ///
    /// Always detected before any state is read.
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// Proposed committee generation is not exactly one past the stored one.
    #[error("Stale generation: current {current}, proposed {proposed}")]
    StaleGeneration { current: u64, proposed: u64 },

    /// Proposed batch sequence is not strictly above the stored floor.
    #[error(
        "Stale batch sequence for asset 0x{}: last {last}, proposed {proposed}",
        hex::encode(.asset)
    )]
    StaleBatchSequence {
        asset: AssetId,
        last: u64,
        proposed: u64,
    },

    /// Matched voting power is below the configured threshold.
    #[error("Insufficient power: have {have}, need {required} of {total}")]
    InsufficientPower {
        have: u128,
        required: u128,
        total: u128,
    },

    /// The custody ledger refused a transfer; the whole operation was aborted.
    #[error("Custody transfer failed: {reason}")]
    CustodyTransferFailed { reason: String },

    /// The state store could not load or commit the bridge state.
    #[error("Storage error: {reason}")]
    Storage { reason: String },

    /// Deployment configuration is invalid.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl BridgeError {
    /// Shorthand for [`BridgeError::MalformedInput`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
