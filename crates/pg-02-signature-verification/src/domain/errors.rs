//! # Signature Errors
//!
//! Per-signature failures. They explain why a slot contributed zero power and
//! never leave the verifier as operation errors.

use thiserror::Error;

/// Errors that can occur while recovering a signer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// R or S is zero or not below the curve order.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection).
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28).
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature.
    #[error("Failed to recover public key")]
    RecoveryFailed,
}
