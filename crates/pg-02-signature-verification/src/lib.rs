//! # Threshold Signature Verification (PG-02)
//!
//! The single trust boundary of Peg Core: every external claim passes through
//! [`ThresholdVerifier::verify`] exactly once per operation.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): secp256k1 recovery and positional power tally
//! - **Ports Layer** (`ports/`): the `ThresholdVerificationApi` consumed by the
//!   registry and the relay
//!
//! ## Security Notes
//!
//! - **Positional Matching**: slot `i` only counts if it recovers to
//!   `committee.members()[i]`; moving or duplicating a signature gains nothing
//! - **Malleability Prevention (EIP-2)**: high-S signatures contribute zero
//! - **Total Function**: apart from a slot-count mismatch, every input yields
//!   an accept/reject tally, never an error

pub mod domain;
pub mod ports;

pub use domain::ecdsa::{
    address_from_pubkey, eth_signed_message_hash, recover_address, recover_signer,
};
pub use domain::entities::{EcdsaSignature, SignatureSlots, VerificationTally};
pub use domain::errors::SignatureError;
pub use domain::threshold::ThresholdVerifier;
pub use ports::inbound::ThresholdVerificationApi;

#[cfg(any(test, feature = "test-utils"))]
pub use domain::ecdsa::test_helpers;
