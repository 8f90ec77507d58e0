//! # Validator Set Registry (PG-03)
//!
//! Exactly one committee is current at any time. It changes only through a
//! rotation signed by the committee it replaces, one generation at a time.
//!
//! ## Security Notes
//!
//! - **Monotonic Generations**: a proposal must carry `generation + 1`, so a
//!   signed rotation can never be replayed or skipped ahead
//! - **Old Committee Signs**: signatures are weighed against the stored
//!   committee, never against the proposal
//! - **No History**: the replaced committee is dropped and cannot authorize
//!   anything afterwards

pub mod domain;

pub use domain::registry::{RotationReceipt, StagedRotation, ValidatorSetRegistry};
