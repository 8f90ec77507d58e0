//! # Shared Types Crate
//!
//! Domain entities and the error type shared by every Peg Core subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: committees, batches and deposits are defined
//!   once here and flow unchanged through encoder, verifier, registry and relay.
//! - **Valid by Construction**: a `Committee` or `Batch` that exists has already
//!   passed input validation, so later stages never re-check shape.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
