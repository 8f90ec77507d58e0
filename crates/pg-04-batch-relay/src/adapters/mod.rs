//! # Adapters Layer
//!
//! Concrete custody ledger and state store implementations.

pub mod custody;
pub mod store;

pub use custody::{InMemoryCustodyLedger, OutboundTransfer};
pub use store::{FileStateStore, InMemoryStateStore};
