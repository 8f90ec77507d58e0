//! # Domain Layer
//!
//! Persisted bridge state and the events emitted on commit.

pub mod events;
pub mod state;

pub use events::BridgeEvent;
pub use state::{BridgeState, RelayState};
