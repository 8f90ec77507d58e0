//! # Batch Relay (PG-04)
//!
//! Replay-protected release of committee-signed transfer batches from
//! custody, the inbound deposit log, and [`BridgeService`], which ties the
//! encoder, verifier and registry into the bridge's operation surface.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): persisted [`BridgeState`] and [`BridgeEvent`]s
//! - **Ports Layer** (`ports/`): [`BridgeApi`] inbound; [`CustodyLedger`] and
//!   [`StateStore`] outbound
//! - **Adapters Layer** (`adapters/`): in-memory custody, in-memory and
//!   file-backed state stores
//! - **Service** (`service.rs`): the operations
//!
//! ## Security Notes
//!
//! - **Replay Floor**: a batch sequence must exceed the asset's last relayed
//!   sequence, checked before any signature
//! - **Current Committee Only**: batches are verified against the committee
//!   stored at the moment of relay; rotation retires older signatures
//! - **All-or-Nothing**: custody releases every transfer of a batch or none,
//!   and state only advances when the whole operation succeeds

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileStateStore, InMemoryCustodyLedger, InMemoryStateStore, OutboundTransfer};
pub use config::BridgeConfig;
pub use domain::{BridgeEvent, BridgeState, RelayState};
pub use ports::inbound::BridgeApi;
pub use ports::outbound::{CustodyError, CustodyLedger, StateStore, StoreError};
pub use service::{BatchReceipt, BridgeService, RotationAndBatchReceipt};
