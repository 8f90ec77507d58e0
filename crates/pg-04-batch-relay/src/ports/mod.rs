//! # Ports Layer
//!
//! - **Inbound (Driving)**: the bridge operation surface
//! - **Outbound (Driven)**: the custody ledger and the state store

pub mod inbound;
pub mod outbound;
