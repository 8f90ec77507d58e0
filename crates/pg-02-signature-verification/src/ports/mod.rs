//! # Ports Layer
//!
//! - **Inbound (Driving)**: the verification API the registry and relay call

pub mod inbound;
