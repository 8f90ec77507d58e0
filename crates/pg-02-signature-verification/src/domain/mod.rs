//! # Domain Layer
//!
//! Pure cryptographic logic with no I/O dependencies.

pub mod ecdsa;
pub mod entities;
pub mod errors;
pub mod threshold;
