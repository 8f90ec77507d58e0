//! # Integration Tests
//!
//! The bridge driven end to end through its public operations.

pub mod concurrency;
pub mod persistence;
