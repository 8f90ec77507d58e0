//! # Exploit Simulations
//!
//! Attacks the bridge must withstand: replayed claims and forged committee
//! takeovers.
