//! # Domain Layer
//!
//! Pure encoding logic with no I/O and no error conditions.

pub mod checkpoint;
