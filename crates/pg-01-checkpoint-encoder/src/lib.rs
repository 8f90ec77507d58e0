//! # Checkpoint Encoder (PG-01)
//!
//! Deterministic, injective encoding of committee state and batch state into
//! the 32-byte digest that committee members sign and that the registry
//! stores as the committed-state fingerprint.
//!
//! ## Encoding
//!
//! Solidity `abi.encode` parameter lists built with `alloy-sol-types`, hashed
//! with keccak256:
//!
//! ```text
//! keccak256(abi.encode(
//!     domain_tag   bytes32,
//!     method       bytes32,   // "checkpoint" | "transactionBatch" | "valsetAndTransactionBatch"
//!     generation   uint256,
//!     identities   address[],
//!     powers       uint256[],
//!     batch_digest bytes32    // batch claims only
//! ))
//! ```
//!
//! The rotation checkpoint has the same shape as the EVM-side valset
//! checkpoint. Batch claims commit to `batch_digest` as a single word instead
//! of inlining the batch fields, so their digests are specific to this core.
//!
//! Arrays carry an explicit length word, so a truncated or extended committee
//! never produces the digest of a different real committee.

pub mod domain;

pub use domain::checkpoint::{
    batch_digest, encode, keccak256, label_bytes32, CheckpointEncoder, Claim, DomainTag, Method,
};
