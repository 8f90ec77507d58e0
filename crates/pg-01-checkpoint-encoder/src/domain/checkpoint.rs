//! # Checkpoint Digests
//!
//! Builds the digests for the three claim kinds:
//!
//! | Claim | Method word | Committee encoded |
//! |-------|-------------|-------------------|
//! | `Rotation` | `checkpoint` | proposed committee |
//! | `Batch` | `transactionBatch` | current committee |
//! | `RotationAndBatch` | `valsetAndTransactionBatch` | proposed committee |
//!
//! Payloads are `abi.encode` parameter lists (no outer tuple offset), hashed
//! with keccak256.

use alloy_primitives::{Address as SolAddress, FixedBytes, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use shared_types::{Address, Batch, BridgeError, BridgeResult, Committee, Hash};

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `bytes32` from an ASCII label, right-padded with zeros.
///
/// Labels longer than 32 bytes are truncated; callers only pass the fixed
/// method names and validated domain labels.
pub fn label_bytes32(label: &str) -> Hash {
    let bytes = label.as_bytes();
    let len = bytes.len().min(32);
    FixedBytes::<32>::right_padding_from(&bytes[..len]).0
}

/// 32-byte deployment identifier mixed into every digest, so signatures for
/// one bridge deployment are useless against another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainTag(pub [u8; 32]);

impl DomainTag {
    /// Longest label accepted by [`DomainTag::from_label`].
    pub const MAX_LABEL_LEN: usize = 31;

    /// Tag from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Tag from an ASCII label, right-padded with zeros (Solidity
    /// `formatBytes32String` convention: at most 31 bytes).
    pub fn from_label(label: &str) -> BridgeResult<Self> {
        if label.is_empty() || label.len() > Self::MAX_LABEL_LEN {
            return Err(BridgeError::Config {
                reason: format!(
                    "domain tag label must be 1..={} bytes, got {}",
                    Self::MAX_LABEL_LEN,
                    label.len()
                ),
            });
        }
        Ok(Self(label_bytes32(label)))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for DomainTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Method discriminator word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Committee rotation only.
    Checkpoint,
    /// Batch signed by the current committee.
    TransactionBatch,
    /// Rotation and batch under one signature round.
    ValsetAndTransactionBatch,
}

impl Method {
    /// ASCII name hashed into the digest.
    pub fn label(&self) -> &'static str {
        match self {
            Method::Checkpoint => "checkpoint",
            Method::TransactionBatch => "transactionBatch",
            Method::ValsetAndTransactionBatch => "valsetAndTransactionBatch",
        }
    }
}

/// What a checkpoint attests to besides the committee itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Claim {
    /// The committee is the proposed next committee.
    Rotation,
    /// The committee is the signing committee; the digest is of the batch.
    Batch(Hash),
    /// The committee is the proposed next committee; the digest is of the
    /// batch relayed alongside it.
    RotationAndBatch(Hash),
}

impl Claim {
    /// Method discriminator for this claim.
    pub fn method(&self) -> Method {
        match self {
            Claim::Rotation => Method::Checkpoint,
            Claim::Batch(_) => Method::TransactionBatch,
            Claim::RotationAndBatch(_) => Method::ValsetAndTransactionBatch,
        }
    }

    fn batch_digest(&self) -> Option<&Hash> {
        match self {
            Claim::Rotation => None,
            Claim::Batch(digest) | Claim::RotationAndBatch(digest) => Some(digest),
        }
    }
}

fn sol_address(address: &Address) -> SolAddress {
    SolAddress::from(*address)
}

/// ABI payload of `(domain_tag, method, generation, identities, powers, [batch_digest])`.
fn checkpoint_payload(domain_tag: &DomainTag, committee: &Committee, claim: &Claim) -> Vec<u8> {
    let tag = FixedBytes::<32>::from(domain_tag.0);
    let method = FixedBytes::<32>::from(label_bytes32(claim.method().label()));
    let generation = U256::from(committee.generation());
    let identities: Vec<SolAddress> = committee.identities().map(sol_address).collect();
    let powers: Vec<U256> = committee.powers().map(U256::from).collect();

    match claim.batch_digest() {
        None => (tag, method, generation, identities, powers).abi_encode_params(),
        Some(digest) => (
            tag,
            method,
            generation,
            identities,
            powers,
            FixedBytes::<32>::from(*digest),
        )
            .abi_encode_params(),
    }
}

/// Encode `(domain_tag, method, committee, [batch_digest])` into a digest.
pub fn encode(domain_tag: &DomainTag, committee: &Committee, claim: &Claim) -> Hash {
    keccak256(&checkpoint_payload(domain_tag, committee, claim))
}

fn batch_payload(batch: &Batch) -> Vec<u8> {
    let transfers = batch.transfers();
    let amounts: Vec<U256> = transfers.iter().map(|t| U256::from(t.amount)).collect();
    let destinations: Vec<SolAddress> =
        transfers.iter().map(|t| sol_address(&t.destination)).collect();
    let fees: Vec<U256> = transfers.iter().map(|t| U256::from(t.fee)).collect();

    (
        amounts,
        destinations,
        fees,
        U256::from(batch.sequence()),
        sol_address(batch.asset()),
    )
        .abi_encode_params()
}

/// Digest of a batch payload:
/// `keccak256(abi.encode(amounts, destinations, fees, sequence, asset))`.
pub fn batch_digest(batch: &Batch) -> Hash {
    keccak256(&batch_payload(batch))
}

/// Encoder bound to one deployment's domain tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckpointEncoder {
    domain_tag: DomainTag,
}

impl CheckpointEncoder {
    /// Create an encoder for `domain_tag`.
    pub fn new(domain_tag: DomainTag) -> Self {
        Self { domain_tag }
    }

    /// Domain tag in use.
    pub fn domain_tag(&self) -> &DomainTag {
        &self.domain_tag
    }

    /// Checkpoint of a committee (rotation digest and stored fingerprint).
    pub fn rotation(&self, committee: &Committee) -> Hash {
        encode(&self.domain_tag, committee, &Claim::Rotation)
    }

    /// Digest the current committee signs to authorize `batch`.
    pub fn batch(&self, signing_committee: &Committee, batch: &Batch) -> Hash {
        encode(
            &self.domain_tag,
            signing_committee,
            &Claim::Batch(batch_digest(batch)),
        )
    }

    /// Joint digest covering the proposed committee and `batch`.
    pub fn rotation_and_batch(&self, new_committee: &Committee, batch: &Batch) -> Hash {
        encode(
            &self.domain_tag,
            new_committee,
            &Claim::RotationAndBatch(batch_digest(batch)),
        )
    }
}
