//! # Domain Entities
//!
//! Signature input and the verification tally.

use serde::{Deserialize, Serialize};
use shared_types::{BridgeError, BridgeResult, Hash};

/// ECDSA signature on the secp256k1 curve, as submitted by off-chain signers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
}

impl EcdsaSignature {
    /// Create a signature from its `(v, r, s)` parts.
    pub fn new(v: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { v, r, s }
    }

    /// The all-zero triple that marks an absent slot.
    pub fn is_absent_sentinel(&self) -> bool {
        self.v == 0 && self.r == [0u8; 32] && self.s == [0u8; 32]
    }
}

/// One optional signature per position of the signing committee.
///
/// Position `i` is only ever checked against committee member `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSlots(Vec<Option<EcdsaSignature>>);

impl SignatureSlots {
    /// Slots from already-decoded optional signatures.
    pub fn new(slots: Vec<Option<EcdsaSignature>>) -> Self {
        Self(slots)
    }

    /// `len` absent slots.
    pub fn absent(len: usize) -> Self {
        Self(vec![None; len])
    }

    /// Slots from raw `(v, r, s)` triples; the all-zero triple becomes an
    /// absent slot.
    pub fn from_triples(triples: &[(u8, [u8; 32], [u8; 32])]) -> Self {
        Self(
            triples
                .iter()
                .map(|&(v, r, s)| {
                    let signature = EcdsaSignature::new(v, r, s);
                    (!signature.is_absent_sentinel()).then_some(signature)
                })
                .collect(),
        )
    }

    /// Slots from parallel `v`, `r`, `s` arrays (the shape EVM callers submit).
    pub fn from_parallel(v: &[u8], r: &[[u8; 32]], s: &[[u8; 32]]) -> BridgeResult<Self> {
        if v.len() != r.len() || v.len() != s.len() {
            return Err(BridgeError::malformed(format!(
                "signature arrays differ in length: v={}, r={}, s={}",
                v.len(),
                r.len(),
                s.len()
            )));
        }
        let triples: Vec<_> = v
            .iter()
            .zip(r)
            .zip(s)
            .map(|((v, r), s)| (*v, *r, *s))
            .collect();
        Ok(Self::from_triples(&triples))
    }

    /// Put `signature` at `position`, growing with absent slots if needed.
    pub fn set(&mut self, position: usize, signature: EcdsaSignature) {
        if self.0.len() <= position {
            self.0.resize(position + 1, None);
        }
        self.0[position] = Some(signature);
    }

    /// Signature at `position`, if present.
    pub fn get(&self, position: usize) -> Option<&EcdsaSignature> {
        self.0.get(position).and_then(Option::as_ref)
    }

    /// Number of slots (present or absent).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no slots at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of present signatures.
    pub fn present(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterate slots in position order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&EcdsaSignature>> + '_ {
        self.0.iter().map(Option::as_ref)
    }
}

/// Outcome of weighing a set of signature slots against a committee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationTally {
    /// Digest the slots were checked against.
    pub digest: Hash,
    /// Power of positionally matched signers.
    pub power: u128,
    /// Total power of the signing committee.
    pub total_power: u128,
    /// Smallest power that would have been accepted.
    pub required: u128,
    /// Positions whose signature matched the committee member.
    pub matched: Vec<usize>,
    /// Whether the threshold was met.
    pub accepted: bool,
}

impl VerificationTally {
    /// `Ok(self)` if accepted, otherwise `InsufficientPower`.
    pub fn into_result(self) -> BridgeResult<Self> {
        if self.accepted {
            Ok(self)
        } else {
            Err(BridgeError::InsufficientPower {
                have: self.power,
                required: self.required,
                total: self.total_power,
            })
        }
    }
}
