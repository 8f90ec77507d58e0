//! # Inbound Ports (Driving Ports / API)
//!
//! The verification surface consumed by the validator registry and the
//! batch relay.

use crate::domain::entities::{SignatureSlots, VerificationTally};
use crate::domain::threshold::ThresholdVerifier;
use shared_types::{BridgeResult, Committee, Hash, Threshold};

/// Weighted threshold verification of committee signatures.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait ThresholdVerificationApi: Send + Sync {
    /// Weigh `slots` against `committee` for `digest`.
    ///
    /// Never fails on bad signatures; only a slot count that differs from
    /// the committee size is `MalformedInput`.
    fn verify(
        &self,
        committee: &Committee,
        digest: &Hash,
        slots: &SignatureSlots,
    ) -> BridgeResult<VerificationTally>;

    /// Acceptance threshold in force.
    fn threshold(&self) -> Threshold;

    /// [`verify`](Self::verify), turning a rejected tally into
    /// `InsufficientPower`.
    fn require(
        &self,
        committee: &Committee,
        digest: &Hash,
        slots: &SignatureSlots,
    ) -> BridgeResult<VerificationTally> {
        self.verify(committee, digest, slots)?.into_result()
    }
}

impl ThresholdVerificationApi for ThresholdVerifier {
    fn verify(
        &self,
        committee: &Committee,
        digest: &Hash,
        slots: &SignatureSlots,
    ) -> BridgeResult<VerificationTally> {
        ThresholdVerifier::verify(self, committee, digest, slots)
    }

    fn threshold(&self) -> Threshold {
        ThresholdVerifier::threshold(self)
    }
}
