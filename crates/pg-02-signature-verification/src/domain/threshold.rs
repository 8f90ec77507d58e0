//! # Weighted Threshold Verification
//!
//! Weighs positional signature slots against a committee.
//!
//! ## Rules
//!
//! - Slot `i` counts only if it recovers to `committee.members()[i]`
//! - Absent, malformed or mismatched slots contribute zero power
//! - Accept iff `power * denominator >= total_power * numerator`

use shared_types::{BridgeError, BridgeResult, Committee, Hash, Threshold};
use tracing::debug;

use super::ecdsa::recover_signer;
use super::entities::{SignatureSlots, VerificationTally};

/// Verifies committee signatures over checkpoint digests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdVerifier {
    threshold: Threshold,
}

impl ThresholdVerifier {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Weigh `slots` against `committee` for `digest`.
    ///
    /// Returns a tally whether or not the threshold is met; the only error is
    /// a slot count that differs from the committee size.
    pub fn verify(
        &self,
        committee: &Committee,
        digest: &Hash,
        slots: &SignatureSlots,
    ) -> BridgeResult<VerificationTally> {
        if slots.len() != committee.len() {
            return Err(BridgeError::malformed(format!(
                "{} signature slots for a committee of {}",
                slots.len(),
                committee.len()
            )));
        }

        let mut power: u128 = 0;
        let mut matched = Vec::new();

        for (position, (member, slot)) in committee.members().iter().zip(slots.iter()).enumerate() {
            let Some(signature) = slot else {
                continue;
            };

            match recover_signer(digest, signature) {
                Ok(signer) if signer == member.identity => {
                    power += u128::from(member.power);
                    matched.push(position);
                }
                Ok(signer) => {
                    debug!(
                        "[pg-02] Slot {} recovered 0x{}, expected 0x{}",
                        position,
                        hex::encode(signer),
                        hex::encode(member.identity)
                    );
                }
                Err(e) => {
                    debug!("[pg-02] Slot {} ignored: {}", position, e);
                }
            }
        }

        let total_power = committee.total_power();
        let accepted = self.threshold.is_met(power, total_power);

        debug!(
            "[pg-02] Tally for 0x{}: {}/{} power from {} signers (threshold {}, accepted={})",
            hex::encode(digest),
            power,
            total_power,
            matched.len(),
            self.threshold,
            accepted
        );

        Ok(VerificationTally {
            digest: *digest,
            power,
            total_power,
            required: self.threshold.required_power(total_power),
            matched,
            accepted,
        })
    }
}
