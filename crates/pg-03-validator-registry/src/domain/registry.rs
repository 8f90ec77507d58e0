//! # Validator Set Registry
//!
//! Holds the single current committee and its checkpoint digest.
//!
//! A rotation is accepted only when the proposed committee is exactly one
//! generation ahead and the *current* committee signed its checkpoint with
//! enough power. Rotations are two-phase: [`ValidatorSetRegistry::stage_rotation`]
//! runs every check and yields a [`StagedRotation`], which
//! [`ValidatorSetRegistry::commit`] applies. The staged value can only be
//! produced by a successful check.

use pg_01_checkpoint_encoder::{encode, Claim, DomainTag};
use pg_02_signature_verification::{SignatureSlots, ThresholdVerificationApi, VerificationTally};
use serde::{Deserialize, Serialize};
use shared_types::{BridgeError, BridgeResult, Committee, Hash};
use tracing::{info, warn};

/// The currently accepted committee and the digest of its rotation checkpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetRegistry {
    committee: Committee,
    checkpoint: Hash,
}

/// A rotation that passed every check but is not yet applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedRotation {
    committee: Committee,
    checkpoint: Hash,
    tally: VerificationTally,
}

impl StagedRotation {
    /// Committee that will become current.
    pub fn committee(&self) -> &Committee {
        &self.committee
    }

    /// Rotation checkpoint of the new committee.
    pub fn checkpoint(&self) -> &Hash {
        &self.checkpoint
    }

    /// Tally of the old committee's signatures.
    pub fn tally(&self) -> &VerificationTally {
        &self.tally
    }
}

/// Outcome of an applied rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotationReceipt {
    pub previous_generation: u64,
    pub generation: u64,
    pub checkpoint: Hash,
    pub tally: VerificationTally,
}

impl ValidatorSetRegistry {
    /// Registry seeded with the genesis committee, trusted without signatures.
    pub fn genesis(domain_tag: &DomainTag, committee: Committee) -> Self {
        let checkpoint = encode(domain_tag, &committee, &Claim::Rotation);
        info!(
            "[pg-03] Genesis committee: generation {}, {} members, power {}, checkpoint 0x{}",
            committee.generation(),
            committee.len(),
            committee.total_power(),
            hex::encode(checkpoint)
        );
        Self {
            committee,
            checkpoint,
        }
    }

    pub fn committee(&self) -> &Committee {
        &self.committee
    }

    pub fn generation(&self) -> u64 {
        self.committee.generation()
    }

    pub fn checkpoint(&self) -> &Hash {
        &self.checkpoint
    }

    /// Input shape check: one signature slot per current member.
    pub fn check_slots(&self, slots: &SignatureSlots) -> BridgeResult<()> {
        if slots.len() != self.committee.len() {
            return Err(BridgeError::malformed(format!(
                "{} signature slots for a committee of {}",
                slots.len(),
                self.committee.len()
            )));
        }
        Ok(())
    }

    /// Generation check: the proposal must be exactly one ahead.
    pub fn check_generation(&self, new_committee: &Committee) -> BridgeResult<()> {
        let current = self.generation();
        let proposed = new_committee.generation();
        if current.checked_add(1) != Some(proposed) {
            warn!(
                "[pg-03] Rejected rotation: generation {} proposed at {}",
                proposed, current
            );
            return Err(BridgeError::StaleGeneration { current, proposed });
        }
        Ok(())
    }

    /// Run every rotation check against `signed_digest`, the digest the
    /// current committee signed (the rotation checkpoint, or a joint
    /// rotation-and-batch digest).
    ///
    /// Order: slot count, generation, signatures.
    pub fn stage_rotation<V: ThresholdVerificationApi + ?Sized>(
        &self,
        domain_tag: &DomainTag,
        verifier: &V,
        new_committee: Committee,
        signed_digest: &Hash,
        slots: &SignatureSlots,
    ) -> BridgeResult<StagedRotation> {
        self.check_slots(slots)?;
        self.check_generation(&new_committee)?;

        let tally = verifier
            .require(&self.committee, signed_digest, slots)
            .inspect_err(|e| {
                warn!(
                    "[pg-03] Rejected rotation to generation {}: {}",
                    new_committee.generation(),
                    e
                )
            })?;

        let checkpoint = encode(domain_tag, &new_committee, &Claim::Rotation);
        Ok(StagedRotation {
            committee: new_committee,
            checkpoint,
            tally,
        })
    }

    /// Apply a staged rotation; the previous committee is dropped.
    pub fn commit(&mut self, staged: StagedRotation) -> RotationReceipt {
        let previous_generation = self.generation();
        let StagedRotation {
            committee,
            checkpoint,
            tally,
        } = staged;

        info!(
            "[pg-03] Rotated committee {} -> {} ({} members, signed power {}/{}), checkpoint 0x{}",
            previous_generation,
            committee.generation(),
            committee.len(),
            tally.power,
            tally.total_power,
            hex::encode(checkpoint)
        );

        self.committee = committee;
        self.checkpoint = checkpoint;

        RotationReceipt {
            previous_generation,
            generation: self.generation(),
            checkpoint,
            tally,
        }
    }

    /// Replace the committee with `new_committee` if the current committee
    /// signed its rotation checkpoint with enough power.
    pub fn rotate<V: ThresholdVerificationApi + ?Sized>(
        &mut self,
        domain_tag: &DomainTag,
        verifier: &V,
        new_committee: Committee,
        slots: &SignatureSlots,
    ) -> BridgeResult<RotationReceipt> {
        let digest = encode(domain_tag, &new_committee, &Claim::Rotation);
        let staged = self.stage_rotation(domain_tag, verifier, new_committee, &digest, slots)?;
        Ok(self.commit(staged))
    }
}
