//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Committee**: `Member`, `Committee`, `Threshold`
//! - **Outbound**: `TransferInstruction`, `Batch`
//! - **Inbound**: `DepositEvent`
//!
//! Committees and batches are only obtainable through validating
//! constructors (deserialization included), so a value of either type is
//! always well-formed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::errors::{BridgeError, BridgeResult};

/// A 32-byte keccak256 digest.
pub type Hash = [u8; 32];

/// A 20-byte identity derived from a secp256k1 public key
/// (last 20 bytes of keccak256 of the uncompressed key).
pub type Address = [u8; 20];

/// Identifier of a custodied asset (the token contract on the custody side).
pub type AssetId = Address;

/// Destination account on the other chain, right-padded to 32 bytes.
pub type ForeignAddress = [u8; 32];

// =============================================================================
// COMMITTEE
// =============================================================================

/// One weighted attestor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Signing identity.
    pub identity: Address,
    /// Voting power.
    pub power: u64,
}

impl Member {
    /// Create a member.
    pub fn new(identity: Address, power: u64) -> Self {
        Self { identity, power }
    }
}

/// Serialized form of a committee, validated on the way back in.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawCommittee {
    members: Vec<Member>,
    generation: u64,
}

/// An ordered, weighted validator committee at one generation.
///
/// Member order is significant: signature slot `i` is checked against
/// `members()[i]` and the encoder hashes members in this order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCommittee", into = "RawCommittee")]
pub struct Committee {
    members: Vec<Member>,
    generation: u64,
    total_power: u128,
}

impl Committee {
    /// Build a committee, rejecting empty member lists, duplicate identities
    /// and zero total power.
    pub fn new(members: Vec<Member>, generation: u64) -> BridgeResult<Self> {
        if members.is_empty() {
            return Err(BridgeError::malformed("committee has no members"));
        }

        let mut seen = HashSet::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            if !seen.insert(member.identity) {
                return Err(BridgeError::malformed(format!(
                    "duplicate committee identity 0x{} at position {}",
                    hex::encode(member.identity),
                    index
                )));
            }
        }

        let total_power = members.iter().map(|m| u128::from(m.power)).sum::<u128>();
        if total_power == 0 {
            return Err(BridgeError::malformed("committee total power is zero"));
        }

        Ok(Self {
            members,
            generation,
            total_power,
        })
    }

    /// Build a committee from parallel identity and power arrays, the shape
    /// in which signers and callers submit it.
    pub fn from_parts(
        identities: &[Address],
        powers: &[u64],
        generation: u64,
    ) -> BridgeResult<Self> {
        if identities.len() != powers.len() {
            return Err(BridgeError::malformed(format!(
                "committee has {} identities but {} powers",
                identities.len(),
                powers.len()
            )));
        }
        let members = identities
            .iter()
            .zip(powers)
            .map(|(identity, power)| Member::new(*identity, *power))
            .collect();
        Self::new(members, generation)
    }

    /// Members in signing order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Number of members (and therefore of signature slots).
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for a constructed committee; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Generation number.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sum of member powers.
    pub fn total_power(&self) -> u128 {
        self.total_power
    }

    /// Identities in signing order.
    pub fn identities(&self) -> impl Iterator<Item = &Address> + '_ {
        self.members.iter().map(|m| &m.identity)
    }

    /// Powers in signing order.
    pub fn powers(&self) -> impl Iterator<Item = u64> + '_ {
        self.members.iter().map(|m| m.power)
    }
}

impl TryFrom<RawCommittee> for Committee {
    type Error = BridgeError;

    fn try_from(raw: RawCommittee) -> Result<Self, Self::Error> {
        Committee::new(raw.members, raw.generation)
    }
}

impl From<Committee> for RawCommittee {
    fn from(committee: Committee) -> Self {
        Self {
            members: committee.members,
            generation: committee.generation,
        }
    }
}

/// Fraction of the signing committee's total power required for acceptance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    numerator: u32,
    denominator: u32,
}

impl Threshold {
    /// Create a threshold; both parts positive and `numerator <= denominator`.
    pub fn new(numerator: u32, denominator: u32) -> BridgeResult<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(BridgeError::Config {
                reason: format!("threshold {numerator}/{denominator} must be positive"),
            });
        }
        if numerator > denominator {
            return Err(BridgeError::Config {
                reason: format!("threshold {numerator}/{denominator} exceeds one"),
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Numerator.
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Denominator.
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Whether `power` out of `total_power` meets the threshold:
    /// `power * denominator >= total_power * numerator`.
    ///
    /// Committee powers are `u64` and the parts are `u32`, so both products
    /// fit in `u128` for any committee below 2^32 members.
    pub fn is_met(&self, power: u128, total_power: u128) -> bool {
        power.saturating_mul(u128::from(self.denominator))
            >= total_power.saturating_mul(u128::from(self.numerator))
    }

    /// Smallest power that meets the threshold:
    /// `ceil(numerator * total_power / denominator)`.
    pub fn required_power(&self, total_power: u128) -> u128 {
        let numerator = u128::from(self.numerator);
        let denominator = u128::from(self.denominator);
        let scaled = total_power.saturating_mul(numerator);
        scaled / denominator + u128::from(scaled % denominator != 0)
    }
}

impl Default for Threshold {
    /// 6666/10000, just over two thirds of total power.
    fn default() -> Self {
        Self {
            numerator: 6666,
            denominator: 10000,
        }
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

// =============================================================================
// OUTBOUND BATCHES
// =============================================================================

/// One outbound transfer inside a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInstruction {
    /// Recipient on the custody side.
    pub destination: Address,
    /// Amount released to the recipient.
    pub amount: u128,
    /// Fee paid to the relayer for this transfer.
    pub fee: u128,
}

impl TransferInstruction {
    /// Create a transfer instruction.
    pub fn new(destination: Address, amount: u128, fee: u128) -> Self {
        Self {
            destination,
            amount,
            fee,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawBatch {
    asset: AssetId,
    sequence: u64,
    transfers: Vec<TransferInstruction>,
}

/// An ordered set of outbound transfers for one asset under one sequence number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBatch", into = "RawBatch")]
pub struct Batch {
    asset: AssetId,
    sequence: u64,
    transfers: Vec<TransferInstruction>,
    total_amount: u128,
    total_fee: u128,
}

impl Batch {
    /// Build a batch, rejecting empty transfer lists and totals that overflow.
    pub fn new(
        asset: AssetId,
        sequence: u64,
        transfers: Vec<TransferInstruction>,
    ) -> BridgeResult<Self> {
        if transfers.is_empty() {
            return Err(BridgeError::malformed("batch has no transfers"));
        }

        let mut total_amount: u128 = 0;
        let mut total_fee: u128 = 0;
        for transfer in &transfers {
            total_amount = total_amount
                .checked_add(transfer.amount)
                .ok_or_else(|| BridgeError::malformed("batch amount total overflows"))?;
            total_fee = total_fee
                .checked_add(transfer.fee)
                .ok_or_else(|| BridgeError::malformed("batch fee total overflows"))?;
        }

        Ok(Self {
            asset,
            sequence,
            transfers,
            total_amount,
            total_fee,
        })
    }

    /// Asset moved by this batch.
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }

    /// Batch sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Transfers in submission order.
    pub fn transfers(&self) -> &[TransferInstruction] {
        &self.transfers
    }

    /// Number of transfers.
    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    /// Always false for a constructed batch.
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Sum of transfer amounts.
    pub fn total_amount(&self) -> u128 {
        self.total_amount
    }

    /// Sum of transfer fees.
    pub fn total_fee(&self) -> u128 {
        self.total_fee
    }
}

impl TryFrom<RawBatch> for Batch {
    type Error = BridgeError;

    fn try_from(raw: RawBatch) -> Result<Self, Self::Error> {
        Batch::new(raw.asset, raw.sequence, raw.transfers)
    }
}

impl From<Batch> for RawBatch {
    fn from(batch: Batch) -> Self {
        Self {
            asset: batch.asset,
            sequence: batch.sequence,
            transfers: batch.transfers,
        }
    }
}

// =============================================================================
// INBOUND DEPOSITS
// =============================================================================

/// A recorded deposit into custody, destined for the other chain.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    /// Global deposit sequence number (first deposit is 1).
    pub sequence: u64,
    /// Deposited asset.
    pub asset: AssetId,
    /// Deposited amount.
    pub amount: u128,
    /// Depositor on the custody side.
    pub source: Address,
    /// Recipient on the other chain.
    #[serde_as(as = "Bytes")]
    pub destination: ForeignAddress,
}
