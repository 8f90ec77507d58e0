//! # ECDSA Signer Recovery (secp256k1)
//!
//! Recovers the 20-byte identity that produced a committee signature.
//!
//! ## Security Notes
//!
//! - **Prefixed Digest**: signers sign the EIP-191 form of the checkpoint
//!   (`"\x19Ethereum Signed Message:\n32" || digest`), never the raw digest
//! - **Malleability Prevention (EIP-2)**: S must not exceed half the curve order
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: scalar comparisons use `subtle`

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use pg_01_checkpoint_encoder::keccak256;
use shared_types::{Address, Hash};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use super::entities::EcdsaSignature;
use super::errors::SignatureError;

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// floor(n / 2), the largest S accepted under EIP-2.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// EIP-191 personal-message hash of a 32-byte digest.
pub fn eth_signed_message_hash(digest: &Hash) -> Hash {
    let mut message = Vec::with_capacity(SIGNED_MESSAGE_PREFIX.len() + digest.len());
    message.extend_from_slice(SIGNED_MESSAGE_PREFIX);
    message.extend_from_slice(digest);
    keccak256(&message)
}

/// Recover the identity that signed checkpoint `digest`.
///
/// Applies the EIP-191 prefix, then [`recover_address`].
pub fn recover_signer(digest: &Hash, signature: &EcdsaSignature) -> Result<Address, SignatureError> {
    recover_address(&eth_signed_message_hash(digest), signature)
}

/// Recover the signer's address from a signature over `prehash`.
///
/// Validations, in order:
/// 1. R and S are in [1, n-1]
/// 2. S is in the lower half of the curve order (EIP-2)
/// 3. Recovery ID (v) is 0, 1, 27 or 28
/// 4. Public key recovery succeeds
pub fn recover_address(prehash: &Hash, signature: &EcdsaSignature) -> Result<Address, SignatureError> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = parsed.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(prehash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Derive the 20-byte identity of a public key:
/// last 20 bytes of keccak256 of the uncompressed key without its 0x04 prefix.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Constant-time `a < b` over big-endian 32-byte integers.
fn ct_less_than(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        less |= not_decided & Choice::from((a[i] < b[i]) as u8);
        greater |= not_decided & Choice::from((a[i] > b[i]) as u8);
    }

    less
}

/// S <= floor(n/2).
fn is_low_s(s: &[u8; 32]) -> bool {
    let equal = s.ct_eq(&SECP256K1_HALF_ORDER);
    (ct_less_than(s, &SECP256K1_HALF_ORDER) | equal).into()
}

/// Scalar in [1, n-1].
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }
    (!is_zero & ct_less_than(scalar, &SECP256K1_ORDER)).into()
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

// =============================================================================
// TEST HELPERS
// =============================================================================

/// Deterministic signing keys and checkpoint signing, shared with the
/// registry, relay and end-to-end test suites.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers {
    use super::*;
    use crate::domain::entities::SignatureSlots;
    use k256::ecdsa::SigningKey;
    use shared_types::Committee;

    /// Deterministic signing key for `seed`.
    pub fn signing_key(seed: u64) -> SigningKey {
        let secret = keccak256(&seed.to_be_bytes());
        SigningKey::from_slice(&secret).expect("keccak output is a valid scalar")
    }

    /// High-S twin of a signature scalar: s' = n - s
    pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
        let mut result = [0u8; 32];
        let mut borrow: i32 = 0;

        for i in (0..32).rev() {
            let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
            if diff < 0 {
                result[i] = (diff + 256) as u8;
                borrow = 1;
            } else {
                result[i] = diff as u8;
                borrow = 0;
            }
        }

        result
    }

    /// `count` deterministic signing keys, seeds `offset..offset + count`.
    pub fn signing_keys(offset: u64, count: usize) -> Vec<SigningKey> {
        (0..count as u64).map(|i| signing_key(offset + i)).collect()
    }

    /// Identity of a signing key.
    pub fn identity(key: &SigningKey) -> Address {
        address_from_pubkey(key.verifying_key())
    }

    /// Committee of `keys` with `powers` at `generation`.
    pub fn committee_of(keys: &[SigningKey], powers: &[u64], generation: u64) -> Committee {
        let identities: Vec<Address> = keys.iter().map(identity).collect();
        Committee::from_parts(&identities, powers, generation).expect("valid test committee")
    }

    /// Sign a raw prehash, normalized to low S (EIP-2) with `v` in {27, 28}.
    pub fn sign_prehash(prehash: &Hash, key: &SigningKey) -> EcdsaSignature {
        let (sig, recid) = key
            .sign_prehash_recoverable(prehash)
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        let (s, flipped) = if is_low_s(&s) {
            (s, false)
        } else {
            (invert_s(&s), true)
        };
        let parity = recid.to_byte() ^ u8::from(flipped);

        EcdsaSignature { v: 27 + parity, r, s }
    }

    /// Sign a checkpoint digest the way off-chain signers do (EIP-191 prefix).
    pub fn sign_checkpoint(digest: &Hash, key: &SigningKey) -> EcdsaSignature {
        sign_prehash(&eth_signed_message_hash(digest), key)
    }

    /// Slots for a committee of `keys` where only `signers` sign `digest`.
    pub fn sign_slots(digest: &Hash, keys: &[SigningKey], signers: &[usize]) -> SignatureSlots {
        let mut slots = SignatureSlots::absent(keys.len());
        for &position in signers {
            slots.set(position, sign_checkpoint(digest, &keys[position]));
        }
        slots
    }
}
