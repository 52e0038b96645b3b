//! Curve25519 key types in the Signal "DJB" encoding, plus the helpers that
//! move keys between Montgomery (X25519) and Edwards (Ed25519) form.

use std::fmt;

use curve25519_dalek::traits::IsIdentity as _;
use curve25519_dalek::{
    EdwardsPoint, Scalar, constants::ED25519_BASEPOINT_POINT, montgomery::MontgomeryPoint,
};
use rand_core::OsRng;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use x25519_dalek::StaticSecret;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{LibsignalError, Result};
use crate::xeddsa::{xeddsa_sign, xeddsa_verify};

/// Type byte prepended to serialized Curve25519 public keys.
pub const DJB_TYPE: u8 = 0x05;
/// Length of a raw Curve25519 key (public u-coordinate or private scalar).
pub const KEY_LENGTH: usize = 32;
/// Length of a serialized public key: type byte plus u-coordinate.
pub const SERIALIZED_PUBLIC_KEY_LENGTH: usize = KEY_LENGTH + 1;
/// Length of an XEdDSA signature (`R || s`).
pub const SIGNATURE_LENGTH: usize = 64;

/// Checks that `u` encodes a usable X25519 public key.
///
/// Rejects the all-zero key, u-coordinates that are not reduced modulo
/// `p = 2^255 - 19`, points without an Edwards image and low-order points.
pub fn is_valid_public_key(pk: &[u8; 32]) -> bool {
    if pk.iter().all(|&b| b == 0) {
        return false;
    }

    if !is_canonical_u(pk) {
        return false;
    }

    let Some(edwards) = convert_mont(*pk) else {
        return false;
    };

    if edwards.is_identity() {
        return false;
    }

    // Cofactor-cleared point must not be identity (catches low-order)
    if edwards.mul_by_cofactor().is_identity() {
        return false;
    }

    true
}

/// Returns true when `u < p`, which also requires the top bit to be clear.
pub(crate) fn is_canonical_u(u: &[u8; 32]) -> bool {
    if u[31] & 0x80 != 0 {
        return false;
    }
    // p = [0xed, 0xff x 30, 0x7f] little endian
    !(u[31] == 0x7f && u[1..31].iter().all(|&b| b == 0xff) && u[0] >= 0xed)
}

/// Applies the Curve25519 "clamping" modification to a 32-byte private key.
///
/// It performs the following operations as defined in RFC 7748:
/// * `key[0] &= 248;` (clears the 3 least significant bits)
/// * `key[31] &= 127;` (clears the most significant bit)
/// * `key[31] |= 64;`  (sets the second most significant bit)
pub fn clamp_private_key(mut u: [u8; 32]) -> [u8; 32] {
    u[0] &= 248;
    u[31] &= 127;
    u[31] |= 64;
    u
}

/// Calculates a "canonical" Ed25519 key pair from an X25519 private key.
///
/// The returned public key always has a sign bit of 0; the private scalar is
/// negated when needed to make that hold. This is what lets a verifier
/// rebuild the Edwards key from the Montgomery u-coordinate alone.
///
/// # Returns
///
/// A tuple `(private_key, public_key)` where:
/// * `private_key` is the `Scalar` (potentially negated to be "canonical").
/// * `public_key` is the `EdwardsPoint` corresponding to the `private_key`.
pub fn calculate_key_pair(k: [u8; 32]) -> (Scalar, EdwardsPoint) {
    let k = Scalar::from_bytes_mod_order(clamp_private_key(k));
    let ed = ED25519_BASEPOINT_POINT * k;

    let sign = (ed.compress().to_bytes()[31] >> 7) & 1;

    let priv_key = Scalar::conditional_select(&k, &-k, Choice::from(sign));
    let public_key = ED25519_BASEPOINT_POINT * priv_key;

    (priv_key, public_key)
}

/// Converts a Montgomery u-coordinate to the Edwards point with sign bit 0.
///
/// Returns `None` when `u` has no Edwards image (`u = -1 mod p`).
pub fn convert_mont(u: [u8; 32]) -> Option<EdwardsPoint> {
    let mut u_masked = u;
    u_masked[31] &= 127;
    MontgomeryPoint(u_masked).to_edwards(0)
}

/// Encodes a public key by prepending 0x05 (Curve25519) to the 32-byte key.
pub fn encode_public_key(key: &[u8; 32]) -> [u8; 33] {
    let mut out = [0u8; SERIALIZED_PUBLIC_KEY_LENGTH];
    out[0] = DJB_TYPE;
    out[1..].copy_from_slice(key);
    out
}

fn to_key_array(bytes: &[u8]) -> Result<[u8; 32]> {
    bytes
        .try_into()
        .map_err(|_| LibsignalError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: bytes.len(),
        })
}

/// An X25519 public key (Montgomery u-coordinate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_bytes(u: [u8; 32]) -> Result<Self> {
        if !is_valid_public_key(&u) {
            return Err(LibsignalError::InvalidKey("not a valid curve point"));
        }
        Ok(Self(u))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// `0x05 || u`
    pub fn serialize(&self) -> [u8; 33] {
        encode_public_key(&self.0)
    }

    /// Parses the 33-byte DJB encoding produced by [`PublicKey::serialize`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SERIALIZED_PUBLIC_KEY_LENGTH {
            return Err(LibsignalError::InvalidKeyLength {
                expected: SERIALIZED_PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            });
        }
        if bytes[0] != DJB_TYPE {
            return Err(LibsignalError::BadKeyType(bytes[0]));
        }
        Self::from_bytes(to_key_array(&bytes[1..])?)
    }

    /// Verifies an XEdDSA signature made by the matching private key.
    pub fn verify_signature(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = <&[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
            return false;
        };
        xeddsa_verify(&self.0, message, signature)
    }
}

/// A clamped X25519 private key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Parses a raw 32-byte private key, clamping it.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let raw = to_key_array(bytes)?;
        if bool::from(raw.as_slice().ct_eq(&[0u8; 32][..])) {
            return Err(LibsignalError::InvalidKey("all-zero private key"));
        }
        Ok(Self(clamp_private_key(raw)))
    }

    pub fn serialize(&self) -> [u8; 32] {
        self.0
    }

    pub fn public_key(&self) -> PublicKey {
        let secret = StaticSecret::from(self.0);
        PublicKey(x25519_dalek::PublicKey::from(&secret).to_bytes())
    }

    /// XEdDSA signature over `message`.
    pub fn calculate_signature(&self, message: &[u8]) -> [u8; 64] {
        xeddsa_sign(&self.0, message)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// A Curve25519 key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl KeyPair {
    /// Generates a random key pair from the OS RNG.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let private_key = PrivateKey(clamp_private_key(secret.to_bytes()));
        Self::from_private(private_key)
    }

    pub fn from_private(private_key: PrivateKey) -> Self {
        Self {
            public_key: private_key.public_key(),
            private_key,
        }
    }
}
