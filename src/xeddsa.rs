#![allow(non_snake_case)]
use curve25519_dalek::{
    constants::ED25519_BASEPOINT_POINT, edwards::EdwardsPoint, scalar::Scalar,
};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha512};

use crate::{
    curve::{calculate_key_pair, convert_mont, is_canonical_u},
    hashes::hash_i,
};

/// Computes an XEdDSA signature over `M` with an X25519 private key.
///
/// The signature is `R || s` and verifies as a plain Ed25519 signature
/// against the Edwards form of the signer's public key.
///
/// # Arguments
///
/// * `k` - The 32-byte X25519 private key. Clamping happens inside.
/// * `M` - The message bytes.
pub fn xeddsa_sign(k: &[u8; 32], M: &[u8]) -> [u8; 64] {
    let (a, A) = calculate_key_pair(*k);
    let A_bytes = A.compress().to_bytes();

    let mut Z = [0u8; 64];
    OsRng.fill_bytes(&mut Z);

    // 1. r = hash1(a || M || Z) (mod q)
    let mut r_msg = Vec::with_capacity(32 + M.len() + Z.len());
    r_msg.extend_from_slice(a.as_bytes());
    r_msg.extend_from_slice(M);
    r_msg.extend_from_slice(&Z);
    let r = Scalar::from_bytes_mod_order_wide(&hash_i(1, &r_msg));

    // 2. R = r * B
    let R_bytes = (ED25519_BASEPOINT_POINT * r).compress().to_bytes();

    // 3. h = hash(R || A || M) (mod q)
    let h = challenge(&R_bytes, &A_bytes, M);

    // 4. s = r + (h * a) (mod q)
    let s = r + (h * a);

    let mut signature = [0u8; 64];
    signature[0..32].copy_from_slice(&R_bytes);
    signature[32..64].copy_from_slice(&s.to_bytes());
    signature
}

/// Verifies an XEdDSA signature.
///
/// # Arguments
///
/// * `u` - The X25519 public key (Montgomery u-coordinate).
/// * `M` - The signed message.
/// * `signature` - The 64-byte signature (`R || s`).
///
/// # Returns
///
/// `true` only if `u` is a reduced coordinate, `s` is canonical and
/// `sB - hA` compresses to `R`.
pub fn xeddsa_verify(u: &[u8; 32], M: &[u8], signature: &[u8; 64]) -> bool {
    if !is_canonical_u(u) {
        return false;
    }

    let R_bytes: [u8; 32] = match signature[0..32].try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let s_bytes: [u8; 32] = match signature[32..64].try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    // s >= 2^253
    if s_bytes[31] & 0xE0 != 0 {
        return false;
    }
    let s = match Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes)) {
        Some(s) => s,
        None => return false,
    };

    let A = match convert_mont(*u) {
        Some(point) => point,
        None => return false,
    };
    let A_bytes = A.compress().to_bytes();

    let h = challenge(&R_bytes, &A_bytes, M);

    // R_check = sB - hA
    let R_check: EdwardsPoint = (ED25519_BASEPOINT_POINT * s) - (A * h);

    R_check.compress().to_bytes() == R_bytes
}

fn challenge(R_bytes: &[u8; 32], A_bytes: &[u8; 32], M: &[u8]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(R_bytes);
    hasher.update(A_bytes);
    hasher.update(M);
    Scalar::from_bytes_mod_order_wide(&hasher.finalize().into())
}
