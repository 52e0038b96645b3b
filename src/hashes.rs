use sha2::{Digest, Sha512};

/// Computes the SHA-512 hash of the input.
pub fn hash(x: &[u8]) -> [u8; 64] {
    Sha512::digest(x).into()
}

/// Computes the domain-separated hash `hash_i`.
///
/// The function calculates `SHA-512( ((2^256 - 1) - i) || x )`, the prefix
/// being encoded as 32 little-endian bytes. XEdDSA uses `hash_1` to derive the
/// per-signature nonce so that it can never collide with a plain `hash`.
///
/// # Arguments
///
/// * `i` - The domain separation index (a small integer).
/// * `x` - The input byte slice.
pub fn hash_i(i: u8, x: &[u8]) -> [u8; 64] {
    // (2^256 - 1) is [0xFF; 32] in little endian, so subtracting a small `i`
    // only touches the first byte.
    let mut prefix = [0xFFu8; 32];
    prefix[0] -= i;

    let mut hasher = Sha512::new();
    hasher.update(prefix);
    hasher.update(x);
    hasher.finalize().into()
}
