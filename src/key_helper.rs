//! Helpers for generating the key material a client publishes.

use chrono::Utc;
use rand_core::{OsRng, RngCore};

use crate::curve::{KeyPair, PrivateKey};
use crate::records::{PreKeyRecord, SignedPreKeyRecord};

/// Largest pre-key id; ids live in a 24-bit space.
pub const MAX_PRE_KEY_ID: u32 = 0xFF_FFFF;

/// Registration ids are drawn from `1..=MAX_REGISTRATION_ID`.
pub const MAX_REGISTRATION_ID: u32 = 16380;

pub fn generate_identity_key_pair() -> KeyPair {
    KeyPair::generate()
}

/// Id of the pre-key `offset` places after `start`, wrapping inside
/// `1..MAX_PRE_KEY_ID`. A `start` of 0 is treated as 1.
pub fn pre_key_id(start: u32, offset: u32) -> u32 {
    let span = u64::from(MAX_PRE_KEY_ID - 1);
    ((u64::from(start.max(1)) - 1 + u64::from(offset)) % span + 1) as u32
}

/// Generates exactly `count` pre-keys with consecutive (wrapping) ids.
pub fn generate_pre_keys(start: u32, count: u32) -> Vec<PreKeyRecord> {
    (0..count)
        .map(|offset| PreKeyRecord::new(pre_key_id(start, offset), KeyPair::generate()))
        .collect()
}

/// Generates a signed pre-key; the signature covers the serialized public key.
pub fn generate_signed_pre_key(identity_private: &PrivateKey, id: u32) -> SignedPreKeyRecord {
    let key_pair = KeyPair::generate();
    let signature = identity_private.calculate_signature(&key_pair.public_key.serialize());

    SignedPreKeyRecord {
        id,
        timestamp: Utc::now().timestamp_millis().max(0) as u64,
        key_pair,
        signature,
    }
}

pub fn generate_registration_id() -> u32 {
    OsRng.next_u32() % MAX_REGISTRATION_ID + 1
}
