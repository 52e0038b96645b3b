//! Pre-key and signed pre-key records and their byte layouts.

use crate::curve::{
    KEY_LENGTH, KeyPair, PrivateKey, PublicKey, SERIALIZED_PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};
use crate::error::{LibsignalError, Result};

/// One-time pre-key: id plus key pair.
#[derive(Clone, Debug)]
pub struct PreKeyRecord {
    pub id: u32,
    pub key_pair: KeyPair,
}

impl PreKeyRecord {
    /// Length of [`PreKeyRecord::serialize`] output.
    pub const SERIALIZED_LENGTH: usize = 4 + SERIALIZED_PUBLIC_KEY_LENGTH + KEY_LENGTH;

    pub fn new(id: u32, key_pair: KeyPair) -> Self {
        Self { id, key_pair }
    }

    /// Format: [id (4, be)] || [public (33)] || [private (32)]
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SERIALIZED_LENGTH);
        bytes.extend_from_slice(&self.id.to_be_bytes());
        bytes.extend_from_slice(&self.key_pair.public_key.serialize());
        bytes.extend_from_slice(&self.key_pair.private_key.serialize());
        bytes
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SERIALIZED_LENGTH {
            return Err(LibsignalError::InvalidRecord(format!(
                "pre-key record must be {} bytes, got {}",
                Self::SERIALIZED_LENGTH,
                bytes.len()
            )));
        }

        let mut id_bytes = [0u8; 4];
        id_bytes.copy_from_slice(&bytes[0..4]);
        let id = u32::from_be_bytes(id_bytes);

        let key_pair = read_key_pair(&bytes[4..4 + SERIALIZED_PUBLIC_KEY_LENGTH + KEY_LENGTH])?;

        Ok(Self { id, key_pair })
    }
}

/// Medium-term pre-key whose public part is signed by the identity key.
#[derive(Clone, Debug)]
pub struct SignedPreKeyRecord {
    pub id: u32,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub key_pair: KeyPair,
    pub signature: [u8; SIGNATURE_LENGTH],
}

impl SignedPreKeyRecord {
    /// Length of [`SignedPreKeyRecord::serialize`] output.
    pub const SERIALIZED_LENGTH: usize =
        4 + 8 + SERIALIZED_PUBLIC_KEY_LENGTH + KEY_LENGTH + SIGNATURE_LENGTH;

    /// Format: [id (4, be)] || [timestamp (8, be)] || [public (33)] || [private (32)] || [signature (64)]
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SERIALIZED_LENGTH);
        bytes.extend_from_slice(&self.id.to_be_bytes());
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes.extend_from_slice(&self.key_pair.public_key.serialize());
        bytes.extend_from_slice(&self.key_pair.private_key.serialize());
        bytes.extend_from_slice(&self.signature);
        bytes
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SERIALIZED_LENGTH {
            return Err(LibsignalError::InvalidRecord(format!(
                "signed pre-key record must be {} bytes, got {}",
                Self::SERIALIZED_LENGTH,
                bytes.len()
            )));
        }

        let mut id_bytes = [0u8; 4];
        id_bytes.copy_from_slice(&bytes[0..4]);
        let id = u32::from_be_bytes(id_bytes);

        let mut ts_bytes = [0u8; 8];
        ts_bytes.copy_from_slice(&bytes[4..12]);
        let timestamp = u64::from_be_bytes(ts_bytes);

        let keys_end = 12 + SERIALIZED_PUBLIC_KEY_LENGTH + KEY_LENGTH;
        let key_pair = read_key_pair(&bytes[12..keys_end])?;

        let mut signature = [0u8; SIGNATURE_LENGTH];
        signature.copy_from_slice(&bytes[keys_end..]);

        Ok(Self {
            id,
            timestamp,
            key_pair,
            signature,
        })
    }

    /// Checks the signature over the serialized public key.
    pub fn verify(&self, identity_key: &PublicKey) -> Result<()> {
        if identity_key.verify_signature(&self.key_pair.public_key.serialize(), &self.signature) {
            Ok(())
        } else {
            Err(LibsignalError::InvalidSignature)
        }
    }
}

fn read_key_pair(bytes: &[u8]) -> Result<KeyPair> {
    let public_key = PublicKey::deserialize(&bytes[..SERIALIZED_PUBLIC_KEY_LENGTH])?;
    let private_key = PrivateKey::deserialize(&bytes[SERIALIZED_PUBLIC_KEY_LENGTH..])?;
    if private_key.public_key() != public_key {
        return Err(LibsignalError::InvalidRecord(
            "public key does not match private key".to_string(),
        ));
    }
    Ok(KeyPair {
        public_key,
        private_key,
    })
}
