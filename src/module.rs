//! The binding contract of the `PingLibsignal` module and its adapter.
//!
//! [`NativeModule`] lists every operation the module exposes. [`PingLibsignal`]
//! implements it by forwarding to the key library and marshalling all binary
//! key material to standard base64 strings.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::ModuleConfig;
use crate::curve::PrivateKey;
use crate::error::{LibsignalError, Result};
use crate::key_helper::{
    generate_identity_key_pair, generate_pre_keys, generate_registration_id,
    generate_signed_pre_key, pre_key_id,
};

pub const MODULE_NAME: &str = "PingLibsignal";

const HELLO: &str = "Hello world! 👋";
const EVENT_CAPACITY: usize = 16;

/// Identity key pair as base64 strings: 33-byte public, 32-byte private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibSignalKeyPair {
    #[serde(rename = "pub")]
    pub public: String,
    #[serde(rename = "priv")]
    pub private: String,
}

/// Batch of base64 serialized pre-key records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreKeyBundle {
    pub pre_keys: Vec<String>,
}

/// Base64 serialized signed pre-key record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPreKey {
    pub signed_pre_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub encrypted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
}

/// Payload of the `onChange` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEventPayload {
    pub value: String,
}

/// Operations exposed by the native module.
#[async_trait]
pub trait NativeModule: Send + Sync {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    /// The `PI` constant.
    fn pi(&self) -> f64;

    /// Liveness check. Must return the same text on every call.
    fn hello(&self) -> String;

    /// Stores nothing; emits `onChange` with `value`.
    async fn set_value_async(&self, value: String) -> Result<()>;

    /// Generates an identity key pair.
    async fn test_lib_signal(&self) -> Result<LibSignalKeyPair>;

    async fn generate_pre_keys(&self, count: u32) -> Result<PreKeyBundle>;

    /// Generates a signed pre-key signed with the base64 identity private key.
    async fn generate_signed_pre_key(&self, identity_private_key: &str) -> Result<SignedPreKey>;

    async fn generate_registration_id(&self) -> Result<u32>;

    async fn encrypt_message(
        &self,
        _message: &str,
        _recipient_public_key: &str,
    ) -> Result<EncryptedMessage> {
        Err(LibsignalError::NotImplemented("encryptMessage"))
    }

    async fn create_session(
        &self,
        _recipient_id: &str,
        _recipient_public_key: &str,
    ) -> Result<SessionInfo> {
        Err(LibsignalError::NotImplemented("createSession"))
    }
}

#[derive(Debug)]
struct IdAllocator {
    next_pre_key_id: u32,
    next_signed_pre_key_id: u32,
}

impl IdAllocator {
    /// Reserves `count` pre-key ids and returns the first.
    fn take_pre_key_ids(&mut self, count: u32) -> u32 {
        let start = pre_key_id(self.next_pre_key_id, 0);
        self.next_pre_key_id = pre_key_id(start, count);
        start
    }

    fn take_signed_pre_key_id(&mut self) -> u32 {
        let id = pre_key_id(self.next_signed_pre_key_id, 0);
        self.next_signed_pre_key_id = pre_key_id(id, 1);
        id
    }
}

/// Adapter backing [`NativeModule`] with the in-crate key library.
pub struct PingLibsignal {
    config: ModuleConfig,
    ids: Mutex<IdAllocator>,
    events: broadcast::Sender<ChangeEventPayload>,
}

impl PingLibsignal {
    pub const PI: f64 = std::f64::consts::PI;

    pub fn new(config: ModuleConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let ids = IdAllocator {
            next_pre_key_id: config.pre_key_start_id,
            next_signed_pre_key_id: config.signed_pre_key_id,
        };
        Self {
            config,
            ids: Mutex::new(ids),
            events,
        }
    }

    /// Settings the module was built with; `pre_key_count` is the batch
    /// size callers fall back to.
    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Subscribes to `onChange` events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEventPayload> {
        self.events.subscribe()
    }
}

impl Default for PingLibsignal {
    fn default() -> Self {
        Self::new(ModuleConfig::default())
    }
}

fn reject<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        warn!(operation, code = err.code(), %err, "operation rejected");
    }
    result
}

#[async_trait]
impl NativeModule for PingLibsignal {
    fn pi(&self) -> f64 {
        Self::PI
    }

    fn hello(&self) -> String {
        HELLO.to_string()
    }

    async fn set_value_async(&self, value: String) -> Result<()> {
        debug!(receivers = self.events.receiver_count(), "emitting onChange");
        // No subscribers is not an error
        let _ = self.events.send(ChangeEventPayload { value });
        Ok(())
    }

    async fn test_lib_signal(&self) -> Result<LibSignalKeyPair> {
        debug!("generating identity key pair");
        let result = tokio::task::spawn_blocking(generate_identity_key_pair)
            .await
            .map_err(LibsignalError::from)
            .map(|key_pair| LibSignalKeyPair {
                public: STANDARD.encode(key_pair.public_key.serialize()),
                private: STANDARD.encode(key_pair.private_key.serialize()),
            });
        reject("testLibSignal", result)
    }

    async fn generate_pre_keys(&self, count: u32) -> Result<PreKeyBundle> {
        let start = self.ids.lock().take_pre_key_ids(count);
        debug!(start, count, "generating pre-keys");

        let result = tokio::task::spawn_blocking(move || generate_pre_keys(start, count))
            .await
            .map_err(LibsignalError::from)
            .map(|records| PreKeyBundle {
                pre_keys: records
                    .iter()
                    .map(|record| STANDARD.encode(record.serialize()))
                    .collect(),
            });
        reject("generatePreKeys", result)
    }

    async fn generate_signed_pre_key(&self, identity_private_key: &str) -> Result<SignedPreKey> {
        let private_key = STANDARD
            .decode(identity_private_key.trim())
            .map_err(LibsignalError::from)
            .and_then(|bytes| PrivateKey::deserialize(&bytes));
        let private_key = reject("generateSignedPreKey", private_key)?;

        let id = self.ids.lock().take_signed_pre_key_id();
        debug!(id, "generating signed pre-key");

        let result =
            tokio::task::spawn_blocking(move || generate_signed_pre_key(&private_key, id))
                .await
                .map_err(LibsignalError::from)
                .map(|record| SignedPreKey {
                    signed_pre_key: STANDARD.encode(record.serialize()),
                });
        reject("generateSignedPreKey", result)
    }

    async fn generate_registration_id(&self) -> Result<u32> {
        Ok(generate_registration_id())
    }
}
