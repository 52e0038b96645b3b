//! # ping-libsignal
//!
//! Signal-style key material behind a small async binding contract, and a
//! headless test screen that exercises it.
//!
//! ## Modules
//!
//! * `curve` - Curve25519 key types and Montgomery/Edwards conversions.
//! * `hashes` - SHA-512 and the domain-separated `hash_i`.
//! * `xeddsa` - XEdDSA signing and verification with X25519 keys.
//! * `records` - Pre-key and signed pre-key records.
//! * `key_helper` - Identity, pre-key, signed pre-key and registration id generation.
//! * `module` - The `PingLibsignal` binding contract and its base64 adapter.
//! * `screen` - Test screen state, triggers and rendering.
//! * `config` - TOML configuration.

pub mod config;
pub mod curve;
pub mod error;
pub mod hashes;
pub mod key_helper;
pub mod module;
pub mod records;
pub mod screen;
pub mod xeddsa;

pub use error::{LibsignalError, Result};
