//! TOML configuration for the module and the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::Directive;

use crate::error::{LibsignalError, Result};

/// Environment variable consulted for a config path when `--config` is absent.
pub const CONFIG_ENV: &str = "PING_LIBSIGNAL_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing directive, a bare level (`debug`) or a per-target
    /// directive (`ping_libsignal=debug`); `RUST_LOG` still wins.
    pub log_level: String,
    pub module: ModuleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            module: ModuleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Id handed to the first generated pre-key.
    pub pre_key_start_id: u32,
    /// Batch size used when a caller does not ask for one.
    pub pre_key_count: u32,
    /// Id handed to the first generated signed pre-key.
    pub signed_pre_key_id: u32,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            pre_key_start_id: 1,
            pre_key_count: 5,
            signed_pre_key_id: 1,
        }
    }
}

impl Config {
    /// Loads the file at `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LibsignalError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| LibsignalError::Config(e.to_string()))?;
        config.default_directive()?;
        Ok(config)
    }

    pub fn default_directive(&self) -> Result<Directive> {
        self.log_level.parse().map_err(|_| {
            LibsignalError::Config(format!("invalid log directive {:?}", self.log_level))
        })
    }
}
