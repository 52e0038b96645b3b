use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ping_libsignal::config::CONFIG_ENV;

#[derive(Parser, Debug)]
#[command(
    name = "ping-libsignal",
    version,
    about = "Exercise the PingLibsignal key module"
)]
pub struct Cli {
    #[arg(long, global = true, env = CONFIG_ENV, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Liveness check
    Hello,
    /// Print the PI constant
    Pi,
    /// Generate an identity key pair
    Identity,
    /// Generate a batch of pre-keys
    PreKeys {
        #[arg(long, help = "Number of pre-keys (defaults to the configured batch size)")]
        count: Option<u32>,
    },
    /// Generate a signed pre-key with a base64 identity private key
    SignedPreKey {
        #[arg(long)]
        identity_private: String,
    },
    /// Generate a registration id
    RegistrationId,
    /// Run the whole test screen flow and render it
    Screen {
        #[arg(long)]
        count: Option<u32>,
    },
}
