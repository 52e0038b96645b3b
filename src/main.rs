mod cli;

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use cli::{Cli, Commands};
use ping_libsignal::config::Config;
use ping_libsignal::module::{NativeModule, PingLibsignal};
use ping_libsignal::screen::TestScreen;

/// Logs go to stderr so stdout only carries command output.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.default_directive()?)
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
    Ok(())
}

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    human: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(human(value))
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<String> {
    let module = Arc::new(PingLibsignal::new(config.module));
    let default_count = module.config().pre_key_count;
    let json = cli.json;

    match cli.command {
        Commands::Hello => emit(json, &module.hello(), |hello| hello.clone()),
        Commands::Pi => emit(json, &module.pi(), |pi| pi.to_string()),
        Commands::Identity => {
            let key_pair = module
                .test_lib_signal()
                .await
                .context("testLibSignal failed")?;
            emit(json, &key_pair, |kp| {
                format!("Public Key: {}\nPrivate Key: {}", kp.public, kp.private)
            })
        }
        Commands::PreKeys { count } => {
            let bundle = module
                .generate_pre_keys(count.unwrap_or(default_count))
                .await
                .context("generatePreKeys failed")?;
            emit(json, &bundle, |b| b.pre_keys.join("\n"))
        }
        Commands::SignedPreKey { identity_private } => {
            let signed = module
                .generate_signed_pre_key(&identity_private)
                .await
                .context("generateSignedPreKey failed")?;
            emit(json, &signed, |s| s.signed_pre_key.clone())
        }
        Commands::RegistrationId => {
            let id = module
                .generate_registration_id()
                .await
                .context("generateRegistrationId failed")?;
            emit(json, &id, |id| id.to_string())
        }
        Commands::Screen { count } => {
            let screen = TestScreen::new(module);
            screen.initialize();
            screen.test_lib_signal().await;
            screen.generate_pre_keys(count.unwrap_or(default_count)).await;
            screen.generate_signed_pre_key().await;
            if json {
                Ok(serde_json::to_string_pretty(&screen.state())?)
            } else {
                Ok(screen.render())
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    match run(cli, config).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
