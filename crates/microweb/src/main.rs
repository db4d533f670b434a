//! microweb binary.
//!
//! Loads configuration from defaults, an optional file, `.env` and
//! `MICROWEB_*` variables, then serves until SIGINT or SIGTERM.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use microweb::config::ConfigLoader;
use microweb::server::ShutdownSignal;
use microweb::telemetry::init_logging;
use microweb::{log_config, Bootstrap};

const DEFAULT_CONFIG_FILE: &str = "microweb.toml";

#[derive(Debug, Parser)]
#[command(name = "microweb", version, about = "Declaration-driven GET routing server")]
struct Cli {
    /// Configuration file (TOML or JSON). Defaults to ./microweb.toml if present.
    #[arg(short, long, env = "MICROWEB_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port, overriding the configured address's port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Start from the development preset (pretty debug logs, no caching).
    #[arg(long)]
    dev: bool,

    /// Register only these controllers, by simple name or type path.
    #[arg(value_name = "CONTROLLER")]
    controllers: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "microweb failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loader = ConfigLoader::new().with_dotenv();
    let loader = if cli.dev {
        loader.with_development()
    } else {
        loader.with_defaults()
    };
    let loader = match &cli.config {
        Some(path) => loader
            .with_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE)?,
    };

    let mut config = loader
        .with_env_prefix("MICROWEB")
        .with_port_env()
        .load()
        .context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.set_port(port);
    }

    init_logging(&log_config(&config.logging)).context("initializing logging")?;
    tracing::info!(
        version = microweb::VERSION,
        addr = %config.server.http_addr,
        "starting microweb"
    );

    Bootstrap::new(config)
        .with_controllers(cli.controllers)
        .run(ShutdownSignal::with_os_signals())
        .await
        .context("server stopped with an error")?;

    tracing::info!("microweb stopped");
    Ok(())
}
