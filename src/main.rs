#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use mentora::config::Config;
use mentora::gateway;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mentora", version, about = "Mentor chat gateway — LLM, STT and TTS proxy with session memory")]
struct Cli {
    /// Path to config file (default: ./mentora.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway (default)
    Serve {
        /// Override gateway.host
        #[arg(long)]
        host: Option<String>,
        /// Override gateway.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate configuration and report which vendor credentials are set
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS before any client is built.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            gateway::run_gateway(config).await
        }
        Command::Check => check(&config),
    }
}

fn check(config: &Config) -> Result<()> {
    config.validate()?;
    println!("✓ config valid");
    println!("  provider:  {} ({})", config.llm.provider, config.llm.model);

    let mark = |present: bool| if present { "✓" } else { "!" };
    println!(
        "  {} LLM API key {}",
        mark(config.llm_api_key().is_some()),
        if config.llm_api_key().is_some() {
            "set"
        } else {
            "missing"
        }
    );
    println!(
        "  {} Deepgram API key {}",
        mark(config.speech.api_key.is_some()),
        if config.speech.api_key.is_some() {
            "set"
        } else {
            "missing (STT/TTS disabled)"
        }
    );
    println!(
        "  sessions:  max {}, ttl {}s, history {} turns",
        config.session.max_sessions, config.session.ttl_secs, config.session.max_turns
    );
    println!(
        "  gateway:   {}:{}",
        config.gateway.host, config.gateway.port
    );
    Ok(())
}
