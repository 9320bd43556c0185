//! Telepath CLI - inspect telepath payloads
//!
//! Commands:
//!   telepath decode [FILE]  - Decode a payload with the built-in adapters
//!   telepath tags           - List the tags the built-in adapters handle

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use telepath::{Limits, RegistryBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "telepath")]
#[command(about = "Tools for inspecting telepath payloads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a payload and print the reconstructed value
    Decode {
        /// Payload file; reads stdin when omitted or `-`
        payload: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Maximum nesting depth
        #[arg(long, default_value_t = Limits::default().max_depth)]
        max_depth: usize,

        /// Maximum number of wire nodes
        #[arg(long, default_value_t = Limits::default().max_nodes)]
        max_nodes: usize,
    },
    /// List the registered type tags
    Tags,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            payload,
            json,
            max_depth,
            max_nodes,
        } => decode_command(
            payload.as_ref(),
            json,
            &Limits {
                max_depth,
                max_nodes,
            },
        ),
        Commands::Tags => tags_command(),
    }
}

fn decode_command(payload: Option<&PathBuf>, json: bool, limits: &Limits) -> anyhow::Result<()> {
    let (source, text) = read_payload(payload)?;

    let registry = RegistryBuilder::with_builtins()?.freeze();
    let value = registry
        .decode_str_with_limits(&text, limits)
        .with_context(|| format!("Failed to decode {source}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}

fn tags_command() -> anyhow::Result<()> {
    let registry = RegistryBuilder::with_builtins()?.freeze();
    for tag in registry.tags() {
        println!("{tag}");
    }
    Ok(())
}

/// Read the payload text, returning a display name for its source.
fn read_payload(path: Option<&PathBuf>) -> anyhow::Result<(String, String)> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok((path.display().to_string(), text))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(("stdin".to_string(), text))
        }
    }
}
