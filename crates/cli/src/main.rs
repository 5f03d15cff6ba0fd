//! campus command-line entry point.
//!
//! Fetches site collections through the query client and prints them as JSON.
//! Logging goes to stderr so stdout stays pipeable.

use anyhow::{Context, Result};
use campus_client::QueryClient;
use campus_core::{AppConfig, Environment, ResourceKey};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "campus")]
#[command(about = "Query the university site API")]
#[command(version)]
struct Args {
    /// Resolve keys against the development server (raw paths only)
    #[arg(long, global = true)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one or more collections, e.g. `/api/news /api/events`
    Get {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Save a file from /api/downloads
    Download {
        file: String,

        /// Output path (default: the file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();

    let config = AppConfig::load().context("failed to load configuration")?;
    let config = if args.dev { AppConfig { environment: Environment::Development, ..config } } else { config };

    let client = QueryClient::new(&config)?;

    match args.command {
        Command::Get { paths } => {
            let keys = paths
                .iter()
                .map(|p| p.parse::<ResourceKey>())
                .collect::<Result<Vec<_>, _>>()?;

            // the whole set fails if any one key does
            let values = client.query_all(&keys).await?;
            for (key, value) in keys.iter().zip(values) {
                tracing::info!(key = %key, "fetched");
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }
        Command::Download { file, output } => {
            let bytes = client.download(&file).await?;
            let output = output.unwrap_or_else(|| PathBuf::from(&file));
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(file = %file, bytes = bytes.len(), path = %output.display(), "downloaded");
        }
    }

    Ok(())
}
