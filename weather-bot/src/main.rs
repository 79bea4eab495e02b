//! Binary crate for the `weather-bot` service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - The terminal chat transport
//! - The read-only request history API

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod api;
mod cli;
mod console;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables take precedence.
    dotenvy::dotenv().ok();

    // Logs go to stderr so chat replies on stdout stay clean.
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
