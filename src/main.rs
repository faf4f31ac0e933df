//! pbuild CLI - Incremental C/C++ build orchestrator
//!
//! Entry point for the pbuild command-line application.

use anyhow::Result;
use clap::Parser;

use pbuild::cli::output::{display_error, OutputConfig};
use pbuild::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Apply output configuration globally
    let output_config = OutputConfig::new(cli.quiet, cli.json, cli.verbose);
    output_config.apply_global();

    // RUST_LOG takes precedence over -v
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(output_config.log_level().into())
                .from_env_lossy(),
        )
        .init();

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
