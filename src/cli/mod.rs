//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no build logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::sync::OnceLock;

use anyhow::Result;
use clap::Parser;

use commands::Commands;

/// pbuild - Incremental C/C++ build orchestrator
///
/// Rebuilds only what changed, in parallel, and keeps
/// compile_commands.json current.
#[derive(Parser, Debug)]
#[command(name = "pbuild")]
#[command(author, version, about, long_about = None)]
#[command(long_version = long_version())]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            cmd.run().await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}

/// Version with build metadata, for `--version`
fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        format!(
            "{}\ncommit: {}{}\nbuilt:  {}\ntarget: {}",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            if option_env!("VERGEN_GIT_DIRTY") == Some("true") {
                " (dirty)"
            } else {
                ""
            },
            option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
            option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown"),
        )
    })
}
