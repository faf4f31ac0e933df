//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod check;
pub mod clean;
pub mod compdb;
pub mod init;

use anyhow::Result;
use clap::Subcommand;

use crate::core::profile::Profile;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new pbuild project
    Init {
        /// Overwrite an existing pbuild.toml
        #[arg(short, long)]
        force: bool,
    },

    /// Compile what changed and link the target
    Build {
        /// Profile to build (debug or release)
        #[arg(default_value_t = Profile::Release)]
        profile: Profile,

        /// Number of parallel jobs (defaults to CPU count)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Rebuild every unit regardless of recorded state
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration and show what a build would compile
    Check {
        /// Profile to check (debug or release)
        #[arg(default_value_t = Profile::Release)]
        profile: Profile,
    },

    /// Write compile_commands.json without building
    Compdb {
        /// Profile whose commands are written (debug or release)
        #[arg(default_value_t = Profile::Release)]
        profile: Profile,
    },

    /// Remove build artifacts
    Clean {
        /// Only clean this profile
        profile: Option<Profile>,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Init { force } => init::execute(&current_dir, force).await,
            Self::Build {
                profile,
                jobs,
                force,
            } => {
                let options = build::BuildOptions {
                    profile,
                    jobs,
                    force,
                };
                build::execute(&current_dir, options).await
            }
            Self::Check { profile } => check::execute(&current_dir, profile).await,
            Self::Compdb { profile } => compdb::execute(&current_dir, profile).await,
            Self::Clean { profile } => clean::execute(&current_dir, profile).await,
        }
    }
}
