//! CLI implementation for `pbuild init` command
//!
//! This module handles the CLI interface for project initialization.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{print_detail, print_success};
use crate::core::init::{init_project, InitOptions};

/// Execute the init command
pub async fn execute(path: &Path, force: bool) -> Result<()> {
    let result = init_project(path, &InitOptions { force })
        .with_context(|| format!("Failed to initialize project in {}", path.display()))?;

    print_success(&format!("Initialized pbuild project in {}", path.display()));
    print_detail("Created pbuild.toml");
    if let Some(source) = &result.starter_source {
        let shown = source.strip_prefix(path).unwrap_or(source);
        print_detail(&format!("Created {}", shown.display()));
    }
    if result.gitignore_created {
        print_detail("Created .gitignore");
    } else {
        print_detail("Updated .gitignore");
    }

    Ok(())
}
