//! CLI implementation for `pbuild clean` command
//!
//! This module handles the CLI interface for cleaning build artifacts.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{print_detail, print_success};
use crate::core::clean::{clean_project, has_build_artifacts};
use crate::core::manifest::Manifest;
use crate::core::profile::Profile;

/// Execute the clean command
pub async fn execute(project_dir: &Path, profile: Option<Profile>) -> Result<()> {
    let manifest = Manifest::load(project_dir)?;

    if !has_build_artifacts(project_dir, &manifest, profile) {
        print_success("Nothing to clean");
        return Ok(());
    }

    let result = clean_project(project_dir, &manifest, profile)
        .with_context(|| "Failed to clean build artifacts")?;

    print_success("Cleaned build artifacts:");
    for path in &result.removed {
        let shown = path.strip_prefix(project_dir).unwrap_or(path);
        print_detail(&format!("Removed {}", shown.display()));
    }

    Ok(())
}
