//! CLI implementation for `pbuild check`
//!
//! Validates the project and prints the classification of every unit
//! without compiling anything.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::output::{is_json, print_detail, print_info, print_json, print_success};
use crate::core::check::check;
use crate::core::profile::Profile;
use crate::core::state::StateStore;
use crate::core::unit::Project;

/// Execute the check command
pub async fn execute(project_dir: &Path, profile: Profile) -> Result<()> {
    let project = Project::load(project_dir, profile)
        .with_context(|| format!("Failed to load project in {}", project_dir.display()))?;
    let store = StateStore::load(&project.state_dir());
    let result = check(&project, &store);

    if is_json() {
        print_json(&result)?;
    } else {
        print_success(&format!(
            "Configuration valid: {} unit(s) in profile {}",
            result.units.len(),
            result.profile
        ));
        for unit in &result.units {
            let line = match &unit.reason {
                Some(reason) => format!("stale    {} ({reason})", unit.source.display()),
                None => format!("current  {}", unit.source.display()),
            };
            print_detail(&line);
        }
        match &result.link {
            Some(reason) => print_info(&format!("Link needed ({reason})")),
            None => print_info("Link up to date"),
        }
        print_info(&format!(
            "{} of {} unit(s) would be compiled",
            result.stale_count(),
            result.units.len()
        ));
    }

    if !result.is_valid() {
        bail!("Compiler '{}' not found in PATH", result.compiler);
    }
    Ok(())
}
