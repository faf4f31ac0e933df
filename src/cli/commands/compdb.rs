//! CLI implementation for `pbuild compdb`

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::print_success;
use crate::core::compdb;
use crate::core::profile::Profile;
use crate::core::state::StateStore;
use crate::core::unit::Project;

/// Execute the compdb command
pub async fn execute(project_dir: &Path, profile: Profile) -> Result<()> {
    let project = Project::load(project_dir, profile)
        .with_context(|| format!("Failed to load project in {}", project_dir.display()))?;
    let store = StateStore::load(&project.state_dir());

    let entries = compdb::entries(&project.root, &project.units, &store);
    let path = project.compdb_path();
    compdb::write(&path, &entries)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    print_success(&format!(
        "Wrote {} entries ({profile}) to {}",
        entries.len(),
        path.display()
    ));
    Ok(())
}
