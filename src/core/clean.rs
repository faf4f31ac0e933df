//! Clean logic
//!
//! Removes build outputs and state, either for one profile or for the whole
//! build directory.

use std::path::{Path, PathBuf};

use crate::core::manifest::Manifest;
use crate::core::profile::Profile;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Result of clean operation
#[derive(Debug, Default)]
pub struct CleanResult {
    /// Paths that were removed
    pub removed: Vec<PathBuf>,
    /// Paths that didn't exist (skipped)
    pub skipped: Vec<PathBuf>,
}

/// Paths `clean` removes for `profile`, or for every profile
///
/// Without a profile the whole build directory goes, together with the
/// compilation database that points into it.
pub fn clean_targets(project_dir: &Path, manifest: &Manifest, profile: Option<Profile>) -> Vec<PathBuf> {
    match profile {
        Some(profile) => vec![manifest.profile_dir(project_dir, profile)],
        None => vec![
            manifest.build_dir(project_dir),
            Manifest::compdb_path_in(project_dir),
        ],
    }
}

/// Remove build artifacts of a project
pub fn clean_project(
    project_dir: &Path,
    manifest: &Manifest,
    profile: Option<Profile>,
) -> Result<CleanResult, FilesystemError> {
    let mut result = CleanResult::default();

    for path in clean_targets(project_dir, manifest, profile) {
        if path.is_dir() {
            filesystem::remove_dir_all(&path)?;
            result.removed.push(path);
        } else if path.is_file() {
            std::fs::remove_file(&path).map_err(|e| FilesystemError::RemoveDir {
                path: path.clone(),
                error: e.to_string(),
            })?;
            result.removed.push(path);
        } else {
            result.skipped.push(path);
        }
    }

    tracing::debug!("Removed {} path(s)", result.removed.len());
    Ok(result)
}

/// Check if a project has any build artifacts
pub fn has_build_artifacts(project_dir: &Path, manifest: &Manifest, profile: Option<Profile>) -> bool {
    clean_targets(project_dir, manifest, profile)
        .iter()
        .any(|path| path.exists())
}
