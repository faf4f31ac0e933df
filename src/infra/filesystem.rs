//! Filesystem operations
//!
//! Handles file and directory operations.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Write content to a file atomically
///
/// The data goes to a sibling temp file which is synced and then renamed
/// over `path`, so readers see either the old or the new content.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    let write_error = |e: std::io::Error| FilesystemError::WriteFile {
        path: temp_path.clone(),
        error: e.to_string(),
    };

    let mut file = File::create(&temp_path).map_err(write_error)?;
    file.write_all(data).map_err(write_error)?;
    file.sync_all().map_err(write_error)?;
    drop(file);

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        FilesystemError::Rename {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            error: e.to_string(),
        }
    })?;

    // Best effort: make the rename itself durable
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

/// Sibling temp path, unique per process so concurrent writers never share one
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
