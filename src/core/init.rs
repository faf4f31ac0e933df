//! Project initialization logic
//!
//! Creates `pbuild.toml`, a source directory with a starter file, and the
//! `.gitignore` entries for build outputs.

use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::manifest::{template_manifest, Manifest};
use crate::error::InitError;

/// Entries to add to .gitignore
pub const GITIGNORE_ENTRIES: &[&str] = &["build/", "compile_commands.json"];

/// Marker comment for the pbuild section in .gitignore
pub const GITIGNORE_MARKER: &str = "# pbuild";

const STARTER_SOURCE: &str = "main.cpp";

const STARTER_CONTENT: &str = r#"#include <cstdio>

int main() {
    std::puts("hello from pbuild");
    return 0;
}
"#;

/// Options for project initialization
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Overwrite an existing manifest
    pub force: bool,
}

/// Result of initialization
#[derive(Debug)]
pub struct InitResult {
    /// Path to created manifest
    pub manifest_path: PathBuf,
    /// Starter source, if one was written
    pub starter_source: Option<PathBuf>,
    /// Whether .gitignore was created (false: updated)
    pub gitignore_created: bool,
}

/// Generate .gitignore content for pbuild
pub fn generate_gitignore_content() -> String {
    let mut content = String::from(GITIGNORE_MARKER);
    content.push('\n');
    for entry in GITIGNORE_ENTRIES {
        content.push_str(entry);
        content.push('\n');
    }
    content
}

/// Append pbuild entries to existing .gitignore content
pub fn append_gitignore_entries(existing: &str) -> String {
    if existing.contains(GITIGNORE_MARKER) {
        return existing.to_string();
    }

    let mut result = existing.to_string();
    if !result.is_empty() && !result.ends_with('\n') {
        result.push('\n');
    }
    if !result.is_empty() {
        result.push('\n');
    }
    result.push_str(&generate_gitignore_content());
    result
}

/// Validate initialization can proceed
pub fn validate_init(path: &Path, options: &InitOptions) -> Result<(), InitError> {
    if !path.is_dir() {
        return Err(InitError::DirectoryNotFound {
            path: path.to_path_buf(),
        });
    }

    let manifest_path = Manifest::path_in(path);
    if manifest_path.exists() && !options.force {
        return Err(InitError::ManifestExists {
            path: manifest_path,
        });
    }

    Ok(())
}

/// Derive project name from directory
pub fn derive_project_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "my-project".to_string())
}

/// Initialize a project in `path`
///
/// The starter source is only written when the source directory is empty,
/// so re-initializing never touches existing code.
pub fn init_project(path: &Path, options: &InitOptions) -> Result<InitResult, InitError> {
    validate_init(path, options)?;

    let io_error = |path: &Path, e: std::io::Error| InitError::IoError {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let manifest_path = Manifest::path_in(path);
    std::fs::write(&manifest_path, template_manifest(&derive_project_name(path)))
        .map_err(|e| io_error(&manifest_path, e))?;

    let source_dir = path.join(defaults::DEFAULT_SOURCE_DIR);
    std::fs::create_dir_all(&source_dir).map_err(|e| io_error(&source_dir, e))?;
    let is_empty = std::fs::read_dir(&source_dir)
        .map_err(|e| io_error(&source_dir, e))?
        .next()
        .is_none();
    let starter_source = if is_empty {
        let starter = source_dir.join(STARTER_SOURCE);
        std::fs::write(&starter, STARTER_CONTENT).map_err(|e| io_error(&starter, e))?;
        Some(starter)
    } else {
        None
    };

    let gitignore_path = path.join(".gitignore");
    let gitignore_created = !gitignore_path.exists();
    let gitignore = if gitignore_created {
        generate_gitignore_content()
    } else {
        let existing =
            std::fs::read_to_string(&gitignore_path).map_err(|e| io_error(&gitignore_path, e))?;
        append_gitignore_entries(&existing)
    };
    std::fs::write(&gitignore_path, gitignore).map_err(|e| io_error(&gitignore_path, e))?;

    tracing::debug!("Initialized project in {}", path.display());
    Ok(InitResult {
        manifest_path,
        starter_source,
        gitignore_created,
    })
}
