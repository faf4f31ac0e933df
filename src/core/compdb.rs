//! Compilation database (`compile_commands.json`)
//!
//! One entry per translation unit of the profile, whether or not it was
//! compiled in this invocation. The file is replaced atomically.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::state::StateStore;
use crate::core::unit::TranslationUnit;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// One `compile_commands.json` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    /// Working directory of the compile
    pub directory: PathBuf,
    /// Compiler argument vector
    pub arguments: Vec<String>,
    /// Source file
    pub file: PathBuf,
    /// Object file
    pub output: PathBuf,
}

/// Entries for every unit, in unit order
///
/// A unit whose record matches its realized command reports the stored
/// command; any other unit reports the command it will be compiled with.
pub fn entries(root: &Path, units: &[TranslationUnit], store: &StateStore) -> Vec<CompileCommand> {
    units
        .iter()
        .map(|unit| {
            let arguments = match store.current_record(&unit.key()) {
                Some(record) if record.arguments == unit.arguments => record.arguments,
                _ => unit.arguments.clone(),
            };
            CompileCommand {
                directory: root.to_path_buf(),
                arguments,
                file: unit.source.clone(),
                output: unit.object.clone(),
            }
        })
        .collect()
}

/// Write the database as a single JSON array
pub fn write(path: &Path, entries: &[CompileCommand]) -> Result<(), FilesystemError> {
    let mut data = serde_json::to_vec_pretty(entries).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    data.push(b'\n');
    filesystem::atomic_write(path, &data)?;
    tracing::info!("Wrote {} entries to {}", entries.len(), path.display());
    Ok(())
}

/// Read a database back
pub fn read(path: &Path) -> Result<Vec<CompileCommand>, FilesystemError> {
    let content = std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::Fingerprint;
    use crate::core::profile::Profile;
    use crate::core::state::BuildRecord;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn unit(root: &Path, name: &str, flag: &str) -> TranslationUnit {
        let source = root.join("src").join(format!("{name}.c"));
        let object = root.join("build/debug/obj").join(format!("{name}.o"));
        TranslationUnit {
            arguments: vec![
                "cc".into(),
                flag.into(),
                "-c".into(),
                source.display().to_string(),
                "-o".into(),
                object.display().to_string(),
            ],
            depfile: object.with_extension("d"),
            source,
            object,
            profile: Profile::Debug,
        }
    }

    #[test]
    fn test_one_entry_per_unit() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let units = vec![unit(root, "a", "-g"), unit(root, "b", "-g")];
        let store = StateStore::load(&root.join("state"));

        let entries = entries(root, &units, &store);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file, root.join("src/a.c"));
        assert_eq!(entries[0].output, root.join("build/debug/obj/a.o"));
        assert_eq!(entries[0].directory, root);
        assert_eq!(entries[1].arguments, units[1].arguments);
    }

    #[test]
    fn test_current_unit_uses_stored_command() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let a = unit(root, "a", "-g");
        let store = StateStore::load(&root.join("state"));
        store
            .save(
                &a.key(),
                BuildRecord {
                    source: a.source.clone(),
                    source_fingerprint: Fingerprint::of_bytes(b""),
                    headers: BTreeMap::new(),
                    arguments: a.arguments.clone(),
                    object_fingerprint: Fingerprint::of_bytes(b""),
                },
            )
            .unwrap();

        let entries = entries(root, std::slice::from_ref(&a), &store);
        assert_eq!(entries[0].arguments, a.arguments);

        let changed = unit(root, "a", "-O2");
        let entries = super::entries(root, std::slice::from_ref(&changed), &store);
        assert_eq!(entries[0].arguments, changed.arguments);
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let units = vec![unit(root, "a", "-g")];
        let store = StateStore::load(&root.join("state"));
        let path = root.join("compile_commands.json");

        write(&path, &entries(root, &units, &store)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &value.as_array().unwrap()[0];
        for key in ["directory", "arguments", "file", "output"] {
            assert!(entry.get(key).is_some(), "missing {key}");
        }
        assert_eq!(read(&path).unwrap().len(), 1);
    }
}
