//! Persisted build state
//!
//! One JSON file per translation unit under `<build>/<profile>/state/units/`,
//! plus `link.json` for the link step. Every file is replaced atomically
//! (temp file + rename), so a record is either the previous good one or the
//! new one, never a mixture.
//!
//! Loading fails closed: unreadable, corrupt or foreign-format files are
//! logged and treated as absent, which forces the affected units to rebuild.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::core::command::render_command;
use crate::core::fingerprint::Fingerprint;
use crate::core::unit::UnitKey;
use crate::error::StateError;
use crate::infra::filesystem;

/// Version of the on-disk record format
///
/// Bump when the record layout or the fingerprint function changes.
pub const STATE_FORMAT: u32 = 2;

const UNITS_SUBDIR: &str = "units";
const LINK_RECORD: &str = "link.json";

/// Fingerprint of a translation unit's last successful compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Canonical source path
    pub source: PathBuf,
    /// Source content at the time of the compile
    pub source_fingerprint: Fingerprint,
    /// Every header the compiler reported, with its content fingerprint
    pub headers: BTreeMap<PathBuf, Fingerprint>,
    /// Exact compile command used
    pub arguments: Vec<String>,
    /// Object file the compile produced
    pub object_fingerprint: Fingerprint,
}

impl BuildRecord {
    /// Stored command as a single string
    pub fn command_line(&self) -> String {
        render_command(&self.arguments)
    }

    /// Header paths of the record
    pub fn header_set(&self) -> BTreeSet<PathBuf> {
        self.headers.keys().cloned().collect()
    }
}

/// Fingerprint of the last successful link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Exact link command used
    pub arguments: Vec<String>,
    /// Input objects with their content fingerprints
    pub objects: BTreeMap<PathBuf, Fingerprint>,
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    format: u32,
    record: T,
}

#[derive(Deserialize)]
struct FormatProbe {
    format: u32,
}

/// Per-profile store of build records
#[derive(Debug)]
pub struct StateStore {
    dir: PathBuf,
    records: Mutex<HashMap<UnitKey, BuildRecord>>,
    link: Mutex<Option<LinkRecord>>,
}

impl StateStore {
    /// Load every record under `dir`
    ///
    /// Never fails: problems are logged and the affected records dropped.
    pub fn load(dir: &Path) -> Self {
        let mut records = HashMap::new();
        let units_dir = dir.join(UNITS_SUBDIR);

        match std::fs::read_dir(&units_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    match read_envelope::<BuildRecord>(&path) {
                        Ok(record) => {
                            records.insert(UnitKey::for_source(&record.source), record);
                        }
                        Err(e) => tracing::warn!("Ignoring build record: {e}"),
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No build state at {}", units_dir.display());
            }
            Err(e) => tracing::warn!(
                "Cannot read build state at {}, rebuilding everything: {e}",
                units_dir.display()
            ),
        }

        let link_path = dir.join(LINK_RECORD);
        let link = if link_path.exists() {
            read_envelope::<LinkRecord>(&link_path)
                .map_err(|e| tracing::warn!("Ignoring link record: {e}"))
                .ok()
        } else {
            None
        };

        tracing::debug!("Loaded {} build records from {}", records.len(), dir.display());

        Self {
            dir: dir.to_path_buf(),
            records: Mutex::new(records),
            link: Mutex::new(link),
        }
    }

    /// Directory backing the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot of all unit records
    pub fn records(&self) -> HashMap<UnitKey, BuildRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current record of a unit
    pub fn current_record(&self, key: &UnitKey) -> Option<BuildRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Persist a unit record, replacing the previous one atomically
    pub fn save(&self, key: &UnitKey, record: BuildRecord) -> Result<(), StateError> {
        let path = self.unit_path(key);
        write_envelope(&path, &record)?;
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), record);
        Ok(())
    }

    /// Forget a unit's record
    ///
    /// Used when an object was rewritten but no record describes it.
    pub fn remove(&self, key: &UnitKey) -> Result<(), StateError> {
        let path = self.unit_path(key);
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        remove_record_file(&path)
    }

    /// Drop the records of every unit not in `live`
    ///
    /// Returns the number of records removed.
    pub fn retain(&self, live: &HashSet<UnitKey>) -> Result<usize, StateError> {
        let stale: Vec<UnitKey> = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|key| !live.contains(*key))
            .cloned()
            .collect();
        for key in &stale {
            self.remove(key)?;
        }
        if !stale.is_empty() {
            tracing::debug!("Pruned {} build record(s) of removed sources", stale.len());
        }
        Ok(stale.len())
    }

    /// Record of the last successful link
    pub fn link_record(&self) -> Option<LinkRecord> {
        self.link
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persist the link record atomically
    pub fn save_link(&self, record: LinkRecord) -> Result<(), StateError> {
        write_envelope(&self.dir.join(LINK_RECORD), &record)?;
        *self.link.lock().unwrap_or_else(PoisonError::into_inner) = Some(record);
        Ok(())
    }

    fn unit_path(&self, key: &UnitKey) -> PathBuf {
        self.dir
            .join(UNITS_SUBDIR)
            .join(format!("{}.json", key.as_str()))
    }
}

fn read_envelope<T: DeserializeOwned>(path: &Path) -> Result<T, StateError> {
    let content = std::fs::read_to_string(path).map_err(|e| StateError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    let corrupt = |e: serde_json::Error| StateError::Corrupt {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let probe: FormatProbe = serde_json::from_str(&content).map_err(corrupt)?;
    if probe.format != STATE_FORMAT {
        return Err(StateError::UnsupportedFormat {
            path: path.to_path_buf(),
            found: probe.format,
            expected: STATE_FORMAT,
        });
    }
    let envelope: Envelope<T> = serde_json::from_str(&content).map_err(corrupt)?;
    Ok(envelope.record)
}

fn remove_record_file(path: &Path) -> Result<(), StateError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StateError::Write {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
    }
}

fn write_envelope<T: Serialize>(path: &Path, record: &T) -> Result<(), StateError> {
    let envelope = Envelope {
        format: STATE_FORMAT,
        record,
    };
    let data = serde_json::to_vec_pretty(&envelope).map_err(|e| StateError::Write {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    filesystem::atomic_write(path, &data).map_err(|e| StateError::Write {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
