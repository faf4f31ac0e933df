//! Change detection
//!
//! Classifies each translation unit as stale or current by comparing the
//! filesystem against the unit's last build record. The decision is local to
//! the unit: a changed header only invalidates units whose own record lists
//! it.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::depfile::DependencyExtractor;
use crate::core::fingerprint::Fingerprint;
use crate::core::state::StateStore;
use crate::core::unit::TranslationUnit;
use crate::error::DepfileError;

/// Why a unit has to be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// Rebuild requested by the caller
    Forced,
    /// Never built under this profile
    NoRecord,
    /// Source file is gone
    SourceMissing,
    /// Source file could not be read
    SourceUnreadable(String),
    /// Source content differs from the record
    SourceChanged,
    /// Compile command differs from the record
    CommandChanged,
    /// A recorded header no longer exists
    HeaderMissing(PathBuf),
    /// A recorded header's content changed
    HeaderChanged(PathBuf),
    /// The dependency file lists a header the record does not know
    HeaderAdded(PathBuf),
    /// The dependency file is gone although a record exists
    DepfileMissing,
    /// The dependency file could not be parsed
    DepfileUnreadable(DepfileError),
    /// The object file is gone although the record is current
    ObjectMissing,
    /// The object file is not the one the record describes
    ObjectChanged,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forced => write!(f, "rebuild forced"),
            Self::NoRecord => write!(f, "not built yet"),
            Self::SourceMissing => write!(f, "source file missing"),
            Self::SourceUnreadable(e) => write!(f, "source unreadable: {e}"),
            Self::SourceChanged => write!(f, "source changed"),
            Self::CommandChanged => write!(f, "compile command changed"),
            Self::HeaderMissing(p) => write!(f, "header removed: {}", p.display()),
            Self::HeaderChanged(p) => write!(f, "header changed: {}", p.display()),
            Self::HeaderAdded(p) => write!(f, "new dependency: {}", p.display()),
            Self::DepfileMissing => write!(f, "dependency file missing"),
            Self::DepfileUnreadable(e) => write!(f, "{e}"),
            Self::ObjectMissing => write!(f, "object file missing"),
            Self::ObjectChanged => write!(f, "object file not from the recorded compile"),
        }
    }
}

/// Per-unit classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Record matches the filesystem; the unit may be skipped
    Current,
    /// The unit must be compiled
    Stale(StaleReason),
}

impl Staleness {
    /// Whether the unit needs compiling
    pub fn is_stale(&self) -> bool {
        matches!(self, Staleness::Stale(_))
    }
}

/// Result of classifying one unit
#[derive(Debug, Clone)]
pub struct Classification {
    /// Stale or current
    pub staleness: Staleness,
    /// Source fingerprint observed during classification
    pub source_fingerprint: Option<Fingerprint>,
}

/// Compares units against the state store
#[derive(Debug)]
pub struct ChangeDetector<'a> {
    store: &'a StateStore,
    extractor: &'a dyn DependencyExtractor,
    base: &'a Path,
    force: bool,
    header_cache: HashMap<PathBuf, Option<Fingerprint>>,
}

impl<'a> ChangeDetector<'a> {
    /// Create a detector; `base` is the directory compilers run in
    pub fn new(store: &'a StateStore, extractor: &'a dyn DependencyExtractor, base: &'a Path) -> Self {
        Self {
            store,
            extractor,
            base,
            force: false,
            header_cache: HashMap::new(),
        }
    }

    /// Treat every unit as stale
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Classify one unit
    pub fn classify(&mut self, unit: &TranslationUnit) -> Classification {
        let source_fingerprint = match Fingerprint::of_file(&unit.source) {
            Ok(Some(fp)) => fp,
            Ok(None) => return stale(StaleReason::SourceMissing, None),
            Err(e) => return stale(StaleReason::SourceUnreadable(e.to_string()), None),
        };
        let observed = Some(source_fingerprint.clone());

        if self.force {
            return stale(StaleReason::Forced, observed);
        }

        let Some(record) = self.store.current_record(&unit.key()) else {
            return stale(StaleReason::NoRecord, observed);
        };
        if record.source_fingerprint != source_fingerprint {
            return stale(StaleReason::SourceChanged, observed);
        }
        if record.arguments != unit.arguments {
            return stale(StaleReason::CommandChanged, observed);
        }
        // A killed or unrecorded compile may have rewritten the object
        match Fingerprint::of_file(&unit.object) {
            Ok(None) => return stale(StaleReason::ObjectMissing, observed),
            Ok(Some(object)) if object == record.object_fingerprint => {}
            Ok(Some(_)) | Err(_) => return stale(StaleReason::ObjectChanged, observed),
        }

        for (header, recorded) in &record.headers {
            match self.header_fingerprint(header) {
                None => return stale(StaleReason::HeaderMissing(header.clone()), observed),
                Some(current) if current != *recorded => {
                    return stale(StaleReason::HeaderChanged(header.clone()), observed)
                }
                Some(_) => {}
            }
        }

        match unit.read_dependencies(self.extractor, self.base) {
            Err(e) => return stale(StaleReason::DepfileUnreadable(e), observed),
            Ok(None) => return stale(StaleReason::DepfileMissing, observed),
            Ok(Some(current)) => {
                if let Some(added) = current.iter().find(|h| !record.headers.contains_key(*h)) {
                    return stale(StaleReason::HeaderAdded(added.clone()), observed);
                }
            }
        }

        Classification {
            staleness: Staleness::Current,
            source_fingerprint: observed,
        }
    }

    /// Classify every unit, in order
    pub fn classify_all(&mut self, units: &[TranslationUnit]) -> Vec<Classification> {
        units
            .iter()
            .map(|unit| {
                let classification = self.classify(unit);
                if let Staleness::Stale(reason) = &classification.staleness {
                    tracing::debug!("{}: stale ({reason})", unit.source.display());
                } else {
                    tracing::debug!("{}: current", unit.source.display());
                }
                classification
            })
            .collect()
    }

    /// Header fingerprint, computed once per invocation
    ///
    /// Unreadable headers count as missing.
    fn header_fingerprint(&mut self, header: &Path) -> Option<Fingerprint> {
        self.header_cache
            .entry(header.to_path_buf())
            .or_insert_with(|| Fingerprint::of_file(header).ok().flatten())
            .clone()
    }
}

fn stale(reason: StaleReason, source_fingerprint: Option<Fingerprint>) -> Classification {
    Classification {
        staleness: Staleness::Stale(reason),
        source_fingerprint,
    }
}
