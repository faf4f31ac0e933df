//! Build planning
//!
//! Turns per-unit classifications into the compile jobs of this invocation
//! and decides whether the link step has to run.

use std::fmt;
use std::path::PathBuf;

use crate::core::detect::{ChangeDetector, Classification, StaleReason, Staleness};
use crate::core::fingerprint::Fingerprint;
use crate::core::state::StateStore;
use crate::core::unit::{LinkSpec, Project, TranslationUnit};

/// A stale unit scheduled for compilation
#[derive(Debug, Clone)]
pub struct CompileJob {
    /// Unit to compile
    pub unit: TranslationUnit,
    /// Why it is being compiled
    pub reason: StaleReason,
    /// Source fingerprint observed before dispatch
    pub source_fingerprint: Option<Fingerprint>,
}

/// Why the link step runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkReason {
    /// At least one unit is compiled this invocation
    UnitsCompiled(usize),
    /// The linked artifact does not exist
    OutputMissing,
    /// No previous link is recorded
    NoRecord,
    /// The link command differs from the record
    CommandChanged,
    /// An input object differs from the one last linked
    ObjectChanged(PathBuf),
}

impl fmt::Display for LinkReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitsCompiled(n) => write!(f, "{n} unit(s) compiled"),
            Self::OutputMissing => write!(f, "target missing"),
            Self::NoRecord => write!(f, "not linked yet"),
            Self::CommandChanged => write!(f, "link command changed"),
            Self::ObjectChanged(p) => write!(f, "object changed: {}", p.display()),
        }
    }
}

/// The link step with its staleness decision
#[derive(Debug, Clone)]
pub struct LinkJob {
    /// Link command and inputs
    pub spec: LinkSpec,
    /// `None` when the target is up to date
    pub reason: Option<LinkReason>,
}

impl LinkJob {
    /// Whether the link step has to run
    pub fn is_needed(&self) -> bool {
        self.reason.is_some()
    }
}

/// Work for one invocation; rebuilt from scratch every time
#[derive(Debug, Clone)]
pub struct BuildPlan {
    /// Stale units, in unit order
    pub compile_jobs: Vec<CompileJob>,
    /// Units that are skipped
    pub current: Vec<TranslationUnit>,
    /// The single link job over every unit's object
    pub link: LinkJob,
}

impl BuildPlan {
    /// Classify the project's units and plan the invocation
    pub fn for_project(project: &Project, store: &StateStore, force: bool) -> Self {
        let mut detector =
            ChangeDetector::new(store, project.extractor.as_ref(), &project.root).with_force(force);
        let classifications = detector.classify_all(&project.units);
        Self::from_classifications(&project.units, classifications, project.link.clone(), store)
    }

    /// Plan from existing classifications
    ///
    /// A current unit whose object file is gone is planned as stale.
    pub fn from_classifications(
        units: &[TranslationUnit],
        classifications: Vec<Classification>,
        link: LinkSpec,
        store: &StateStore,
    ) -> Self {
        let mut compile_jobs = Vec::new();
        let mut current = Vec::new();

        for (unit, classification) in units.iter().zip(classifications) {
            let reason = match classification.staleness {
                Staleness::Stale(reason) => Some(reason),
                Staleness::Current if !unit.object.is_file() => {
                    tracing::debug!("{}: stale ({})", unit.source.display(), StaleReason::ObjectMissing);
                    Some(StaleReason::ObjectMissing)
                }
                Staleness::Current => None,
            };
            match reason {
                Some(reason) => compile_jobs.push(CompileJob {
                    unit: unit.clone(),
                    reason,
                    source_fingerprint: classification.source_fingerprint,
                }),
                None => current.push(unit.clone()),
            }
        }

        let reason = link_reason(&link, store, compile_jobs.len());
        if let Some(reason) = &reason {
            tracing::debug!("link: stale ({reason})");
        }

        tracing::info!(
            "Planned {} compile job(s), {} unit(s) current, link {}",
            compile_jobs.len(),
            current.len(),
            if reason.is_some() { "needed" } else { "up to date" }
        );

        Self {
            compile_jobs,
            current,
            link: LinkJob { spec: link, reason },
        }
    }

    /// Whether the invocation has nothing to do
    pub fn is_noop(&self) -> bool {
        self.compile_jobs.is_empty() && !self.link.is_needed()
    }
}

/// Decide whether the link step must run
///
/// Relinks whenever a unit is compiled. Otherwise compares the target, the
/// command and every input object against the last link record.
pub fn link_reason(link: &LinkSpec, store: &StateStore, units_compiled: usize) -> Option<LinkReason> {
    if units_compiled > 0 {
        return Some(LinkReason::UnitsCompiled(units_compiled));
    }
    if !link.output.is_file() {
        return Some(LinkReason::OutputMissing);
    }
    let Some(record) = store.link_record() else {
        return Some(LinkReason::NoRecord);
    };
    if record.arguments != link.arguments {
        return Some(LinkReason::CommandChanged);
    }
    for object in &link.objects {
        let current = Fingerprint::of_file(object).ok().flatten();
        if current.as_ref() != record.objects.get(object) {
            return Some(LinkReason::ObjectChanged(object.clone()));
        }
    }
    None
}
