//! Check command logic
//!
//! Validates the configuration and reports what a build would do, without
//! running the compiler.

use serde::Serialize;
use std::path::PathBuf;

use crate::core::plan::BuildPlan;
use crate::core::profile::Profile;
use crate::core::state::StateStore;
use crate::core::unit::Project;

/// Classification of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitCheck {
    /// Source file
    pub source: PathBuf,
    /// Whether a build would compile it
    pub stale: bool,
    /// Why it is stale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of the check operation
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Checked profile
    pub profile: Profile,
    /// Compiler from the manifest
    pub compiler: String,
    /// Whether the compiler was found on PATH
    pub compiler_found: bool,
    /// Every unit, in unit order
    pub units: Vec<UnitCheck>,
    /// Why the link step would run, if it would
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl CheckResult {
    /// Number of units a build would compile
    pub fn stale_count(&self) -> usize {
        self.units.iter().filter(|u| u.stale).count()
    }

    /// Check if all validations passed
    pub fn is_valid(&self) -> bool {
        self.compiler_found
    }
}

/// Classify every unit of a resolved project
pub fn check(project: &Project, store: &StateStore) -> CheckResult {
    let plan = BuildPlan::for_project(project, store, false);

    let mut units: Vec<UnitCheck> = plan
        .compile_jobs
        .iter()
        .map(|job| UnitCheck {
            source: job.unit.source.clone(),
            stale: true,
            reason: Some(job.reason.to_string()),
        })
        .chain(plan.current.iter().map(|unit| UnitCheck {
            source: unit.source.clone(),
            stale: false,
            reason: None,
        }))
        .collect();
    units.sort_by(|a, b| a.source.cmp(&b.source));

    CheckResult {
        profile: project.profile,
        compiler: project.manifest.toolchain.compiler.clone(),
        compiler_found: project.verify_compiler().is_ok(),
        units,
        link: plan.link.reason.map(|r| r.to_string()),
    }
}
