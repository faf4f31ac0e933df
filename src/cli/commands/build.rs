//! Build command implementation
//!
//! Implements `pbuild build` to compile stale units, link the target and
//! refresh the compilation database.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::cli::output::{
    create_build_bar, is_json, print_detail, print_error, print_info, print_json, print_success,
    print_warning,
};
use crate::core::compdb;
use crate::core::executor::{BuildReport, CompileOutcome, Executor, LinkOutcome};
use crate::core::plan::BuildPlan;
use crate::core::profile::Profile;
use crate::core::state::StateStore;
use crate::core::unit::Project;

/// Build options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Profile to build
    pub profile: Profile,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
    /// Treat every unit as stale
    pub force: bool,
}

/// Execute the build command
pub async fn execute(project_dir: &Path, options: BuildOptions) -> Result<()> {
    let project = Project::load(project_dir, options.profile)
        .with_context(|| format!("Failed to load project in {}", project_dir.display()))?;
    project.verify_compiler()?;

    tracing::info!(
        "Building {} ({}, {} unit(s))",
        project.manifest.project.name,
        project.profile,
        project.units.len()
    );

    let store = Arc::new(StateStore::load(&project.state_dir()));
    let plan = BuildPlan::for_project(&project, &store, options.force);

    let bar = create_build_bar(plan.compile_jobs.len() as u64);
    let progress_bar = bar.clone();
    let mut executor = Executor::new(
        &project.root,
        project.profile,
        store.clone(),
        project.extractor.clone(),
    )
    .with_progress(Arc::new(move |outcome: &CompileOutcome| {
        progress_bar.inc(1);
        if let Some(name) = outcome.source().file_name() {
            progress_bar.set_message(name.to_string_lossy().into_owned());
        }
    }));
    if let Some(jobs) = options.jobs {
        executor = executor.with_jobs(jobs);
    }

    let report = executor.execute(plan).await;
    bar.finish_and_clear();

    let entries = compdb::entries(&project.root, &project.units, &store);
    compdb::write(&project.compdb_path(), &entries)
        .with_context(|| "Failed to write compilation database")?;

    if is_json() {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if !report.success() {
        bail!("Build failed: {}", report.summary());
    }
    Ok(())
}

/// Human-readable report; failures go to stderr even with --quiet
fn print_report(report: &BuildReport) {
    for failure in &report.failed {
        let status = failure
            .exit_code
            .map_or_else(|| "did not run".to_string(), |code| format!("exit code {code}"));
        print_error(&format!(
            "{}: compile failed ({status})",
            failure.source.display()
        ));
        for line in failure.diagnostics.lines() {
            eprintln!("    {line}");
        }
    }

    if let LinkOutcome::Failed {
        exit_code,
        diagnostics,
    } = &report.link
    {
        let status = exit_code.map_or_else(|| "did not run".to_string(), |code| format!("exit code {code}"));
        print_error(&format!("{}: link failed ({status})", report.target.display()));
        for line in diagnostics.lines() {
            eprintln!("    {line}");
        }
    }

    if !report.not_started.is_empty() {
        print_warning(&format!(
            "{} unit(s) were not compiled after the first failure",
            report.not_started.len()
        ));
    }

    if report.success() {
        print_success(&report.summary());
        if matches!(report.link, LinkOutcome::Linked) {
            print_detail(&format!("Target: {}", report.target.display()));
        }
    } else {
        print_info(&report.summary());
    }
}
