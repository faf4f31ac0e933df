//! Parallel execution of a build plan
//!
//! Compile jobs run on a bounded pool: each job holds a semaphore permit for
//! the lifetime of its compiler process. Once a job fails no further jobs are
//! dispatched, but jobs already running are allowed to finish. The link job
//! runs only after every dispatched compile has succeeded.
//!
//! A unit's build record is written only after its compile succeeded, so an
//! interrupted or failed compile leaves the previous record in place. The
//! record pins the object it describes: an object rewritten by a compile that
//! never got recorded no longer matches, and the unit is compiled again.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;

use crate::core::depfile::DependencyExtractor;
use crate::core::fingerprint::Fingerprint;
use crate::core::plan::{BuildPlan, CompileJob, LinkJob};
use crate::core::profile::Profile;
use crate::core::state::{BuildRecord, LinkRecord, StateStore};
use crate::core::unit::UnitKey;
use crate::infra::{filesystem, process};

/// Progress callback, invoked once per finished compile job
pub type ProgressCallback = Arc<dyn Fn(&CompileOutcome) + Send + Sync>;

/// A compile job that did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    /// Source file of the failed unit
    pub source: PathBuf,
    /// Compiler exit code; `None` if it never ran or was killed
    pub exit_code: Option<i32>,
    /// Captured compiler output
    pub diagnostics: String,
}

/// Result of one compile job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Object written and record updated
    Compiled(PathBuf),
    /// Compile failed; no record written
    Failed(UnitFailure),
}

impl CompileOutcome {
    /// Source file of the job
    pub fn source(&self) -> &Path {
        match self {
            CompileOutcome::Compiled(source) => source,
            CompileOutcome::Failed(failure) => &failure.source,
        }
    }
}

/// What happened to the link step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkOutcome {
    /// Target linked
    Linked,
    /// Target already current
    UpToDate,
    /// Not attempted because a compile failed
    Blocked,
    /// Linker failed
    Failed {
        /// Linker exit code
        exit_code: Option<i32>,
        /// Captured linker output
        diagnostics: String,
    },
}

/// Outcome of executing a plan
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Profile that was built
    pub profile: Profile,
    /// Units compiled successfully
    pub compiled: Vec<PathBuf>,
    /// Units that were current
    pub skipped: Vec<PathBuf>,
    /// Stale units not dispatched after an earlier failure
    pub not_started: Vec<PathBuf>,
    /// Units whose compile failed
    pub failed: Vec<UnitFailure>,
    /// Link step result
    pub link: LinkOutcome,
    /// Linked artifact
    pub target: PathBuf,
}

impl BuildReport {
    /// Whether every compile and the link succeeded
    pub fn success(&self) -> bool {
        self.failed.is_empty()
            && self.not_started.is_empty()
            && matches!(self.link, LinkOutcome::Linked | LinkOutcome::UpToDate)
    }

    /// One-line summary with explicit counts
    pub fn summary(&self) -> String {
        let link = match &self.link {
            LinkOutcome::Linked => "linked",
            LinkOutcome::UpToDate => "link up to date",
            LinkOutcome::Blocked => "link skipped",
            LinkOutcome::Failed { .. } => "link failed",
        };
        let mut line = format!(
            "compiled {}, skipped {}, failed {}",
            self.compiled.len(),
            self.skipped.len(),
            self.failed.len()
        );
        if !self.not_started.is_empty() {
            line.push_str(&format!(", not started {}", self.not_started.len()));
        }
        line.push_str(&format!("; {link}"));
        line
    }
}

/// Shared state of the compile tasks
#[derive(Debug)]
struct JobContext {
    root: PathBuf,
    store: Arc<StateStore>,
    extractor: Arc<dyn DependencyExtractor>,
}

/// Raises the shared failure flag unless the job completed
///
/// Dropped on panic or cancellation too, so a dying task still stops
/// further dispatch.
struct FailureGuard {
    failed: Arc<AtomicBool>,
    completed: bool,
}

impl Drop for FailureGuard {
    fn drop(&mut self) {
        if !self.completed {
            self.failed.store(true, Ordering::SeqCst);
        }
    }
}

/// Runs build plans against a state store
pub struct Executor {
    context: Arc<JobContext>,
    profile: Profile,
    jobs: usize,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("context", &self.context)
            .field("profile", &self.profile)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Create an executor running commands in `root`
    ///
    /// Defaults to one job per available CPU.
    pub fn new(
        root: &Path,
        profile: Profile,
        store: Arc<StateStore>,
        extractor: Arc<dyn DependencyExtractor>,
    ) -> Self {
        Self {
            context: Arc::new(JobContext {
                root: root.to_path_buf(),
                store,
                extractor,
            }),
            profile,
            jobs: num_cpus::get(),
            progress: None,
        }
    }

    /// Set the number of parallel compile jobs (at least one)
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set a progress callback
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Number of parallel compile jobs
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Execute a plan to completion
    pub async fn execute(&self, plan: BuildPlan) -> BuildReport {
        let BuildPlan {
            compile_jobs,
            current,
            link: link_job,
        } = plan;

        tracing::info!(
            "Compiling {} unit(s) with {} job(s)",
            compile_jobs.len(),
            self.jobs
        );

        let live: HashSet<UnitKey> = compile_jobs
            .iter()
            .map(|job| &job.unit)
            .chain(&current)
            .map(|unit| unit.key())
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let failed = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(compile_jobs.len());
        let mut not_started = Vec::new();

        for job in compile_jobs {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                not_started.push(job.unit.source);
                continue;
            };
            if failed.load(Ordering::SeqCst) {
                not_started.push(job.unit.source);
                continue;
            }

            tracing::info!("Compiling {} ({})", job.unit.source.display(), job.reason);
            let source = job.unit.source.clone();
            let context = self.context.clone();
            let failed = failed.clone();
            let progress = self.progress.clone();

            let handle = tokio::spawn(async move {
                let permit = permit;
                // Declared after the permit, so it drops first even on unwind
                let mut guard = FailureGuard {
                    failed,
                    completed: false,
                };
                let outcome = compile(job, context).await;
                if let Some(progress) = progress {
                    progress(&outcome);
                }
                guard.completed = matches!(outcome, CompileOutcome::Compiled(_));
                // Flag is set before the permit frees a slot
                drop(guard);
                drop(permit);
                outcome
            });
            handles.push((source, handle));
        }

        let mut compiled = Vec::new();
        let mut failures = Vec::new();
        for (source, handle) in handles {
            match handle.await {
                Ok(CompileOutcome::Compiled(source)) => compiled.push(source),
                Ok(CompileOutcome::Failed(failure)) => failures.push(failure),
                Err(e) => failures.push(UnitFailure {
                    source,
                    exit_code: None,
                    diagnostics: format!("compile task aborted: {e}"),
                }),
            }
        }

        if !not_started.is_empty() {
            tracing::warn!(
                "{} unit(s) not compiled after an earlier failure",
                not_started.len()
            );
        }

        let link = if !failures.is_empty() || !not_started.is_empty() {
            LinkOutcome::Blocked
        } else {
            self.link(&link_job).await
        };

        let report = BuildReport {
            profile: self.profile,
            compiled,
            skipped: current.into_iter().map(|u| u.source).collect(),
            not_started,
            failed: failures,
            link,
            target: link_job.spec.output,
        };

        if report.success() {
            if let Err(e) = self.context.store.retain(&live) {
                tracing::warn!("Could not prune build records of removed sources: {e}");
            }
        }
        report
    }

    async fn link(&self, job: &LinkJob) -> LinkOutcome {
        let Some(reason) = &job.reason else {
            tracing::info!("{} is up to date", job.spec.output.display());
            return LinkOutcome::UpToDate;
        };
        tracing::info!("Linking {} ({reason})", job.spec.output.display());

        if let Some(parent) = job.spec.output.parent() {
            if let Err(e) = filesystem::create_dir_all(parent) {
                return LinkOutcome::Failed {
                    exit_code: None,
                    diagnostics: e.to_string(),
                };
            }
        }

        let output = match process::run(&job.spec.arguments, &self.context.root).await {
            Ok(output) => output,
            Err(e) => {
                return LinkOutcome::Failed {
                    exit_code: None,
                    diagnostics: e.to_string(),
                }
            }
        };
        if !output.success() {
            return LinkOutcome::Failed {
                exit_code: output.exit_code,
                diagnostics: output.diagnostics(),
            };
        }
        echo_stdout(&output.stdout);

        let objects: BTreeMap<PathBuf, Fingerprint> = job
            .spec
            .objects
            .iter()
            .filter_map(|o| {
                Fingerprint::of_file(o)
                    .ok()
                    .flatten()
                    .map(|fp| (o.clone(), fp))
            })
            .collect();
        let record = LinkRecord {
            arguments: job.spec.arguments.clone(),
            objects,
        };
        if let Err(e) = self.context.store.save_link(record) {
            tracing::warn!("Linked, but could not save the link record: {e}");
        }
        LinkOutcome::Linked
    }
}

/// Compile one unit and record it on success
async fn compile(job: CompileJob, context: Arc<JobContext>) -> CompileOutcome {
    let source = job.unit.source.clone();
    let fail = |exit_code: Option<i32>, diagnostics: String| {
        CompileOutcome::Failed(UnitFailure {
            source: source.clone(),
            exit_code,
            diagnostics,
        })
    };

    for dir in [job.unit.object.parent(), job.unit.depfile.parent()]
        .into_iter()
        .flatten()
    {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            return fail(None, format!("cannot create {}: {e}", dir.display()));
        }
    }
    // A leftover file must not be mistaken for this compile's output
    if let Err(e) = tokio::fs::remove_file(&job.unit.depfile).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            return fail(None, format!("cannot remove {}: {e}", job.unit.depfile.display()));
        }
    }

    let output = match process::run(&job.unit.arguments, &context.root).await {
        Ok(output) => output,
        Err(e) => return fail(None, e.to_string()),
    };
    if !output.success() {
        tracing::debug!("{} failed with {:?}", source.display(), output.exit_code);
        return fail(output.exit_code, output.diagnostics());
    }
    echo_stdout(&output.stdout);

    let key = job.unit.key();
    let blocking = context.clone();
    let recorded = tokio::task::spawn_blocking(move || {
        let key = job.unit.key();
        record_for(&job, &blocking)
            .and_then(|record| blocking.store.save(&key, record).map_err(|e| e.to_string()))
    })
    .await
    .unwrap_or_else(|e| Err(format!("record task aborted: {e}")));

    if let Err(reason) = recorded {
        tracing::warn!(
            "{} compiled, but its build record could not be updated ({reason}); it will be rebuilt next time",
            source.display()
        );
        // The previous record describes an object that was just overwritten
        if let Err(e) = context.store.remove(&key) {
            tracing::warn!("Could not drop the build record of {}: {e}", source.display());
        }
    }

    CompileOutcome::Compiled(source)
}

/// Build record for a successfully compiled unit
///
/// The source fingerprint is the one observed before dispatch, so an edit
/// made while the compiler ran still counts as a change next time.
fn record_for(job: &CompileJob, context: &JobContext) -> Result<BuildRecord, String> {
    let unit = &job.unit;
    let headers = unit
        .read_dependencies(context.extractor.as_ref(), &context.root)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no dependency file at {}", unit.depfile.display()))?;

    let source_fingerprint = match &job.source_fingerprint {
        Some(fp) => fp.clone(),
        None => Fingerprint::of_file(&unit.source)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("{} disappeared", unit.source.display()))?,
    };

    let object_fingerprint = Fingerprint::of_file(&unit.object)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("compiler wrote no object at {}", unit.object.display()))?;

    let mut fingerprints = BTreeMap::new();
    for header in headers {
        match Fingerprint::of_file(&header) {
            Ok(Some(fp)) => {
                fingerprints.insert(header, fp);
            }
            // Left out; the dependency file still lists it, so the next
            // run sees it as added
            Ok(None) => tracing::debug!("{} vanished after compile", header.display()),
            Err(e) => return Err(format!("cannot read {}: {e}", header.display())),
        }
    }

    Ok(BuildRecord {
        source: unit.source.clone(),
        source_fingerprint,
        headers: fingerprints,
        arguments: unit.arguments.clone(),
        object_fingerprint,
    })
}

fn echo_stdout(stdout: &str) {
    let stdout = stdout.trim_end();
    if !stdout.is_empty() {
        tracing::info!("{stdout}");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::depfile::MakeRuleExtractor;
    use crate::core::detect::StaleReason;
    use crate::core::unit::Project;
    use crate::error::DepfileError;
    use crate::test_utils::fixtures::FakeProject;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    /// Passes the usual flags but never understands the dependency file
    #[derive(Debug)]
    struct UnparsableDepfiles;

    impl DependencyExtractor for UnparsableDepfiles {
        fn compile_flags(&self, depfile: &Path) -> Vec<String> {
            MakeRuleExtractor.compile_flags(depfile)
        }

        fn parse(
            &self,
            _content: &str,
            depfile: &Path,
            _target: &Path,
            _base: &Path,
        ) -> Result<BTreeSet<PathBuf>, DepfileError> {
            Err(DepfileError::NoRule {
                path: depfile.to_path_buf(),
            })
        }
    }

    async fn build(fake: &FakeProject, jobs: usize) -> (Project, BuildReport) {
        let project = fake.load(Profile::Debug);
        let store = Arc::new(StateStore::load(&project.state_dir()));
        let plan = BuildPlan::for_project(&project, &store, false);
        let executor = Executor::new(&project.root, project.profile, store, project.extractor.clone())
            .with_jobs(jobs);
        let report = executor.execute(plan).await;
        (project, report)
    }

    fn plan_for(fake: &FakeProject) -> (Project, Arc<StateStore>, BuildPlan) {
        let project = fake.load(Profile::Debug);
        let store = Arc::new(StateStore::load(&project.state_dir()));
        let plan = BuildPlan::for_project(&project, &store, false);
        (project, store, plan)
    }

    fn two_units() -> FakeProject {
        let fake = FakeProject::new();
        fake.write("src/h.h", "#define H 1\n");
        fake.write("src/a.c", "#include \"h.h\"\nint a;\n");
        fake.write("src/b.c", "int b;\n");
        fake
    }

    #[tokio::test]
    async fn test_first_build_compiles_and_links() {
        let fake = two_units();
        let (project, report) = build(&fake, 4).await;

        assert!(report.success(), "{report:?}");
        assert_eq!(report.compiled.len(), 2);
        assert_eq!(report.link, LinkOutcome::Linked);
        assert!(project.link.output.is_file());
        assert_eq!(fake.take_compiled(), vec!["a.c", "b.c"]);
    }

    #[tokio::test]
    async fn test_records_headers_from_fresh_depfile() {
        let fake = two_units();
        let (project, _) = build(&fake, 2).await;

        let store = StateStore::load(&project.state_dir());
        let a = &project.units[0];
        let record = store.current_record(&a.key()).unwrap();
        let header = project.root.join("src/h.h");
        assert!(record.headers.contains_key(&header));
        assert_eq!(record.arguments, a.arguments);
        assert!(store.link_record().is_some());
    }

    #[tokio::test]
    async fn test_second_build_is_noop() {
        let fake = two_units();
        build(&fake, 2).await;
        fake.take_invocations();

        let (_, report) = build(&fake, 2).await;
        assert!(report.success());
        assert!(report.compiled.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.link, LinkOutcome::UpToDate);
        assert!(fake.take_invocations().is_empty());
    }

    #[tokio::test]
    async fn test_header_change_rebuilds_only_includers() {
        let fake = two_units();
        build(&fake, 2).await;
        fake.take_invocations();

        fake.write("src/h.h", "#define H 2\n");
        let (_, report) = build(&fake, 2).await;

        assert!(report.success());
        assert_eq!(fake.take_compiled(), vec!["a.c"]);
        assert_eq!(report.link, LinkOutcome::Linked);
    }

    #[tokio::test]
    async fn test_failed_compile_keeps_previous_record_and_blocks_link() {
        let fake = two_units();
        let (project, _) = build(&fake, 2).await;
        let b = project.units[1].clone();
        let before = StateStore::load(&project.state_dir()).current_record(&b.key());

        fake.write("src/b.c", "#error broken\n");
        let (_, report) = build(&fake, 2).await;

        assert!(!report.success());
        assert_eq!(report.link, LinkOutcome::Blocked);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].source, b.source);
        assert_eq!(report.failed[0].exit_code, Some(1));
        assert!(report.failed[0].diagnostics.contains("#error directive"));

        let after = StateStore::load(&project.state_dir()).current_record(&b.key());
        assert_eq!(before, after);

        // Still stale on the next run
        fake.take_invocations();
        build(&fake, 2).await;
        assert_eq!(fake.take_compiled(), vec!["b.c"]);
    }

    #[tokio::test]
    async fn test_no_dispatch_after_failure() {
        let fake = FakeProject::new();
        fake.write("src/a.c", "#error first\n");
        fake.write("src/b.c", "int b;\n");
        fake.write("src/c.c", "int c;\n");

        let (_, report) = build(&fake, 1).await;

        assert_eq!(report.failed.len(), 1);
        assert!(report.compiled.is_empty());
        assert_eq!(report.not_started.len(), 2);
        assert_eq!(report.link, LinkOutcome::Blocked);
        assert_eq!(fake.take_compiled(), vec!["a.c"]);
    }

    #[tokio::test]
    async fn test_in_flight_jobs_finish_after_failure() {
        let fake = FakeProject::new();
        fake.write("src/a.c", "#sleep\nint a;\n");
        fake.write("src/b.c", "#error fast\n");

        let (project, report) = build(&fake, 2).await;

        assert_eq!(report.compiled, vec![project.units[0].source.clone()]);
        assert_eq!(report.failed.len(), 1);
        let store = StateStore::load(&project.state_dir());
        assert!(store.current_record(&project.units[0].key()).is_some());
        assert!(store.current_record(&project.units[1].key()).is_none());
    }

    #[tokio::test]
    async fn test_unrecorded_compile_is_not_trusted_after_revert() {
        let fake = FakeProject::new();
        fake.write("src/b.c", "int b = 1;\n");
        build(&fake, 1).await;

        // Compiles fine, but no record can be written for it
        fake.write("src/b.c", "int b = 2;\n");
        let (project, store, plan) = plan_for(&fake);
        let report = Executor::new(&project.root, project.profile, store, Arc::new(UnparsableDepfiles))
            .execute(plan)
            .await;
        assert_eq!(report.compiled, vec![project.units[0].source.clone()]);
        assert!(StateStore::load(&project.state_dir())
            .current_record(&project.units[0].key())
            .is_none());

        fake.write("src/b.c", "int b = 1;\n");
        fake.take_invocations();
        let (project, report) = build(&fake, 1).await;

        assert_eq!(report.compiled, vec![project.units[0].source.clone()]);
        assert_eq!(std::fs::read_to_string(&project.units[0].object).unwrap(), "int b = 1;\n");
    }

    #[tokio::test]
    async fn test_partial_object_is_recompiled() {
        let fake = two_units();
        let (project, _) = build(&fake, 2).await;
        let b = project.units[1].clone();

        // Compile killed after truncating the object, before any record update
        std::fs::remove_file(&b.object).unwrap();
        std::fs::write(&b.object, "in").unwrap();
        fake.take_invocations();

        let (_, _, plan) = plan_for(&fake);
        assert_eq!(plan.compile_jobs.len(), 1);
        assert_eq!(plan.compile_jobs[0].unit, b);
        assert_eq!(plan.compile_jobs[0].reason, StaleReason::ObjectChanged);

        build(&fake, 2).await;
        assert_eq!(fake.take_compiled(), vec!["b.c"]);
        assert_eq!(std::fs::read_to_string(&b.object).unwrap(), "int b;\n");
    }

    #[tokio::test]
    async fn test_panicking_job_stops_dispatch() {
        let fake = FakeProject::new();
        fake.write("src/a.c", "int a;\n");
        fake.write("src/b.c", "int b;\n");
        fake.write("src/c.c", "int c;\n");
        let (project, store, plan) = plan_for(&fake);

        let report = Executor::new(&project.root, project.profile, store, project.extractor.clone())
            .with_jobs(1)
            .with_progress(Arc::new(|_: &CompileOutcome| panic!("progress sink failed")))
            .execute(plan)
            .await;

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].diagnostics.contains("aborted"));
        assert_eq!(report.not_started.len(), 2);
        assert_eq!(report.link, LinkOutcome::Blocked);
        assert_eq!(fake.take_compiled(), vec!["a.c"]);
    }

    #[tokio::test]
    async fn test_records_of_removed_sources_are_pruned() {
        let fake = two_units();
        let (project, _) = build(&fake, 2).await;
        let b = project.units[1].clone();

        std::fs::remove_file(&b.source).unwrap();
        let (project, report) = build(&fake, 2).await;

        assert!(report.success(), "{report:?}");
        let store = StateStore::load(&project.state_dir());
        assert_eq!(store.records().len(), 1);
        assert!(store.current_record(&b.key()).is_none());
    }

    #[tokio::test]
    async fn test_link_failure_is_reported() {
        let fake = FakeProject::new();
        fake.write("src/a.c", "#link-error\n");

        let (project, report) = build(&fake, 1).await;

        assert_eq!(report.compiled.len(), 1);
        assert!(matches!(report.link, LinkOutcome::Failed { exit_code: Some(1), .. }));
        assert!(!report.success());
        let store = StateStore::load(&project.state_dir());
        assert!(store.link_record().is_none());
        assert!(store.current_record(&project.units[0].key()).is_some());
    }

    #[tokio::test]
    async fn test_progress_reports_every_job() {
        let fake = two_units();
        let project = fake.load(Profile::Debug);
        let store = Arc::new(StateStore::load(&project.state_dir()));
        let plan = BuildPlan::for_project(&project, &store, false);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let executor = Executor::new(&project.root, project.profile, store, project.extractor.clone())
            .with_progress(Arc::new(move |outcome: &CompileOutcome| {
                sink.lock().unwrap().push(outcome.source().to_path_buf());
            }));
        executor.execute(plan).await;

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![project.units[0].source.clone(), project.units[1].source.clone()]);
    }

    #[test]
    fn test_summary_counts() {
        let report = BuildReport {
            profile: Profile::Debug,
            compiled: vec![PathBuf::from("a.c")],
            skipped: vec![PathBuf::from("b.c"), PathBuf::from("c.c")],
            not_started: Vec::new(),
            failed: Vec::new(),
            link: LinkOutcome::Linked,
            target: PathBuf::from("main"),
        };
        assert_eq!(report.summary(), "compiled 1, skipped 2, failed 0; linked");
        assert!(report.success());
    }

    #[test]
    fn test_jobs_at_least_one() {
        let store = Arc::new(StateStore::load(Path::new("/nonexistent/state")));
        let extractor = crate::core::depfile::CompilerFamily::Gcc.extractor();
        let executor = Executor::new(Path::new("/"), Profile::Debug, store, extractor).with_jobs(0);
        assert_eq!(executor.jobs(), 1);
    }
}
