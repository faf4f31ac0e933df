//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// POSIX `sh` stand-in for a C compiler
///
/// Compiling copies the source to the object and writes a `-MF` dependency
/// file listing every `#include "x"` relative to the source. Sources
/// containing `#error` fail. Linking concatenates the objects. Every
/// invocation is appended to the log.
const FAKE_COMPILER: &str = r#"#!/bin/sh
log='@LOG@'
mode=link
src=
out=
dep=
objs=
while [ $# -gt 0 ]; do
    case "$1" in
        -c) mode=compile; shift; src="$1" ;;
        -o) shift; out="$1" ;;
        -MF) shift; dep="$1" ;;
        -I) shift ;;
        -*) ;;
        *) objs="$objs
$1" ;;
    esac
    shift
done

if [ "$mode" = compile ]; then
    echo "compile $src" >> "$log"
    if grep -q '#error' "$src"; then
        echo "$src:1: error: #error directive" >&2
        exit 1
    fi
    cp "$src" "$out" || exit 1
    if [ -n "$dep" ]; then
        dir=$(dirname "$src")
        {
            printf '%s: %s' "$out" "$src"
            sed -n 's/^#include "\(.*\)".*/\1/p' "$src" | while IFS= read -r header; do
                printf ' \\\n  %s' "$dir/$header"
            done
            printf '\n'
        } > "$dep"
    fi
    exit 0
fi

echo "link $out" >> "$log"
: > "$out" || exit 1
printf '%s\n' "$objs" | while IFS= read -r obj; do
    [ -z "$obj" ] && continue
    cat "$obj" >> "$out" || exit 1
done || exit 1
"#;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project whose manifest drives the fake compiler
    pub fn with_fake_compiler() -> Self {
        let project = Self::new();
        let log = project.log_path();
        project.create_file(
            "tools/fakecc.sh",
            &FAKE_COMPILER.replace("@LOG@", &log.display().to_string()),
        );
        project.write_manifest(&["-g"], &["-O2"]);
        project
    }

    /// Rewrite pbuild.toml with the given per-profile flags
    pub fn write_manifest(&self, debug_flags: &[&str], release_flags: &[&str]) {
        let script = self.path().join("tools/fakecc.sh");
        let flags = |extra: &[&str]| {
            std::iter::once(script.display().to_string())
                .chain(extra.iter().map(ToString::to_string))
                .map(|f| format!("{f:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let manifest = format!(
            r#"[project]
name = "demo"
target = "app"

[paths]
pattern = "**/*.c"

[toolchain]
compiler = "sh"

[profiles.debug]
flags = [{}]

[profiles.release]
flags = [{}]
"#,
            flags(debug_flags),
            flags(release_flags)
        );
        self.create_file("pbuild.toml", &manifest);
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Canonical project root, as pbuild reports paths
    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().expect("Failed to canonicalize")
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Remove a file from the test project
    pub fn remove_file(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(name)).expect("Failed to remove file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run pbuild in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_pbuild"))
            .current_dir(self.path())
            .args(args)
            .output()
            .expect("Failed to execute pbuild")
    }

    /// Run pbuild with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_pbuild"))
            .current_dir(self.path())
            .args(args)
            .envs(env.iter().copied())
            .output()
            .expect("Failed to execute pbuild")
    }

    /// Run pbuild and assert it succeeded
    pub fn run_ok(&self, args: &[&str]) -> Output {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "pbuild {args:?} failed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("tools/invocations.log")
    }

    /// Logged compiler invocations since the last call, oldest first
    pub fn take_invocations(&self) -> Vec<String> {
        let log = self.log_path();
        let content = std::fs::read_to_string(&log).unwrap_or_default();
        let _ = std::fs::remove_file(&log);
        content.lines().map(ToString::to_string).collect()
    }

    /// File names of sources compiled since the last call, sorted
    pub fn take_compiled(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .take_invocations()
            .iter()
            .filter_map(|line| line.strip_prefix("compile "))
            .filter_map(|path| Path::new(path).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Whether the last run linked
    pub fn linked(invocations: &[String]) -> bool {
        invocations.iter().any(|line| line.starts_with("link "))
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Combined stdout and stderr of a run
pub fn combined_output(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// The two-file project: `a.c` includes `h.h`, `b.c` includes nothing
pub fn two_file_project() -> TestProject {
    let project = TestProject::with_fake_compiler();
    project.create_file("src/h.h", "#define ANSWER 42\n");
    project.create_file("src/a.c", "#include \"h.h\"\nint a = ANSWER;\n");
    project.create_file("src/b.c", "int b = 0;\n");
    project
}
