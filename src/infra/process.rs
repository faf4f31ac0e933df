//! External process execution
//!
//! Compiler and linker invocations run directly from their argument vector,
//! without a shell, with both output streams captured.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::ExecError;

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Both streams combined, stderr first, trimmed
    pub fn diagnostics(&self) -> String {
        let mut text = self.stderr.trim_end().to_string();
        let stdout = self.stdout.trim_end();
        if !stdout.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stdout);
        }
        text
    }
}

/// Run `args[0]` with the remaining arguments in `cwd` and wait for it
pub async fn run(args: &[String], cwd: &Path) -> Result<ProcessOutput, ExecError> {
    let (program, rest) = args.split_first().ok_or(ExecError::EmptyCommand)?;

    tracing::debug!("Running in {}: {}", cwd.display(), args.join(" "));

    let output = Command::new(program)
        .args(rest)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ExecError::Spawn {
            program: program.clone(),
            error: e.to_string(),
        })?;

    Ok(ProcessOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_captures_output_and_status() {
        let dir = TempDir::new().unwrap();
        let output = run(&args(&["sh", "-c", "echo out; echo err >&2; exit 3"]), dir.path())
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.diagnostics(), "err\nout");
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = TempDir::new().unwrap();
        let output = run(&args(&["sh", "-c", "pwd"]), dir.path()).await.unwrap();
        assert!(output.success());
        assert_eq!(
            std::path::PathBuf::from(output.stdout.trim()).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let result = run(&args(&["pbuild-no-such-program"]), dir.path()).await;
        assert!(matches!(result, Err(ExecError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_empty_command() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(run(&[], dir.path()).await, Err(ExecError::EmptyCommand)));
    }
}
