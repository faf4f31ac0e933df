//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying progress bars,
//! status messages and errors to the user. Messages go to stdout unless
//! `--quiet` or `--json` is active; errors always go to stderr.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

static QUIET: AtomicBool = AtomicBool::new(false);
static JSON: AtomicBool = AtomicBool::new(false);
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Global output settings from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything but errors
    pub quiet: bool,
    /// Machine-readable output
    pub json: bool,
    /// `-v` count
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this configuration visible to the print helpers
    pub fn apply_global(&self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
        VERBOSITY.store(self.verbose, Ordering::Relaxed);
    }

    /// Log level implied by `-v` / `-vv`
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

/// Whether `--quiet` is active
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Whether `--json` is active
pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

/// Whether human-readable messages should be printed
fn show_messages() -> bool {
    !is_quiet() && !is_json()
}

/// Print a success message
pub fn print_success(message: &str) {
    if show_messages() {
        println!("{} {message}", status::SUCCESS);
    }
}

/// Print an informational message
pub fn print_info(message: &str) {
    if show_messages() {
        println!("{} {message}", status::INFO);
    }
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    if show_messages() {
        println!("  {message}");
    }
}

/// Print a warning
pub fn print_warning(message: &str) {
    if show_messages() {
        println!("{} {message}", status::WARNING);
    }
}

/// Print an error line; never suppressed
pub fn print_error(message: &str) {
    eprintln!("{} {message}", status::ERROR);
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a fatal error with its cause chain
pub fn display_error(error: &anyhow::Error) {
    print_error(&format!("Error: {error}"));
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Create a progress bar for compile jobs
///
/// Hidden when output is quiet, JSON, verbose, or not a terminal.
pub fn create_build_bar(total: u64) -> ProgressBar {
    if !show_messages() || VERBOSITY.load(Ordering::Relaxed) > 0 || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} units ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
