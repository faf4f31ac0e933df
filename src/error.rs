//! Error types for pbuild
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Project configuration errors
///
/// These are always fatal and are reported before any compile job is
/// dispatched.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Manifest file missing
    #[error("Manifest not found at '{path}'. Run 'pbuild init' to create a project.")]
    ManifestNotFound { path: PathBuf },

    /// Manifest could not be parsed
    #[error("Failed to parse manifest '{path}': {error}")]
    ManifestParse { path: PathBuf, error: String },

    /// Environment variable substitution failed
    #[error("Failed to substitute environment variables: {0}")]
    Substitution(String),

    /// Compiler executable not found
    #[error("Compiler '{compiler}' not found in PATH")]
    CompilerNotFound { compiler: String },

    /// Explicitly listed source does not exist
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Source lies outside of the source directory
    #[error("Source file '{path}' is outside of the source directory '{source_dir}'")]
    SourceOutsideSourceDir { path: PathBuf, source_dir: PathBuf },

    /// No translation units to build
    #[error("No source files found in '{source_dir}'")]
    NoSources { source_dir: PathBuf },

    /// Two sources map to the same object file
    #[error("Sources '{first}' and '{second}' both compile to '{output}'")]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },

    /// Invalid glob pattern
    #[error("Invalid source pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    /// Template references an unknown placeholder
    #[error("Unknown placeholder '{{{placeholder}}}' in {template} template")]
    UnknownPlaceholder {
        template: &'static str,
        placeholder: String,
    },

    /// Template lacks a required placeholder
    #[error("The {template} template must reference '{{{placeholder}}}'")]
    MissingPlaceholder {
        template: &'static str,
        placeholder: &'static str,
    },

    /// Unknown profile name
    #[error("Unknown profile '{0}': expected 'debug' or 'release'")]
    UnknownProfile(String),

    /// Unknown compiler family
    #[error("Unknown compiler family '{0}': expected 'gcc' or 'clang'")]
    UnknownFamily(String),
}

/// Dependency-rule file errors
///
/// Recovered locally: the affected unit is treated as stale.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepfileError {
    /// The file exists but could not be read
    #[error("Failed to read dependency file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// A rule line has no target separator
    #[error("Malformed dependency file '{path}' at line {line}: missing ':' after target")]
    MissingSeparator { path: PathBuf, line: usize },

    /// The file ends in the middle of a continued line
    #[error("Malformed dependency file '{path}': dangling line continuation")]
    DanglingContinuation { path: PathBuf },

    /// No rule in the file
    #[error("Dependency file '{path}' contains no rule")]
    NoRule { path: PathBuf },
}

/// State store errors
///
/// Recovered by treating the affected records as absent.
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to read a record
    #[error("Failed to read build record '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Record content could not be decoded
    #[error("Corrupt build record '{path}': {error}")]
    Corrupt { path: PathBuf, error: String },

    /// Record written by an incompatible format
    #[error("Build record '{path}' has format {found}, expected {expected}")]
    UnsupportedFormat {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// Failed to persist a record
    #[error("Failed to write build record '{path}': {error}")]
    Write { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to move a temporary file into place
    #[error("Failed to rename '{from}' to '{to}': {error}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// External process errors
#[derive(Error, Debug)]
pub enum ExecError {
    /// Command has no program
    #[error("Cannot run an empty command")]
    EmptyCommand,

    /// Failed to start the process
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },
}

/// Project initialization errors
#[derive(Error, Debug)]
pub enum InitError {
    /// Target directory does not exist
    #[error("Directory '{path}' does not exist")]
    DirectoryNotFound { path: PathBuf },

    /// A manifest is already present
    #[error("'{path}' already exists. Use --force to overwrite it.")]
    ManifestExists { path: PathBuf },

    /// Filesystem failure while creating the project
    #[error("Failed to initialize '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Top-level pbuild error type
#[derive(Error, Debug)]
pub enum PbuildError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dependency file error
    #[error("Dependency file error: {0}")]
    Depfile(#[from] DepfileError),

    /// State store error
    #[error("State store error: {0}")]
    State(#[from] StateError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Process error
    #[error("Process error: {0}")]
    Exec(#[from] ExecError),

    /// Initialization error
    #[error("Init error: {0}")]
    Init(#[from] InitError),

    /// IO error
    #[error("IO error: {source}")]
    Io { source: std::io::Error },

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

impl From<std::io::Error> for PbuildError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
