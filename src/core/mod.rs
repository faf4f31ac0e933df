//! Core build logic
//!
//! Everything that decides what to build lives here; process spawning and
//! file replacement go through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`manifest`] - Manifest (pbuild.toml) parsing and validation
//! - [`profile`] - Build profiles
//! - [`command`] - Compile and link command templates
//! - [`unit`] - Translation units and the resolved project
//! - [`depfile`] - Dependency-rule file extraction
//! - [`fingerprint`] - Content fingerprints
//! - [`state`] - Persisted build records
//! - [`detect`] - Per-unit change detection
//! - [`plan`] - Build planning and link staleness
//! - [`executor`] - Parallel compile and link
//! - [`compdb`] - Compilation database
//! - [`init`] - Project initialization logic
//! - [`clean`] - Clean build artifacts logic
//! - [`check`] - Dry-run classification

pub mod check;
pub mod clean;
pub mod command;
pub mod compdb;
pub mod depfile;
pub mod detect;
pub mod executor;
pub mod fingerprint;
pub mod init;
pub mod manifest;
pub mod plan;
pub mod profile;
pub mod state;
pub mod unit;
