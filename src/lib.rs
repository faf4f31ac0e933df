//! pbuild - Incremental C/C++ build orchestrator
//!
//! Compiles only the translation units whose source, headers or compile
//! command changed since their last successful build, runs the compiles in
//! parallel, links the result and keeps `compile_commands.json` current.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Change detection, planning and execution
//! - [`infra`] - Infrastructure layer (filesystem, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
