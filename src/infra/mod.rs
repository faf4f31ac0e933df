//! Infrastructure layer
//!
//! Handles I/O with side effects: atomic file replacement and external
//! processes.

pub mod filesystem;
pub mod process;
