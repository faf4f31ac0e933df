//! Configuration constants
//!
//! - [`defaults`] - Default values and fixed file names

pub mod defaults;
