//! Build profiles
//!
//! A profile selects the compiler flags and the output subdirectory. Debug
//! and release artifacts and build records never share a directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Build profile
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Unoptimized build with debug info
    Debug,
    /// Optimized build
    #[default]
    Release,
}

impl Profile {
    /// All known profiles
    pub const ALL: [Profile; 2] = [Profile::Debug, Profile::Release];

    /// Name used for the profile's build subdirectory and in the manifest
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Profile::Debug),
            "release" => Ok(Profile::Release),
            _ => Err(ConfigError::UnknownProfile(s.to_string())),
        }
    }
}
