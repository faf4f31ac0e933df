//! Manifest (pbuild.toml) parsing
//!
//! The manifest describes where the sources live, which compiler to run and
//! the per-profile flags and command templates.
//! Supports environment variable substitution using ${VAR} syntax.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::profile::Profile;
use crate::error::ConfigError;

/// The project manifest (pbuild.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Project configuration
    #[serde(default)]
    pub project: ProjectConfig,

    /// Source and build locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Compiler selection
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// Link inputs beyond the project's objects
    #[serde(default)]
    pub link: LinkConfig,

    /// Per-profile flags and templates
    #[serde(default)]
    pub profiles: ProfilesConfig,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,

    /// Name of the linked artifact
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_target() -> String {
    defaults::DEFAULT_TARGET.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            target: default_target(),
        }
    }
}

/// Source and build directory configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Directory containing the sources, relative to the project root
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Directory receiving all build outputs, relative to the project root
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Explicit sources, relative to `source_dir`
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Glob searched under `source_dir`
    #[serde(default)]
    pub pattern: Option<String>,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_SOURCE_DIR)
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_BUILD_DIR)
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            build_dir: default_build_dir(),
            sources: Vec::new(),
            pattern: None,
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolchainConfig {
    /// Compiler used for compiling and linking
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Compiler family (gcc or clang), detected from the compiler name when absent
    #[serde(default)]
    pub family: Option<String>,
}

fn default_compiler() -> String {
    defaults::DEFAULT_COMPILER.to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            family: None,
        }
    }
}

/// Extra link inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    /// Libraries, passed as `-l:<name>`
    #[serde(default)]
    pub libraries: Vec<String>,

    /// Library search directories, passed as `-L<dir>`
    #[serde(default)]
    pub library_dirs: Vec<PathBuf>,
}

/// The two profile sections
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfilesConfig {
    /// `[profiles.debug]`
    #[serde(default)]
    pub debug: ProfileConfig,

    /// `[profiles.release]`
    #[serde(default)]
    pub release: ProfileConfig,
}

/// Flags and optional template overrides for one profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileConfig {
    /// Flags shared by the compile and link commands
    #[serde(default)]
    pub flags: Vec<String>,

    /// Compile template override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<Vec<String>>,

    /// Link template override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Vec<String>>,
}

impl ProfileConfig {
    /// Compile template for this profile, falling back to the default
    pub fn compile_template(&self) -> Vec<String> {
        self.compile.clone().unwrap_or_else(|| {
            defaults::DEFAULT_COMPILE_TEMPLATE
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }

    /// Link template for this profile, falling back to the default
    pub fn link_template(&self) -> Vec<String> {
        self.link.clone().unwrap_or_else(|| {
            defaults::DEFAULT_LINK_TEMPLATE
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }
}

/// Substitute environment variables in a string using ${VAR} syntax.
///
/// Unset variables are replaced with an empty string.
///
/// # Examples
/// ```
/// use pbuild::core::manifest::substitute_env_vars;
///
/// std::env::set_var("PBUILD_DOC_VAR", "hello");
/// let result = substitute_env_vars("prefix_${PBUILD_DOC_VAR}_suffix").unwrap();
/// assert_eq!(result, "prefix_hello_suffix");
/// std::env::remove_var("PBUILD_DOC_VAR");
/// ```
pub fn substitute_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ConfigError::Substitution(format!("Invalid regex: {e}")))?;

    let mut last_end = 0;
    let mut output = String::new();

    for cap in re.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        output.push_str(&input[last_end..full_match.start()]);
        output.push_str(&std::env::var(&cap[1]).unwrap_or_default());
        last_end = full_match.end();
    }

    output.push_str(&input[last_end..]);
    Ok(output)
}

/// Recursively substitute environment variables in a TOML value
fn substitute_in_value(value: &mut toml::Value) -> Result<(), ConfigError> {
    match value {
        toml::Value::String(s) => {
            *s = substitute_env_vars(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_in_value(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_in_value(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

impl Manifest {
    /// Path of the manifest inside a project directory
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(defaults::MANIFEST_FILE)
    }

    /// Path of the compilation database inside a project directory
    pub fn compdb_path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(defaults::COMPILATION_DATABASE)
    }

    /// Load the manifest of a project, substituting environment variables
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(project_dir);
        if !path.is_file() {
            return Err(ConfigError::ManifestNotFound { path });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ManifestParse {
            path: path.clone(),
            error: e.to_string(),
        })?;
        Self::from_toml_with_env(&content).map_err(|e| match e {
            ConfigError::ManifestParse { error, .. } => ConfigError::ManifestParse { path, error },
            other => other,
        })
    }

    /// Parse TOML content, substituting ${VAR} in every string value first
    pub fn from_toml_with_env(content: &str) -> Result<Self, ConfigError> {
        let parse_error = |error: String| ConfigError::ManifestParse {
            path: PathBuf::from(defaults::MANIFEST_FILE),
            error,
        };
        let mut value: toml::Value = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        substitute_in_value(&mut value)?;
        value.try_into().map_err(|e: toml::de::Error| parse_error(e.to_string()))
    }

    /// Load manifest from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize manifest to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Settings for a profile
    pub fn profile(&self, profile: Profile) -> &ProfileConfig {
        match profile {
            Profile::Debug => &self.profiles.debug,
            Profile::Release => &self.profiles.release,
        }
    }

    /// Absolute source directory
    pub fn source_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.source_dir)
    }

    /// Absolute build directory
    pub fn build_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.build_dir)
    }

    /// Output directory of one profile
    pub fn profile_dir(&self, project_dir: &Path, profile: Profile) -> PathBuf {
        self.build_dir(project_dir).join(profile.as_str())
    }

    /// Object file directory of one profile
    pub fn object_dir(&self, project_dir: &Path, profile: Profile) -> PathBuf {
        self.profile_dir(project_dir, profile)
            .join(defaults::OBJECT_SUBDIR)
    }

    /// State store directory of one profile
    pub fn state_dir(&self, project_dir: &Path, profile: Profile) -> PathBuf {
        self.profile_dir(project_dir, profile)
            .join(defaults::STATE_SUBDIR)
    }

    /// Linked artifact path of one profile
    pub fn target_path(&self, project_dir: &Path, profile: Profile) -> PathBuf {
        self.profile_dir(project_dir, profile)
            .join(&self.project.target)
    }
}

/// Manifest written by `pbuild init`
pub fn template_manifest(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"
target = "{target}"

[paths]
source_dir = "{source_dir}"
build_dir = "{build_dir}"
sources = []
pattern = "**/*.cpp"

[toolchain]
compiler = "{compiler}"

[link]
libraries = []
library_dirs = []

[profiles.debug]
flags = ["-g", "-std=c++20"]

[profiles.release]
flags = ["-O2", "-std=c++20"]
"#,
        target = defaults::DEFAULT_TARGET,
        source_dir = defaults::DEFAULT_SOURCE_DIR,
        build_dir = defaults::DEFAULT_BUILD_DIR,
        compiler = defaults::DEFAULT_COMPILER,
    )
}
