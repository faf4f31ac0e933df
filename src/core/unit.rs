//! Translation units and the resolved project
//!
//! [`Project::resolve`] turns a manifest and a profile into the list of
//! translation units with their realized compile commands, plus the link
//! step. All paths are absolute so commands and records do not depend on the
//! caller's working directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::config::defaults;
use crate::core::command::{render_command, CommandTemplate, TemplateVars};
use crate::core::depfile::{CompilerFamily, DependencyExtractor};
use crate::core::manifest::Manifest;
use crate::core::profile::Profile;
use crate::error::{ConfigError, DepfileError};

/// Identity of a translation unit within a profile
///
/// Stable across invocations: derived from the canonical source path only,
/// since the profile is already encoded in the state directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey(String);

impl UnitKey {
    /// Key for a canonical source path
    pub fn for_source(source: &Path) -> Self {
        let digest = Sha256::digest(source.to_string_lossy().as_bytes());
        Self(hex::encode(&digest[..16]))
    }

    /// File-name-safe representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One source file compiled under one profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Canonical absolute source path
    pub source: PathBuf,
    /// Profile the unit is built for
    pub profile: Profile,
    /// Object file produced by the compile step
    pub object: PathBuf,
    /// Dependency-rule file written by the compiler
    pub depfile: PathBuf,
    /// Realized compile command
    pub arguments: Vec<String>,
}

impl TranslationUnit {
    /// State store identity
    pub fn key(&self) -> UnitKey {
        UnitKey::for_source(&self.source)
    }

    /// Compile command as a single string
    pub fn command_line(&self) -> String {
        render_command(&self.arguments)
    }

    /// Headers reported by the unit's current dependency file
    ///
    /// `Ok(None)` means the file does not exist. The source itself is
    /// tracked separately and is removed from the set.
    pub fn read_dependencies(
        &self,
        extractor: &dyn DependencyExtractor,
        base: &Path,
    ) -> Result<Option<BTreeSet<PathBuf>>, DepfileError> {
        let deps = extractor.extract(&self.depfile, &self.object, base)?;
        Ok(deps.map(|mut set| {
            set.remove(&self.source);
            set
        }))
    }
}

/// The link step of a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    /// Linked artifact
    pub output: PathBuf,
    /// Object files, one per translation unit, in unit order
    pub objects: Vec<PathBuf>,
    /// Realized link command
    pub arguments: Vec<String>,
}

impl LinkSpec {
    /// Link command as a single string
    pub fn command_line(&self) -> String {
        render_command(&self.arguments)
    }
}

/// A manifest resolved for one profile
#[derive(Debug)]
pub struct Project {
    /// Canonical project root; every command runs here
    pub root: PathBuf,
    /// Parsed manifest
    pub manifest: Manifest,
    /// Selected profile
    pub profile: Profile,
    /// Compiler family
    pub family: CompilerFamily,
    /// Dependency extractor for the family
    pub extractor: Arc<dyn DependencyExtractor>,
    /// Translation units, sorted by source path
    pub units: Vec<TranslationUnit>,
    /// Link step
    pub link: LinkSpec,
}

impl Project {
    /// Load `pbuild.toml` from `project_dir` and resolve it for `profile`
    pub fn load(project_dir: &Path, profile: Profile) -> Result<Self, ConfigError> {
        let manifest = Manifest::load(project_dir)?;
        Self::resolve(project_dir, manifest, profile)
    }

    /// Resolve a manifest for `profile`
    pub fn resolve(
        project_dir: &Path,
        manifest: Manifest,
        profile: Profile,
    ) -> Result<Self, ConfigError> {
        let root = project_dir
            .canonicalize()
            .map_err(|_| ConfigError::ManifestNotFound {
                path: Manifest::path_in(project_dir),
            })?;

        let family = match &manifest.toolchain.family {
            Some(name) => name.parse()?,
            None => CompilerFamily::detect(&manifest.toolchain.compiler),
        };
        let extractor = family.extractor();

        let source_dir = manifest.source_dir(&root);
        let sources = discover_sources(&manifest, &source_dir)?;
        let source_dir = source_dir
            .canonicalize()
            .map_err(|_| ConfigError::NoSources {
                source_dir: source_dir.clone(),
            })?;

        let settings = manifest.profile(profile);
        let compile_template = CommandTemplate::new("compile", settings.compile_template());
        compile_template.require(&["source", "output"])?;
        let writes_own_depfile = compile_template
            .tokens()
            .iter()
            .any(|t| t.contains("{depfile}"));

        let object_dir = manifest.object_dir(&root, profile);
        let mut units = Vec::with_capacity(sources.len());
        let mut outputs: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

        for source in sources {
            let relative = source.strip_prefix(&source_dir).map_err(|_| {
                ConfigError::SourceOutsideSourceDir {
                    path: source.clone(),
                    source_dir: source_dir.clone(),
                }
            })?;
            let object = object_dir
                .join(relative)
                .with_extension(defaults::OBJECT_EXTENSION);
            let depfile = object.with_extension(defaults::DEPFILE_EXTENSION);

            if let Some(first) = outputs.insert(object.clone(), source.clone()) {
                return Err(ConfigError::OutputCollision {
                    first,
                    second: source,
                    output: object,
                });
            }

            let vars = TemplateVars::new()
                .scalar("compiler", manifest.toolchain.compiler.clone())
                .list("flags", settings.flags.clone())
                .path("source_dir", &source_dir)
                .path("source", &source)
                .path("output", &object)
                .path("depfile", &depfile)
                .scalar("profile", profile.as_str());
            let mut arguments = compile_template.expand(&vars)?;
            if !writes_own_depfile {
                arguments.extend(extractor.compile_flags(&depfile));
            }

            units.push(TranslationUnit {
                source,
                profile,
                object,
                depfile,
                arguments,
            });
        }

        let link = resolve_link(&manifest, &root, profile, &units)?;

        Ok(Self {
            root,
            manifest,
            profile,
            family,
            extractor,
            units,
            link,
        })
    }

    /// Fail if the configured compiler cannot be found
    pub fn verify_compiler(&self) -> Result<(), ConfigError> {
        let compiler = &self.manifest.toolchain.compiler;
        which::which(compiler)
            .map(|_| ())
            .map_err(|_| ConfigError::CompilerNotFound {
                compiler: compiler.clone(),
            })
    }

    /// Directory holding this profile's build records
    pub fn state_dir(&self) -> PathBuf {
        self.manifest.state_dir(&self.root, self.profile)
    }

    /// Compilation database location
    pub fn compdb_path(&self) -> PathBuf {
        Manifest::compdb_path_in(&self.root)
    }
}

fn resolve_link(
    manifest: &Manifest,
    root: &Path,
    profile: Profile,
    units: &[TranslationUnit],
) -> Result<LinkSpec, ConfigError> {
    let settings = manifest.profile(profile);
    let template = CommandTemplate::new("link", settings.link_template());
    template.require(&["objects", "output"])?;

    let output = manifest.target_path(root, profile);
    let objects: Vec<PathBuf> = units.iter().map(|u| u.object.clone()).collect();

    let vars = TemplateVars::new()
        .scalar("compiler", manifest.toolchain.compiler.clone())
        .list("flags", settings.flags.clone())
        .list(
            "objects",
            objects.iter().map(|o| o.display().to_string()).collect(),
        )
        .list(
            "library_dirs",
            manifest
                .link
                .library_dirs
                .iter()
                .map(|d| format!("-L{}", root.join(d).display()))
                .collect(),
        )
        .list(
            "libraries",
            manifest
                .link
                .libraries
                .iter()
                .map(|l| format!("-l:{l}"))
                .collect(),
        )
        .path("source_dir", &manifest.source_dir(root))
        .path("output", &output)
        .scalar("profile", profile.as_str());

    Ok(LinkSpec {
        arguments: template.expand(&vars)?,
        output,
        objects,
    })
}

/// Collect explicit and pattern-matched sources, canonical and deduplicated
fn discover_sources(
    manifest: &Manifest,
    source_dir: &Path,
) -> Result<BTreeSet<PathBuf>, ConfigError> {
    let mut sources = BTreeSet::new();

    for source in &manifest.paths.sources {
        let path = source_dir.join(source);
        let canonical = path
            .canonicalize()
            .map_err(|_| ConfigError::SourceNotFound { path: path.clone() })?;
        if !canonical.is_file() {
            return Err(ConfigError::SourceNotFound { path });
        }
        sources.insert(canonical);
    }

    if let Some(pattern) = &manifest.paths.pattern {
        let full_pattern = source_dir.join(pattern);
        let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| {
            ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                error: e.to_string(),
            }
        })?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    if let Ok(canonical) = path.canonicalize() {
                        sources.insert(canonical);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping unreadable path while searching sources: {e}"),
            }
        }
    }

    if sources.is_empty() {
        return Err(ConfigError::NoSources {
            source_dir: source_dir.to_path_buf(),
        });
    }
    Ok(sources)
}
