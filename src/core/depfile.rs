//! Dependency-rule file extraction
//!
//! Compilers report the headers a translation unit read as a Makefile rule:
//!
//! ```text
//! build/debug/obj/a.o: src/a.c src/h.h \
//!   src/other\ dir/x.h
//! ```
//!
//! The [`DependencyExtractor`] trait hides the compiler-specific flags and
//! syntax behind one interface. GCC and Clang share the make-rule dialect
//! implemented by [`MakeRuleExtractor`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ConfigError, DepfileError};

/// Compiler family, selecting the dependency-file dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompilerFamily {
    /// GCC (`gcc`, `g++`, cross prefixes)
    Gcc,
    /// Clang (`clang`, `clang++`)
    Clang,
}

impl CompilerFamily {
    /// Guess the family from a compiler executable name
    ///
    /// Anything that is not recognizably Clang is treated as GCC-compatible.
    pub fn detect(compiler: &str) -> Self {
        let name = Path::new(compiler)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(compiler);
        if name.contains("clang") {
            CompilerFamily::Clang
        } else {
            CompilerFamily::Gcc
        }
    }

    /// Extractor implementing this family's dependency-file dialect
    pub fn extractor(self) -> Arc<dyn DependencyExtractor> {
        match self {
            CompilerFamily::Gcc | CompilerFamily::Clang => Arc::new(MakeRuleExtractor),
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerFamily::Gcc => write!(f, "gcc"),
            CompilerFamily::Clang => write!(f, "clang"),
        }
    }
}

impl FromStr for CompilerFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" | "g++" => Ok(CompilerFamily::Gcc),
            "clang" | "clang++" => Ok(CompilerFamily::Clang),
            _ => Err(ConfigError::UnknownFamily(s.to_string())),
        }
    }
}

/// Compiler-specific dependency extraction
pub trait DependencyExtractor: Send + Sync + fmt::Debug {
    /// Extra compile arguments that make the compiler write `depfile`
    fn compile_flags(&self, depfile: &Path) -> Vec<String>;

    /// Parse dependency-file content into the dependencies of `target`
    ///
    /// Relative dependency paths are resolved against `base`, the directory
    /// the compiler ran in. The target itself is never part of the result.
    fn parse(
        &self,
        content: &str,
        depfile: &Path,
        target: &Path,
        base: &Path,
    ) -> Result<BTreeSet<PathBuf>, DepfileError>;

    /// Read and parse a dependency file
    ///
    /// Returns `Ok(None)` when the file does not exist.
    fn extract(
        &self,
        depfile: &Path,
        target: &Path,
        base: &Path,
    ) -> Result<Option<BTreeSet<PathBuf>>, DepfileError> {
        let content = match std::fs::read_to_string(depfile) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DepfileError::Read {
                    path: depfile.to_path_buf(),
                    error: e.to_string(),
                })
            }
        };
        self.parse(&content, depfile, target, base).map(Some)
    }
}

/// Makefile-rule dialect written by `-MMD -MF <file>`
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRuleExtractor;

/// One parsed `targets: prerequisites` rule
#[derive(Debug, PartialEq, Eq)]
struct Rule {
    targets: Vec<String>,
    prerequisites: Vec<String>,
}

impl DependencyExtractor for MakeRuleExtractor {
    fn compile_flags(&self, depfile: &Path) -> Vec<String> {
        vec![
            "-MMD".to_string(),
            "-MF".to_string(),
            depfile.display().to_string(),
        ]
    }

    fn parse(
        &self,
        content: &str,
        depfile: &Path,
        target: &Path,
        base: &Path,
    ) -> Result<BTreeSet<PathBuf>, DepfileError> {
        let rules = parse_rules(content, depfile)?;
        if rules.is_empty() {
            return Err(DepfileError::NoRule {
                path: depfile.to_path_buf(),
            });
        }

        let resolve = |p: &str| {
            let path = Path::new(p);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };
        let target = resolve(&target.display().to_string());

        let matching: Vec<&Rule> = rules
            .iter()
            .filter(|rule| rule.targets.iter().any(|t| resolve(t) == target))
            .collect();
        // -MT overrides or odd toolchains can name the target differently;
        // the first rule is the one describing the object.
        let selected: Vec<&Rule> = if matching.is_empty() {
            rules.iter().take(1).collect()
        } else {
            matching
        };

        let mut dependencies = BTreeSet::new();
        for rule in selected {
            let targets: BTreeSet<PathBuf> = rule.targets.iter().map(|t| resolve(t)).collect();
            for prerequisite in &rule.prerequisites {
                let path = resolve(prerequisite);
                if !targets.contains(&path) && path != target {
                    dependencies.insert(path);
                }
            }
        }
        Ok(dependencies)
    }
}

/// Join continued lines and split them into rules
fn parse_rules(content: &str, depfile: &Path) -> Result<Vec<Rule>, DepfileError> {
    let mut logical: Vec<(usize, String)> = Vec::new();
    let mut current = String::new();
    let mut start_line = 0;
    let mut continued = false;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if !continued {
            start_line = index + 1;
        }
        if let Some(body) = line.strip_suffix('\\') {
            current.push_str(body);
            current.push(' ');
            continued = true;
        } else {
            current.push_str(line);
            logical.push((start_line, std::mem::take(&mut current)));
            continued = false;
        }
    }
    if continued {
        return Err(DepfileError::DanglingContinuation {
            path: depfile.to_path_buf(),
        });
    }

    let mut rules = Vec::new();
    for (line_no, line) in logical {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(colon) = find_separator(trimmed) else {
            return Err(DepfileError::MissingSeparator {
                path: depfile.to_path_buf(),
                line: line_no,
            });
        };
        let targets = split_words(&trimmed[..colon]);
        let prerequisites = split_words(&trimmed[colon + 1..]);
        if targets.is_empty() {
            return Err(DepfileError::MissingSeparator {
                path: depfile.to_path_buf(),
                line: line_no,
            });
        }
        rules.push(Rule {
            targets,
            prerequisites,
        });
    }
    Ok(rules)
}

/// Byte offset of the rule's `:` separator
///
/// A colon followed by a path character (a Windows drive letter such as
/// `C:\`) or preceded by a backslash is part of a path.
fn find_separator(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b':' {
            continue;
        }
        if i > 0 && bytes[i - 1] == b'\\' {
            continue;
        }
        match bytes.get(i + 1) {
            None | Some(b' ' | b'\t') => return Some(i),
            Some(b'\\' | b'/') if i == 1 => continue,
            Some(_) => return Some(i),
        }
    }
    None
}

/// Split on unescaped whitespace, undoing make escapes
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next @ (' ' | '#' | ':')) => {
                    word.push(next);
                    chars.next();
                }
                _ => word.push('\\'),
            },
            '$' if chars.peek() == Some(&'$') => {
                word.push('$');
                chars.next();
            }
            c if c.is_whitespace() => {
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
            }
            c => word.push(c),
        }
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}
