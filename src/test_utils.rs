//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a literal command-line argument (no placeholders, no whitespace)
    pub fn arg_token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_./=+:-]{1,16}"
    }

    /// Generate an absolute header path, possibly containing inner spaces
    pub fn header_path() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just("inc"), Just("src"), Just("third party/include")],
            "[a-z][a-z0-9_ ]{0,10}[a-z0-9]",
            prop_oneof![Just("h"), Just("hpp")],
        )
            .prop_map(|(dir, name, ext)| format!("/p/{dir}/{name}.{ext}"))
    }

    /// Generate a source file name relative to the source directory
    pub fn source_name() -> impl Strategy<Value = String> {
        (
            "[a-z][a-z0-9_]{0,8}",
            prop_oneof![Just("c"), Just("cc"), Just("cpp")],
        )
            .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_arg_token_generator(token in arg_token()) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.contains('{') && !token.contains('}'), "token contains a brace: {}", token);
            prop_assert!(!token.chars().any(char::is_whitespace));
        }

        #[test]
        fn test_header_path_generator(path in header_path()) {
            prop_assert!(path.starts_with("/p/"));
            prop_assert!(path.ends_with(".h") || path.ends_with(".hpp"));
            prop_assert!(!path.contains(['$', '#', '\\']));
            prop_assert!(!path.contains(" .") && !path.contains("/ "));
        }

        #[test]
        fn test_source_name_generator(name in source_name()) {
            prop_assert!(name.contains('.'));
            prop_assert!(!name.contains('/'));
        }
    }
}

/// A POSIX `sh` stand-in for a C compiler, for tests that run real builds
///
/// Compiling copies the source to the object file and writes a `-MF`
/// dependency file listing every `#include "x"` relative to the source. A
/// source containing `#error` fails to compile, one containing `#sleep`
/// takes a second. Linking concatenates the objects. Every invocation is
/// appended to a log file.
#[cfg(all(test, unix))]
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use crate::core::manifest::Manifest;
    use crate::core::profile::Profile;
    use crate::core::unit::Project;

    const SCRIPT: &str = r#"#!/bin/sh
log='@LOG@'
mode=link
src=
out=
dep=
objs=
while [ $# -gt 0 ]; do
    case "$1" in
        -c) mode=compile; shift; src="$1" ;;
        -o) shift; out="$1" ;;
        -MF) shift; dep="$1" ;;
        -I) shift ;;
        -*) ;;
        *) objs="$objs
$1" ;;
    esac
    shift
done

if [ "$mode" = compile ]; then
    echo "compile $src" >> "$log"
    if grep -q '#sleep' "$src"; then
        sleep 1
    fi
    if grep -q '#error' "$src"; then
        echo "$src:1: error: #error directive" >&2
        exit 1
    fi
    cp "$src" "$out" || exit 1
    if [ -n "$dep" ]; then
        dir=$(dirname "$src")
        {
            printf '%s: %s' "$out" "$src"
            sed -n 's/^#include "\(.*\)".*/\1/p' "$src" | while IFS= read -r header; do
                printf ' \\\n  %s' "$dir/$header"
            done
            printf '\n'
        } > "$dep"
    fi
    exit 0
fi

echo "link $out" >> "$log"
: > "$out" || exit 1
printf '%s\n' "$objs" | while IFS= read -r obj; do
    [ -z "$obj" ] && continue
    cat "$obj" >> "$out" || exit 1
done || exit 1
if grep -q '#link-error' "$out"; then
    echo "undefined reference to 'missing'" >&2
    exit 1
fi
"#;

    /// A project tree wired to the fake compiler
    pub struct FakeProject {
        dir: TempDir,
        script: PathBuf,
        log: PathBuf,
    }

    impl FakeProject {
        /// Create an empty project with a manifest using the fake compiler
        pub fn new() -> Self {
            let dir = TempDir::new().expect("temp dir");
            let tools = dir.path().join("tools");
            std::fs::create_dir_all(&tools).expect("tools dir");
            let log = tools.join("invocations.log");
            let script = tools.join("fakecc.sh");
            std::fs::write(&script, SCRIPT.replace("@LOG@", &log.display().to_string()))
                .expect("write script");

            let project = Self { dir, script, log };
            project.write_manifest(&[]);
            project
        }

        /// Project root
        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        /// Rewrite the manifest; `extra_debug_flags` follow the script path
        pub fn write_manifest(&self, extra_debug_flags: &[&str]) {
            let mut debug_flags = vec![self.script.display().to_string(), "-g".to_string()];
            debug_flags.extend(extra_debug_flags.iter().map(ToString::to_string));
            let quoted = |flags: &[String]| {
                flags
                    .iter()
                    .map(|f| format!("{f:?}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let release_flags = vec![self.script.display().to_string(), "-O2".to_string()];
            let manifest = format!(
                "[project]\nname = \"demo\"\n\n[paths]\npattern = \"**/*.c\"\n\n\
                 [toolchain]\ncompiler = \"sh\"\n\n\
                 [profiles.debug]\nflags = [{}]\n\n\
                 [profiles.release]\nflags = [{}]\n",
                quoted(&debug_flags),
                quoted(&release_flags)
            );
            self.write("pbuild.toml", &manifest);
        }

        /// Write a file relative to the project root
        pub fn write(&self, relative: &str, content: &str) {
            let path = self.dir.path().join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("parent dir");
            }
            std::fs::write(path, content).expect("write file");
        }

        /// Load and resolve the project
        pub fn load(&self, profile: Profile) -> Project {
            let manifest = Manifest::load(self.root()).expect("manifest");
            Project::resolve(self.root(), manifest, profile).expect("project")
        }

        /// Logged invocations, oldest first, and clear the log
        pub fn take_invocations(&self) -> Vec<String> {
            let content = std::fs::read_to_string(&self.log).unwrap_or_default();
            let _ = std::fs::remove_file(&self.log);
            content.lines().map(ToString::to_string).collect()
        }

        /// File names of compiled sources in the log, sorted, and clear the log
        pub fn take_compiled(&self) -> Vec<String> {
            let mut names: Vec<String> = self
                .take_invocations()
                .iter()
                .filter_map(|line| line.strip_prefix("compile "))
                .filter_map(|path| Path::new(path).file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
    }
}
