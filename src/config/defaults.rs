//! Default configuration values

/// Project manifest file name
pub const MANIFEST_FILE: &str = "pbuild.toml";

/// Compilation database file name, written to the project root
pub const COMPILATION_DATABASE: &str = "compile_commands.json";

/// Default source directory
pub const DEFAULT_SOURCE_DIR: &str = "src";

/// Default build directory
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Default linked artifact name
pub const DEFAULT_TARGET: &str = "main";

/// Default compiler
pub const DEFAULT_COMPILER: &str = "clang++";

/// Object files subdirectory inside a profile directory
pub const OBJECT_SUBDIR: &str = "obj";

/// State store subdirectory inside a profile directory
pub const STATE_SUBDIR: &str = "state";

/// Object file extension
pub const OBJECT_EXTENSION: &str = "o";

/// Dependency-rule file extension
pub const DEPFILE_EXTENSION: &str = "d";

/// Default compile command template
pub const DEFAULT_COMPILE_TEMPLATE: &[&str] = &[
    "{compiler}",
    "{flags}",
    "-I",
    "{source_dir}",
    "-c",
    "{source}",
    "-o",
    "{output}",
];

/// Default link command template
pub const DEFAULT_LINK_TEMPLATE: &[&str] = &[
    "{compiler}",
    "{flags}",
    "{objects}",
    "{library_dirs}",
    "{libraries}",
    "-o",
    "{output}",
];
