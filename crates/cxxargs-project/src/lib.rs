//! Per-file compiler argument resolution for C/C++ tooling.
//!
//! This crate provides:
//! - compile_commands.json loading, with command tokenization and cleanup
//! - a directory-listing fallback driven by a `clang_args` flags file
//! - a project store that answers "which arguments parse this file?",
//!   inferring them from nearby entries for files the build never compiles
//!
//! # Example
//!
//! ```no_run
//! use cxxargs_project::{Project, ProjectConfig};
//! use std::path::Path;
//!
//! let root = Path::new("/work/chrome/src");
//! let config = ProjectConfig::discover(root).unwrap_or_default();
//! let project = Project::load(root, &config);
//!
//! let entry = project.find("/work/chrome/src/base/logging.h");
//! println!("{} (inferred: {})", entry.args.join(" "), entry.is_inferred);
//! ```
//!
//! ```toml
//! # .cxxargs.toml
//! [compiler]
//! extra_flags = ["-Wno-unknown-warning-option"]
//!
//! [index]
//! blacklist = ["**/third_party/**"]
//! ```

mod cleanup;
mod compile_commands;
mod config;
mod error;
mod filter;
mod infer;
mod listing;
mod paths;
mod project;
mod tokenize;

pub use cleanup::{ArgumentCleaner, IncludeDirectories, SourceLanguage};
pub use compile_commands::{load_entries as load_compile_commands, CompileCommand, CompileCommands};
pub use config::{
    CompilerConfig, IndexConfig, ListingConfig, PathsConfig, ProjectConfig, CONFIG_FILE_NAME,
};
pub use error::{ProjectError, Result};
pub use filter::{AcceptAll, GroupMatch, PathPredicate};
pub use infer::{best_match, guess_score};
pub use listing::{
    find_source_files, load_entries as load_directory_listing, read_flags_file,
};
pub use paths::{
    ensure_ends_in_slash, is_absolute_path, normalize_lexically, Canonical, Lexical,
    PathNormalizer, Verbatim,
};
pub use project::{Entry, LoadSource, Project, ProjectHandle, COMPILE_COMMANDS_FILE};
pub use tokenize::split_command;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_resolution() {
        let json = r#"[
            {
                "directory": "/build",
                "file": "src/main.cc",
                "command": "clang++ -Iinclude -c src/main.cc"
            }
        ]"#;

        let mut includes = IncludeDirectories::new();
        let cleaner = ArgumentCleaner::new(&Lexical);
        let entries = load_compile_commands(json, &cleaner, &Lexical, &mut includes)
            .expect("Failed to load compile commands");
        let project = Project::from_entries(entries);

        let entry = project.find("/build/src/main.cc");
        assert!(!entry.is_inferred);
        assert_eq!(entry.args[0], "-I/build/include");

        let header = project.find("/build/src/main.h");
        assert!(header.is_inferred);
        assert_eq!(header.args, entry.args);
    }
}
