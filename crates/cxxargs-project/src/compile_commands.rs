//! compile_commands.json parsing.
//!
//! CMake, GN and friends can generate a compile_commands.json file that
//! contains the exact compilation command for each source file. Every
//! command is tokenized and cleaned into an [`Entry`].

use serde::{Deserialize, Serialize};

use crate::cleanup::{ArgumentCleaner, IncludeDirectories};
use crate::error::{ProjectError, Result};
use crate::paths::{ensure_ends_in_slash, is_absolute_path, PathNormalizer};
use crate::project::Entry;
use crate::tokenize::split_command;

/// A single compile command from compile_commands.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileCommand {
    /// The working directory for compilation.
    pub directory: String,

    /// The source file path, absolute or relative to `directory`.
    pub file: String,

    /// The full compilation command (space-separated).
    #[serde(default)]
    pub command: Option<String>,

    /// The compilation arguments (array form).
    #[serde(default)]
    pub arguments: Option<Vec<String>>,

    /// Output file (optional).
    #[serde(default)]
    pub output: Option<String>,
}

impl CompileCommand {
    /// Get the raw, uncleaned compilation arguments.
    ///
    /// `arguments` is already tokenized and wins over `command`.
    pub fn raw_args(&self) -> Result<Vec<String>> {
        if let Some(args) = &self.arguments {
            Ok(args.clone())
        } else if let Some(cmd) = &self.command {
            Ok(split_command(cmd))
        } else {
            Err(ProjectError::MissingCommand {
                file: self.file.clone(),
            })
        }
    }

    /// The working directory, terminated with `/`.
    pub fn build_directory(&self) -> String {
        let mut directory = self.directory.clone();
        ensure_ends_in_slash(&mut directory);
        directory
    }

    /// Resolve `file` to an absolute, normalized path.
    pub fn absolute_file(&self, normalizer: &dyn PathNormalizer) -> String {
        if is_absolute_path(&self.file) {
            normalizer.normalize(&self.file)
        } else {
            normalizer.normalize(&format!("{}{}", self.build_directory(), self.file))
        }
    }

    /// Tokenize and clean this command into an entry.
    pub fn to_entry(
        &self,
        cleaner: &ArgumentCleaner<'_>,
        normalizer: &dyn PathNormalizer,
        includes: &mut IncludeDirectories,
    ) -> Result<Entry> {
        let raw = self.raw_args()?;
        let args = cleaner.clean(&self.build_directory(), &self.file, raw, includes);
        Ok(Entry::new(self.absolute_file(normalizer), args))
    }
}

/// Collection of compile commands (from compile_commands.json).
#[derive(Debug, Clone)]
pub struct CompileCommands {
    commands: Vec<CompileCommand>,
}

impl CompileCommands {
    /// Load compile commands from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse compile commands from a JSON string.
    pub fn from_str(json: &str) -> Result<Self> {
        let commands: Vec<CompileCommand> = serde_json::from_str(json)?;
        Ok(Self { commands })
    }

    /// Get all compile commands.
    pub fn commands(&self) -> &[CompileCommand] {
        &self.commands
    }

    /// Convert every command into an entry, in document order.
    ///
    /// Fails as a whole if any command is unusable; callers fall back to a
    /// directory listing in that case. Duplicate files produce duplicate
    /// entries.
    pub fn into_entries(
        &self,
        cleaner: &ArgumentCleaner<'_>,
        normalizer: &dyn PathNormalizer,
        includes: &mut IncludeDirectories,
    ) -> Result<Vec<Entry>> {
        self.commands
            .iter()
            .map(|cmd| cmd.to_entry(cleaner, normalizer, includes))
            .collect()
    }
}

/// Parse a database and convert it into entries in one step.
///
/// Include directories are merged into `includes` only when the whole
/// database loads, so a failed attempt leaves no partial state behind.
pub fn load_entries(
    json: &str,
    cleaner: &ArgumentCleaner<'_>,
    normalizer: &dyn PathNormalizer,
    includes: &mut IncludeDirectories,
) -> Result<Vec<Entry>> {
    let commands = CompileCommands::from_str(json)?;
    let mut found = IncludeDirectories::new();
    let entries = commands.into_entries(cleaner, normalizer, &mut found)?;
    includes.merge(found);
    Ok(entries)
}
