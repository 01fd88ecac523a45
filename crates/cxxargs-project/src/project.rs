//! The project store: every resolved entry plus inference for the files
//! that have none.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::cleanup::{ArgumentCleaner, IncludeDirectories};
use crate::compile_commands;
use crate::config::ProjectConfig;
use crate::filter::PathPredicate;
use crate::infer;
use crate::listing;
use crate::paths::{ensure_ends_in_slash, path_to_string, PathNormalizer};

/// File name of the compilation database at the project root.
pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";

/// One resolved compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Absolute, normalized path.
    pub filename: String,
    /// Cleaned compiler arguments.
    pub args: Vec<String>,
    /// Set when the arguments were borrowed from a nearby entry.
    pub is_inferred: bool,
}

impl Entry {
    pub fn new(filename: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            filename: filename.into(),
            args,
            is_inferred: false,
        }
    }

    pub fn inferred(filename: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            is_inferred: true,
            ..Self::new(filename, args)
        }
    }
}

/// Where the entries of a project came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadSource {
    /// Parsed from compile_commands.json.
    CompileCommands,
    /// Synthesized from a directory listing and the flags file.
    #[default]
    DirectoryListing,
}

/// Resolved configuration for a whole source tree.
///
/// Immutable once built; `find` only adds to a private inference cache.
#[derive(Debug, Default)]
pub struct Project {
    entries: Vec<Entry>,
    quote_include_directories: Vec<String>,
    angle_include_directories: Vec<String>,
    filename_index: FxHashMap<String, usize>,
    /// One slot per distinct file queried through `find` that has no entry.
    /// Never evicted: a project is rebuilt on reload, which drops it.
    inferred: RwLock<FxHashMap<String, Vec<String>>>,
    source: LoadSource,
}

impl Project {
    /// Loads `<root>/compile_commands.json`, falling back to a directory
    /// listing when it is missing or unusable.
    pub fn load(project_root: &Path, config: &ProjectConfig) -> Self {
        let normalizer = config.normalizer();
        Self::load_with(project_root, config, normalizer.as_ref())
    }

    /// [`Project::load`] with an explicit normalization strategy.
    pub fn load_with(
        project_root: &Path,
        config: &ProjectConfig,
        normalizer: &dyn PathNormalizer,
    ) -> Self {
        let mut project_directory = path_to_string(project_root);
        ensure_ends_in_slash(&mut project_directory);

        let cleaner =
            ArgumentCleaner::new(normalizer).with_extra_flags(&config.compiler.extra_flags);
        let mut includes = IncludeDirectories::new();

        let database_path = format!("{}{}", project_directory, COMPILE_COMMANDS_FILE);
        let from_database = match std::fs::read_to_string(&database_path) {
            Ok(content) => {
                match compile_commands::load_entries(&content, &cleaner, normalizer, &mut includes)
                {
                    Ok(entries) => Some(entries),
                    Err(err) => {
                        warn!(
                            "Unable to use {}: {}; using directory listing instead",
                            database_path, err
                        );
                        None
                    }
                }
            }
            Err(err) => {
                info!(
                    "Unable to load {}: {}; using directory listing instead",
                    database_path, err
                );
                None
            }
        };

        let (entries, source) = match from_database {
            Some(entries) => (entries, LoadSource::CompileCommands),
            None => {
                let entries = listing::load_entries(
                    &project_directory,
                    &config.listing,
                    &cleaner,
                    normalizer,
                    &mut includes,
                );
                (entries, LoadSource::DirectoryListing)
            }
        };

        info!(
            "Finished loading project (used compile_commands={}); got {} entries",
            source == LoadSource::CompileCommands,
            entries.len()
        );

        let (quote, angle) = includes.into_search_paths();
        for path in &quote {
            debug!("quote_include_dir: {}", path);
        }
        for path in &angle {
            debug!("angle_include_dir: {}", path);
        }

        Self {
            quote_include_directories: quote,
            angle_include_directories: angle,
            source,
            ..Self::from_entries(entries)
        }
    }

    /// Builds a project around already-resolved entries.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let mut filename_index = FxHashMap::default();
        for (index, entry) in entries.iter().enumerate() {
            if let Some(previous) = filename_index.insert(entry.filename.clone(), index) {
                debug!(
                    "Duplicate entry for {} (#{} replaces #{})",
                    entry.filename, index, previous
                );
            }
        }

        Self {
            entries,
            filename_index,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn quote_include_directories(&self) -> &[String] {
        &self.quote_include_directories
    }

    pub fn angle_include_directories(&self) -> &[String] {
        &self.angle_include_directories
    }

    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// Returns the entry for `filename`, or one inferred from the
    /// best-matching entry when the file has none.
    ///
    /// Inferred entries carry the queried filename and `is_inferred = true`;
    /// with no entries at all their argument list is empty.
    pub fn find(&self, filename: &str) -> Entry {
        if let Some(&index) = self.filename_index.get(filename) {
            return self.entries[index].clone();
        }

        if let Ok(cache) = self.inferred.read() {
            if let Some(args) = cache.get(filename) {
                return Entry::inferred(filename, args.clone());
            }
        }

        let args = infer::best_match(filename, self.entries.iter().map(|e| e.filename.as_str()))
            .map(|index| self.entries[index].args.clone())
            .unwrap_or_default();

        if let Ok(mut cache) = self.inferred.write() {
            cache.insert(filename.to_string(), args.clone());
        }

        Entry::inferred(filename, args)
    }

    /// Number of inferred lookups remembered so far.
    pub fn inferred_count(&self) -> usize {
        self.inferred.read().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Calls `action` with the index of every entry `predicate` accepts,
    /// in load order.
    pub fn for_each_filtered<P, F>(&self, predicate: &P, log_skipped: bool, mut action: F)
    where
        P: PathPredicate + ?Sized,
        F: FnMut(usize, &Entry),
    {
        let total = self.entries.len();
        for (index, entry) in self.entries.iter().enumerate() {
            match predicate.check(&entry.filename) {
                Ok(()) => action(index, entry),
                Err(reason) => {
                    if log_skipped {
                        info!(
                            "[{}/{}]: Failed {}; skipping {}",
                            index + 1,
                            total,
                            reason,
                            entry.filename
                        );
                    }
                }
            }
        }
    }
}

/// Shared access to the current project. Reloading builds a complete new
/// [`Project`] before swapping it in, so readers only ever see a whole one.
#[derive(Debug, Default)]
pub struct ProjectHandle {
    current: RwLock<Arc<Project>>,
}

impl ProjectHandle {
    pub fn new(project: Project) -> Self {
        Self {
            current: RwLock::new(Arc::new(project)),
        }
    }

    /// Snapshot of the current project.
    pub fn current(&self) -> Arc<Project> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the current project.
    pub fn replace(&self, project: Project) {
        let project = Arc::new(project);
        match self.current.write() {
            Ok(mut guard) => *guard = project,
            Err(poisoned) => *poisoned.into_inner() = project,
        }
    }

    /// Loads the project again and swaps it in.
    pub fn reload(&self, project_root: &Path, config: &ProjectConfig) {
        self.replace(Project::load(project_root, config));
    }
}
