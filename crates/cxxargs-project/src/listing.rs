//! Fallback for projects without a compile_commands.json: every source file
//! under the root gets the same argument list, read from a flags file.

use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::cleanup::{ArgumentCleaner, IncludeDirectories};
use crate::config::ListingConfig;
use crate::paths::{path_to_string, PathNormalizer};
use crate::project::Entry;

/// Reads one argument per line, skipping blank lines and `#` comments.
/// An unreadable file yields no arguments.
pub fn read_flags_file(path: &Path) -> Vec<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            debug!("No flags file at {}: {}", path.display(), err);
            return Vec::new();
        }
    };

    content
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Recursively lists files under `root` whose name ends in one of
/// `extensions`, in a stable (file name sorted) order.
pub fn find_source_files(root: &Path, extensions: &[String]) -> Vec<String> {
    let suffixes: Vec<String> = extensions.iter().map(|ext| format!(".{}", ext)).collect();

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("Skipping unreadable path: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| path_to_string(entry.path()))
        .filter(|path| suffixes.iter().any(|suffix| path.ends_with(suffix.as_str())))
        .collect()
}

/// Builds an entry for every source file under `project_directory`
/// (slash-terminated). Never fails; a missing tree gives no entries.
pub fn load_entries(
    project_directory: &str,
    settings: &ListingConfig,
    cleaner: &ArgumentCleaner<'_>,
    normalizer: &dyn PathNormalizer,
    includes: &mut IncludeDirectories,
) -> Vec<Entry> {
    let flags_path = format!("{}{}", project_directory, settings.flags_file);
    let template = read_flags_file(Path::new(&flags_path));
    info!("Using arguments {}", template.join(" "));

    find_source_files(Path::new(project_directory), &settings.extensions)
        .into_iter()
        .map(|file| {
            let filename = normalizer.normalize(&file);
            let args = cleaner.clean(project_directory, &filename, template.clone(), includes);
            Entry::new(filename, args)
        })
        .collect()
}
