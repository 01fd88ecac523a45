//! Project configuration (`.cxxargs.toml` format).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ProjectError;
use crate::filter::GroupMatch;
use crate::paths::{Canonical, Lexical, PathNormalizer};

/// Name of the optional config file at the project root.
pub const CONFIG_FILE_NAME: &str = ".cxxargs.toml";

/// Root project configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Flags added to every entry.
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Which entries get indexed.
    #[serde(default)]
    pub index: IndexConfig,

    /// Fallback loader settings.
    #[serde(default)]
    pub listing: ListingConfig,

    /// Path normalization.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Global compiler settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Appended verbatim after cleanup, before the language/std defaults.
    #[serde(default)]
    pub extra_flags: Vec<String>,
}

/// Index filter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Globs that are always indexed.
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Globs that are skipped unless whitelisted.
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Log every entry the filter skips.
    #[serde(default)]
    pub log_skipped_paths: bool,
}

/// Settings for projects without a compile_commands.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Project-relative file holding one argument per line.
    #[serde(default = "default_flags_file")]
    pub flags_file: String,

    /// Extensions (without the dot) of files that get an entry.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Path normalization settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Resolve symlinks through the filesystem instead of purely textual
    /// normalization.
    #[serde(default)]
    pub resolve_symlinks: bool,
}

fn default_flags_file() -> String {
    "clang_args".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["cc".to_string(), "cpp".to_string(), "c".to_string()]
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            flags_file: default_flags_file(),
            extensions: default_extensions(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ProjectConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the loaders cannot use.
    pub fn validate(&self) -> crate::Result<()> {
        if self.listing.flags_file.trim().is_empty() {
            return Err(ProjectError::Validation(
                "listing.flags_file must not be empty".to_string(),
            ));
        }
        if let Some(ext) = self.listing.extensions.iter().find(|ext| ext.starts_with('.')) {
            return Err(ProjectError::Validation(format!(
                "listing.extensions entry {:?} must be written without the leading dot",
                ext
            )));
        }
        Ok(())
    }

    /// Load `<root>/.cxxargs.toml`, or defaults when the file is missing.
    pub fn discover(project_root: &Path) -> crate::Result<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Build the index filter from the whitelist/blacklist.
    pub fn index_filter(&self) -> crate::Result<GroupMatch> {
        GroupMatch::new(&self.index.whitelist, &self.index.blacklist)
    }

    /// The normalizer selected by `[paths]`.
    pub fn normalizer(&self) -> Box<dyn PathNormalizer> {
        if self.paths.resolve_symlinks {
            Box::new(Canonical)
        } else {
            Box::new(Lexical)
        }
    }

    /// Add extra compiler flags.
    pub fn with_extra_flags(mut self, flags: &[&str]) -> Self {
        self.compiler.extra_flags = flags.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the index blacklist.
    pub fn with_blacklist(mut self, patterns: &[&str]) -> Self {
        self.index.blacklist = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the index whitelist.
    pub fn with_whitelist(mut self, patterns: &[&str]) -> Self {
        self.index.whitelist = patterns.iter().map(|s| s.to_string()).collect();
        self
    }
}
