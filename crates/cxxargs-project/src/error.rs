//! Error types for cxxargs-project.

use thiserror::Error;

/// Result type for cxxargs-project operations.
pub type Result<T> = std::result::Result<T, ProjectError>;

/// Errors that can occur while loading a project.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Failed to read a file from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// Failed to parse JSON (compile_commands.json).
    #[error("Failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// A database entry has neither `command` nor `arguments`.
    #[error("Compile command for {file} has neither `command` nor `arguments`")]
    MissingCommand { file: String },

    /// Invalid glob in the index whitelist/blacklist.
    #[error("Invalid path pattern: {0}")]
    InvalidPattern(#[from] globset::Error),

    /// Configuration validation error.
    #[error("Config validation error: {0}")]
    Validation(String),
}
