//! Configuration system for ontomatch.
//!
//! Configuration is layered: built-in defaults, then an optional file
//! (TOML, YAML or JSON), then environment variables. Every loaded or built
//! configuration is validated before any matching runs.

mod builder;
mod loader;
mod models;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "ontomatch.toml",
    "ontomatch.yaml",
    "ontomatch.yml",
    "ontomatch.json",
    ".ontomatch/config.toml",
    ".ontomatch/config.yaml",
    ".ontomatch/config.yml",
    ".ontomatch/config.json",
];

/// Environment variable prefix for ontomatch configuration
pub const ENV_PREFIX: &str = "ONTOMATCH_";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
