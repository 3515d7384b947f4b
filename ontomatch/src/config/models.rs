//! Configuration model definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for ontomatch.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OntomatchConfig {
    /// Acceptance rules for automatic mappings
    pub matching: MatchingConfig,

    /// Query construction and index limits
    pub search: SearchConfig,

    /// Batch execution settings
    pub batch: BatchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Acceptance rules applied by the consensus resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum suggestion score (0-100) eligible for automatic acceptance
    pub score_threshold: u8,

    /// What an accepted suggestion does to the entity
    pub acceptance: AcceptancePolicy,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            score_threshold: 95,
            acceptance: AcceptancePolicy::Mapped,
        }
    }
}

/// Outcome of an automatic acceptance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AcceptancePolicy {
    /// Accepted entities become Mapped
    #[default]
    Mapped,

    /// Accepted entities are queued for human review
    Review,
}

impl fmt::Display for AcceptancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptancePolicy::Mapped => write!(f, "mapped"),
            AcceptancePolicy::Review => write!(f, "review"),
        }
    }
}

impl FromStr for AcceptancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mapped" => Ok(AcceptancePolicy::Mapped),
            "review" => Ok(AcceptancePolicy::Review),
            _ => Err(format!("Invalid acceptance policy: {}", s)),
        }
    }
}

/// Query construction weights and limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Weight of the fuzzy interpretation of a field value
    pub fuzzy_boost: f32,

    /// Weight of the phrase interpretation of a field value
    pub phrase_boost: f32,

    /// Maximum number of tokens in a phrase query
    pub phrase_term_cap: usize,

    /// Extra tokens allowed between phrase terms
    pub phrase_slop: u32,

    /// Maximum edit distance of fuzzy clauses
    pub max_edits: u8,

    /// Characters of raw text considered when building queries
    pub max_text_length: usize,

    /// Characters kept per token
    pub max_token_length: usize,

    /// Hits requested from the rule corpus
    pub rule_top_k: usize,

    /// Hits requested from the ontology corpus
    pub ontology_top_k: usize,

    /// Time budget of a single query, in milliseconds
    pub query_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_boost: 1.0,
            phrase_boost: 1.5,
            phrase_term_cap: 10,
            phrase_slop: 1,
            max_edits: 2,
            max_text_length: 150,
            max_token_length: 50,
            rule_top_k: 10,
            ontology_top_k: 10,
            query_timeout_ms: 250,
        }
    }
}

impl SearchConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Batch execution settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BatchConfig {
    /// Size of a dedicated worker pool; the global pool is used when unset
    pub workers: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to the console (stderr)
    #[serde(alias = "stdout")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            console: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
