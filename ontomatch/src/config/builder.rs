//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use std::path::Path;

/// Builder for creating OntomatchConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: OntomatchConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: OntomatchConfig::default(),
        }
    }

    /// Start from an existing configuration, e.g. one produced by the loader.
    pub fn from_config(config: OntomatchConfig) -> Self {
        Self { config }
    }

    /// Set the minimum score for automatic acceptance.
    pub fn with_score_threshold(mut self, threshold: u8) -> Self {
        self.config.matching.score_threshold = threshold;
        self
    }

    /// Set what an accepted suggestion does to the entity.
    pub fn with_acceptance(mut self, policy: AcceptancePolicy) -> Self {
        self.config.matching.acceptance = policy;
        self
    }

    /// Replace the whole search configuration.
    pub fn with_search_config(mut self, search: SearchConfig) -> Self {
        self.config.search = search;
        self
    }

    /// Set the fuzzy and phrase weights.
    pub fn with_boosts(mut self, fuzzy: f32, phrase: f32) -> Self {
        self.config.search.fuzzy_boost = fuzzy;
        self.config.search.phrase_boost = phrase;
        self
    }

    /// Set how many hits are requested from each corpus.
    pub fn with_top_k(mut self, rules: usize, ontology: usize) -> Self {
        self.config.search.rule_top_k = rules;
        self.config.search.ontology_top_k = ontology;
        self
    }

    /// Set the per-query time budget.
    pub fn with_query_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.search.query_timeout_ms = timeout_ms;
        self
    }

    /// Run batches on a dedicated pool of `workers` threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.batch.workers = Some(workers);
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use default logging configuration (JSON console output at Info level)
    pub fn with_default_logging(mut self) -> Self {
        self.config.logging.level = LogLevel::Info;
        self.config.logging.format = LogFormat::Json;
        self.config.logging.file = None;
        self
    }

    /// Create a configuration for interactive development.
    ///
    /// Debug-level, human-readable logging and every accepted match queued
    /// for review instead of being mapped outright.
    pub fn development() -> Self {
        Self::new()
            .with_acceptance(AcceptancePolicy::Review)
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Create a configuration for automated testing.
    ///
    /// Deterministic small worker pool and a generous query budget so slow CI
    /// machines do not hit timeouts.
    pub fn testing() -> Self {
        Self::new()
            .with_workers(2)
            .with_query_timeout_ms(5_000)
            .with_log_level(LogLevel::Warn)
            .with_log_format(LogFormat::Compact)
    }

    /// Create a production configuration.
    ///
    /// Default matching rules with structured JSON logs.
    pub fn production() -> Self {
        Self::new().with_default_logging()
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<OntomatchConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
