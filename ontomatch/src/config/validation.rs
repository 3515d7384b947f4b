//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;
use crate::search::query::MAX_FUZZY_EDITS;

/// Validate the entire configuration.
pub fn validate_config(config: &OntomatchConfig) -> Result<(), ConfigError> {
    validate_matching_config(&config.matching)?;
    validate_search_config(&config.search)?;
    validate_batch_config(&config.batch)?;

    Ok(())
}

fn validate_matching_config(config: &MatchingConfig) -> Result<(), ConfigError> {
    if config.score_threshold > 100 {
        return Err(invalid(format!(
            "Score threshold must be between 0 and 100, got {}",
            config.score_threshold
        )));
    }

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    for (name, boost) in [
        ("fuzzy_boost", config.fuzzy_boost),
        ("phrase_boost", config.phrase_boost),
    ] {
        if !boost.is_finite() || boost <= 0.0 {
            return Err(invalid(format!(
                "{} must be a positive finite number, got {}",
                name, boost
            )));
        }
    }

    for (name, value) in [
        ("phrase_term_cap", config.phrase_term_cap),
        ("max_text_length", config.max_text_length),
        ("max_token_length", config.max_token_length),
        ("rule_top_k", config.rule_top_k),
        ("ontology_top_k", config.ontology_top_k),
    ] {
        if value == 0 {
            return Err(invalid(format!("{} must be greater than 0", name)));
        }
    }

    if config.query_timeout_ms == 0 {
        return Err(invalid("query_timeout_ms must be greater than 0"));
    }

    if config.max_edits > MAX_FUZZY_EDITS {
        return Err(invalid(format!(
            "max_edits must be at most {}, got {}",
            MAX_FUZZY_EDITS, config.max_edits
        )));
    }

    Ok(())
}

fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.workers == Some(0) {
        return Err(invalid("Batch worker count must be greater than 0"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}
