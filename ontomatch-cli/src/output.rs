use colored::*;
use ontomatch::OntomatchError;
use ontomatch::config::OntomatchConfig;
use ontomatch::matching::{BatchSummary, Resolution, UnresolvedReason};
use ontomatch::models::{EntityType, MappingStatus, Suggestion};
use serde::Serialize;
use serde_json::json;

pub struct CliColors;

impl CliColors {
    pub fn success() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn error() -> Color {
        Color::TrueColor {
            r: 239,
            g: 68,
            b: 68,
        }
    }

    pub fn warning() -> Color {
        Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        }
    }

    pub fn info() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }

    pub fn muted() -> Color {
        Color::TrueColor {
            r: 148,
            g: 163,
            b: 184,
        }
    }

    pub fn accent() -> Color {
        Color::TrueColor {
            r: 168,
            g: 85,
            b: 247,
        }
    }
}

pub fn format_success(msg: &str) -> String {
    format!(
        "{} {}",
        "✓".color(CliColors::success()).bold(),
        msg.color(CliColors::success())
    )
}

pub fn format_error(msg: &str) -> String {
    format!(
        "{} {}",
        "✗".color(CliColors::error()).bold(),
        msg.color(CliColors::error())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!(
        "{} {}",
        "⚠".color(CliColors::warning()).bold(),
        msg.color(CliColors::warning())
    )
}

pub fn format_info(msg: &str) -> String {
    format!(
        "{} {}",
        "ℹ".color(CliColors::info()).bold(),
        msg.color(CliColors::info())
    )
}

/// Stable machine-readable code for an error.
pub fn error_code(error: &OntomatchError) -> &'static str {
    match error {
        OntomatchError::Configuration(_) => "CONFIGURATION_ERROR",
        OntomatchError::Logging(_) => "LOGGING_ERROR",
        OntomatchError::Storage(_) => "STORAGE_ERROR",
        OntomatchError::Search(_) => "SEARCH_ERROR",
        OntomatchError::UnknownEntityType(_) => "UNKNOWN_ENTITY_TYPE",
        OntomatchError::UnknownMappingKey { .. } => "UNKNOWN_MAPPING_KEY",
        OntomatchError::InvalidInput(_) => "INVALID_INPUT",
        OntomatchError::Other(_) => "ERROR",
    }
}

pub fn output_error(error: &OntomatchError, output_format: &str) {
    if output_format == "json" {
        let response = json!({
            "error": true,
            "code": error_code(error),
            "message": error.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        eprintln!("{}", format_error(&error.to_string()));
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn format_score(score: u8, threshold: u8) -> ColoredString {
    let text = format!("{:>3}", score);
    if score >= threshold {
        text.color(CliColors::success()).bold()
    } else if score >= threshold / 2 {
        text.color(CliColors::warning())
    } else {
        text.color(CliColors::muted())
    }
}

pub fn format_status(status: MappingStatus) -> ColoredString {
    match status {
        MappingStatus::Mapped => "mapped".color(CliColors::success()),
        MappingStatus::Review => "review".color(CliColors::warning()),
        MappingStatus::Request => "request".color(CliColors::accent()),
        MappingStatus::Unmapped => "unmapped".color(CliColors::muted()),
    }
}

pub fn print_fingerprint(entity_type: EntityType, fingerprint: &str) {
    println!(
        "{}: {}",
        "Type".color(CliColors::muted()),
        entity_type.to_string().color(CliColors::accent())
    );
    println!(
        "{}: {}",
        "Fingerprint".color(CliColors::muted()),
        fingerprint.bold()
    );
}

pub fn print_suggestions(suggestions: &[Suggestion], threshold: u8) {
    if suggestions.is_empty() {
        println!("{}", format_info("No suggestions found."));
        return;
    }

    println!(
        "{:<5} {:<9} {:<30} {}",
        "Score".color(CliColors::muted()).bold(),
        "Source".color(CliColors::muted()).bold(),
        "Label".color(CliColors::muted()).bold(),
        "Url".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(80).color(CliColors::muted()));

    for suggestion in suggestions {
        let label: String = suggestion.target_label().chars().take(30).collect();
        println!(
            "{:<5} {:<9} {:<30} {}",
            format_score(suggestion.score(), threshold),
            suggestion.source().to_string(),
            label,
            suggestion.target_url().color(CliColors::info())
        );
    }
}

pub fn print_resolution(resolution: &Resolution) {
    match resolution {
        Resolution::Accepted(acceptance) => println!(
            "{}",
            format_success(&format!(
                "Accepted {} ({}) with score {} from {}",
                acceptance.label, acceptance.url, acceptance.score, acceptance.source
            ))
        ),
        Resolution::Unresolved(reason) => {
            println!("{}", format_warning(&describe_unresolved(reason)))
        }
    }
}

pub fn describe_unresolved(reason: &UnresolvedReason) -> String {
    match reason {
        UnresolvedReason::NoSuggestions => "Unresolved: no candidates found".to_string(),
        UnresolvedReason::BelowThreshold { best } => {
            format!("Unresolved: best score {} is below the threshold", best)
        }
        UnresolvedReason::Disagreement { urls } => format!(
            "Unresolved: top candidates disagree ({})",
            urls.join(", ")
        ),
        UnresolvedReason::SearchFailed { errors } => format!(
            "Unresolved: search failed ({})",
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

pub fn print_summary(summary: &BatchSummary) {
    println!(
        "{:<12} {:>10} {:>12} {:>9}",
        "Type".color(CliColors::muted()).bold(),
        "Processed".color(CliColors::muted()).bold(),
        "Auto-mapped".color(CliColors::muted()).bold(),
        "Hit rate".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(46).color(CliColors::muted()));

    for entry in &summary.types {
        let hit_rate = match entry.hit_rate {
            Some(rate) => format!("{}%", rate).color(CliColors::success()),
            None => "n/a".color(CliColors::muted()),
        };
        println!(
            "{:<12} {:>10} {:>12} {:>9}",
            entry.entity_type.to_string(),
            entry.processed,
            entry.auto_mapped,
            hit_rate
        );
    }
}

/// Effective configuration as `(section, [(key, value)])` rows.
pub fn config_sections(
    config: &OntomatchConfig,
) -> Vec<(&'static str, Vec<(&'static str, String)>)> {
    let search = &config.search;
    vec![
        (
            "matching",
            vec![
                ("score_threshold", config.matching.score_threshold.to_string()),
                ("acceptance", config.matching.acceptance.to_string()),
            ],
        ),
        (
            "search",
            vec![
                ("fuzzy_boost", search.fuzzy_boost.to_string()),
                ("phrase_boost", search.phrase_boost.to_string()),
                ("phrase_term_cap", search.phrase_term_cap.to_string()),
                ("phrase_slop", search.phrase_slop.to_string()),
                ("max_edits", search.max_edits.to_string()),
                ("max_text_length", search.max_text_length.to_string()),
                ("max_token_length", search.max_token_length.to_string()),
                ("rule_top_k", search.rule_top_k.to_string()),
                ("ontology_top_k", search.ontology_top_k.to_string()),
                ("query_timeout_ms", search.query_timeout_ms.to_string()),
            ],
        ),
        (
            "batch",
            vec![(
                "workers",
                config
                    .batch
                    .workers
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "auto".to_string()),
            )],
        ),
        (
            "logging",
            vec![
                ("level", config.logging.level.to_string()),
                ("format", format!("{:?}", config.logging.format).to_lowercase()),
                (
                    "file",
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| "none".to_string()),
                ),
                ("console", config.logging.console.to_string()),
            ],
        ),
    ]
}

pub fn print_config(config: &OntomatchConfig) {
    for (section, fields) in config_sections(config) {
        println!("{}", section.color(CliColors::accent()).bold());
        for (name, value) in fields {
            println!("  {:<18} {}", name.color(CliColors::muted()), value);
        }
    }
}
