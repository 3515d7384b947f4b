//! Text normalization shared by indexing and querying.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^\p{L}\p{N}]+").unwrap();
}

/// Default cap on the characters of a single token.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 50;

/// Stateless tokenizer: lower-cases, strips symbols and splits on whitespace.
///
/// The analyzer only carries settings. Every call to [`Analyzer::analyze`] works on
/// its own buffers, so one value can be shared freely between threads, indexes and
/// query builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    max_token_length: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKEN_LENGTH)
    }
}

impl Analyzer {
    pub fn new(max_token_length: usize) -> Self {
        Self { max_token_length }
    }

    pub fn max_token_length(&self) -> usize {
        self.max_token_length
    }

    /// Tokenize `text` into lower-case alphanumeric tokens, preserving order.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        NON_ALPHANUMERIC
            .replace_all(&lowered, " ")
            .split_whitespace()
            .map(|token| truncate_chars(token, self.max_token_length))
            .collect()
    }

    /// Keyword form of a value: trimmed and lower-cased, otherwise untouched.
    pub fn keyword(&self, value: &str) -> String {
        value.trim().to_lowercase()
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits() {
        let analyzer = Analyzer::default();
        assert_eq!(
            analyzer.analyze("Invasive Ductal  Carcinoma"),
            vec!["invasive", "ductal", "carcinoma"]
        );
    }

    #[test]
    fn test_strips_symbols() {
        let analyzer = Analyzer::default();
        assert_eq!(
            analyzer.analyze("Carcinoma, NOS (breast) +=%&"),
            vec!["carcinoma", "nos", "breast"]
        );
        assert_eq!(analyzer.analyze("non-small cell"), vec!["non", "small", "cell"]);
        assert!(analyzer.analyze(" +=%& ").is_empty());
    }

    #[test]
    fn test_keeps_digits_and_accents() {
        let analyzer = Analyzer::default();
        assert_eq!(
            analyzer.analyze("5-FU Hodgkin's Lymphomé"),
            vec!["5", "fu", "hodgkin", "s", "lymphomé"]
        );
    }

    #[test]
    fn test_truncates_long_tokens() {
        let analyzer = Analyzer::new(5);
        assert_eq!(analyzer.analyze("adenocarcinoma of lung"), vec!["adeno", "of", "lung"]);
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let analyzer = Analyzer::default();
        let first = analyzer.analyze("Breast Cancer");
        let _ = analyzer.analyze("something entirely different and much longer");
        assert_eq!(analyzer.analyze("Breast Cancer"), first);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("éééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn test_keyword() {
        assert_eq!(Analyzer::default().keyword("  JAX "), "jax");
    }
}
