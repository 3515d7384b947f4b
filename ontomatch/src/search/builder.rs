//! Turns raw field text into weighted fuzzy/phrase queries.

use super::analyzer::{Analyzer, truncate_chars};
use super::query::Query;
use crate::config::SearchConfig;

/// Builds field-level queries with the configured caps and boosts.
///
/// Raw text is cut to `max_text_length` characters before tokenizing, and phrase
/// queries keep at most `phrase_term_cap` tokens, which bounds the cost of long
/// free-text values.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    analyzer: Analyzer,
    max_text_length: usize,
    phrase_term_cap: usize,
    phrase_slop: u32,
    max_edits: u8,
    fuzzy_boost: f32,
    phrase_boost: f32,
}

impl QueryBuilder {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            analyzer: Analyzer::new(config.max_token_length),
            max_text_length: config.max_text_length,
            phrase_term_cap: config.phrase_term_cap,
            phrase_slop: config.phrase_slop,
            max_edits: config.max_edits,
            fuzzy_boost: config.fuzzy_boost,
            phrase_boost: config.phrase_boost,
        }
    }

    pub fn analyzer(&self) -> Analyzer {
        self.analyzer
    }

    /// Sanitized tokens for `text`.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let text = truncate_chars(text, self.max_text_length);
        self.analyzer.analyze(&text)
    }

    /// Exact match on a keyword field.
    pub fn term_query(&self, field: &str, value: &str) -> Option<Query> {
        let value = self.analyzer.keyword(&truncate_chars(value, self.max_text_length));
        if value.is_empty() {
            None
        } else {
            Some(Query::term(field, value))
        }
    }

    /// One fuzzy clause per token, OR-ed together.
    ///
    /// `total_boost` is shared out equally, each token clause being boosted by
    /// `total_boost / n`, so the whole query tops out at `total_boost` however many
    /// tokens the text has.
    pub fn fuzzy_query(&self, field: &str, text: &str, total_boost: f32) -> Option<Query> {
        let tokens = self.tokens(text);
        if tokens.is_empty() {
            return None;
        }

        let weight = total_boost / tokens.len() as f32;
        let clauses = tokens
            .into_iter()
            .map(|token| Query::fuzzy(field, token, self.max_edits))
            .collect();
        Some(Query::should(clauses).boosted(weight))
    }

    /// Leading tokens as a single sloppy phrase, boosted.
    ///
    /// The phrase remembers how many tokens the whole text has, so a value
    /// identical to a text longer than the caps still scores as an exact match.
    pub fn phrase_query(&self, field: &str, text: &str, boost: f32) -> Option<Query> {
        let mut tokens = self.tokens(text);
        if tokens.is_empty() {
            return None;
        }

        // a word split by the character cap would never match an indexed token
        let whole = self.analyzer.analyze(text);
        let intact = tokens
            .iter()
            .zip(&whole)
            .take_while(|(cut, full)| cut == full)
            .count();
        if intact > 0 {
            tokens.truncate(intact);
        }

        tokens.truncate(self.phrase_term_cap);
        Some(Query::truncated_phrase(field, tokens, self.phrase_slop, whole.len()).boosted(boost))
    }

    /// Best of the phrase and fuzzy interpretations of `text` on `field`.
    pub fn field_query(&self, field: &str, text: &str) -> Option<Query> {
        let phrase = self.phrase_query(field, text, self.phrase_boost)?;
        let fuzzy = self.fuzzy_query(field, text, self.fuzzy_boost)?;
        Some(Query::dis_max(vec![phrase, fuzzy], 0.0))
    }
}
