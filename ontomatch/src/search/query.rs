//! Query tree executed by the corpus indexes.
//!
//! Leaves score in `[0, 1]`; combinators add, boost or take the maximum of their
//! children. Every query can report the highest score it could possibly reach, which
//! lets hits be expressed as a relevance in `[0, 1]` independent of query shape.

use super::SearchError;

/// Largest edit distance a fuzzy clause may allow.
pub const MAX_FUZZY_EDITS: u8 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Exact match of one field/value pair
    Term { field: String, value: String },

    /// Token within `max_edits` edits of `term`
    Fuzzy {
        field: String,
        term: String,
        max_edits: u8,
    },

    /// Tokens in order, with at most `slop` extra tokens interleaved.
    ///
    /// `text_len` is the token count of the text the terms were taken from. It
    /// exceeds `terms.len()` when the phrase was cut short, and coverage of a
    /// document value is then measured against the whole text.
    Phrase {
        field: String,
        terms: Vec<String>,
        slop: u32,
        text_len: usize,
    },

    /// Inner score multiplied by `boost`
    Boost { query: Box<Query>, boost: f32 },

    /// Boolean combination.
    ///
    /// `must` and `filter` clauses are required; only `must` clauses score. When there
    /// are no `must` clauses at least one `should` clause has to match (if any exist).
    Bool {
        must: Vec<Query>,
        should: Vec<Query>,
        filter: Vec<Query>,
    },

    /// Best matching alternative plus `tie_breaker` times the others
    DisMax {
        disjuncts: Vec<Query>,
        tie_breaker: f32,
    },
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn fuzzy(field: impl Into<String>, term: impl Into<String>, max_edits: u8) -> Self {
        Query::Fuzzy {
            field: field.into(),
            term: term.into(),
            max_edits,
        }
    }

    pub fn phrase(field: impl Into<String>, terms: Vec<String>, slop: u32) -> Self {
        let text_len = terms.len();
        Query::truncated_phrase(field, terms, slop, text_len)
    }

    /// Phrase made of the leading `terms` of a text of `text_len` tokens.
    pub fn truncated_phrase(
        field: impl Into<String>,
        terms: Vec<String>,
        slop: u32,
        text_len: usize,
    ) -> Self {
        Query::Phrase {
            field: field.into(),
            text_len: text_len.max(terms.len()),
            terms,
            slop,
        }
    }

    /// Union: a document matches if any clause matches.
    pub fn should(clauses: Vec<Query>) -> Self {
        Query::Bool {
            must: Vec::new(),
            should: clauses,
            filter: Vec::new(),
        }
    }

    /// Intersection: every clause is required.
    pub fn must(clauses: Vec<Query>) -> Self {
        Query::Bool {
            must: clauses,
            should: Vec::new(),
            filter: Vec::new(),
        }
    }

    /// Best single clause; matching several equivalent phrasings does not add up.
    pub fn dis_max(disjuncts: Vec<Query>, tie_breaker: f32) -> Self {
        Query::DisMax {
            disjuncts,
            tie_breaker,
        }
    }

    pub fn boosted(self, boost: f32) -> Self {
        Query::Boost {
            query: Box::new(self),
            boost,
        }
    }

    /// Restrict matches to documents also matching `filter`, without changing scores.
    pub fn with_filter(self, filter: Query) -> Self {
        match self {
            Query::Bool {
                must,
                should,
                filter: mut filters,
            } => {
                filters.push(filter);
                Query::Bool {
                    must,
                    should,
                    filter: filters,
                }
            }
            other => Query::Bool {
                must: vec![other],
                should: Vec::new(),
                filter: vec![filter],
            },
        }
    }

    /// Highest score this query can produce for any document.
    pub fn max_score(&self) -> f32 {
        match self {
            Query::Term { .. } | Query::Fuzzy { .. } | Query::Phrase { .. } => 1.0,
            Query::Boost { query, boost } => query.max_score() * boost,
            Query::Bool { must, should, .. } => must
                .iter()
                .chain(should.iter())
                .map(Query::max_score)
                .sum(),
            Query::DisMax {
                disjuncts,
                tie_breaker,
            } => {
                let scores: Vec<f32> = disjuncts.iter().map(Query::max_score).collect();
                let max = scores.iter().copied().fold(0.0_f32, f32::max);
                let sum: f32 = scores.iter().sum();
                max + tie_breaker * (sum - max)
            }
        }
    }

    /// Reject queries that cannot be executed meaningfully.
    pub fn validate(&self) -> Result<(), SearchError> {
        match self {
            Query::Term { field, value } => {
                check_field(field)?;
                if value.trim().is_empty() {
                    return Err(malformed(format!("empty term value for field '{}'", field)));
                }
            }
            Query::Fuzzy {
                field,
                term,
                max_edits,
            } => {
                check_field(field)?;
                if term.is_empty() {
                    return Err(malformed(format!("empty fuzzy term for field '{}'", field)));
                }
                if *max_edits > MAX_FUZZY_EDITS {
                    return Err(malformed(format!(
                        "fuzzy edit distance {} exceeds {}",
                        max_edits, MAX_FUZZY_EDITS
                    )));
                }
            }
            Query::Phrase { field, terms, .. } => {
                check_field(field)?;
                if terms.is_empty() || terms.iter().any(String::is_empty) {
                    return Err(malformed(format!("empty phrase for field '{}'", field)));
                }
            }
            Query::Boost { query, boost } => {
                if !boost.is_finite() || *boost < 0.0 {
                    return Err(malformed(format!("invalid boost {}", boost)));
                }
                query.validate()?;
            }
            Query::Bool {
                must,
                should,
                filter,
            } => {
                if must.is_empty() && should.is_empty() && filter.is_empty() {
                    return Err(malformed("boolean query without clauses"));
                }
                for clause in must.iter().chain(should).chain(filter) {
                    clause.validate()?;
                }
            }
            Query::DisMax {
                disjuncts,
                tie_breaker,
            } => {
                if disjuncts.is_empty() {
                    return Err(malformed("disjunction-max query without clauses"));
                }
                if !(0.0..=1.0).contains(tie_breaker) {
                    return Err(malformed(format!("invalid tie breaker {}", tie_breaker)));
                }
                for clause in disjuncts {
                    clause.validate()?;
                }
            }
        }
        Ok(())
    }
}

fn check_field(field: &str) -> Result<(), SearchError> {
    if field.is_empty() {
        Err(malformed("empty field name"))
    } else {
        Ok(())
    }
}

fn malformed(reason: impl Into<String>) -> SearchError {
    SearchError::MalformedQuery(reason.into())
}
