//! Full-text search over the rule and ontology corpora
//!
//! This module provides the text analysis, query construction and in-memory
//! indexing used to find candidate targets for an unmapped term.
//!
//! # Overview
//!
//! - [`Analyzer`] normalizes text into lower-case alphanumeric tokens
//! - [`QueryBuilder`] turns raw field values into boosted fuzzy and phrase queries
//! - [`InvertedIndex`] executes a [`Query`] and scores documents
//! - [`CorpusIndex`] wraps an index snapshot with atomic rebuilds, and
//!   [`DualIndex`] pairs the rule corpus with the ontology corpus
//!
//! # Example
//!
//! ```no_run
//! use ontomatch::config::SearchConfig;
//! use ontomatch::models::OntologyTerm;
//! use ontomatch::search::{DualIndex, QueryBuilder, corpus::LABEL_FIELD};
//!
//! let config = SearchConfig::default();
//! let index = DualIndex::new(&config);
//! index.ontology.build(vec![OntologyTerm::new(
//!     "C3224",
//!     "http://purl.obolibrary.org/obo/NCIT_C3224",
//!     "Melanoma",
//!     "diagnosis",
//! )]);
//!
//! let builder = QueryBuilder::new(&config);
//! if let Some(query) = builder.field_query(LABEL_FIELD, "Melanoma") {
//!     let hits = index.ontology.search(&query, 10).unwrap();
//!     assert_eq!(hits[0].record.label, "Melanoma");
//! }
//! ```

pub mod analyzer;
pub mod builder;
pub mod corpus;
pub mod index;
pub mod query;

pub use analyzer::Analyzer;
pub use builder::QueryBuilder;
pub use corpus::{
    BuildReport, CorpusIndex, CorpusReader, DualIndex, Indexable, MalformedRecord, SearchHit,
};
pub use index::{Document, FieldKind, InvertedIndex};
pub use query::Query;

use thiserror::Error;

/// Failure of a single search operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Index not built: {corpus}")]
    IndexNotBuilt { corpus: String },

    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Query exceeded its {budget_ms} ms time budget")]
    Timeout { budget_ms: u64 },
}
