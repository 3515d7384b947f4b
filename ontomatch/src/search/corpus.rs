//! Rule and ontology corpora over the inverted index.
//!
//! Each corpus holds an immutable snapshot behind an [`ArcSwapOption`]: searches load
//! the current snapshot and keep it for their whole duration, while a rebuild
//! publishes a completely built replacement in one atomic store.

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::SearchError;
use super::analyzer::Analyzer;
use super::index::{Document, InvertedIndex};
use super::query::Query;
use crate::config::SearchConfig;
use crate::models::{KeyKind, MappingEntity, MappingStatus, OntologyTerm};

/// Rule corpus field holding the entity type label.
pub const ENTITY_TYPE_FIELD: &str = "entity_type";
/// Rule corpus field holding the accepted target url.
pub const MAPPED_URL_FIELD: &str = "mapped_term_url";
/// Rule corpus field holding the accepted target label.
pub const MAPPED_LABEL_FIELD: &str = "mapped_term_label";

/// Ontology corpus field holding the preferred label.
pub const LABEL_FIELD: &str = "label";
/// Ontology corpus field holding synonyms (multi-valued).
pub const SYNONYM_FIELD: &str = "synonym";
/// Ontology corpus field holding the term category.
pub const TYPE_FIELD: &str = "type";
/// Ontology corpus field holding the free-text definition.
pub const DEFINITION_FIELD: &str = "definition";

/// A record that cannot be turned into an index document.
#[derive(Debug, Error)]
#[error("record '{id}' is malformed: {reason}")]
pub struct MalformedRecord {
    pub id: String,
    pub reason: String,
}

impl MalformedRecord {
    fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// A record type that can be stored in a corpus.
pub trait Indexable: Clone + Send + Sync + 'static {
    /// Corpus name used in logs and errors.
    const CORPUS: &'static str;

    fn to_document(&self) -> Result<Document, MalformedRecord>;
}

impl Indexable for MappingEntity {
    const CORPUS: &'static str = "rules";

    fn to_document(&self) -> Result<Document, MalformedRecord> {
        let id = self.id.to_string();
        if self.status != MappingStatus::Mapped {
            return Err(MalformedRecord::new(id, "entity is not mapped"));
        }
        let url = non_blank(self.mapped_term_url.as_deref())
            .ok_or_else(|| MalformedRecord::new(id.as_str(), "missing mapped term url"))?;
        let label = non_blank(self.mapped_term_label.as_deref())
            .ok_or_else(|| MalformedRecord::new(id.as_str(), "missing mapped term label"))?;

        let mut document = Document::new(id.as_str())
            .keyword(ENTITY_TYPE_FIELD, self.entity_type.label())
            .keyword(MAPPED_URL_FIELD, url)
            .text(MAPPED_LABEL_FIELD, label);
        for (key, value) in self.populated() {
            document = match key.kind() {
                KeyKind::Keyword => document.keyword(key.field_name(), value),
                KeyKind::Text => document.text(key.field_name(), value),
            };
        }
        Ok(document)
    }
}

impl Indexable for OntologyTerm {
    const CORPUS: &'static str = "ontology";

    fn to_document(&self) -> Result<Document, MalformedRecord> {
        if non_blank(Some(self.url.as_str())).is_none() {
            return Err(MalformedRecord::new(self.id.as_str(), "missing url"));
        }
        let label = non_blank(Some(self.label.as_str()))
            .ok_or_else(|| MalformedRecord::new(self.id.as_str(), "missing label"))?;

        let mut document = Document::new(self.id.as_str())
            .text(LABEL_FIELD, label)
            .keyword(TYPE_FIELD, self.term_type.as_str());
        for synonym in &self.synonyms {
            document = document.text(SYNONYM_FIELD, synonym.as_str());
        }
        if let Some(definition) = non_blank(self.description.as_deref()) {
            document = document.text(DEFINITION_FIELD, definition);
        }
        Ok(document)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Outcome of a corpus rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub indexed: usize,
    pub skipped: usize,
}

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit<R> {
    pub score: f32,
    /// Score relative to the query's maximum, in `[0, 1]`
    pub relevance: f32,
    pub id: String,
    pub matched_field: Option<String>,
    pub record: R,
}

#[derive(Debug)]
struct Snapshot<R> {
    index: InvertedIndex,
    records: Vec<R>,
    built_at: DateTime<Utc>,
}

/// A searchable, atomically rebuildable collection of records.
pub struct CorpusIndex<R: Indexable> {
    current: ArcSwapOption<Snapshot<R>>,
    analyzer: Analyzer,
    budget: Duration,
}

impl<R: Indexable> CorpusIndex<R> {
    pub fn new(analyzer: Analyzer, budget: Duration) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            analyzer,
            budget,
        }
    }

    /// Replace the corpus with `records`.
    ///
    /// Malformed records are skipped. Readers keep whatever snapshot they already
    /// hold until their search completes.
    pub fn build(&self, records: Vec<R>) -> BuildReport {
        let mut documents = Vec::with_capacity(records.len());
        let mut kept = Vec::with_capacity(records.len());
        let mut skipped = 0;

        for record in records {
            match record.to_document() {
                Ok(document) => {
                    documents.push(document);
                    kept.push(record);
                }
                Err(e) => {
                    warn!(corpus = R::CORPUS, error = %e, "Skipping malformed record");
                    skipped += 1;
                }
            }
        }

        let index = InvertedIndex::build(documents, self.analyzer);
        let report = BuildReport {
            indexed: kept.len(),
            skipped,
        };
        self.current.store(Some(Arc::new(Snapshot {
            index,
            records: kept,
            built_at: Utc::now(),
        })));

        info!(
            corpus = R::CORPUS,
            indexed = report.indexed,
            skipped = report.skipped,
            "Corpus rebuilt"
        );
        report
    }

    pub fn is_built(&self) -> bool {
        self.current.load().is_some()
    }

    /// Number of records in the current snapshot.
    pub fn len(&self) -> usize {
        self.current
            .load_full()
            .map(|snapshot| snapshot.records.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.current.load_full().map(|snapshot| snapshot.built_at)
    }

    /// Pin the current snapshot for a series of searches.
    pub fn reader(&self) -> Result<CorpusReader<R>, SearchError> {
        let snapshot = self
            .current
            .load_full()
            .ok_or_else(|| SearchError::IndexNotBuilt {
                corpus: R::CORPUS.to_string(),
            })?;
        Ok(CorpusReader {
            snapshot,
            budget: self.budget,
        })
    }

    /// Run `query` against the current snapshot.
    pub fn search(&self, query: &Query, top_k: usize) -> Result<Vec<SearchHit<R>>, SearchError> {
        self.reader()?.search(query, top_k)
    }
}

/// One corpus snapshot, unaffected by rebuilds published after it was taken.
pub struct CorpusReader<R: Indexable> {
    snapshot: Arc<Snapshot<R>>,
    budget: Duration,
}

impl<R: Indexable> CorpusReader<R> {
    pub fn len(&self) -> usize {
        self.snapshot.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.records.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.snapshot.built_at
    }

    pub fn search(&self, query: &Query, top_k: usize) -> Result<Vec<SearchHit<R>>, SearchError> {
        let hits = self.snapshot.index.search(query, top_k, self.budget)?;
        debug!(corpus = R::CORPUS, hits = hits.len(), "Search completed");

        Ok(hits
            .into_iter()
            .map(|hit| SearchHit {
                score: hit.score,
                relevance: hit.relevance,
                record: self.snapshot.records[hit.ordinal].clone(),
                id: hit.id,
                matched_field: hit.matched_field,
            })
            .collect())
    }
}

/// The rule corpus and the ontology corpus, searched side by side.
pub struct DualIndex {
    pub rules: CorpusIndex<MappingEntity>,
    pub ontology: CorpusIndex<OntologyTerm>,
}

impl DualIndex {
    pub fn new(config: &SearchConfig) -> Self {
        let analyzer = Analyzer::new(config.max_token_length);
        let budget = config.query_timeout();
        Self {
            rules: CorpusIndex::new(analyzer, budget),
            ontology: CorpusIndex::new(analyzer, budget),
        }
    }

    pub fn is_built(&self) -> bool {
        self.rules.is_built() && self.ontology.is_built()
    }
}
