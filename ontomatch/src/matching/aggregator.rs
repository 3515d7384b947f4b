//! Builds per-entity queries and merges hits from both corpora into suggestions.

use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::models::{KeyKind, MappingEntity, OntologySuggestion, RuleSuggestion, Suggestion};
use crate::search::corpus::{ENTITY_TYPE_FIELD, LABEL_FIELD, SYNONYM_FIELD, TYPE_FIELD};
use crate::search::{DualIndex, Query, QueryBuilder, SearchError};

/// Ranked suggestions for one entity, plus any corpus that failed to answer.
#[derive(Debug, Clone, Default)]
pub struct Suggestions {
    pub items: Vec<Suggestion>,
    pub failures: Vec<SearchError>,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Highest suggestion score, if any.
    pub fn best_score(&self) -> Option<u8> {
        self.items.iter().map(Suggestion::score).max()
    }
}

/// Convert a relevance in `[0, 1]` to a suggestion score in `0..=100`.
pub fn relevance_to_score(relevance: f32) -> u8 {
    if !relevance.is_finite() {
        return 0;
    }
    (relevance * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Produces ranked suggestions for entities from the dual index.
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    builder: QueryBuilder,
    rule_top_k: usize,
    ontology_top_k: usize,
}

impl SuggestionEngine {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            builder: QueryBuilder::new(config),
            rule_top_k: config.rule_top_k,
            ontology_top_k: config.ontology_top_k,
        }
    }

    /// Query over the rule corpus: one clause per populated key, restricted to
    /// rules of the same entity type.
    ///
    /// Keyword keys only narrow the ranking. An entity without any searchable
    /// text gets no rule query at all.
    pub fn rule_query(&self, entity: &MappingEntity) -> Option<Query> {
        let mut clauses = Vec::new();
        let mut has_text = false;

        for (key, value) in entity.populated() {
            let clause = match key.kind() {
                KeyKind::Keyword => self.builder.term_query(key.field_name(), value),
                KeyKind::Text => {
                    let clause = self.builder.field_query(key.field_name(), value);
                    has_text |= clause.is_some();
                    clause
                }
            };
            clauses.extend(clause);
        }

        if !has_text {
            return None;
        }

        Some(
            Query::should(clauses)
                .with_filter(Query::term(ENTITY_TYPE_FIELD, entity.entity_type.label())),
        )
    }

    /// Query over the ontology corpus from the entity's primary value, matched
    /// against labels and synonyms of terms in the allowed categories.
    pub fn ontology_query(&self, entity: &MappingEntity) -> Option<Query> {
        let value = entity.value(entity.entity_type.primary_key())?;
        let disjuncts: Vec<Query> = [LABEL_FIELD, SYNONYM_FIELD]
            .into_iter()
            .filter_map(|field| self.builder.field_query(field, value))
            .collect();
        if disjuncts.is_empty() {
            return None;
        }

        let categories = entity
            .entity_type
            .ontology_types()
            .iter()
            .map(|category| Query::term(TYPE_FIELD, *category))
            .collect();

        Some(
            Query::should(vec![Query::dis_max(disjuncts, 0.0)])
                .with_filter(Query::should(categories)),
        )
    }

    /// Search both corpora for `entity`.
    ///
    /// Rule suggestions come before ontology suggestions, then the list is
    /// stably sorted by score, so equal scores keep that order.
    pub fn suggest(&self, index: &DualIndex, entity: &MappingEntity) -> Suggestions {
        let mut suggestions = Suggestions::default();

        if let Some(query) = self.rule_query(entity) {
            match index.rules.search(&query, self.rule_top_k) {
                Ok(hits) => suggestions.items.extend(hits.into_iter().map(|hit| {
                    Suggestion::Rule(RuleSuggestion {
                        score: relevance_to_score(hit.relevance),
                        matched_field: hit.matched_field,
                        rule: hit.record,
                    })
                })),
                Err(e) => {
                    warn!(entity = %entity.id, corpus = "rules", error = %e, "Search failed");
                    suggestions.failures.push(e);
                }
            }
        }

        if let Some(query) = self.ontology_query(entity) {
            match index.ontology.search(&query, self.ontology_top_k) {
                Ok(hits) => suggestions.items.extend(hits.into_iter().map(|hit| {
                    Suggestion::Ontology(OntologySuggestion {
                        score: relevance_to_score(hit.relevance),
                        matched_field: hit.matched_field,
                        term: hit.record,
                    })
                })),
                Err(e) => {
                    warn!(entity = %entity.id, corpus = "ontology", error = %e, "Search failed");
                    suggestions.failures.push(e);
                }
            }
        }

        suggestions.items.sort_by(|a, b| b.score().cmp(&a.score()));
        debug!(
            entity = %entity.id,
            suggestions = suggestions.items.len(),
            best = ?suggestions.best_score(),
            "Collected suggestions"
        );
        suggestions
    }
}
