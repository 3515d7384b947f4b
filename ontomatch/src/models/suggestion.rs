//! Candidate matches produced by one matching pass.

use serde::Serialize;

use super::entity::{MappingEntity, MappingSource};
use super::ontology::OntologyTerm;

/// A candidate match backed by a previously mapped entity.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSuggestion {
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_field: Option<String>,
    pub rule: MappingEntity,
}

/// A candidate match backed by an ontology term.
#[derive(Debug, Clone, Serialize)]
pub struct OntologySuggestion {
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_field: Option<String>,
    pub term: OntologyTerm,
}

/// A scored candidate target for an entity.
///
/// Suggestions are transient: they are rebuilt on every matching pass and only the
/// accepted mapping outlives the pass.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Suggestion {
    Rule(RuleSuggestion),
    Ontology(OntologySuggestion),
}

impl Suggestion {
    /// Score in `0..=100`.
    pub fn score(&self) -> u8 {
        match self {
            Suggestion::Rule(s) => s.score,
            Suggestion::Ontology(s) => s.score,
        }
    }

    pub fn target_url(&self) -> &str {
        match self {
            Suggestion::Rule(s) => s.rule.mapped_term_url.as_deref().unwrap_or_default(),
            Suggestion::Ontology(s) => &s.term.url,
        }
    }

    pub fn target_label(&self) -> &str {
        match self {
            Suggestion::Rule(s) => s.rule.mapped_term_label.as_deref().unwrap_or_default(),
            Suggestion::Ontology(s) => &s.term.label,
        }
    }

    pub fn source(&self) -> MappingSource {
        match self {
            Suggestion::Rule(_) => MappingSource::Rule,
            Suggestion::Ontology(_) => MappingSource::Ontology,
        }
    }

    pub fn matched_field(&self) -> Option<&str> {
        match self {
            Suggestion::Rule(s) => s.matched_field.as_deref(),
            Suggestion::Ontology(s) => s.matched_field.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityType, MappingKey, MappingStatus};

    #[test]
    fn test_accessors() {
        let mut rule = MappingEntity::new(
            EntityType::Treatment,
            [(MappingKey::TreatmentName, Some("CDDP"))],
        )
        .unwrap();
        rule.apply_manual_mapping("http://x/C376", "Cisplatin", MappingStatus::Mapped);

        let from_rule = Suggestion::Rule(RuleSuggestion {
            score: 97,
            matched_field: Some("treatment_name".to_string()),
            rule,
        });
        assert_eq!(from_rule.score(), 97);
        assert_eq!(from_rule.target_url(), "http://x/C376");
        assert_eq!(from_rule.target_label(), "Cisplatin");
        assert_eq!(from_rule.source(), MappingSource::Rule);

        let from_term = Suggestion::Ontology(OntologySuggestion {
            score: 80,
            matched_field: None,
            term: OntologyTerm::new("C376", "http://x/C376", "Cisplatin", "treatment"),
        });
        assert_eq!(from_term.source(), MappingSource::Ontology);
        assert_eq!(from_term.target_url(), from_rule.target_url());

        let json = serde_json::to_value(&from_term).unwrap();
        assert_eq!(json["source"], "ontology");
        assert_eq!(json["score"], 80);
    }
}
