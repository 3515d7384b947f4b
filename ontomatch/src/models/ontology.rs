//! Canonical ontology terms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A canonical target node of the ontology.
///
/// The `url` is the term's identity for matching purposes; two suggestions agree
/// exactly when their target urls are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyTerm {
    pub id: String,
    pub url: String,
    pub label: String,
    /// Term category, e.g. "diagnosis", "treatment" or "regimen"
    #[serde(rename = "type")]
    pub term_type: String,
    #[serde(default)]
    pub synonyms: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OntologyTerm {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        label: impl Into<String>,
        term_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            label: label.into(),
            term_type: term_type.into(),
            synonyms: BTreeSet::new(),
            description: None,
        }
    }

    pub fn with_synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.insert(synonym.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
