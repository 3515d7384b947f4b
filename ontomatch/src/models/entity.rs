//! Mapping entities and the per-type key schema.
//!
//! A [`MappingEntity`] is one provider term instance (a diagnosis or a treatment name
//! together with its context fields). Its identity is the fingerprint derived from the
//! entity type and the ordered key values, never an independently stored value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::suggestion::Suggestion;
use crate::fingerprint;
use crate::{OntomatchError, Result};

/// Kind of entity being harmonized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Sample diagnosis terms
    Diagnosis,
    /// Treatment and regimen names
    Treatment,
}

impl EntityType {
    /// Every supported entity type, in reporting order.
    pub const ALL: [EntityType; 2] = [EntityType::Diagnosis, EntityType::Treatment];

    /// Lower-case label used in fingerprints and index documents.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Diagnosis => "diagnosis",
            EntityType::Treatment => "treatment",
        }
    }

    /// Ordered key schema. The order is part of the fingerprint contract.
    pub fn keys(&self) -> &'static [MappingKey] {
        match self {
            EntityType::Diagnosis => &[
                MappingKey::SampleDiagnosis,
                MappingKey::TumorType,
                MappingKey::OriginTissue,
                MappingKey::DataSource,
            ],
            EntityType::Treatment => &[MappingKey::TreatmentName, MappingKey::DataSource],
        }
    }

    /// The key whose value names the term itself and is searched against the ontology.
    pub fn primary_key(&self) -> MappingKey {
        match self {
            EntityType::Diagnosis => MappingKey::SampleDiagnosis,
            EntityType::Treatment => MappingKey::TreatmentName,
        }
    }

    /// Ontology term types that are valid targets for this entity type.
    pub fn ontology_types(&self) -> &'static [&'static str] {
        match self {
            EntityType::Diagnosis => &["diagnosis"],
            EntityType::Treatment => &["treatment", "regimen"],
        }
    }

    /// Whether `key` belongs to this type's schema.
    pub fn has_key(&self, key: MappingKey) -> bool {
        self.keys().contains(&key)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for EntityType {
    type Err = OntomatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "diagnosis" => Ok(EntityType::Diagnosis),
            "treatment" => Ok(EntityType::Treatment),
            _ => Err(OntomatchError::UnknownEntityType(s.to_string())),
        }
    }
}

/// A named field of a mapping entity.
///
/// Variant order follows the schema order of every entity type, so a
/// `BTreeMap<MappingKey, _>` iterates keys in fingerprint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKey {
    SampleDiagnosis,
    TumorType,
    OriginTissue,
    TreatmentName,
    DataSource,
}

/// How a key's value is indexed and queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Free text, tokenized and matched with fuzzy/phrase queries
    Text,
    /// Identifier-like value matched exactly
    Keyword,
}

impl MappingKey {
    /// Field name used in serialized records and in the rule corpus.
    pub fn field_name(&self) -> &'static str {
        match self {
            MappingKey::SampleDiagnosis => "sample_diagnosis",
            MappingKey::TumorType => "tumor_type",
            MappingKey::OriginTissue => "origin_tissue",
            MappingKey::TreatmentName => "treatment_name",
            MappingKey::DataSource => "data_source",
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            MappingKey::DataSource => KeyKind::Keyword,
            _ => KeyKind::Text,
        }
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl FromStr for MappingKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "sample_diagnosis" | "samplediagnosis" => Ok(MappingKey::SampleDiagnosis),
            "tumor_type" | "tumortype" => Ok(MappingKey::TumorType),
            "origin_tissue" | "origintissue" => Ok(MappingKey::OriginTissue),
            "treatment_name" | "treatmentname" => Ok(MappingKey::TreatmentName),
            "data_source" | "datasource" => Ok(MappingKey::DataSource),
            _ => Err(format!("Invalid mapping key: {}", s)),
        }
    }
}

/// Curation status of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    #[default]
    Unmapped,
    Mapped,
    Review,
    Request,
}

/// How the current mapping (or lack of one) was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    Manual,
    AutomaticReview,
    AutomaticMapped,
}

/// Where the accepted mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingSource {
    Rule,
    Ontology,
    Legacy,
}

impl fmt::Display for MappingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingSource::Rule => write!(f, "rule"),
            MappingSource::Ontology => write!(f, "ontology"),
            MappingSource::Legacy => write!(f, "legacy"),
        }
    }
}

/// One curated or uncurated term instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntity {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub entity_type: EntityType,
    #[serde(default)]
    values: BTreeMap<MappingKey, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_term_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_term_url: Option<String>,
    #[serde(default)]
    pub status: MappingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_type: Option<MappingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MappingSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Candidates from the last matching pass; never persisted.
    #[serde(skip)]
    pub suggestions: Vec<Suggestion>,
}

impl MappingEntity {
    /// Create an unmapped entity, rejecting keys outside the type's schema.
    ///
    /// Empty values are treated as absent.
    pub fn new<I, V>(entity_type: EntityType, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (MappingKey, Option<V>)>,
        V: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in values {
            if !entity_type.has_key(key) {
                return Err(OntomatchError::UnknownMappingKey {
                    entity_type: entity_type.to_string(),
                    key: key.to_string(),
                });
            }
            if let Some(value) = value.map(Into::into)
                && !value.is_empty()
            {
                map.insert(key, value);
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            entity_type,
            values: map,
            mapped_term_label: None,
            mapped_term_url: None,
            status: MappingStatus::Unmapped,
            mapping_type: None,
            source: None,
            updated_at: None,
            suggestions: Vec::new(),
        })
    }

    /// Create an entity from string key names, as supplied by loaders and the CLI.
    pub fn from_named<'a, I>(entity_type: EntityType, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut values = Vec::new();
        for (name, value) in pairs {
            let key = MappingKey::from_str(name).map_err(|_| OntomatchError::UnknownMappingKey {
                entity_type: entity_type.to_string(),
                key: name.to_string(),
            })?;
            values.push((key, value));
        }
        Self::new(entity_type, values)
    }

    /// Check a deserialized record against its type's schema.
    pub fn validate(&self) -> Result<()> {
        match self.values.keys().find(|key| !self.entity_type.has_key(**key)) {
            Some(key) => Err(OntomatchError::UnknownMappingKey {
                entity_type: self.entity_type.to_string(),
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Value for `key`, if present.
    pub fn value(&self, key: MappingKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Values in schema order, absent ones as `None`.
    pub fn ordered_values(&self) -> Vec<Option<&str>> {
        self.entity_type
            .keys()
            .iter()
            .map(|key| self.value(*key))
            .collect()
    }

    /// Populated keys with their values, in schema order.
    pub fn populated(&self) -> impl Iterator<Item = (MappingKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Stable identity hash of this entity.
    pub fn fingerprint(&self) -> String {
        fingerprint::fingerprint(self.entity_type, self.ordered_values())
    }

    /// Whether the entity carries an accepted target term.
    pub fn is_mapped(&self) -> bool {
        self.status == MappingStatus::Mapped && self.mapped_term_url.is_some()
    }

    /// Record a mapping chosen by a human reviewer.
    pub fn apply_manual_mapping(
        &mut self,
        url: impl Into<String>,
        label: impl Into<String>,
        status: MappingStatus,
    ) {
        self.mapped_term_url = Some(url.into());
        self.mapped_term_label = Some(label.into());
        self.status = status;
        self.mapping_type = Some(MappingType::Manual);
        self.suggestions.clear();
        self.touch();
    }

    /// Accept one of the reviewed suggestions as the manual mapping.
    pub fn accept_suggestion(&mut self, suggestion: &Suggestion) {
        let url = suggestion.target_url().to_string();
        let label = suggestion.target_label().to_string();
        self.apply_manual_mapping(url, label, MappingStatus::Mapped);
        self.source = Some(suggestion.source());
    }

    /// Flag the entity as needing a new ontology term.
    pub fn request_term(&mut self) {
        self.status = MappingStatus::Request;
        self.mapping_type = Some(MappingType::Manual);
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
