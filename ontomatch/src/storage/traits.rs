//! Collaborator traits consumed by the matching service

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{EntityType, MappingEntity, OntologyTerm};
use crate::storage::errors::StorageResult;

/// Result of inserting an entity keyed by its fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "id", rename_all = "lowercase")]
pub enum InsertOutcome {
    /// A new record was created
    Inserted(Uuid),
    /// A record with the same fingerprint already exists
    Duplicate(Uuid),
}

impl InsertOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            InsertOutcome::Inserted(id) | InsertOutcome::Duplicate(id) => *id,
        }
    }
}

/// Source and sink of mapping entities.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Entities of `entity_type` still awaiting a mapping
    async fn unmapped(&self, entity_type: EntityType) -> StorageResult<Vec<MappingEntity>>;

    /// Every mapped entity, used as the rule corpus
    async fn mapped_rules(&self) -> StorageResult<Vec<MappingEntity>>;

    /// Get an entity by its ID
    async fn get(&self, id: Uuid) -> StorageResult<Option<MappingEntity>>;

    /// Persist updated entities, returning how many were written
    async fn save(&self, entities: &[MappingEntity]) -> StorageResult<usize>;

    /// Insert an entity unless one with the same fingerprint exists
    async fn insert(&self, entity: MappingEntity) -> StorageResult<InsertOutcome>;
}

/// Read access to the canonical ontology.
#[async_trait]
pub trait OntologyCatalog: Send + Sync {
    /// Snapshot of every ontology term
    async fn terms(&self) -> StorageResult<Vec<OntologyTerm>>;
}
