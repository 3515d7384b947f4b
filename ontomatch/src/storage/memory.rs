//! In-memory entity store and ontology catalog

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{EntityType, MappingEntity, MappingStatus, OntologyTerm};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::traits::{EntityStore, InsertOutcome, OntologyCatalog};

#[derive(Debug, Default)]
struct Entities {
    records: Vec<MappingEntity>,
    by_id: HashMap<Uuid, usize>,
    by_fingerprint: HashMap<String, usize>,
}

impl Entities {
    fn insert(&mut self, entity: MappingEntity) -> StorageResult<InsertOutcome> {
        entity
            .validate()
            .map_err(|e| StorageError::Validation(e.to_string()))?;

        let fingerprint = entity.fingerprint();
        if let Some(&position) = self.by_fingerprint.get(&fingerprint) {
            return Ok(InsertOutcome::Duplicate(self.records[position].id));
        }
        if self.by_id.contains_key(&entity.id) {
            return Err(StorageError::Validation(format!(
                "Entity id {} is already taken by a different record",
                entity.id
            )));
        }

        let id = entity.id;
        let position = self.records.len();
        self.records.push(entity);
        self.by_id.insert(id, position);
        self.by_fingerprint.insert(fingerprint, position);
        Ok(InsertOutcome::Inserted(id))
    }
}

/// Entity store and ontology catalog kept entirely in memory.
///
/// Entities are deduplicated by fingerprint and returned in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entities: RwLock<Entities>,
    terms: RwLock<Vec<OntologyTerm>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the ontology catalog.
    pub fn with_terms(self, terms: Vec<OntologyTerm>) -> Self {
        Self {
            entities: self.entities,
            terms: RwLock::new(terms),
        }
    }

    /// Insert many entities, returning one outcome per entity.
    pub async fn insert_all(
        &self,
        entities: impl IntoIterator<Item = MappingEntity>,
    ) -> StorageResult<Vec<InsertOutcome>> {
        let mut guard = self.entities.write().await;
        entities
            .into_iter()
            .map(|entity| guard.insert(entity))
            .collect()
    }

    /// Snapshot of every stored entity in insertion order.
    pub async fn entities(&self) -> Vec<MappingEntity> {
        self.entities.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn unmapped(&self, entity_type: EntityType) -> StorageResult<Vec<MappingEntity>> {
        let guard = self.entities.read().await;
        Ok(guard
            .records
            .iter()
            .filter(|e| e.entity_type == entity_type && e.status == MappingStatus::Unmapped)
            .cloned()
            .collect())
    }

    async fn mapped_rules(&self) -> StorageResult<Vec<MappingEntity>> {
        let guard = self.entities.read().await;
        Ok(guard
            .records
            .iter()
            .filter(|e| e.is_mapped())
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> StorageResult<Option<MappingEntity>> {
        let guard = self.entities.read().await;
        Ok(guard.by_id.get(&id).map(|&position| guard.records[position].clone()))
    }

    async fn save(&self, entities: &[MappingEntity]) -> StorageResult<usize> {
        let mut guard = self.entities.write().await;
        for entity in entities {
            let position = *guard
                .by_id
                .get(&entity.id)
                .ok_or_else(|| StorageError::NotFound(format!("Entity {}", entity.id)))?;
            guard.records[position] = entity.clone();
        }
        debug!(count = entities.len(), "Saved entities");
        Ok(entities.len())
    }

    async fn insert(&self, entity: MappingEntity) -> StorageResult<InsertOutcome> {
        self.entities.write().await.insert(entity)
    }
}

#[async_trait]
impl OntologyCatalog for InMemoryStore {
    async fn terms(&self) -> StorageResult<Vec<OntologyTerm>> {
        Ok(self.terms.read().await.clone())
    }
}
