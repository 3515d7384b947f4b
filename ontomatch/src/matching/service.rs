//! Async front door tying storage, indexes and the matching pass together.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::aggregator::{SuggestionEngine, Suggestions};
use super::batch::{BatchReport, MatchOutcome, match_entity, run_batch};
use super::consensus::ConsensusResolver;
use crate::config::OntomatchConfig;
use crate::models::{EntityType, MappingEntity};
use crate::search::{BuildReport, DualIndex};
use crate::storage::{EntityStore, InsertOutcome, OntologyCatalog};
use crate::{OntomatchError, Result};

/// Result of rebuilding both corpora.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub rules: BuildReport,
    pub ontology: BuildReport,
}

/// Runs matching passes against a store and an ontology catalog.
pub struct MatchingService {
    config: OntomatchConfig,
    index: Arc<DualIndex>,
    engine: Arc<SuggestionEngine>,
    resolver: ConsensusResolver,
    pool: Option<Arc<rayon::ThreadPool>>,
    store: Arc<dyn EntityStore>,
    catalog: Arc<dyn OntologyCatalog>,
}

impl MatchingService {
    /// Create a service with empty indexes.
    ///
    /// A dedicated worker pool is created when `batch.workers` is set.
    pub fn new(
        config: OntomatchConfig,
        store: Arc<dyn EntityStore>,
        catalog: Arc<dyn OntologyCatalog>,
    ) -> Result<Self> {
        let pool = match config.batch.workers {
            Some(workers) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("ontomatch-worker-{}", i))
                    .build()
                    .map_err(|e| OntomatchError::Other(format!("Failed to start workers: {}", e)))?,
            )),
            None => None,
        };

        Ok(Self {
            index: Arc::new(DualIndex::new(&config.search)),
            engine: Arc::new(SuggestionEngine::new(&config.search)),
            resolver: ConsensusResolver::new(&config.matching),
            pool,
            store,
            catalog,
            config,
        })
    }

    pub fn config(&self) -> &OntomatchConfig {
        &self.config
    }

    pub fn index(&self) -> &DualIndex {
        &self.index
    }

    /// Rebuild both corpora from the current mapped rules and ontology terms.
    pub async fn rebuild_indexes(&self) -> Result<IndexReport> {
        let rules = self.store.mapped_rules().await?;
        let terms = self.catalog.terms().await?;
        let index = Arc::clone(&self.index);

        let report = tokio::task::spawn_blocking(move || IndexReport {
            rules: index.rules.build(rules),
            ontology: index.ontology.build(terms),
        })
        .await
        .map_err(|e| OntomatchError::Other(format!("Index build task failed: {}", e)))?;

        info!(
            rules = report.rules.indexed,
            terms = report.ontology.indexed,
            skipped = report.rules.skipped + report.ontology.skipped,
            "Indexes rebuilt"
        );
        Ok(report)
    }

    /// Match every unmapped entity of `types` and persist the results.
    ///
    /// The indexes are built first if they have never been built.
    pub async fn run(&self, types: &[EntityType]) -> Result<BatchReport> {
        if !self.index.is_built() {
            self.rebuild_indexes().await?;
        }

        let mut entities = Vec::new();
        for &entity_type in types {
            let unmapped = self.store.unmapped(entity_type).await?;
            debug!(entity_type = %entity_type, count = unmapped.len(), "Fetched unmapped entities");
            entities.extend(unmapped);
        }
        info!(entities = entities.len(), "Starting matching pass");

        let engine = Arc::clone(&self.engine);
        let index = Arc::clone(&self.index);
        let resolver = self.resolver;
        let pool = self.pool.clone();
        let types = types.to_vec();

        let report = tokio::task::spawn_blocking(move || {
            let job = || run_batch(&engine, &resolver, &index, entities, &types);
            match pool {
                Some(pool) => pool.install(job),
                None => job(),
            }
        })
        .await
        .map_err(|e| OntomatchError::Other(format!("Matching task failed: {}", e)))?;

        let updated: Vec<MappingEntity> = report.entities().cloned().collect();
        let saved = self.store.save(&updated).await?;
        debug!(saved, "Persisted matching results");

        Ok(report)
    }

    /// Ranked suggestions for `entity`, for a review surface.
    pub fn suggest(&self, entity: &MappingEntity) -> Suggestions {
        self.engine.suggest(&self.index, entity)
    }

    /// Match a single entity without persisting it.
    pub fn evaluate(&self, entity: MappingEntity) -> MatchOutcome {
        match_entity(&self.engine, &self.resolver, &self.index, entity)
    }

    /// Store a new entity unless an identical one (by fingerprint) exists.
    pub async fn ingest(&self, entity: MappingEntity) -> Result<InsertOutcome> {
        entity.validate()?;
        let fingerprint = entity.fingerprint();

        let outcome = self.store.insert(entity).await?;
        match outcome {
            InsertOutcome::Inserted(id) => info!(%id, %fingerprint, "Ingested entity"),
            InsertOutcome::Duplicate(id) => {
                debug!(%id, %fingerprint, "Entity already present")
            }
        }
        Ok(outcome)
    }
}
