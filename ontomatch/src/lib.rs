//! # ontomatch
//!
//! Automatic harmonization of free-text biomedical terms (sample diagnoses,
//! treatment names) against a canonical ontology.
//!
//! Every unmapped term is searched against two corpora: previously curated
//! mappings ("rules") and the ontology itself. The ranked candidates from both
//! are merged, and a term is mapped automatically only when every candidate in
//! the top score band agrees on the same target above a configured threshold.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ontomatch::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::new().build()?;
//!
//!     let store = Arc::new(InMemoryStore::new().with_terms(vec![OntologyTerm::new(
//!         "NCIT_C3224",
//!         "http://purl.obolibrary.org/obo/NCIT_C3224",
//!         "Melanoma",
//!         "diagnosis",
//!     )]));
//!     let entity = MappingEntity::new(
//!         EntityType::Diagnosis,
//!         [(MappingKey::SampleDiagnosis, Some("Melanoma"))],
//!     )?;
//!     store.insert(entity).await?;
//!
//!     let service = init(config, store.clone(), store).await?;
//!     let report = service.run(&EntityType::ALL).await?;
//!     for summary in &report.summary.types {
//!         println!("{}: {:?}", summary.entity_type, summary.hit_rate);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`fingerprint`]: stable identity of an entity from its type and values
//! - [`search`]: text analysis, query construction and the dual corpus index
//! - [`matching`]: suggestion aggregation, consensus resolution and batches
//! - [`storage`]: collaborator traits plus in-memory and JSON implementations

pub mod config;
pub mod fingerprint;
pub mod logging;
pub mod matching;
pub mod models;
pub mod search;
pub mod storage;

use std::sync::Arc;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::init;

    pub use crate::config::{
        AcceptancePolicy, ConfigBuilder, ConfigLoader, LogFormat, LogLevel, OntomatchConfig,
        SearchConfig,
    };

    pub use crate::models::{
        EntityType, MappingEntity, MappingKey, MappingSource, MappingStatus, MappingType,
        OntologyTerm, Suggestion,
    };

    pub use crate::matching::{
        BatchReport, BatchSummary, ConsensusResolver, MatchingService, Resolution,
        SuggestionEngine, Suggestions, UnresolvedReason,
    };

    pub use crate::search::{DualIndex, SearchError};

    pub use crate::storage::{
        EntityStore, InMemoryStore, InsertOutcome, OntologyCatalog, StorageError,
    };

    pub use crate::{OntomatchError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for ontomatch operations
#[derive(Debug, thiserror::Error)]
pub enum OntomatchError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Error reading or writing entities and terms
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Error executing a search
    #[error("Search error: {0}")]
    Search(#[from] crate::search::SearchError),

    /// Entity type outside the supported set
    #[error("Unknown entity type '{0}'. Supported types are 'diagnosis' and 'treatment'")]
    UnknownEntityType(String),

    /// Key that is not part of the entity type's schema
    #[error("Unknown mapping key '{key}' for entity type '{entity_type}'")]
    UnknownMappingKey { entity_type: String, key: String },

    /// Invalid caller-supplied input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for OntomatchError {
    fn from(err: crate::config::ConfigError) -> Self {
        OntomatchError::Configuration(err.to_string())
    }
}

/// Result type for ontomatch operations
pub type Result<T> = std::result::Result<T, OntomatchError>;

/// Create a matching service and build both corpora from its collaborators.
///
/// Logging is left to the caller (see [`logging::init`]) so that the returned
/// guard can be held for the life of the process.
pub async fn init(
    config: config::OntomatchConfig,
    store: Arc<dyn storage::EntityStore>,
    catalog: Arc<dyn storage::OntologyCatalog>,
) -> Result<matching::MatchingService> {
    config::validate_config(&config)?;

    let service = matching::MatchingService::new(config, store, catalog)?;
    service.rebuild_indexes().await?;

    Ok(service)
}
