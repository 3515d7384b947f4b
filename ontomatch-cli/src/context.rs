use ontomatch::prelude::*;
use ontomatch::storage::json;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub struct OntomatchCliContext {
    pub config: OntomatchConfig,
}

impl OntomatchCliContext {
    /// Load configuration from the default locations, an optional explicit
    /// file and the environment, in that order.
    pub fn new(config_path: Option<&Path>) -> ontomatch::Result<Self> {
        let mut loader = ConfigLoader::new();
        loader.load_default_files();
        if let Some(path) = config_path {
            loader.load_file(path)?;
        }
        loader.load_env();

        Ok(Self {
            config: loader.extract()?,
        })
    }

    pub fn from_config(config: OntomatchConfig) -> Self {
        Self { config }
    }

    /// Build a service over an in-memory store seeded from JSON files.
    pub async fn service(
        &self,
        config: OntomatchConfig,
        entities: Option<&Path>,
        ontology: &Path,
    ) -> ontomatch::Result<(MatchingService, Arc<InMemoryStore>)> {
        let terms = json::load_terms(ontology).await?;
        let store = Arc::new(InMemoryStore::new().with_terms(terms));

        if let Some(path) = entities {
            let outcomes = store.insert_all(json::load_entities(path).await?).await?;
            let duplicates = outcomes
                .iter()
                .filter(|outcome| matches!(outcome, InsertOutcome::Duplicate(_)))
                .count();
            if duplicates > 0 {
                warn!(duplicates, path = %path.display(), "Dropped duplicate entities");
            }
        }

        let service = ontomatch::init(config, store.clone(), store.clone()).await?;
        Ok((service, store))
    }
}
