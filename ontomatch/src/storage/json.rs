//! JSON file import and export.
//!
//! Entities and ontology terms are stored as JSON arrays. Entity records may
//! omit their `id`; a fresh one is assigned on load.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

use crate::models::{MappingEntity, OntologyTerm};
use crate::storage::errors::{StorageError, StorageResult};

async fn read_array<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.display().to_string())
        } else {
            StorageError::Io(e)
        }
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load mapping entities, rejecting records with keys outside their type's schema.
pub async fn load_entities(path: impl AsRef<Path>) -> StorageResult<Vec<MappingEntity>> {
    let path = path.as_ref();
    let entities: Vec<MappingEntity> = read_array(path).await?;
    for entity in &entities {
        entity
            .validate()
            .map_err(|e| StorageError::Validation(format!("{}: {}", path.display(), e)))?;
    }

    info!(path = %path.display(), count = entities.len(), "Loaded entities");
    Ok(entities)
}

/// Load ontology terms.
pub async fn load_terms(path: impl AsRef<Path>) -> StorageResult<Vec<OntologyTerm>> {
    let path = path.as_ref();
    let terms: Vec<OntologyTerm> = read_array(path).await?;

    info!(path = %path.display(), count = terms.len(), "Loaded ontology terms");
    Ok(terms)
}

/// Write entities as a pretty-printed JSON array, creating parent directories.
pub async fn write_entities(path: impl AsRef<Path>, entities: &[MappingEntity]) -> StorageResult<()> {
    write_array(path.as_ref(), entities).await
}

async fn write_array<T: Serialize>(path: &Path, items: &[T]) -> StorageResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(items)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityType, MappingKey, MappingStatus};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_entities_without_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entities.json");
        std::fs::write(
            &path,
            r#"[
                {"entity_type": "treatment", "values": {"treatment_name": "CDDP", "data_source": "JAX"}},
                {"entity_type": "diagnosis", "values": {"sample_diagnosis": "Melanoma"},
                 "status": "mapped", "mapped_term_url": "http://x/C3224", "mapped_term_label": "Melanoma"}
            ]"#,
        )
        .unwrap();

        let entities = load_entities(&path).await.unwrap();
        assert_eq!(entities.len(), 2);
        assert_ne!(entities[0].id, entities[1].id);
        assert_eq!(entities[0].value(MappingKey::TreatmentName), Some("CDDP"));
        assert_eq!(entities[1].status, MappingStatus::Mapped);
    }

    #[tokio::test]
    async fn test_load_rejects_foreign_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entities.json");
        std::fs::write(
            &path,
            r#"[{"entity_type": "treatment", "values": {"tumor_type": "Primary"}}]"#,
        )
        .unwrap();

        assert!(matches!(
            load_entities(&path).await,
            Err(StorageError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_terms(dir.path().join("absent.json")).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("entities.json");
        let mut entity = MappingEntity::new(
            EntityType::Diagnosis,
            [(MappingKey::SampleDiagnosis, Some("Melanoma"))],
        )
        .unwrap();
        entity.apply_manual_mapping("http://x/C3224", "Melanoma", MappingStatus::Mapped);

        write_entities(&path, std::slice::from_ref(&entity)).await.unwrap();
        let loaded = load_entities(&path).await.unwrap();
        assert_eq!(loaded[0].id, entity.id);
        assert_eq!(loaded[0].fingerprint(), entity.fingerprint());
        assert!(loaded[0].is_mapped());
    }
}
