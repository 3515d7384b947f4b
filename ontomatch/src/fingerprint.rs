//! Deterministic entity fingerprints.
//!
//! A fingerprint is the lower-case hex SHA-256 of the canonical string
//! `"{type}|{value_1}|...|{value_n}"`, where values follow the type's key order,
//! absent values are empty and everything is lower-cased. Case folding is the only
//! normalization: punctuation and whitespace differences produce different digests.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::models::{EntityType, MappingKey};
use crate::{OntomatchError, Result};

const SEPARATOR: &str = "|";

/// Fingerprint of an entity from its values in schema order.
///
/// Callers must pass exactly one value per schema key; only the keyed variants
/// ([`fingerprint_values`], [`fingerprint_named`]) check values against the schema.
/// A wrong count is caught by a debug assertion.
pub fn fingerprint<I, S>(entity_type: EntityType, ordered_values: I) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut canonical = entity_type.label().to_lowercase();
    let mut count = 0;
    for value in ordered_values {
        count += 1;
        canonical.push_str(SEPARATOR);
        if let Some(value) = value {
            canonical.push_str(&value.as_ref().to_lowercase());
        }
    }
    debug_assert_eq!(
        count,
        entity_type.keys().len(),
        "{} fingerprint expects one value per schema key",
        entity_type
    );

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fingerprint from a keyed map, ordering values by the type's schema.
///
/// Fails if the map contains a key that is not part of the schema.
pub fn fingerprint_values(
    entity_type: EntityType,
    values: &BTreeMap<MappingKey, String>,
) -> Result<String> {
    if let Some(key) = values.keys().find(|key| !entity_type.has_key(**key)) {
        return Err(OntomatchError::UnknownMappingKey {
            entity_type: entity_type.to_string(),
            key: key.to_string(),
        });
    }

    let ordered = entity_type
        .keys()
        .iter()
        .map(|key| values.get(key).map(String::as_str));
    Ok(fingerprint(entity_type, ordered))
}

/// Fingerprint from an entity type label and key names, as received from outside callers.
pub fn fingerprint_named(type_label: &str, pairs: &[(&str, Option<&str>)]) -> Result<String> {
    let entity_type: EntityType = type_label.parse()?;

    let mut values = BTreeMap::new();
    for (name, value) in pairs {
        let key: MappingKey = name.parse().map_err(|_| OntomatchError::UnknownMappingKey {
            entity_type: entity_type.to_string(),
            key: name.to_string(),
        })?;
        if let Some(value) = value {
            values.insert(key, value.to_string());
        }
    }

    fingerprint_values(entity_type, &values)
}
