use ontomatch::OntomatchError;
use ontomatch::config::{LogLevel, LoggingConfig};
use ontomatch::models::{EntityType, MappingEntity};

/// Logging settings for one invocation: `--quiet` (or json output) keeps only
/// errors and `--verbose` raises the level to debug.
pub fn cli_logging(base: &LoggingConfig, verbose: bool, quiet: bool) -> LoggingConfig {
    let level = if quiet {
        LogLevel::Error
    } else if verbose {
        LogLevel::Debug
    } else {
        base.level
    };
    LoggingConfig {
        level,
        ..base.clone()
    }
}

/// Split `KEY=VALUE` arguments. An empty value counts as absent.
pub fn parse_pairs(pairs: &[String]) -> ontomatch::Result<Vec<(&str, Option<&str>)>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                OntomatchError::InvalidInput(format!("Expected KEY=VALUE, got '{}'", pair))
            })?;
            let value = Some(value.trim()).filter(|v| !v.is_empty());
            Ok((key.trim(), value))
        })
        .collect()
}

pub fn parse_entity(entity_type: &str, pairs: &[String]) -> ontomatch::Result<MappingEntity> {
    let entity_type: EntityType = entity_type.parse()?;
    MappingEntity::from_named(entity_type, parse_pairs(pairs)?)
}

/// Parse `--type` values; none means every type.
pub fn parse_types(types: &[String]) -> ontomatch::Result<Vec<EntityType>> {
    if types.is_empty() {
        return Ok(EntityType::ALL.to_vec());
    }

    let mut parsed: Vec<EntityType> = Vec::with_capacity(types.len());
    for name in types {
        let entity_type = name.parse()?;
        if !parsed.contains(&entity_type) {
            parsed.push(entity_type);
        }
    }
    Ok(parsed)
}
