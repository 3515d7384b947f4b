//! Domain model: mapping entities, ontology terms and suggestions.

mod entity;
mod ontology;
mod suggestion;

pub use entity::{
    EntityType, KeyKind, MappingEntity, MappingKey, MappingSource, MappingStatus, MappingType,
};
pub use ontology::OntologyTerm;
pub use suggestion::{OntologySuggestion, RuleSuggestion, Suggestion};
