//! Storage collaborators for the matching engine.
//!
//! The engine only depends on the [`EntityStore`] and [`OntologyCatalog`]
//! traits. [`InMemoryStore`] implements both and [`json`] moves records between
//! files and memory.

pub mod errors;
pub mod json;
pub mod memory;
pub mod traits;

pub use errors::{StorageError, StorageResult};
pub use memory::InMemoryStore;
pub use traits::{EntityStore, InsertOutcome, OntologyCatalog};
