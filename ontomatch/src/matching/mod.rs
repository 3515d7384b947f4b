//! Automatic matching: suggestions, consensus and batch passes.

pub mod aggregator;
pub mod batch;
pub mod consensus;
pub mod service;

pub use aggregator::{SuggestionEngine, Suggestions, relevance_to_score};
pub use batch::{BatchCounters, BatchReport, BatchSummary, MatchOutcome, TypeSummary, hit_rate};
pub use consensus::{Acceptance, ConsensusResolver, Resolution, UnresolvedReason};
pub use service::{IndexReport, MatchingService};
