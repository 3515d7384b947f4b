//! Parallel matching passes and their counters.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::aggregator::SuggestionEngine;
use super::consensus::{ConsensusResolver, Resolution};
use crate::models::{EntityType, MappingEntity};
use crate::search::DualIndex;

/// Per-type tallies of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TypeCounters {
    processed: u64,
    auto_mapped: u64,
}

/// Counters accumulated by one worker and merged at the end of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchCounters {
    by_type: BTreeMap<EntityType, TypeCounters>,
}

impl BatchCounters {
    pub fn record(&mut self, entity_type: EntityType, accepted: bool) {
        let counters = self.by_type.entry(entity_type).or_default();
        counters.processed += 1;
        if accepted {
            counters.auto_mapped += 1;
        }
    }

    pub fn merge(mut self, other: BatchCounters) -> Self {
        for (entity_type, counters) in other.by_type {
            let mine = self.by_type.entry(entity_type).or_default();
            mine.processed += counters.processed;
            mine.auto_mapped += counters.auto_mapped;
        }
        self
    }

    pub fn processed(&self, entity_type: EntityType) -> u64 {
        self.by_type
            .get(&entity_type)
            .map(|c| c.processed)
            .unwrap_or(0)
    }

    pub fn auto_mapped(&self, entity_type: EntityType) -> u64 {
        self.by_type
            .get(&entity_type)
            .map(|c| c.auto_mapped)
            .unwrap_or(0)
    }

    /// Summarize `types`, including types that saw no entities.
    pub fn summary(&self, types: &[EntityType]) -> BatchSummary {
        let types = types
            .iter()
            .map(|&entity_type| {
                let processed = self.processed(entity_type);
                let auto_mapped = self.auto_mapped(entity_type);
                TypeSummary {
                    entity_type,
                    processed,
                    auto_mapped,
                    hit_rate: hit_rate(auto_mapped, processed),
                }
            })
            .collect();
        BatchSummary { types }
    }
}

/// Percentage of processed entities mapped automatically, rounded down.
///
/// `None` when nothing was processed.
pub fn hit_rate(auto_mapped: u64, processed: u64) -> Option<u64> {
    (auto_mapped * 100).checked_div(processed)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub entity_type: EntityType,
    pub processed: u64,
    pub auto_mapped: u64,
    pub hit_rate: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub types: Vec<TypeSummary>,
}

impl BatchSummary {
    pub fn get(&self, entity_type: EntityType) -> Option<&TypeSummary> {
        self.types.iter().find(|s| s.entity_type == entity_type)
    }
}

/// An entity after matching, with the decision that was applied to it.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub entity: MappingEntity,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Outcomes in input order
    pub outcomes: Vec<MatchOutcome>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn entities(&self) -> impl Iterator<Item = &MappingEntity> {
        self.outcomes.iter().map(|outcome| &outcome.entity)
    }
}

/// Match one entity: search, resolve, and apply the decision.
pub fn match_entity(
    engine: &SuggestionEngine,
    resolver: &ConsensusResolver,
    index: &DualIndex,
    mut entity: MappingEntity,
) -> MatchOutcome {
    let suggestions = engine.suggest(index, &entity);
    let resolution = resolver.resolve(&suggestions);
    debug!(entity = %entity.id, resolution = ?resolution, "Resolved entity");

    resolver.apply(&mut entity, &resolution, suggestions.items);
    MatchOutcome { entity, resolution }
}

/// Match every entity in parallel.
///
/// Each worker keeps its own [`BatchCounters`]; they are merged once all
/// entities are done. The summary covers `types` in the given order.
pub fn run_batch(
    engine: &SuggestionEngine,
    resolver: &ConsensusResolver,
    index: &DualIndex,
    entities: Vec<MappingEntity>,
    types: &[EntityType],
) -> BatchReport {
    let total = entities.len();

    let (outcomes, counters) = entities
        .into_par_iter()
        .map(|entity| match_entity(engine, resolver, index, entity))
        .fold(
            || (Vec::new(), BatchCounters::default()),
            |(mut outcomes, mut counters), outcome| {
                counters.record(outcome.entity.entity_type, outcome.resolution.is_accepted());
                outcomes.push(outcome);
                (outcomes, counters)
            },
        )
        .reduce(
            || (Vec::new(), BatchCounters::default()),
            |(mut left, left_counters), (right, right_counters)| {
                left.extend(right);
                (left, left_counters.merge(right_counters))
            },
        );

    let summary = counters.summary(types);
    for entry in &summary.types {
        info!(
            entity_type = %entry.entity_type,
            processed = entry.processed,
            auto_mapped = entry.auto_mapped,
            hit_rate = ?entry.hit_rate,
            "Matching pass complete"
        );
    }
    debug!(total, "Batch finished");

    BatchReport { outcomes, summary }
}
