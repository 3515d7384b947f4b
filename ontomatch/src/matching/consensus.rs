//! Decides whether an entity's suggestions agree strongly enough to map it.
//!
//! Only the top score band is consulted: every suggestion sharing the highest
//! score at or above the threshold must point at the same target url. A single
//! dissenting suggestion in that band blocks the acceptance, and weaker bands
//! can never break a tie.

use serde::Serialize;

use super::aggregator::Suggestions;
use crate::config::{AcceptancePolicy, MatchingConfig};
use crate::models::{MappingEntity, MappingSource, MappingStatus, MappingType, Suggestion};
use crate::search::SearchError;

/// The target chosen for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acceptance {
    pub url: String,
    pub label: String,
    pub score: u8,
    pub source: MappingSource,
}

/// Why an entity was left for human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Neither corpus returned a candidate
    NoSuggestions,
    /// The best candidate scored under the threshold
    BelowThreshold { best: u8 },
    /// Top-band candidates point at different targets
    Disagreement { urls: Vec<String> },
    /// At least one corpus could not be searched
    SearchFailed {
        #[serde(serialize_with = "serialize_errors")]
        errors: Vec<SearchError>,
    },
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[SearchError],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// Outcome of consensus for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum Resolution {
    Accepted(Acceptance),
    Unresolved(UnresolvedReason),
}

impl Resolution {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Resolution::Accepted(_))
    }
}

/// Stateless acceptance rule applied to suggestion lists.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusResolver {
    threshold: u8,
    policy: AcceptancePolicy,
}

impl ConsensusResolver {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            threshold: config.score_threshold,
            policy: config.acceptance,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn policy(&self) -> AcceptancePolicy {
        self.policy
    }

    /// Resolve an entity from everything its search produced.
    ///
    /// A failed corpus leaves the entity unresolved even if the other corpus
    /// produced a clear winner.
    pub fn resolve(&self, suggestions: &Suggestions) -> Resolution {
        if suggestions.has_failures() {
            return Resolution::Unresolved(UnresolvedReason::SearchFailed {
                errors: suggestions.failures.clone(),
            });
        }
        self.resolve_items(&suggestions.items)
    }

    /// Resolve from a suggestion list alone.
    pub fn resolve_items(&self, items: &[Suggestion]) -> Resolution {
        let Some(best) = items.iter().map(Suggestion::score).max() else {
            return Resolution::Unresolved(UnresolvedReason::NoSuggestions);
        };
        if best < self.threshold {
            return Resolution::Unresolved(UnresolvedReason::BelowThreshold { best });
        }

        let band: Vec<&Suggestion> = items.iter().filter(|s| s.score() == best).collect();
        let mut urls: Vec<String> = Vec::new();
        for suggestion in &band {
            let url = suggestion.target_url();
            if !urls.iter().any(|seen| seen == url) {
                urls.push(url.to_string());
            }
        }

        if urls.len() > 1 {
            return Resolution::Unresolved(UnresolvedReason::Disagreement { urls });
        }

        let chosen = band[0];
        Resolution::Accepted(Acceptance {
            url: chosen.target_url().to_string(),
            label: chosen.target_label().to_string(),
            score: best,
            source: chosen.source(),
        })
    }

    /// Record `resolution` on the entity.
    ///
    /// Accepted entities take the target and a status set by the acceptance
    /// policy. Unresolved entities keep their status and carry the full
    /// suggestion list for review.
    pub fn apply(
        &self,
        entity: &mut MappingEntity,
        resolution: &Resolution,
        suggestions: Vec<Suggestion>,
    ) {
        match resolution {
            Resolution::Accepted(acceptance) => {
                entity.mapped_term_url = Some(acceptance.url.clone());
                entity.mapped_term_label = Some(acceptance.label.clone());
                entity.source = Some(acceptance.source);
                let (status, mapping_type) = match self.policy {
                    AcceptancePolicy::Mapped => {
                        (MappingStatus::Mapped, MappingType::AutomaticMapped)
                    }
                    AcceptancePolicy::Review => {
                        (MappingStatus::Review, MappingType::AutomaticReview)
                    }
                };
                entity.status = status;
                entity.mapping_type = Some(mapping_type);
                entity.suggestions.clear();
            }
            Resolution::Unresolved(_) => {
                entity.mapping_type = Some(MappingType::AutomaticReview);
                entity.suggestions = suggestions;
            }
        }
        entity.touch();
    }
}
