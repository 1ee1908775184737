//! Candidate ranking
//!
//! Combines per-type similarity search hits with the query analysis and
//! the user's normalized preference profile into composite-scored, sorted
//! candidate lists. Scoring problems never fail the request: the ranker
//! falls back to similarity-only ordering for all types and flags the
//! result set as degraded.

use serde::{Deserialize, Serialize};

use crate::analysis::QueryAnalysis;
use crate::models::{EntityType, NormalizedProfile, TravelEntity};

use super::calculator::ScoreCalculator;
use super::scoring::{CriterionScores, RankingWeights, ScoreLabel};
use super::{MultiSearchResults, SearchHit};

/// One candidate with its criterion scores and composite score
///
/// Immutable once computed; recomputed fresh per request, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The candidate entity
    pub entity: TravelEntity,

    /// Raw similarity from vector search, if the candidate came from one
    pub similarity: Option<f32>,

    /// The six criterion scores
    pub scores: CriterionScores,

    /// Weighted sum of the criterion scores
    pub composite_score: f32,
}

/// Ranked candidates per entity type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankedResults {
    pub destinations: Vec<ScoredCandidate>,
    pub properties: Vec<ScoredCandidate>,
    pub categories: Vec<ScoredCandidate>,
    pub amenities: Vec<ScoredCandidate>,

    /// Set when scoring failed and ordering fell back to raw similarity
    pub degraded: bool,
}

impl RankedResults {
    /// The ranked list for one entity type
    pub fn for_type(&self, entity_type: EntityType) -> &[ScoredCandidate] {
        match entity_type {
            EntityType::Destination => &self.destinations,
            EntityType::Property => &self.properties,
            EntityType::Category => &self.categories,
            EntityType::Amenity => &self.amenities,
        }
    }

    /// Whether every list is empty
    pub fn is_empty(&self) -> bool {
        EntityType::ALL.iter().all(|t| self.for_type(*t).is_empty())
    }
}

/// Per-criterion labels plus the raw composite for one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub semantic_similarity: ScoreLabel,
    pub user_preference: ScoreLabel,
    pub popularity: ScoreLabel,
    pub budget_match: ScoreLabel,
    pub temporal_relevance: ScoreLabel,
    pub availability: ScoreLabel,
    pub composite_score: f32,
}

impl ScoreExplanation {
    /// Human-readable one-line-per-criterion rendering
    pub fn summary(&self) -> String {
        format!(
            "similarity: {} | preference: {} | popularity: {} | budget: {} | season: {} | availability: {} | composite: {:.3}",
            self.semantic_similarity,
            self.user_preference,
            self.popularity,
            self.budget_match,
            self.temporal_relevance,
            self.availability,
            self.composite_score,
        )
    }
}

/// Ranks similarity-search candidates by composite score
#[derive(Debug, Clone)]
pub struct Ranker {
    calculator: ScoreCalculator,
}

impl Ranker {
    /// Create a ranker with the given weights
    ///
    /// Returns an error if the weights are invalid.
    pub fn new(weights: RankingWeights) -> std::result::Result<Self, String> {
        Ok(Self {
            calculator: ScoreCalculator::try_new(weights)?,
        })
    }

    /// Rank all entity types.
    ///
    /// Candidates are sorted by composite score descending within each
    /// type; the sort is stable, so equal composites preserve the
    /// similarity-search order. If scoring any candidate fails, all types
    /// fall back to raw similarity ordering and `degraded` is set.
    pub fn rank(
        &self,
        results: &MultiSearchResults,
        analysis: &QueryAnalysis,
        profile: Option<&NormalizedProfile>,
    ) -> RankedResults {
        match self.try_rank(results, analysis, profile) {
            Ok(ranked) => ranked,
            Err(e) => {
                tracing::error!(error = %e, "Ranking failed; falling back to similarity-only ordering");
                self.rank_by_similarity(results)
            }
        }
    }

    fn try_rank(
        &self,
        results: &MultiSearchResults,
        analysis: &QueryAnalysis,
        profile: Option<&NormalizedProfile>,
    ) -> crate::Result<RankedResults> {
        let mut ranked = RankedResults::default();
        for entity_type in EntityType::ALL {
            let scored = self.rank_type(results.for_type(entity_type), analysis, profile)?;
            *ranked_slot(&mut ranked, entity_type) = scored;
        }
        Ok(ranked)
    }

    fn rank_type(
        &self,
        hits: &[SearchHit],
        analysis: &QueryAnalysis,
        profile: Option<&NormalizedProfile>,
    ) -> crate::Result<Vec<ScoredCandidate>> {
        let mut candidates = Vec::with_capacity(hits.len());
        for hit in hits {
            let scores = self.calculator.score_candidate(
                &hit.entity,
                Some(hit.similarity),
                analysis,
                profile,
            )?;
            candidates.push(ScoredCandidate {
                entity: hit.entity.clone(),
                similarity: Some(hit.similarity),
                composite_score: scores.composite(self.calculator.weights()),
                scores,
            });
        }

        // Stable: ties keep the similarity-search order.
        candidates.sort_by(|a, b| {
            b.composite_score
                .partial_cmp(&a.composite_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(candidates)
    }

    /// Similarity-only fallback ordering used when scoring fails
    fn rank_by_similarity(&self, results: &MultiSearchResults) -> RankedResults {
        let mut ranked = RankedResults {
            degraded: true,
            ..Default::default()
        };

        for entity_type in EntityType::ALL {
            let mut candidates: Vec<ScoredCandidate> = results
                .for_type(entity_type)
                .iter()
                .map(|hit| {
                    let scores = CriterionScores {
                        semantic_similarity: hit.similarity,
                        ..CriterionScores::neutral()
                    };
                    ScoredCandidate {
                        entity: hit.entity.clone(),
                        similarity: Some(hit.similarity),
                        composite_score: hit.similarity,
                        scores,
                    }
                })
                .collect();
            candidates.sort_by(|a, b| {
                b.composite_score
                    .partial_cmp(&a.composite_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            *ranked_slot(&mut ranked, entity_type) = candidates;
        }

        ranked
    }

    /// Explain a scored candidate with the fixed score-range buckets
    pub fn explain(&self, candidate: &ScoredCandidate) -> ScoreExplanation {
        ScoreExplanation {
            semantic_similarity: ScoreLabel::from_score(candidate.scores.semantic_similarity),
            user_preference: ScoreLabel::from_score(candidate.scores.user_preference),
            popularity: ScoreLabel::from_score(candidate.scores.popularity),
            budget_match: ScoreLabel::from_score(candidate.scores.budget_match),
            temporal_relevance: ScoreLabel::from_score(candidate.scores.temporal_relevance),
            availability: ScoreLabel::from_score(candidate.scores.availability),
            composite_score: candidate.composite_score,
        }
    }
}

fn ranked_slot(ranked: &mut RankedResults, entity_type: EntityType) -> &mut Vec<ScoredCandidate> {
    match entity_type {
        EntityType::Destination => &mut ranked.destinations,
        EntityType::Property => &mut ranked.properties,
        EntityType::Category => &mut ranked.categories,
        EntityType::Amenity => &mut ranked.amenities,
    }
}
