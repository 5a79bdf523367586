//! Thread ranking and overlap suppression.
//!
//! Candidates are scored, sorted best-first, then taken greedily: a
//! candidate is suppressed when its paper set is a subset of, or overlaps
//! more than the threshold with, an already selected thread.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::miner::ThreadCandidate;
use crate::policy::{score_candidates, ScoreWeights, ScoredCandidate, ThreadPolicyV1};
use crate::types::PaperId;

/// Overlap coefficient: |A ∩ B| / min(|A|, |B|). Zero if either set is empty.
pub fn overlap_coefficient(a: &BTreeSet<&PaperId>, b: &BTreeSet<&PaperId>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / smaller as f64
}

/// A candidate removed by overlap suppression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suppression {
    /// Signature of the suppressed candidate.
    pub signature: String,
    /// Signature of the selected thread it collided with.
    pub suppressed_by: String,
    /// Overlap coefficient with that thread.
    pub overlap: f64,
}

/// Outcome of selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionResult {
    /// Selected threads in rank order.
    pub selected: Vec<ScoredCandidate>,
    /// Candidates removed for overlap, in rank order.
    pub suppressed: Vec<Suppression>,
    /// Candidates never considered because the cap was reached.
    pub truncated: usize,
}

impl SelectionResult {
    /// Whether no thread was selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Scores, orders and selects thread candidates.
#[derive(Debug, Clone)]
pub struct ThreadSelector {
    weights: ScoreWeights,
    max_threads: usize,
    overlap_threshold: f64,
}

impl ThreadSelector {
    /// Create a selector from policy settings.
    pub fn new(policy: &ThreadPolicyV1) -> Self {
        Self {
            weights: policy.weights.clone(),
            max_threads: policy.max_threads,
            overlap_threshold: policy.overlap_threshold,
        }
    }

    /// Score and select from a raw candidate pool.
    ///
    /// An empty pool yields an empty result; that is not an error.
    pub fn rank(&self, candidates: Vec<ThreadCandidate>) -> SelectionResult {
        if candidates.is_empty() {
            tracing::info!("No thread candidates to rank");
            return SelectionResult::default();
        }
        self.select(score_candidates(candidates, &self.weights))
    }

    /// Select from candidates already ordered best-first.
    pub fn select(&self, ranked: Vec<ScoredCandidate>) -> SelectionResult {
        let mut result = SelectionResult::default();
        let total = ranked.len();

        for (position, scored) in ranked.into_iter().enumerate() {
            if result.selected.len() >= self.max_threads {
                result.truncated = total - position;
                break;
            }

            match self.collision(&scored, &result.selected) {
                Some(suppression) => {
                    tracing::debug!(
                        signature = %suppression.signature,
                        suppressed_by = %suppression.suppressed_by,
                        overlap = suppression.overlap,
                        "Suppressing overlapping candidate"
                    );
                    result.suppressed.push(suppression);
                }
                None => result.selected.push(scored),
            }
        }

        tracing::debug!(
            selected = result.selected.len(),
            suppressed = result.suppressed.len(),
            truncated = result.truncated,
            "Selected threads"
        );
        result
    }

    fn collision(&self, scored: &ScoredCandidate, selected: &[ScoredCandidate]) -> Option<Suppression> {
        let papers = scored.candidate.paper_set();
        selected.iter().find_map(|kept| {
            let kept_papers = kept.candidate.paper_set();
            let overlap = overlap_coefficient(&papers, &kept_papers);
            let subset = papers.is_subset(&kept_papers);
            (subset || overlap > self.overlap_threshold).then(|| Suppression {
                signature: scored.candidate.signature.clone(),
                suppressed_by: kept.candidate.signature.clone(),
                overlap,
            })
        })
    }
}
