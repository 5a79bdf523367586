//! Candidate scoring for thread ranking.

use serde::{Deserialize, Serialize};

use super::v1::ScoreWeights;
use crate::canonical::quantize;
use crate::miner::ThreadCandidate;

/// Normalized score components of a candidate.
///
/// Each component is in [0, 1], normalized over the candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// `ln(1 + citations) / ln(1 + max_citations)`.
    pub citation: f64,
    /// `papers / max_papers`.
    pub size: f64,
    /// Fraction of edges matching the dominant relation.
    pub purity: f64,
    /// Weighted mean of the components.
    pub total: f64,
}

/// Pool-wide maxima used for normalization.
#[derive(Debug, Clone, Copy, Default)]
struct PoolMaxima {
    citations: u64,
    papers: usize,
}

/// Compute the score breakdown of one candidate.
///
/// Formula:
/// ```text
/// total = (w_c * citation + w_s * size + w_p * purity) / (w_c + w_s + w_p)
/// ```
fn score(candidate: &ThreadCandidate, maxima: PoolMaxima, weights: &ScoreWeights) -> ScoreBreakdown {
    let citation = if maxima.citations == 0 {
        0.0
    } else {
        (candidate.total_citations as f64).ln_1p() / (maxima.citations as f64).ln_1p()
    };
    let size = if maxima.papers == 0 {
        0.0
    } else {
        candidate.paper_count() as f64 / maxima.papers as f64
    };
    let purity = candidate.relations.purity();

    let weight_sum = weights.total();
    let total = if weight_sum > 0.0 {
        (weights.citation * citation + weights.size * size + weights.purity * purity) / weight_sum
    } else {
        0.0
    };

    ScoreBreakdown {
        citation,
        size,
        purity,
        total,
    }
}

/// Candidate with its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The candidate.
    pub candidate: ThreadCandidate,
    /// Score components.
    pub breakdown: ScoreBreakdown,
    /// Quantized total, used for comparison.
    pub quantized_score: i64,
}

impl ScoredCandidate {
    fn new(candidate: ThreadCandidate, breakdown: ScoreBreakdown) -> Self {
        let quantized_score = quantize(breakdown.total);
        Self {
            candidate,
            breakdown,
            quantized_score,
        }
    }
}

// Ranking order: `Greater` ranks first
impl PartialEq for ScoredCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for ScoredCandidate {}

impl PartialOrd for ScoredCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Primary: higher score
        // Secondary: more citations, then more papers
        // Then chains before stars, then signature for determinism
        self.quantized_score
            .cmp(&other.quantized_score)
            .then_with(|| self.candidate.total_citations.cmp(&other.candidate.total_citations))
            .then_with(|| self.candidate.paper_count().cmp(&other.candidate.paper_count()))
            .then_with(|| other.candidate.pattern().cmp(&self.candidate.pattern()))
            .then_with(|| other.candidate.signature.cmp(&self.candidate.signature))
    }
}

/// Score a candidate pool and return it best-first.
pub fn score_candidates(candidates: Vec<ThreadCandidate>, weights: &ScoreWeights) -> Vec<ScoredCandidate> {
    let maxima = candidates.iter().fold(PoolMaxima::default(), |acc, c| PoolMaxima {
        citations: acc.citations.max(c.total_citations),
        papers: acc.papers.max(c.paper_count()),
    });

    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|c| {
            let breakdown = score(&c, maxima, weights);
            ScoredCandidate::new(c, breakdown)
        })
        .collect();
    scored.sort_by(|a, b| b.cmp(a));
    scored
}
