//! Thread mining over the pruned strong-relation view.
//!
//! Generates every chain and star candidate deterministically; selection
//! is the ranker's job. Candidates are returned chains first, then stars,
//! each in discovery order.

pub mod candidate;
mod chain;
mod star;

use std::collections::BTreeSet;

pub use candidate::{CandidateShape, Hop, RelationCounts, Route, ThreadCandidate, ThreadPattern};

use crate::policy::ThreadPolicyV1;
use crate::pruner::PrunedGraph;
use crate::types::PaperId;

/// Error type for mining.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MiningError {
    /// A candidate violates a structural invariant. This is a defect.
    #[error("Invariant violation in {signature}: {reason}")]
    InvariantViolation {
        /// Signature of the offending candidate.
        signature: String,
        /// What was violated.
        reason: String,
    },
}

/// Chain and star discovery.
#[derive(Debug, Clone)]
pub struct ThreadMiner {
    min_chain_length: usize,
    min_star_branches: usize,
    max_route_depth: usize,
}

impl ThreadMiner {
    /// Create a miner from policy thresholds.
    pub fn new(policy: &ThreadPolicyV1) -> Self {
        Self {
            min_chain_length: policy.min_chain_length,
            min_star_branches: policy.min_star_branches,
            max_route_depth: policy.max_route_depth,
        }
    }

    /// Mine all candidates from a pruned view.
    ///
    /// Every candidate is checked before being returned; a violation fails
    /// the whole run rather than producing a corrupted thread.
    pub fn mine(&self, view: &PrunedGraph<'_>) -> Result<Vec<ThreadCandidate>, MiningError> {
        let chains = chain::mine_chains(view, self.min_chain_length);
        let stars = star::mine_stars(view, self.min_star_branches, self.max_route_depth);
        tracing::debug!(chains = chains.len(), stars = stars.len(), "Mined thread candidates");

        let candidates: Vec<ThreadCandidate> = chains.into_iter().chain(stars).collect();
        for candidate in &candidates {
            if let Err(err) = self.check(candidate, view) {
                tracing::error!(error = %err, "Rejecting mining run");
                return Err(err);
            }
        }
        Ok(candidates)
    }

    /// Verify the structural invariants of a candidate.
    pub fn check(&self, candidate: &ThreadCandidate, view: &PrunedGraph<'_>) -> Result<(), MiningError> {
        let violation = |reason: String| MiningError::InvariantViolation {
            signature: candidate.signature.clone(),
            reason,
        };
        let graph = view.graph();

        for hop in candidate.hops() {
            for id in [&hop.source, &hop.target] {
                if !view.contains(id) {
                    return Err(violation(format!("paper {id} is outside the pruned view")));
                }
            }
            if !hop.relation_type.is_strong()
                || graph.strong_relation(&hop.source, &hop.target).is_none()
            {
                return Err(violation(format!(
                    "hop {} -> {} is not a strong relation",
                    hop.source, hop.target
                )));
            }
        }

        match &candidate.shape {
            CandidateShape::Chain { hops } => {
                if hops.is_empty() || hops.len() < self.min_chain_length {
                    return Err(violation(format!("chain shorter than {}", self.min_chain_length)));
                }
                if hops.windows(2).any(|w| w[0].target != w[1].source) {
                    return Err(violation("chain hops are not consecutive".to_string()));
                }
                let mut seen = BTreeSet::new();
                let sequence = std::iter::once(&hops[0].source).chain(hops.iter().map(|h| &h.target));
                if let Some(id) = first_repeat(sequence, &mut seen) {
                    return Err(violation(format!("chain revisits {id}")));
                }
            }
            CandidateShape::Star { hub, routes } => {
                let branches: BTreeSet<&PaperId> =
                    routes.iter().filter_map(|r| r.hops.first().map(|h| &h.target)).collect();
                if branches.len() < self.min_star_branches || branches.len() != routes.len() {
                    return Err(violation(format!(
                        "star has {} distinct branches over {} routes",
                        branches.len(),
                        routes.len()
                    )));
                }
                for route in routes {
                    if route.hops.is_empty() || route.depth() > self.max_route_depth {
                        return Err(violation(format!("route depth {} out of range", route.depth())));
                    }
                    if &route.hops[0].source != hub
                        || route.hops.windows(2).any(|w| w[0].target != w[1].source)
                    {
                        return Err(violation("route is not anchored at the hub".to_string()));
                    }
                    let mut seen = BTreeSet::new();
                    if let Some(id) = first_repeat(std::iter::once(hub).chain(route.papers()), &mut seen) {
                        return Err(violation(format!("route revisits {id}")));
                    }
                }
            }
        }
        Ok(())
    }
}

fn first_repeat<'a, I>(ids: I, seen: &mut BTreeSet<&'a PaperId>) -> Option<&'a PaperId>
where
    I: IntoIterator<Item = &'a PaperId>,
{
    ids.into_iter().find(|id| !seen.insert(*id))
}
