//! Candidate thread structures produced by the miner.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::graph::CitationGraph;
use crate::types::{PaperId, RelationType};

/// Structural pattern of a thread.
///
/// `Chain` orders before `Star` when all scores tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadPattern {
    /// Linear evolution.
    Chain,
    /// Branching evolution from a hub.
    Star,
}

impl ThreadPattern {
    /// Short machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::Star => "star",
        }
    }

    /// Display name used in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Chain => "The Chain",
            Self::Star => "The Star",
        }
    }
}

impl std::fmt::Display for ThreadPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One strong edge traversed by a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    /// Source paper.
    pub source: PaperId,
    /// Target paper.
    pub target: PaperId,
    /// Relation type used for this hop.
    pub relation_type: RelationType,
}

impl Hop {
    /// Create a new hop.
    pub fn new(source: PaperId, target: PaperId, relation_type: RelationType) -> Self {
        Self {
            source,
            target,
            relation_type,
        }
    }
}

/// One branch of a star, starting at the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Hops from the hub outward. Never empty.
    pub hops: Vec<Hop>,
}

impl Route {
    /// Relation type of the first hop (the branch relation).
    pub fn branch_relation(&self) -> Option<&RelationType> {
        self.hops.first().map(|h| &h.relation_type)
    }

    /// Papers along the route, excluding the hub.
    pub fn papers(&self) -> impl Iterator<Item = &PaperId> {
        self.hops.iter().map(|h| &h.target)
    }

    /// Number of edges.
    pub fn depth(&self) -> usize {
        self.hops.len()
    }
}

/// Shape of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateShape {
    /// Ordered relation chain.
    Chain {
        /// Consecutive hops.
        hops: Vec<Hop>,
    },
    /// Hub plus routes.
    Star {
        /// Hub paper.
        hub: PaperId,
        /// Routes in deterministic order.
        routes: Vec<Route>,
    },
}

/// Count per relation type along a candidate's edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationCounts(BTreeMap<RelationType, usize>);

impl RelationCounts {
    /// Increment count for a relation type.
    pub fn increment(&mut self, relation_type: &RelationType) {
        *self.0.entry(relation_type.clone()).or_default() += 1;
    }

    /// Total count across all types.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Count for one relation type.
    pub fn get(&self, relation_type: &RelationType) -> usize {
        self.0.get(relation_type).copied().unwrap_or(0)
    }

    /// Get the dominant relation (most occurrences).
    ///
    /// Ties are broken by relation priority; the map iterates in priority
    /// order, so the first maximum wins.
    pub fn dominant(&self) -> Option<&RelationType> {
        let mut best: Option<(&RelationType, usize)> = None;
        for (relation_type, &count) in &self.0 {
            if count == 0 {
                continue;
            }
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((relation_type, count)),
            }
        }
        best.map(|(r, _)| r)
    }

    /// Fraction of edges matching the dominant relation (0 when empty).
    pub fn purity(&self) -> f64 {
        let total = self.total();
        match self.dominant() {
            Some(dominant) if total > 0 => self.get(dominant) as f64 / total as f64,
            _ => 0.0,
        }
    }

    /// Iterate counts in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&RelationType, usize)> {
        self.0.iter().map(|(r, &c)| (r, c))
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<RelationType, usize> {
        &self.0
    }
}

impl<'a> FromIterator<&'a RelationType> for RelationCounts {
    fn from_iter<I: IntoIterator<Item = &'a RelationType>>(iter: I) -> Self {
        let mut counts = Self::default();
        for relation_type in iter {
            counts.increment(relation_type);
        }
        counts
    }
}

/// A discovered chain or star before ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadCandidate {
    /// Structure of the candidate.
    pub shape: CandidateShape,
    /// Participating papers, each once, in structural order.
    pub papers: Vec<PaperId>,
    /// Sum of citation counts over `papers`.
    pub total_citations: u64,
    /// Relation distribution along the candidate's edges.
    pub relations: RelationCounts,
    /// Structural signature, e.g. `A→B→C` or `S→{A,B→D}`.
    pub signature: String,
}

impl ThreadCandidate {
    /// Build a chain candidate from consecutive hops.
    pub fn chain(hops: Vec<Hop>, graph: &CitationGraph) -> Self {
        let sequence: Vec<PaperId> = hops
            .first()
            .map(|h| h.source.clone())
            .into_iter()
            .chain(hops.iter().map(|h| h.target.clone()))
            .collect();
        let signature = sequence
            .iter()
            .map(PaperId::as_str)
            .collect::<Vec<_>>()
            .join("→");
        let relations = hops.iter().map(|h| &h.relation_type).collect();
        Self::assemble(CandidateShape::Chain { hops }, sequence, relations, signature, graph)
    }

    /// Build a star candidate from a hub and its routes.
    pub fn star(hub: PaperId, routes: Vec<Route>, graph: &CitationGraph) -> Self {
        let sequence: Vec<PaperId> = std::iter::once(hub.clone())
            .chain(routes.iter().flat_map(|r| r.papers().cloned()))
            .collect();
        let branches: Vec<String> = routes
            .iter()
            .map(|r| r.papers().map(PaperId::as_str).collect::<Vec<_>>().join("→"))
            .collect();
        let signature = format!("{}→{{{}}}", hub, branches.join(","));
        let relations = routes
            .iter()
            .flat_map(|r| r.hops.iter().map(|h| &h.relation_type))
            .collect();
        Self::assemble(CandidateShape::Star { hub, routes }, sequence, relations, signature, graph)
    }

    fn assemble(
        shape: CandidateShape,
        sequence: Vec<PaperId>,
        relations: RelationCounts,
        signature: String,
        graph: &CitationGraph,
    ) -> Self {
        let mut seen = BTreeSet::new();
        let papers: Vec<PaperId> = sequence
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        let total_citations = papers
            .iter()
            .fold(0u64, |acc, id| acc.saturating_add(graph.citations(id)));
        Self {
            shape,
            papers,
            total_citations,
            relations,
            signature,
        }
    }

    /// Pattern of this candidate.
    pub fn pattern(&self) -> ThreadPattern {
        match self.shape {
            CandidateShape::Chain { .. } => ThreadPattern::Chain,
            CandidateShape::Star { .. } => ThreadPattern::Star,
        }
    }

    /// All hops, chain order or route by route.
    pub fn hops(&self) -> Box<dyn Iterator<Item = &Hop> + '_> {
        match &self.shape {
            CandidateShape::Chain { hops } => Box::new(hops.iter()),
            CandidateShape::Star { routes, .. } => Box::new(routes.iter().flat_map(|r| r.hops.iter())),
        }
    }

    /// Number of distinct papers.
    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.relations.total()
    }

    /// Dominant relation of the candidate.
    pub fn dominant_relation(&self) -> Option<&RelationType> {
        self.relations.dominant()
    }

    /// Paper set for overlap computations.
    pub fn paper_set(&self) -> BTreeSet<&PaperId> {
        self.papers.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Paper;

    fn graph() -> CitationGraph {
        CitationGraph::from_parts(
            ["S", "A", "B", "C", "D"]
                .iter()
                .enumerate()
                .map(|(i, id)| Paper::new(*id, *id, None, (i as u64 + 1) * 10, false)),
            Vec::new(),
        )
    }

    fn hop(s: &str, t: &str, r: RelationType) -> Hop {
        Hop::new(PaperId::new(s), PaperId::new(t), r)
    }

    #[test]
    fn test_dominant_tie_broken_by_priority() {
        let counts: RelationCounts = [
            RelationType::AlternativeTo,
            RelationType::Extends,
            RelationType::Overcomes,
        ]
        .iter()
        .collect();
        assert_eq!(counts.dominant(), Some(&RelationType::Overcomes));

        let counts: RelationCounts = [
            RelationType::Extends,
            RelationType::AlternativeTo,
            RelationType::AlternativeTo,
        ]
        .iter()
        .collect();
        assert_eq!(counts.dominant(), Some(&RelationType::AlternativeTo));
        assert!((counts.purity() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_counts() {
        let counts = RelationCounts::default();
        assert_eq!(counts.dominant(), None);
        assert_eq!(counts.purity(), 0.0);
    }

    #[test]
    fn test_total_citations_saturate() {
        let g = CitationGraph::from_parts(
            vec![
                Paper::new("A", "A", None, u64::MAX, false),
                Paper::new("B", "B", None, 10, false),
            ],
            Vec::new(),
        );
        let chain = ThreadCandidate::chain(vec![hop("A", "B", RelationType::Extends)], &g);
        assert_eq!(chain.total_citations, u64::MAX);
    }

    #[test]
    fn test_chain_candidate() {
        let g = graph();
        let c = ThreadCandidate::chain(
            vec![
                hop("S", "A", RelationType::Overcomes),
                hop("A", "B", RelationType::Extends),
            ],
            &g,
        );
        assert_eq!(c.pattern(), ThreadPattern::Chain);
        assert_eq!(c.signature, "S→A→B");
        assert_eq!(c.paper_count(), 3);
        assert_eq!(c.edge_count(), 2);
        assert_eq!(c.total_citations, 10 + 20 + 30);
    }

    #[test]
    fn test_star_counts_shared_papers_once() {
        let g = graph();
        let routes = vec![
            Route {
                hops: vec![hop("S", "A", RelationType::Overcomes), hop("A", "D", RelationType::Extends)],
            },
            Route {
                hops: vec![hop("S", "B", RelationType::Extends), hop("B", "D", RelationType::Extends)],
            },
        ];
        let c = ThreadCandidate::star(PaperId::new("S"), routes, &g);
        assert_eq!(c.pattern(), ThreadPattern::Star);
        assert_eq!(c.signature, "S→{A→D,B→D}");
        assert_eq!(c.papers.len(), 4);
        // S + A + B + D, D once
        assert_eq!(c.total_citations, 10 + 20 + 30 + 50);
        assert_eq!(c.edge_count(), 4);
        assert_eq!(c.dominant_relation(), Some(&RelationType::Extends));
        assert_eq!(c.hops().count(), 4);
    }
}
