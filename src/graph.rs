//! Typed citation graph.
//!
//! An explicit node table plus edge table keyed by [`PaperId`]. The strong
//! subgraph is exposed as adjacency indices maintained on insertion rather
//! than as a separate graph copy, so there is one source of truth.
//!
//! All structures use `BTreeMap`/`BTreeSet` for deterministic iteration.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::canonical::canonical_hash_hex;
use crate::types::{Paper, PaperId, Relation, RelationType};
use crate::EVOLUTION_KERNEL_SCHEMA_VERSION;

/// A relation referencing a paper that is not in the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataIntegrityError {
    /// Source paper is missing.
    #[error("Relation {source_id} -[{relation_type}]-> {target}: unknown source paper")]
    UnknownSource {
        /// Missing source id.
        source_id: PaperId,
        /// Target id.
        target: PaperId,
        /// Relation label.
        relation_type: RelationType,
    },
    /// Target paper is missing.
    #[error("Relation {source_id} -[{relation_type}]-> {target}: unknown target paper")]
    UnknownTarget {
        /// Source id.
        source_id: PaperId,
        /// Missing target id.
        target: PaperId,
        /// Relation label.
        relation_type: RelationType,
    },
}

/// Citation graph for a single analysis run.
///
/// Papers are keyed by id (a re-inserted id replaces the earlier record).
/// Relations are stored as an ordered set, so exact duplicates collapse
/// while parallel relations of different types stay distinct.
#[derive(Debug, Clone, Default)]
pub struct CitationGraph {
    /// Papers by ID.
    papers: BTreeMap<PaperId, Paper>,
    /// All relations in canonical order.
    relations: BTreeSet<Relation>,
    /// Strong adjacency: source -> target -> strong types on that pair.
    strong_out: BTreeMap<PaperId, BTreeMap<PaperId, BTreeSet<RelationType>>>,
    /// Reverse strong adjacency: target -> sources.
    strong_in: BTreeMap<PaperId, BTreeSet<PaperId>>,
    /// Relations rejected for referencing unknown papers.
    dropped_relations: usize,
}

impl CitationGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from papers and relations, tolerating noisy data.
    ///
    /// Relations referencing unknown papers are dropped, logged, and
    /// counted in [`dropped_relations`](Self::dropped_relations).
    pub fn from_parts<P, R>(papers: P, relations: R) -> Self
    where
        P: IntoIterator<Item = Paper>,
        R: IntoIterator<Item = Relation>,
    {
        let mut graph = Self::new();
        for paper in papers {
            graph.add_paper(paper);
        }
        for relation in relations {
            graph.add_relation_lossy(relation);
        }
        graph
    }

    /// Add a paper. Returns the replaced record if the id was already present.
    pub fn add_paper(&mut self, paper: Paper) -> Option<Paper> {
        let replaced = self.papers.insert(paper.id.clone(), paper);
        if let Some(old) = &replaced {
            tracing::debug!(paper_id = %old.id, "Replacing existing paper record");
        }
        replaced
    }

    /// Add a relation. Both endpoints must already be present.
    ///
    /// Returns `Ok(false)` if an identical relation was already stored.
    pub fn add_relation(&mut self, relation: Relation) -> Result<bool, DataIntegrityError> {
        if !self.papers.contains_key(&relation.source) {
            return Err(DataIntegrityError::UnknownSource {
                source_id: relation.source,
                target: relation.target,
                relation_type: relation.relation_type,
            });
        }
        if !self.papers.contains_key(&relation.target) {
            return Err(DataIntegrityError::UnknownTarget {
                source_id: relation.source,
                target: relation.target,
                relation_type: relation.relation_type,
            });
        }

        if relation.is_strong() {
            self.strong_out
                .entry(relation.source.clone())
                .or_default()
                .entry(relation.target.clone())
                .or_default()
                .insert(relation.relation_type.clone());
            self.strong_in
                .entry(relation.target.clone())
                .or_default()
                .insert(relation.source.clone());
        }

        Ok(self.relations.insert(relation))
    }

    /// Add a relation, dropping and counting it on integrity failure.
    pub fn add_relation_lossy(&mut self, relation: Relation) -> bool {
        match self.add_relation(relation) {
            Ok(inserted) => inserted,
            Err(err) => {
                tracing::warn!(error = %err, "Dropping relation with dangling endpoint");
                self.dropped_relations += 1;
                false
            }
        }
    }

    /// Get a paper by ID.
    pub fn paper(&self, id: &PaperId) -> Option<&Paper> {
        self.papers.get(id)
    }

    /// Whether the graph contains the paper.
    pub fn contains(&self, id: &PaperId) -> bool {
        self.papers.contains_key(id)
    }

    /// All papers in id order.
    pub fn papers(&self) -> impl Iterator<Item = &Paper> {
        self.papers.values()
    }

    /// All relations in canonical order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    /// Number of papers.
    pub fn num_papers(&self) -> usize {
        self.papers.len()
    }

    /// Number of relations.
    pub fn num_relations(&self) -> usize {
        self.relations.len()
    }

    /// Whether the graph has no papers.
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Number of relations dropped for referencing unknown papers.
    pub fn dropped_relations(&self) -> usize {
        self.dropped_relations
    }

    /// Papers flagged `is_seed`.
    pub fn flagged_seeds(&self) -> BTreeSet<PaperId> {
        self.papers
            .values()
            .filter(|p| p.is_seed)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Citation count of a paper (0 if unknown).
    pub fn citations(&self, id: &PaperId) -> u64 {
        self.papers.get(id).map(|p| p.citation_count).unwrap_or(0)
    }

    /// Strong successors of a paper with the highest-priority strong type
    /// on each pair, in target id order.
    pub fn strong_successors<'a>(
        &'a self,
        id: &PaperId,
    ) -> impl Iterator<Item = (&'a PaperId, &'a RelationType)> + 'a {
        self.strong_out
            .get(id)
            .into_iter()
            .flat_map(|targets| targets.iter())
            .filter_map(|(target, types)| types.first().map(|t| (target, t)))
    }

    /// Strong predecessors of a paper in id order.
    pub fn strong_predecessors<'a>(&'a self, id: &PaperId) -> impl Iterator<Item = &'a PaperId> + 'a {
        self.strong_in.get(id).into_iter().flat_map(|s| s.iter())
    }

    /// Undirected strong neighbors of a paper, deduplicated, in id order.
    pub fn strong_neighbors(&self, id: &PaperId) -> BTreeSet<&PaperId> {
        self.strong_successors(id)
            .map(|(target, _)| target)
            .chain(self.strong_predecessors(id))
            .collect()
    }

    /// Highest-priority strong relation from `source` to `target`, if any.
    pub fn strong_relation(&self, source: &PaperId, target: &PaperId) -> Option<&RelationType> {
        self.strong_out
            .get(source)
            .and_then(|targets| targets.get(target))
            .and_then(|types| types.first())
    }

    /// Number of strong relations (counting parallel types separately).
    pub fn num_strong_relations(&self) -> usize {
        self.relations.iter().filter(|r| r.is_strong()).count()
    }

    /// Order-independent fingerprint of the graph content.
    pub fn fingerprint(&self) -> String {
        let input = GraphFingerprintInput {
            schema_version: EVOLUTION_KERNEL_SCHEMA_VERSION,
            papers: self
                .papers
                .values()
                .map(|p| (p.id.as_str(), p.citation_count, p.is_seed))
                .collect(),
            relations: self
                .relations
                .iter()
                .map(|r| (r.source.as_str(), r.target.as_str(), r.relation_type.label()))
                .collect(),
        };
        canonical_hash_hex(&input)
    }
}

/// Internal struct for computing the graph fingerprint.
#[derive(Serialize)]
struct GraphFingerprintInput<'a> {
    schema_version: &'a str,
    papers: Vec<(&'a str, u64, bool)>,
    relations: Vec<(&'a str, &'a str, &'a str)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_paper(id: &str, citations: u64) -> Paper {
        Paper::new(id, format!("Paper {id}"), Some(2020), citations, false)
    }

    fn small_graph() -> CitationGraph {
        CitationGraph::from_parts(
            vec![make_paper("A", 10), make_paper("B", 5), make_paper("C", 1)],
            vec![
                Relation::new("A", "B", RelationType::Extends),
                Relation::new("A", "B", RelationType::Overcomes),
                Relation::new("B", "C", RelationType::Baselines),
            ],
        )
    }

    #[test]
    fn test_add_and_get_paper() {
        let mut graph = CitationGraph::new();
        assert!(graph.add_paper(make_paper("A", 1)).is_none());
        assert!(graph.contains(&PaperId::new("A")));
        assert_eq!(graph.citations(&PaperId::new("A")), 1);
        assert!(graph.add_paper(make_paper("A", 2)).is_some());
        assert_eq!(graph.citations(&PaperId::new("A")), 2);
    }

    #[test]
    fn test_dangling_relation_rejected() {
        let mut graph = CitationGraph::new();
        graph.add_paper(make_paper("A", 1));

        let err = graph
            .add_relation(Relation::new("A", "Z", RelationType::Extends))
            .unwrap_err();
        assert!(matches!(err, DataIntegrityError::UnknownTarget { .. }));

        let err = graph
            .add_relation(Relation::new("Z", "A", RelationType::Extends))
            .unwrap_err();
        assert!(matches!(err, DataIntegrityError::UnknownSource { .. }));
        assert_eq!(
            err.to_string(),
            "Relation Z -[Extends]-> A: unknown source paper"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_from_parts_counts_dropped() {
        let graph = CitationGraph::from_parts(
            vec![make_paper("A", 1)],
            vec![
                Relation::new("A", "X", RelationType::Extends),
                Relation::new("Y", "A", RelationType::Cites),
            ],
        );
        assert_eq!(graph.dropped_relations(), 2);
        assert_eq!(graph.num_relations(), 0);
    }

    #[test]
    fn test_parallel_relations_kept_duplicates_collapsed() {
        let mut graph = small_graph();
        assert_eq!(graph.num_relations(), 3);
        let inserted = graph
            .add_relation(Relation::new("A", "B", RelationType::Extends))
            .unwrap();
        assert!(!inserted);
        assert_eq!(graph.num_relations(), 3);
    }

    #[test]
    fn test_strong_indices() {
        let graph = small_graph();
        let a = PaperId::new("A");
        let b = PaperId::new("B");
        let c = PaperId::new("C");

        let succ: Vec<_> = graph.strong_successors(&a).collect();
        assert_eq!(succ.len(), 1);
        // Highest-priority type wins on a parallel pair
        assert_eq!(succ[0], (&b, &RelationType::Overcomes));

        // Weak relation does not enter the strong view
        assert_eq!(graph.strong_successors(&b).count(), 0);
        assert_eq!(graph.strong_predecessors(&c).count(), 0);
        assert_eq!(graph.strong_neighbors(&b).into_iter().collect::<Vec<_>>(), vec![&a]);
        assert_eq!(graph.num_strong_relations(), 2);
    }

    #[test]
    fn test_fingerprint_order_independent() {
        let g1 = small_graph();
        let g2 = CitationGraph::from_parts(
            vec![make_paper("C", 1), make_paper("B", 5), make_paper("A", 10)],
            vec![
                Relation::new("B", "C", RelationType::Baselines),
                Relation::new("A", "B", RelationType::Overcomes),
                Relation::new("A", "B", RelationType::Extends),
            ],
        );
        assert_eq!(g1.fingerprint(), g2.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let g1 = small_graph();
        let mut g2 = small_graph();
        g2.add_paper(make_paper("D", 0));
        assert_ne!(g1.fingerprint(), g2.fingerprint());
    }
}
