//! Relation-aware pruning.
//!
//! Reduces a citation graph to the papers connected to a seed through
//! strong relations, ignoring edge direction.
//!
//! ## Algorithm
//!
//! 1. Keep the seeds present in the graph; count the missing ones
//! 2. Multi-source BFS from all present seeds over undirected strong edges
//! 3. Visited set = pruned papers
//! 4. Edge set = all edges (strong and weak) with both endpoints surviving
//!
//! A paper attached only through weak edges is dropped no matter how many
//! it has.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::graph::CitationGraph;
use crate::policy::ConfigurationError;
use crate::types::{Paper, PaperId, Relation, RelationType};

/// Pruning mode label recorded in statistics.
pub const PRUNING_MODE: &str = "relation_based";

/// Non-fatal conditions surfaced in statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PruningWarning {
    /// The input graph has no papers.
    EmptyGraph,
    /// Some seeds were not found in the graph.
    MissingSeeds {
        /// How many.
        count: usize,
    },
    /// None of the seeds were found in the graph.
    NoSeedsPresent,
    /// No strong relations survive; only seeds are retained.
    NoStrongEdges,
}

/// Statistics of a pruning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruningStats {
    /// Papers in the input graph.
    pub original_papers: usize,
    /// Seeds present in the graph.
    pub seed_papers: usize,
    /// Seeds absent from the graph.
    pub missing_seeds: usize,
    /// Papers retained.
    pub pruned_papers: usize,
    /// `pruned_papers / original_papers` (0 for an empty graph).
    pub retention_rate: f64,
    /// Strong relations among retained papers.
    pub strong_edges: usize,
    /// Weak relations touching a dropped paper.
    pub weak_edges_removed: usize,
    /// Weak relations among retained papers.
    pub weak_edges_retained: usize,
    /// Relations dropped at load time for dangling endpoints.
    pub dropped_relations: usize,
    /// Histogram of relation types over retained edges.
    pub relation_type_distribution: BTreeMap<RelationType, usize>,
    /// Connected components of the undirected strong view over retained papers.
    pub strong_components_count: usize,
    /// Always [`PRUNING_MODE`].
    pub pruning_mode: String,
    /// Non-fatal conditions.
    pub warnings: Vec<PruningWarning>,
}

/// Read-only view of a graph restricted to the retained papers.
#[derive(Debug, Clone)]
pub struct PrunedGraph<'g> {
    graph: &'g CitationGraph,
    retained: BTreeSet<PaperId>,
    seeds: BTreeSet<PaperId>,
    stats: PruningStats,
}

impl<'g> PrunedGraph<'g> {
    /// Underlying graph.
    pub fn graph(&self) -> &'g CitationGraph {
        self.graph
    }

    /// Pruning statistics.
    pub fn stats(&self) -> &PruningStats {
        &self.stats
    }

    /// Whether a paper survived pruning.
    pub fn contains(&self, id: &PaperId) -> bool {
        self.retained.contains(id)
    }

    /// Retained paper ids in order.
    pub fn paper_ids(&self) -> impl Iterator<Item = &PaperId> {
        self.retained.iter()
    }

    /// Retained papers in id order.
    pub fn papers(&self) -> impl Iterator<Item = &'g Paper> + '_ {
        let graph = self.graph;
        self.retained.iter().filter_map(move |id| graph.paper(id))
    }

    /// Seeds present in the graph.
    pub fn seeds(&self) -> &BTreeSet<PaperId> {
        &self.seeds
    }

    /// Retained relations (both endpoints survive), in canonical order.
    pub fn relations(&self) -> impl Iterator<Item = &'g Relation> + '_ {
        let graph = self.graph;
        graph
            .relations()
            .filter(move |r| self.contains(&r.source) && self.contains(&r.target))
    }

    /// Strong successors of a retained paper within the view.
    pub fn strong_successors<'a>(
        &'a self,
        id: &PaperId,
    ) -> impl Iterator<Item = (&'g PaperId, &'g RelationType)> + 'a {
        let graph = self.graph;
        graph
            .strong_successors(id)
            .filter(move |(target, _)| self.contains(target))
    }

    /// Strong in-degree within the view, ignoring self-loops.
    pub fn strong_in_degree(&self, id: &PaperId) -> usize {
        self.graph
            .strong_predecessors(id)
            .filter(|source| *source != id && self.contains(source))
            .count()
    }

    /// Weakly-connected strong components of the view, each a set of ids.
    pub fn strong_components(&self) -> Vec<BTreeSet<&PaperId>> {
        strong_components(self.graph, &self.retained)
    }

    /// Number of retained papers.
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    /// Whether nothing survived.
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }
}

/// Seed-anchored pruning over strong relations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationPruner;

impl RelationPruner {
    /// Create a new pruner.
    pub fn new() -> Self {
        Self
    }

    /// Prune a graph around a seed set.
    ///
    /// Fails only when `seeds` is empty. Empty graphs and missing seeds are
    /// reported as warnings in the statistics.
    pub fn prune<'g>(
        &self,
        graph: &'g CitationGraph,
        seeds: &BTreeSet<PaperId>,
    ) -> Result<PrunedGraph<'g>, ConfigurationError> {
        if seeds.is_empty() {
            return Err(ConfigurationError::NoSeeds);
        }

        let mut warnings = Vec::new();
        if graph.is_empty() {
            tracing::warn!("Pruning an empty graph");
            warnings.push(PruningWarning::EmptyGraph);
        }

        let present: BTreeSet<PaperId> = seeds.iter().filter(|s| graph.contains(s)).cloned().collect();
        let missing = seeds.len() - present.len();
        if missing > 0 {
            tracing::warn!(missing_seeds = missing, requested = seeds.len(), "Seeds absent from graph");
            warnings.push(PruningWarning::MissingSeeds { count: missing });
            if present.is_empty() && !graph.is_empty() {
                warnings.push(PruningWarning::NoSeedsPresent);
            }
        }

        // Multi-source BFS over undirected strong edges
        let mut retained: BTreeSet<PaperId> = present.clone();
        let mut queue: VecDeque<&PaperId> = present.iter().collect();
        while let Some(current) = queue.pop_front() {
            for neighbor in graph.strong_neighbors(current) {
                if retained.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
        }

        let stats = compute_stats(graph, &retained, present.len(), missing, warnings);
        tracing::info!(
            original_papers = stats.original_papers,
            pruned_papers = stats.pruned_papers,
            retention_rate = stats.retention_rate,
            strong_edges = stats.strong_edges,
            "Pruned citation graph"
        );

        Ok(PrunedGraph {
            graph,
            retained,
            seeds: present,
            stats,
        })
    }
}

fn compute_stats(
    graph: &CitationGraph,
    retained: &BTreeSet<PaperId>,
    seed_papers: usize,
    missing_seeds: usize,
    mut warnings: Vec<PruningWarning>,
) -> PruningStats {
    let mut strong_edges = 0;
    let mut weak_edges_removed = 0;
    let mut weak_edges_retained = 0;
    let mut relation_type_distribution = BTreeMap::new();

    for relation in graph.relations() {
        let survives = retained.contains(&relation.source) && retained.contains(&relation.target);
        match (survives, relation.is_strong()) {
            (true, true) => strong_edges += 1,
            (true, false) => weak_edges_retained += 1,
            (false, false) => weak_edges_removed += 1,
            // Unreachable by construction: a strong edge pulls in both endpoints
            (false, true) => {}
        }
        if survives {
            *relation_type_distribution
                .entry(relation.relation_type.clone())
                .or_insert(0usize) += 1;
        }
    }

    if strong_edges == 0 && !graph.is_empty() {
        warnings.push(PruningWarning::NoStrongEdges);
    }

    let original_papers = graph.num_papers();
    let retention_rate = if original_papers == 0 {
        0.0
    } else {
        retained.len() as f64 / original_papers as f64
    };

    PruningStats {
        original_papers,
        seed_papers,
        missing_seeds,
        pruned_papers: retained.len(),
        retention_rate,
        strong_edges,
        weak_edges_removed,
        weak_edges_retained,
        dropped_relations: graph.dropped_relations(),
        relation_type_distribution,
        strong_components_count: strong_components(graph, retained).len(),
        pruning_mode: PRUNING_MODE.to_string(),
        warnings,
    }
}

/// Weakly-connected components of the strong subgraph among `retained`.
///
/// Components come out ordered by their smallest paper id.
fn strong_components<'a>(
    graph: &'a CitationGraph,
    retained: &'a BTreeSet<PaperId>,
) -> Vec<BTreeSet<&'a PaperId>> {
    let mut visited: BTreeSet<&PaperId> = BTreeSet::new();
    let mut components = Vec::new();
    for start in retained {
        if !visited.insert(start) {
            continue;
        }
        let mut component = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in graph.strong_neighbors(current) {
                if retained.contains(neighbor) && visited.insert(neighbor) {
                    component.insert(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        components.push(component);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_paper(id: &str) -> Paper {
        Paper::new(id, id, Some(2020), 1, false)
    }

    fn seeds(ids: &[&str]) -> BTreeSet<PaperId> {
        ids.iter().map(|s| PaperId::new(*s)).collect()
    }

    fn sample_graph() -> CitationGraph {
        CitationGraph::from_parts(
            ["S", "A", "B", "C"].into_iter().map(make_paper),
            vec![
                Relation::new("S", "A", RelationType::Overcomes),
                Relation::new("A", "B", RelationType::Extends),
                Relation::new("S", "C", RelationType::Baselines),
            ],
        )
    }

    #[test]
    fn test_empty_seed_set_is_error() {
        let graph = sample_graph();
        let err = RelationPruner::new().prune(&graph, &BTreeSet::new()).unwrap_err();
        assert_eq!(err, ConfigurationError::NoSeeds);
    }

    #[test]
    fn test_weak_only_neighbor_dropped() {
        let graph = sample_graph();
        let pruned = RelationPruner::new().prune(&graph, &seeds(&["S"])).unwrap();

        let ids: Vec<&str> = pruned.paper_ids().map(PaperId::as_str).collect();
        assert_eq!(ids, vec!["A", "B", "S"]);
        let stats = pruned.stats();
        assert_eq!(stats.original_papers, 4);
        assert_eq!(stats.pruned_papers, 3);
        assert!((stats.retention_rate - 0.75).abs() < 1e-12);
        assert_eq!(stats.strong_edges, 2);
        assert_eq!(stats.weak_edges_removed, 1);
        assert_eq!(stats.weak_edges_retained, 0);
        assert_eq!(stats.strong_components_count, 1);
        assert_eq!(stats.pruning_mode, "relation_based");
        assert!(stats.warnings.is_empty());
        assert_eq!(pruned.relations().count(), 2);
    }

    #[test]
    fn test_reachability_ignores_direction() {
        let graph = CitationGraph::from_parts(
            ["S", "P", "Q"].into_iter().map(make_paper),
            vec![
                Relation::new("P", "S", RelationType::Extends),
                Relation::new("Q", "P", RelationType::AdaptsTo),
            ],
        );
        let pruned = RelationPruner::new().prune(&graph, &seeds(&["S"])).unwrap();
        assert_eq!(pruned.len(), 3);
    }

    #[test]
    fn test_empty_graph_warns() {
        let graph = CitationGraph::new();
        let pruned = RelationPruner::new().prune(&graph, &seeds(&["S"])).unwrap();
        assert!(pruned.is_empty());
        assert_eq!(pruned.stats().retention_rate, 0.0);
        assert!(pruned.stats().warnings.contains(&PruningWarning::EmptyGraph));
    }

    #[test]
    fn test_missing_seeds_counted() {
        let graph = sample_graph();
        let pruned = RelationPruner::new().prune(&graph, &seeds(&["S", "X", "Y"])).unwrap();
        assert_eq!(pruned.stats().seed_papers, 1);
        assert_eq!(pruned.stats().missing_seeds, 2);
        assert!(pruned
            .stats()
            .warnings
            .contains(&PruningWarning::MissingSeeds { count: 2 }));
        assert_eq!(pruned.len(), 3);
    }

    #[test]
    fn test_no_strong_edges_keeps_seeds_only() {
        let graph = CitationGraph::from_parts(
            ["S", "T", "A"].into_iter().map(make_paper),
            vec![
                Relation::new("S", "A", RelationType::Cites),
                Relation::new("T", "A", RelationType::Baselines),
            ],
        );
        let pruned = RelationPruner::new().prune(&graph, &seeds(&["S", "T"])).unwrap();
        let ids: Vec<&str> = pruned.paper_ids().map(PaperId::as_str).collect();
        assert_eq!(ids, vec!["S", "T"]);
        assert_eq!(pruned.stats().strong_components_count, 2);
        assert!(pruned.stats().warnings.contains(&PruningWarning::NoStrongEdges));
    }

    #[test]
    fn test_all_seeds_retention_is_one() {
        let graph = CitationGraph::from_parts(["A", "B"].into_iter().map(make_paper), Vec::new());
        let pruned = RelationPruner::new().prune(&graph, &seeds(&["A", "B"])).unwrap();
        assert_eq!(pruned.stats().retention_rate, 1.0);
    }

    #[test]
    fn test_distribution_covers_retained_edges() {
        let graph = CitationGraph::from_parts(
            ["S", "A", "B"].into_iter().map(make_paper),
            vec![
                Relation::new("S", "A", RelationType::Overcomes),
                Relation::new("S", "A", RelationType::Cites),
                Relation::new("A", "B", RelationType::Extends),
            ],
        );
        let pruned = RelationPruner::new().prune(&graph, &seeds(&["S"])).unwrap();
        let dist = &pruned.stats().relation_type_distribution;
        assert_eq!(dist.get(&RelationType::Overcomes), Some(&1));
        assert_eq!(dist.get(&RelationType::Cites), Some(&1));
        assert_eq!(dist.get(&RelationType::Extends), Some(&1));
        assert_eq!(pruned.stats().weak_edges_retained, 1);
    }
}
