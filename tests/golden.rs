//! Golden tests for the evolution kernel.
//!
//! These tests pin the documented pruning and mining examples and verify
//! determinism of the full pipeline.

use std::collections::BTreeSet;
use evolution_kernel::{
    CitationGraph, EvolutionAnalyzer, Paper, PaperId, Relation, RelationPruner, RelationType,
    ThreadPattern, ThreadPolicyV1, PruningWarning,
    canonical_hash_hex,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn make_paper(id: &str, citations: u64) -> Paper {
    Paper::new(id, format!("Paper {id}"), Some(2020), citations, false)
}

fn seeds(ids: &[&str]) -> BTreeSet<PaperId> {
    ids.iter().map(|s| PaperId::new(*s)).collect()
}

fn policy_with_min_chain(min_chain_length: usize) -> ThreadPolicyV1 {
    ThreadPolicyV1 {
        min_chain_length,
        ..ThreadPolicyV1::default()
    }
}

/// S →(Overcomes) A →(Extends) B, plus a weak S →(Baselines) C.
fn build_weak_branch_graph() -> CitationGraph {
    CitationGraph::from_parts(
        vec![make_paper("S", 100), make_paper("A", 50), make_paper("B", 20), make_paper("C", 500)],
        vec![
            Relation::new("S", "A", RelationType::Overcomes),
            Relation::new("A", "B", RelationType::Extends),
            Relation::new("S", "C", RelationType::Baselines),
        ],
    )
}

fn build_star_graph() -> CitationGraph {
    //          S
    //        / | \
    //  Overcomes | Extends
    //      A  Alt_to  C
    //          B
    CitationGraph::from_parts(
        vec![make_paper("S", 100), make_paper("A", 10), make_paper("B", 10), make_paper("C", 10)],
        vec![
            Relation::new("S", "A", RelationType::Overcomes),
            Relation::new("S", "B", RelationType::AlternativeTo),
            Relation::new("S", "C", RelationType::Extends),
        ],
    )
}

fn build_linear_graph(n: usize) -> CitationGraph {
    let papers = (0..n).map(|i| make_paper(&format!("P{i:03}"), (n - i) as u64 * 10));
    let relations = (1..n).map(|i| {
        Relation::new(format!("P{:03}", i - 1).as_str(), format!("P{i:03}").as_str(), RelationType::Extends)
    });
    CitationGraph::from_parts(papers, relations)
}

fn build_mixed_graph() -> CitationGraph {
    let mut papers = vec![Paper::seed("S", "Seed", Some(2012), 2000)];
    papers.extend(
        ["A", "B", "C", "D", "E", "F", "G", "H", "X", "Y"]
            .iter()
            .enumerate()
            .map(|(i, id)| make_paper(id, 300 - i as u64 * 25)),
    );
    CitationGraph::from_parts(
        papers,
        vec![
            Relation::new("S", "A", RelationType::Overcomes),
            Relation::new("A", "B", RelationType::Extends),
            Relation::new("B", "C", RelationType::Realizes),
            Relation::new("C", "D", RelationType::Extends),
            Relation::new("S", "E", RelationType::AdaptsTo),
            Relation::new("E", "F", RelationType::Extends),
            Relation::new("S", "G", RelationType::AlternativeTo),
            Relation::new("G", "H", RelationType::Overcomes),
            Relation::new("H", "A", RelationType::Extends),
            Relation::new("X", "S", RelationType::Cites),
            Relation::new("Y", "X", RelationType::Baselines),
        ],
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Documented Examples
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_weak_branch_dropped_and_single_chain() {
    let graph = build_weak_branch_graph();
    let analyzer = EvolutionAnalyzer::new(policy_with_min_chain(2)).unwrap();
    let report = analyzer.analyze(&graph, &seeds(&["S"])).unwrap();

    let view = RelationPruner::new().prune(&graph, &seeds(&["S"])).unwrap();
    let kept: Vec<&str> = view.paper_ids().map(PaperId::as_str).collect();
    assert_eq!(kept, vec!["A", "B", "S"]);

    assert_eq!(report.pruning_stats.original_papers, 4);
    assert_eq!(report.pruning_stats.pruned_papers, 3);
    assert!((report.pruning_stats.retention_rate - 0.75).abs() < 1e-12);
    assert_eq!(report.pruning_stats.weak_edges_removed, 1);

    let chains: Vec<_> = report
        .threads
        .iter()
        .filter(|t| t.thread_type == ThreadPattern::Chain)
        .collect();
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].signature, "S→A→B");
    assert_eq!(report.threads.len(), 1);
}

#[test]
fn test_star_dominant_relation_by_priority() {
    let graph = build_star_graph();
    let analyzer = EvolutionAnalyzer::new(ThreadPolicyV1::default()).unwrap();
    let report = analyzer.analyze(&graph, &seeds(&["S"])).unwrap();

    assert_eq!(report.threads.len(), 1);
    let star = &report.threads[0];
    assert_eq!(star.thread_type, ThreadPattern::Star);
    assert_eq!(star.center_paper.as_ref().map(|p| p.paper_id.as_str()), Some("S"));
    assert_eq!(star.routes.len(), 3);
    assert_eq!(star.relation_stats.dominant_relation, Some(RelationType::Overcomes));
}

#[test]
fn test_no_strong_edges_seeds_only() {
    let graph = CitationGraph::from_parts(
        vec![make_paper("S", 1), make_paper("A", 1), make_paper("B", 1)],
        vec![
            Relation::new("S", "A", RelationType::Cites),
            Relation::new("A", "B", RelationType::Baselines),
        ],
    );
    let analyzer = EvolutionAnalyzer::new(ThreadPolicyV1::default()).unwrap();
    let report = analyzer.analyze(&graph, &seeds(&["S"])).unwrap();

    assert_eq!(report.pruning_stats.pruned_papers, 1);
    assert!(report.threads.is_empty());
    assert_eq!(report.summary.total_threads, 0);
    assert!(report
        .pruning_stats
        .warnings
        .contains(&PruningWarning::NoStrongEdges));
}

#[test]
fn test_empty_graph_is_not_an_error() {
    let graph = CitationGraph::new();
    let analyzer = EvolutionAnalyzer::new(ThreadPolicyV1::default()).unwrap();
    let report = analyzer.analyze(&graph, &seeds(&["S"])).unwrap();
    assert!(report.threads.is_empty());
    assert_eq!(report.pruning_stats.retention_rate, 0.0);
    assert!(report.pruning_stats.warnings.contains(&PruningWarning::EmptyGraph));
}

#[test]
fn test_cyclic_seed_component_keeps_its_chain() {
    // S→A→B has a strong root; X→Y→Z→X is a pure cycle anchored by seed X
    let graph = CitationGraph::from_parts(
        ["S", "A", "B", "X", "Y", "Z"].iter().map(|id| make_paper(id, 10)),
        vec![
            Relation::new("S", "A", RelationType::Overcomes),
            Relation::new("A", "B", RelationType::Extends),
            Relation::new("X", "Y", RelationType::Extends),
            Relation::new("Y", "Z", RelationType::Realizes),
            Relation::new("Z", "X", RelationType::Extends),
        ],
    );
    let analyzer = EvolutionAnalyzer::new(policy_with_min_chain(2)).unwrap();

    let cycle_only = analyzer.analyze(&graph, &seeds(&["X"])).unwrap();
    let both = analyzer.analyze(&graph, &seeds(&["S", "X"])).unwrap();

    let signatures = |report: &evolution_kernel::AnalysisReport| -> BTreeSet<String> {
        report.threads.iter().map(|t| t.signature.clone()).collect()
    };
    assert_eq!(signatures(&cycle_only), BTreeSet::from(["X→Y→Z".to_string()]));
    assert_eq!(both.pruning_stats.strong_components_count, 2);
    assert_eq!(
        signatures(&both),
        BTreeSet::from(["S→A→B".to_string(), "X→Y→Z".to_string()])
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_same_input_same_threads_100_runs() {
    let graph = build_mixed_graph();
    let analyzer = EvolutionAnalyzer::new(policy_with_min_chain(2)).unwrap();
    let first = analyzer.analyze(&graph, &seeds(&["S"])).unwrap();
    assert!(first.has_threads());

    for _ in 0..100 {
        let report = analyzer.analyze(&graph, &seeds(&["S"])).unwrap();
        assert_eq!(report.report_hash, first.report_hash);
        let ids: Vec<(usize, &str)> = report
            .threads
            .iter()
            .map(|t| (t.thread_id, t.signature.as_str()))
            .collect();
        let expected: Vec<(usize, &str)> = first
            .threads
            .iter()
            .map(|t| (t.thread_id, t.signature.as_str()))
            .collect();
        assert_eq!(ids, expected);
    }
}

#[test]
fn test_insertion_order_irrelevant() {
    let graph = build_mixed_graph();
    let mut papers: Vec<Paper> = graph.papers().cloned().collect();
    let mut relations: Vec<Relation> = graph.relations().cloned().collect();
    papers.reverse();
    relations.reverse();
    let reversed = CitationGraph::from_parts(papers, relations);

    let analyzer = EvolutionAnalyzer::new(policy_with_min_chain(2)).unwrap();
    let a = analyzer.analyze(&graph, &seeds(&["S"])).unwrap();
    let b = analyzer.analyze(&reversed, &seeds(&["S"])).unwrap();

    assert_eq!(graph.fingerprint(), reversed.fingerprint());
    assert_eq!(a.report_hash, b.report_hash);
}

#[test]
fn test_policy_param_change_changes_report_hash() {
    let graph = build_mixed_graph();
    let a = EvolutionAnalyzer::new(policy_with_min_chain(2))
        .unwrap()
        .analyze(&graph, &seeds(&["S"]))
        .unwrap();
    let b = EvolutionAnalyzer::new(policy_with_min_chain(3))
        .unwrap()
        .analyze(&graph, &seeds(&["S"]))
        .unwrap();
    assert_ne!(a.params_hash, b.params_hash);
    assert_ne!(a.report_hash, b.report_hash);
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline Invariants
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_long_chain_and_cap() {
    let graph = build_linear_graph(12);
    let analyzer = EvolutionAnalyzer::new(ThreadPolicyV1::default()).unwrap();
    let report = analyzer.analyze(&graph, &seeds(&["P005"])).unwrap();

    assert_eq!(report.pruning_stats.pruned_papers, 12);
    assert_eq!(report.threads.len(), 1);
    assert_eq!(report.threads[0].relation_chain.len(), 11);
    assert_eq!(report.threads[0].papers[0].role, "origin");
}

#[test]
fn test_mixed_graph_threads_respect_policy() {
    let graph = build_mixed_graph();
    let policy = policy_with_min_chain(2);
    let report = EvolutionAnalyzer::new(policy.clone())
        .unwrap()
        .analyze(&graph, &seeds(&["S"]))
        .unwrap();

    // X and Y hang off S by weak relations only
    assert_eq!(report.pruning_stats.pruned_papers, 9);
    assert!(report.threads.len() <= policy.max_threads);

    for (i, thread) in report.threads.iter().enumerate() {
        assert_eq!(thread.thread_id, i + 1);
        match thread.thread_type {
            ThreadPattern::Chain => assert!(thread.relation_chain.len() >= policy.min_chain_length),
            ThreadPattern::Star => assert!(thread.routes.len() >= policy.min_star_branches),
        }
        for hop in &thread.relation_chain {
            assert!(hop.relation_type.is_strong());
        }
    }
}

#[test]
fn test_canonical_hash_determinism() {
    let value = ("thread_policy_v1", 3usize, vec!["A", "B"]);
    let h1 = canonical_hash_hex(&value);
    let h2 = canonical_hash_hex(&value);
    assert_eq!(h1, h2);
    assert_eq!(h1.len(), 16);
}
