//! Chain discovery: maximal greedy paths of strong relations.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use super::candidate::{Hop, ThreadCandidate};
use crate::pruner::PrunedGraph;
use crate::types::PaperId;

/// Extend a path from `from` by following outgoing strong relations.
///
/// At each step the successor with the highest citation count wins (ties
/// go to the smaller id); successors already on the path are skipped.
/// Stops after `max_hops` hops, at a sink, or when every successor is on
/// the path. `on_path` is updated with every visited paper.
pub(crate) fn extend_greedy(
    view: &PrunedGraph<'_>,
    from: &PaperId,
    on_path: &mut BTreeSet<PaperId>,
    max_hops: usize,
) -> Vec<Hop> {
    let graph = view.graph();
    let mut hops = Vec::new();
    let mut current = from.clone();
    on_path.insert(current.clone());

    while hops.len() < max_hops {
        let next = view
            .strong_successors(&current)
            .filter(|(target, _)| !on_path.contains(*target))
            .max_by_key(|(target, _)| (graph.citations(target), Reverse(*target)));

        let Some((target, relation_type)) = next else {
            break;
        };
        let target = target.clone();
        hops.push(Hop::new(current, target.clone(), relation_type.clone()));
        on_path.insert(target.clone());
        current = target;
    }

    hops
}

/// Papers from which chains are grown, in id order.
///
/// Each strong component contributes its in-degree-zero papers; a component
/// with none (it is entirely cyclic) contributes its seeds instead.
pub(crate) fn chain_starts<'v>(view: &'v PrunedGraph<'_>) -> Vec<&'v PaperId> {
    let mut starts = BTreeSet::new();
    for component in view.strong_components() {
        let roots: Vec<&PaperId> = component
            .iter()
            .copied()
            .filter(|id| view.strong_in_degree(id) == 0)
            .collect();
        if roots.is_empty() {
            tracing::debug!(papers = component.len(), "No strong roots in component; growing chains from its seeds");
            starts.extend(component.into_iter().filter(|id| view.seeds().contains(*id)));
        } else {
            starts.extend(roots);
        }
    }
    starts.into_iter().collect()
}

/// Discover chains of at least `min_length` edges.
///
/// Chains whose paper sequence is a contiguous part of another reported
/// chain are not reported.
pub(crate) fn mine_chains(view: &PrunedGraph<'_>, min_length: usize) -> Vec<ThreadCandidate> {
    let mut paths: Vec<Vec<Hop>> = Vec::new();
    for start in chain_starts(view) {
        let mut on_path = BTreeSet::new();
        let hops = extend_greedy(view, start, &mut on_path, usize::MAX);
        if !hops.is_empty() && hops.len() >= min_length {
            paths.push(hops);
        } else if !hops.is_empty() {
            tracing::trace!(start = %start, length = hops.len(), "Discarding short chain");
        }
    }

    let sequences: Vec<Vec<&PaperId>> = paths.iter().map(|hops| sequence(hops)).collect();
    let mut kept = Vec::new();
    for (i, hops) in paths.iter().enumerate() {
        let covered = sequences.iter().enumerate().any(|(j, other)| {
            i != j
                && (other.len() > sequences[i].len()
                    || (other.len() == sequences[i].len() && j < i))
                && is_contiguous_within(&sequences[i], other)
        });
        if !covered {
            kept.push(ThreadCandidate::chain(hops.clone(), view.graph()));
        }
    }
    kept
}

fn sequence(hops: &[Hop]) -> Vec<&PaperId> {
    hops.first()
        .map(|h| &h.source)
        .into_iter()
        .chain(hops.iter().map(|h| &h.target))
        .collect()
}

fn is_contiguous_within(needle: &[&PaperId], haystack: &[&PaperId]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}
