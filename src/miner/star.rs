//! Star discovery: hubs with several strong branches.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use super::candidate::{Hop, Route, ThreadCandidate};
use super::chain::extend_greedy;
use crate::pruner::PrunedGraph;
use crate::types::{PaperId, RelationType};

/// Discover stars with at least `min_branches` distinct branches.
///
/// Every retained paper is tried as a hub, in id order. Branches are
/// ordered by relation priority, then branch citations (desc), then id.
/// Each route is grown greedily to at most `max_route_depth` edges from
/// the hub and never revisits the hub or its own papers.
pub(crate) fn mine_stars(
    view: &PrunedGraph<'_>,
    min_branches: usize,
    max_route_depth: usize,
) -> Vec<ThreadCandidate> {
    let graph = view.graph();
    let mut stars = Vec::new();

    for hub in view.paper_ids() {
        let mut branches: Vec<(&PaperId, &RelationType)> = view
            .strong_successors(hub)
            .filter(|(target, _)| *target != hub)
            .collect();
        if branches.len() < min_branches.max(2) {
            continue;
        }
        branches.sort_by_key(|(target, relation_type)| {
            (*relation_type, Reverse(graph.citations(target)), *target)
        });

        let routes: Vec<Route> = branches
            .into_iter()
            .map(|(branch, relation_type)| {
                let mut on_path = BTreeSet::from([hub.clone()]);
                let mut hops = vec![Hop::new(hub.clone(), branch.clone(), relation_type.clone())];
                hops.extend(extend_greedy(
                    view,
                    branch,
                    &mut on_path,
                    max_route_depth.saturating_sub(1),
                ));
                Route { hops }
            })
            .collect();

        tracing::trace!(hub = %hub, routes = routes.len(), "Found star");
        stars.push(ThreadCandidate::star(hub.clone(), routes, graph));
    }

    stars
}
