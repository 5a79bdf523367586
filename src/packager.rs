//! Thread packaging.
//!
//! Turns selected candidates into self-contained records. Every paper and
//! hop is denormalized by value; consumers never need the graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical::canonical_hash_hex;
use crate::graph::CitationGraph;
use crate::miner::{CandidateShape, Hop, MiningError, Route, ThreadPattern};
use crate::policy::{ScoreBreakdown, ScoredCandidate};
use crate::types::{Paper, PaperId, RelationType};

/// Maximum characters of a paper title in titles and signatures.
const LABEL_CHARS: usize = 48;

/// Compact paper summary used in hops and routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRef {
    /// Paper identifier.
    pub paper_id: PaperId,
    /// Title.
    pub title: String,
    /// Publication year.
    pub year: Option<i32>,
    /// Citation count.
    pub citation_count: u64,
}

impl From<&Paper> for PaperRef {
    fn from(paper: &Paper) -> Self {
        Self {
            paper_id: paper.id.clone(),
            title: paper.title.clone(),
            year: paper.year,
            citation_count: paper.citation_count,
        }
    }
}

/// Paper entry in a thread with its role and narrative fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadPaper {
    /// Paper identifier.
    pub paper_id: PaperId,
    /// Title.
    pub title: String,
    /// Publication year.
    pub year: Option<i32>,
    /// Citation count.
    pub citation_count: u64,
    /// Whether the paper is a seed.
    pub is_seed: bool,
    /// Role in the thread (`origin`, `step-2`, `hub`, `branch-1`, `branch-1.2`, ...).
    pub role: String,
    /// Claimed problem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    /// Claimed method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Claimed limitation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitation: Option<String>,
    /// Claimed contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<String>,
    /// Stated future work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future_work: Option<String>,
}

impl ThreadPaper {
    fn new(paper: &Paper, role: String) -> Self {
        Self {
            paper_id: paper.id.clone(),
            title: paper.title.clone(),
            year: paper.year,
            citation_count: paper.citation_count,
            is_seed: paper.is_seed,
            role,
            problem: paper.problem.clone(),
            method: paper.method.clone(),
            limitation: paper.limitation.clone(),
            contribution: paper.contribution.clone(),
            future_work: paper.future_work.clone(),
        }
    }
}

/// One hop of the relation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagedHop {
    /// Source paper.
    pub from_paper: PaperRef,
    /// Target paper.
    pub to_paper: PaperRef,
    /// Relation type.
    pub relation_type: RelationType,
    /// Route the hop belongs to (stars only, 1-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<usize>,
}

/// One route of a star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagedRoute {
    /// 1-based route number.
    pub route_id: usize,
    /// Relation of the branch edge out of the hub.
    pub relation_type: RelationType,
    /// Papers along the route, hub excluded.
    pub papers: Vec<PaperRef>,
}

/// Relation statistics of a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationStats {
    /// Number of edges.
    pub total_relations: usize,
    /// Mode of the distribution, ties by relation priority.
    pub dominant_relation: Option<RelationType>,
    /// Count per relation type.
    pub relation_distribution: BTreeMap<RelationType, usize>,
    /// Fraction of edges matching the dominant relation.
    pub purity: f64,
}

/// A final, self-contained thread record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagedThread {
    /// Rank-ordered identifier, starting at 1.
    pub thread_id: usize,
    /// Content fingerprint (structure only; excludes id and narrative).
    pub fingerprint: String,
    /// Pattern kind.
    pub thread_type: ThreadPattern,
    /// Pattern display name.
    pub pattern_type: String,
    /// Deterministic title.
    pub title: String,
    /// Human-readable structural signature.
    pub visual_structure: String,
    /// Compact id signature, e.g. `A→B→C`.
    pub signature: String,
    /// Papers with roles, each once.
    pub papers: Vec<ThreadPaper>,
    /// Sum of citation counts over `papers`.
    pub total_citations: u64,
    /// Relation statistics.
    pub relation_stats: RelationStats,
    /// Every hop in structural order.
    pub relation_chain: Vec<PackagedHop>,
    /// Hub of a star.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_paper: Option<PaperRef>,
    /// Number of routes (stars only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes_count: Option<usize>,
    /// Routes of a star.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<PackagedRoute>,
    /// Score breakdown that ranked this thread.
    pub score: ScoreBreakdown,
    /// Prose from a narrative generator, filled after packaging.
    #[serde(default)]
    pub narrative: Option<String>,
}

/// Input to the thread fingerprint.
#[derive(Serialize)]
struct ThreadFingerprintInput<'a> {
    thread_type: ThreadPattern,
    signature: &'a str,
    hops: Vec<(&'a str, &'a str, &'a str)>,
}

/// Builds packaged threads against one graph.
pub struct ThreadPackager<'g> {
    graph: &'g CitationGraph,
}

impl<'g> ThreadPackager<'g> {
    /// Create a new packager.
    pub fn new(graph: &'g CitationGraph) -> Self {
        Self { graph }
    }

    /// Package selected threads, assigning ids in rank order.
    pub fn package(&self, selected: &[ScoredCandidate]) -> Result<Vec<PackagedThread>, MiningError> {
        selected
            .iter()
            .enumerate()
            .map(|(rank, scored)| self.package_one(rank + 1, scored))
            .collect()
    }

    fn paper(&self, id: &PaperId, signature: &str) -> Result<&'g Paper, MiningError> {
        self.graph.paper(id).ok_or_else(|| MiningError::InvariantViolation {
            signature: signature.to_string(),
            reason: format!("paper {id} missing from graph"),
        })
    }

    fn paper_ref(&self, id: &PaperId, signature: &str) -> Result<PaperRef, MiningError> {
        self.paper(id, signature).map(PaperRef::from)
    }

    fn hop(&self, hop: &Hop, route_id: Option<usize>, signature: &str) -> Result<PackagedHop, MiningError> {
        Ok(PackagedHop {
            from_paper: self.paper_ref(&hop.source, signature)?,
            to_paper: self.paper_ref(&hop.target, signature)?,
            relation_type: hop.relation_type.clone(),
            route_id,
        })
    }

    fn label(&self, id: &PaperId, signature: &str) -> Result<String, MiningError> {
        Ok(self.paper(id, signature)?.label(LABEL_CHARS))
    }

    fn package_one(&self, thread_id: usize, scored: &ScoredCandidate) -> Result<PackagedThread, MiningError> {
        let candidate = &scored.candidate;
        let signature = candidate.signature.as_str();
        let pattern = candidate.pattern();

        let mut roles: BTreeMap<&PaperId, String> = BTreeMap::new();
        let mut relation_chain = Vec::new();
        let mut routes = Vec::new();
        let mut center_paper = None;
        let title;
        let visual_structure;

        match &candidate.shape {
            CandidateShape::Chain { hops } => {
                let first = hops.first().map(|h| &h.source);
                let last = hops.last().map(|h| &h.target);
                if let Some(origin) = first {
                    roles.insert(origin, "origin".to_string());
                    let mut parts = vec![self.label(origin, signature)?];
                    for (i, hop) in hops.iter().enumerate() {
                        roles.entry(&hop.target).or_insert_with(|| format!("step-{}", i + 1));
                        relation_chain.push(self.hop(hop, None, signature)?);
                        parts.push(format!("({})", hop.relation_type));
                        parts.push(self.label(&hop.target, signature)?);
                    }
                    visual_structure = parts.join(" → ");
                } else {
                    visual_structure = String::new();
                }
                title = match (first, last) {
                    (Some(a), Some(b)) => {
                        format!("From {} to {}", self.label(a, signature)?, self.label(b, signature)?)
                    }
                    _ => String::new(),
                };
            }
            CandidateShape::Star { hub, routes: star_routes } => {
                roles.insert(hub, "hub".to_string());
                let hub_label = self.label(hub, signature)?;
                let mut branches = Vec::with_capacity(star_routes.len());
                for (index, route) in star_routes.iter().enumerate() {
                    let route_id = index + 1;
                    branches.push(self.route_structure(route, signature)?);
                    for (depth, hop) in route.hops.iter().enumerate() {
                        let role = if depth == 0 {
                            format!("branch-{route_id}")
                        } else {
                            format!("branch-{route_id}.{}", depth + 1)
                        };
                        roles.entry(&hop.target).or_insert(role);
                        relation_chain.push(self.hop(hop, Some(route_id), signature)?);
                    }
                    routes.push(PackagedRoute {
                        route_id,
                        relation_type: route.branch_relation().cloned().unwrap_or_default(),
                        papers: route
                            .papers()
                            .map(|id| self.paper_ref(id, signature))
                            .collect::<Result<_, _>>()?,
                    });
                }
                visual_structure = format!("{hub_label} → {{{}}}", branches.join(", "));
                title = format!("Branches of {hub_label}");
                center_paper = Some(self.paper_ref(hub, signature)?);
            }
        }

        let papers = candidate
            .papers
            .iter()
            .map(|id| -> Result<ThreadPaper, MiningError> {
                let paper = self.paper(id, signature)?;
                let role = roles.get(id).cloned().unwrap_or_default();
                Ok(ThreadPaper::new(paper, role))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let relation_stats = RelationStats {
            total_relations: candidate.relations.total(),
            dominant_relation: candidate.dominant_relation().cloned(),
            relation_distribution: candidate.relations.as_map().clone(),
            purity: candidate.relations.purity(),
        };

        let fingerprint = canonical_hash_hex(&ThreadFingerprintInput {
            thread_type: pattern,
            signature,
            hops: candidate
                .hops()
                .map(|h| (h.source.as_str(), h.target.as_str(), h.relation_type.label()))
                .collect(),
        });

        let routes_count = (pattern == ThreadPattern::Star).then_some(routes.len());

        Ok(PackagedThread {
            thread_id,
            fingerprint,
            thread_type: pattern,
            pattern_type: pattern.display_name().to_string(),
            title,
            visual_structure,
            signature: signature.to_string(),
            papers,
            total_citations: candidate.total_citations,
            relation_stats,
            relation_chain,
            center_paper,
            routes_count,
            routes,
            score: scored.breakdown.clone(),
            narrative: None,
        })
    }

    fn route_structure(&self, route: &Route, signature: &str) -> Result<String, MiningError> {
        let mut parts = Vec::with_capacity(route.hops.len() * 2);
        for hop in &route.hops {
            parts.push(format!("({}) {}", hop.relation_type, self.label(&hop.target, signature)?));
        }
        Ok(parts.join(" → "))
    }
}

impl PackagedThread {
    /// Paper ids in thread order.
    pub fn paper_ids(&self) -> impl Iterator<Item = &PaperId> {
        self.papers.iter().map(|p| &p.paper_id)
    }

    /// Hash of everything a narrative can draw on.
    ///
    /// Unlike [`fingerprint`](Self::fingerprint) this covers titles, years,
    /// paper claims and scores. Excludes `thread_id` and `narrative`.
    pub fn content_fingerprint(&self) -> String {
        canonical_hash_hex(&ThreadContentInput {
            fingerprint: &self.fingerprint,
            thread_type: self.thread_type,
            pattern_type: &self.pattern_type,
            title: &self.title,
            visual_structure: &self.visual_structure,
            signature: &self.signature,
            papers: &self.papers,
            total_citations: self.total_citations,
            relation_stats: &self.relation_stats,
            relation_chain: &self.relation_chain,
            center_paper: self.center_paper.as_ref(),
            routes: &self.routes,
            score: &self.score,
        })
    }
}

/// Input to the content fingerprint.
#[derive(Serialize)]
struct ThreadContentInput<'a> {
    fingerprint: &'a str,
    thread_type: ThreadPattern,
    pattern_type: &'a str,
    title: &'a str,
    visual_structure: &'a str,
    signature: &'a str,
    papers: &'a [ThreadPaper],
    total_citations: u64,
    relation_stats: &'a RelationStats,
    relation_chain: &'a [PackagedHop],
    center_paper: Option<&'a PaperRef>,
    routes: &'a [PackagedRoute],
    score: &'a ScoreBreakdown,
}
