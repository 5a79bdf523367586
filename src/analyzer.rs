//! End-to-end analysis facade.
//!
//! ```text
//! CitationGraph + seeds → prune → mine → rank/select → package → AnalysisReport
//!                                                                   ↓
//!                                                   NarrativeGenerator (optional)
//! ```
//!
//! Every stage is synchronous and read-only over the graph. Narrative
//! generation is the only async step and runs after the report is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::canonical::canonical_hash_hex;
use crate::graph::CitationGraph;
use crate::miner::{MiningError, ThreadMiner, ThreadPattern};
use crate::narrative::NarrativeGenerator;
use crate::packager::{PackagedThread, ThreadPackager};
use crate::policy::{ConfigurationError, ThreadPolicyV1};
use crate::pruner::{PruningStats, RelationPruner};
use crate::ranker::{Suppression, ThreadSelector};
use crate::store::{GraphSource, StoreError};
use crate::types::PaperId;
use crate::EVOLUTION_KERNEL_SCHEMA_VERSION;

/// Error type for analysis runs.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Invalid policy or seed set.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Internal invariant violation.
    #[error(transparent)]
    Mining(#[from] MiningError),
    /// Graph source failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Summary counts of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Papers in the input graph.
    pub original_papers: usize,
    /// Papers retained by pruning.
    pub pruned_papers: usize,
    /// Candidates mined before selection.
    pub candidate_count: usize,
    /// Candidates removed for overlap.
    pub suppressed_candidates: usize,
    /// Threads in the report.
    pub total_threads: usize,
    /// Chain threads.
    pub chain_threads: usize,
    /// Star threads.
    pub star_threads: usize,
}

/// The complete result of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version of the report.
    pub schema_version: String,
    /// Policy identifier.
    pub policy_id: String,
    /// Hash of the policy parameters.
    pub params_hash: String,
    /// Fingerprint of the analyzed graph.
    pub graph_fingerprint: String,
    /// Seeds requested for this run, in order.
    pub seeds: Vec<PaperId>,
    /// Pruning statistics.
    pub pruning_stats: PruningStats,
    /// Selected threads in rank order.
    pub threads: Vec<PackagedThread>,
    /// Candidates removed for overlap.
    pub suppressed: Vec<Suppression>,
    /// Summary counts.
    pub summary: AnalysisSummary,
    /// Hash of all deterministic content (excludes narratives and `generated_at`).
    pub report_hash: String,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Whether any evolutionary pattern was found.
    pub fn has_threads(&self) -> bool {
        !self.threads.is_empty()
    }

    /// Look up a thread by id.
    pub fn thread(&self, thread_id: usize) -> Option<&PackagedThread> {
        self.threads.iter().find(|t| t.thread_id == thread_id)
    }
}

/// Input struct for the report hash.
#[derive(Serialize)]
struct ReportHashInput<'a> {
    schema_version: &'a str,
    params_hash: &'a str,
    graph_fingerprint: &'a str,
    seeds: &'a [PaperId],
    summary: &'a AnalysisSummary,
    threads: Vec<(usize, &'a str)>,
}

/// Runs the pruning and thread mining pipeline under one policy.
#[derive(Debug, Clone)]
pub struct EvolutionAnalyzer {
    policy: ThreadPolicyV1,
    pruner: RelationPruner,
    miner: ThreadMiner,
    selector: ThreadSelector,
}

impl EvolutionAnalyzer {
    /// Create an analyzer. The policy is validated here.
    pub fn new(policy: ThreadPolicyV1) -> Result<Self, ConfigurationError> {
        policy.validate()?;
        Ok(Self {
            pruner: RelationPruner::new(),
            miner: ThreadMiner::new(&policy),
            selector: ThreadSelector::new(&policy),
            policy,
        })
    }

    /// The active policy.
    pub fn policy(&self) -> &ThreadPolicyV1 {
        &self.policy
    }

    /// Analyze a graph around an explicit seed set.
    pub fn analyze(
        &self,
        graph: &CitationGraph,
        seeds: &BTreeSet<PaperId>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let _span = tracing::info_span!(
            "analyze",
            papers = graph.num_papers(),
            seeds = seeds.len(),
            policy = %self.policy.policy_id()
        )
        .entered();

        let view = self.pruner.prune(graph, seeds)?;
        let candidates = self.miner.mine(&view)?;
        let candidate_count = candidates.len();
        let selection = self.selector.rank(candidates);
        let threads = ThreadPackager::new(graph).package(&selection.selected)?;

        let count = |pattern: ThreadPattern| threads.iter().filter(|t| t.thread_type == pattern).count();
        let summary = AnalysisSummary {
            original_papers: view.stats().original_papers,
            pruned_papers: view.stats().pruned_papers,
            candidate_count,
            suppressed_candidates: selection.suppressed.len(),
            total_threads: threads.len(),
            chain_threads: count(ThreadPattern::Chain),
            star_threads: count(ThreadPattern::Star),
        };

        if threads.is_empty() {
            tracing::info!("No strong evolutionary pattern found");
        }

        let seeds: Vec<PaperId> = seeds.iter().cloned().collect();
        let params_hash = self.policy.params_hash();
        let graph_fingerprint = graph.fingerprint();
        let report_hash = canonical_hash_hex(&ReportHashInput {
            schema_version: EVOLUTION_KERNEL_SCHEMA_VERSION,
            params_hash: &params_hash,
            graph_fingerprint: &graph_fingerprint,
            seeds: &seeds,
            summary: &summary,
            threads: threads
                .iter()
                .map(|t| (t.thread_id, t.fingerprint.as_str()))
                .collect(),
        });

        tracing::info!(
            candidates = summary.candidate_count,
            threads = summary.total_threads,
            report_hash = %report_hash,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            schema_version: EVOLUTION_KERNEL_SCHEMA_VERSION.to_string(),
            policy_id: self.policy.policy_id().to_string(),
            params_hash,
            graph_fingerprint,
            seeds,
            pruning_stats: view.stats().clone(),
            threads,
            suppressed: selection.suppressed,
            summary,
            report_hash,
            generated_at: Utc::now(),
        })
    }

    /// Analyze a graph around the papers flagged `is_seed`.
    pub fn analyze_flagged(&self, graph: &CitationGraph) -> Result<AnalysisReport, AnalysisError> {
        self.analyze(graph, &graph.flagged_seeds())
    }

    /// Load a graph from a source and analyze it.
    ///
    /// Seeds are the flagged papers plus `extra_seeds`.
    pub fn analyze_source<S>(
        &self,
        source: &S,
        extra_seeds: &BTreeSet<PaperId>,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        S: GraphSource,
        AnalysisError: From<S::Error>,
    {
        let graph = source.load()?;
        let mut seeds = graph.flagged_seeds();
        seeds.extend(extra_seeds.iter().cloned());
        self.analyze(&graph, &seeds)
    }

    /// Fill each thread's narrative slot.
    ///
    /// Structural data is never touched. A generator failure is logged and
    /// leaves that thread without a narrative. Returns how many threads
    /// received one.
    pub async fn narrate<G>(&self, report: &mut AnalysisReport, generator: &G) -> usize
    where
        G: NarrativeGenerator + ?Sized,
    {
        let mut narrated = 0;
        for thread in &mut report.threads {
            match generator.narrate(thread).await {
                Ok(text) => {
                    thread.narrative = Some(text);
                    narrated += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        thread_id = thread.thread_id,
                        error = %err,
                        "Narrative generation failed"
                    );
                }
            }
        }
        narrated
    }
}
