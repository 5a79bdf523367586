//! # evolution-kernel
//!
//! Relation-aware citation graph pruning and evolutionary thread mining.
//!
//! The kernel answers one question:
//!
//! > Given a citation graph and a few seed papers, which **evolutionary
//! > threads** does the literature actually support?
//!
//! ## Core Contract
//!
//! 1. Keep only papers tied to a seed by **strong** relations (overcomes,
//!    extends, realizes, adapts-to, alternative-to); plain citations never
//!    establish continuity
//! 2. Mine linear **chains** and branching **stars** over the strong view
//! 3. Rank, de-duplicate and package them into self-contained thread records
//!
//! ## Architecture
//!
//! ```text
//! GraphSource → CitationGraph → RelationPruner → ThreadMiner → ThreadSelector → ThreadPackager
//!                                     ↓                                              ↓
//!                               PruningStats                                  AnalysisReport
//!                                                                                    ↓
//!                                                                  NarrativeGenerator (external)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same graph + same seeds + same policy → identical thread ids, order and signatures
//! - Relation ordering is canonical (source, target, relation priority)
//! - Paper ordering is canonical (by PaperId); every tie-break is explicit
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use evolution_kernel::{CitationGraph, EvolutionAnalyzer, Paper, PaperId, Relation, RelationType, ThreadPolicyV1};
//!
//! let graph = CitationGraph::from_parts(
//!     vec![
//!         Paper::seed("S", "Seed", Some(2017), 900),
//!         Paper::new("A", "Follow-up", Some(2019), 120, false),
//!         Paper::new("B", "Refinement", Some(2021), 30, false),
//!     ],
//!     vec![
//!         Relation::new("S", "A", RelationType::Overcomes),
//!         Relation::new("A", "B", RelationType::Extends),
//!     ],
//! );
//!
//! let policy = ThreadPolicyV1 { min_chain_length: 2, ..ThreadPolicyV1::default() };
//! let analyzer = EvolutionAnalyzer::new(policy).unwrap();
//! let report = analyzer.analyze(&graph, &BTreeSet::from([PaperId::new("S")])).unwrap();
//!
//! assert_eq!(report.threads[0].signature, "S→A→B");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod classifier;
pub mod graph;
pub mod store;
pub mod policy;
pub mod pruner;
pub mod miner;
pub mod ranker;
pub mod packager;
pub mod narrative;
pub mod analyzer;
pub mod canonical;
pub mod telemetry;

// Re-exports
pub use types::{Paper, PaperId, Relation, RelationType};
pub use classifier::{classify, RelationStrength};
pub use graph::{CitationGraph, DataIntegrityError};
pub use store::{GraphDocument, GraphSource, StoreError};
pub use policy::{ConfigurationError, ScoreBreakdown, ScoreWeights, ScoredCandidate, ThreadPolicyV1};
pub use pruner::{PrunedGraph, PruningStats, PruningWarning, RelationPruner};
pub use miner::{MiningError, RelationCounts, ThreadCandidate, ThreadMiner, ThreadPattern};
pub use ranker::{overlap_coefficient, SelectionResult, Suppression, ThreadSelector};
pub use packager::{PackagedHop, PackagedRoute, PackagedThread, PaperRef, RelationStats, ThreadPackager, ThreadPaper};
pub use narrative::{CachedNarrator, NarrativeCacheConfig, NarrativeGenerator, TemplateNarrator};
pub use analyzer::{AnalysisError, AnalysisReport, AnalysisSummary, EvolutionAnalyzer};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes, try_to_canonical_bytes};
pub use telemetry::init_tracing;

/// Schema version for all exported artifacts.
pub const EVOLUTION_KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version.
pub const DEFAULT_POLICY_VERSION: &str = "thread_policy_v1";
