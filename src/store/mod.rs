//! Graph ingestion sources.
//!
//! The core consumes papers and relations through [`GraphSource`]; where they
//! come from (JSON documents, API results) is the implementor's concern.

pub mod document;

use crate::graph::CitationGraph;
use crate::types::{Paper, Relation};

/// Trait for upstream graph sources.
///
/// Implementations must guarantee deterministic ordering of results.
pub trait GraphSource {
    /// Error type for source operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch all papers.
    fn papers(&self) -> Result<Vec<Paper>, Self::Error>;

    /// Fetch all relations.
    fn relations(&self) -> Result<Vec<Relation>, Self::Error>;

    /// Load the source into a [`CitationGraph`].
    ///
    /// Relations with dangling endpoints are dropped and counted.
    fn load(&self) -> Result<CitationGraph, Self::Error> {
        let papers = self.papers()?;
        let relations = self.relations()?;
        let graph = CitationGraph::from_parts(papers, relations);
        tracing::debug!(
            papers = graph.num_papers(),
            relations = graph.num_relations(),
            dropped = graph.dropped_relations(),
            "Loaded citation graph"
        );
        Ok(graph)
    }
}

pub use document::{EdgeRecord, GraphDocument, PaperRecord, StoreError};
