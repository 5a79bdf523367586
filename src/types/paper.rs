//! Paper node types for the citation graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a paper in the citation graph.
///
/// Wraps the upstream identifier string (OpenAlex work id, DOI, ...) and
/// implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(String);

impl PaperId {
    /// Create a new PaperId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PaperId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PaperId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Paper node in the citation graph.
///
/// Immutable once loaded into a [`CitationGraph`](crate::graph::CitationGraph).
/// The free-text fields are carried through to packaged threads for
/// narrative generation and are never read by the graph algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Unique paper identifier.
    pub id: PaperId,
    /// Paper title.
    pub title: String,
    /// Publication year.
    pub year: Option<i32>,
    /// Number of citations received.
    pub citation_count: u64,
    /// Whether the caller supplied this paper as an anchor of interest.
    pub is_seed: bool,
    /// Claimed research problem.
    pub problem: Option<String>,
    /// Claimed method.
    pub method: Option<String>,
    /// Claimed limitation.
    pub limitation: Option<String>,
    /// Claimed contribution.
    pub contribution: Option<String>,
    /// Stated future work.
    pub future_work: Option<String>,
}

impl Paper {
    /// Create a new paper with no narrative fields.
    pub fn new(
        id: impl Into<PaperId>,
        title: impl Into<String>,
        year: Option<i32>,
        citation_count: u64,
        is_seed: bool,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year,
            citation_count,
            is_seed,
            problem: None,
            method: None,
            limitation: None,
            contribution: None,
            future_work: None,
        }
    }

    /// Create a seed paper.
    pub fn seed(id: impl Into<PaperId>, title: impl Into<String>, year: Option<i32>, citation_count: u64) -> Self {
        Self::new(id, title, year, citation_count, true)
    }

    /// Set the claimed limitation.
    pub fn with_limitation(mut self, limitation: impl Into<String>) -> Self {
        self.limitation = Some(limitation.into());
        self
    }

    /// Short human-readable label: the title, or the id when untitled.
    pub fn label(&self, max_chars: usize) -> String {
        let base = if self.title.trim().is_empty() {
            self.id.as_str()
        } else {
            self.title.trim()
        };
        if base.chars().count() <= max_chars {
            base.to_string()
        } else {
            let mut cut: String = base.chars().take(max_chars).collect();
            cut.push_str("...");
            cut
        }
    }
}

// Papers are identified by id alone
impl PartialEq for Paper {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Paper {}

impl PartialOrd for Paper {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Paper {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
