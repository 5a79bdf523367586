//! JSON graph documents as produced by upstream bibliographic pipelines.

use serde::{Deserialize, Serialize};

use super::GraphSource;
use crate::types::{Paper, PaperId, Relation, RelationType};

/// Error type for document sources.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Document is not valid JSON for the expected shape.
    #[error("Invalid graph document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Paper record as found in upstream documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Paper identifier.
    #[serde(alias = "paper_id")]
    pub id: PaperId,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Citation count.
    #[serde(default, alias = "cited_by_count")]
    pub citation_count: u64,
    /// Seed flag.
    #[serde(default)]
    pub is_seed: bool,
    /// Claimed problem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    /// Claimed method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Stated limitation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitation: Option<String>,
    /// Stated contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<String>,
    /// Stated future work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future_work: Option<String>,
}

impl From<PaperRecord> for Paper {
    fn from(record: PaperRecord) -> Self {
        Paper {
            id: record.id,
            title: record.title,
            year: record.year,
            citation_count: record.citation_count,
            is_seed: record.is_seed,
            problem: record.problem,
            method: record.method,
            limitation: record.limitation,
            contribution: record.contribution,
            future_work: record.future_work,
        }
    }
}

/// Edge record as found in upstream documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source paper.
    #[serde(alias = "from")]
    pub source: PaperId,
    /// Target paper.
    #[serde(alias = "to")]
    pub target: PaperId,
    /// Relation label; defaults to a plain citation.
    #[serde(default, alias = "edge_type", alias = "type")]
    pub relation_type: RelationType,
}

impl From<EdgeRecord> for Relation {
    fn from(record: EdgeRecord) -> Self {
        Relation::new(record.source, record.target, record.relation_type)
    }
}

/// A complete graph document: papers plus edges.
///
/// Accepts `nodes` for `papers` and `relations` for `edges`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Paper records.
    #[serde(default, alias = "nodes")]
    pub papers: Vec<PaperRecord>,
    /// Edge records.
    #[serde(default, alias = "relations")]
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    /// Parse a document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Mark the given papers as seeds, in addition to any flagged in the document.
    pub fn mark_seeds<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a PaperId>,
    {
        let ids: std::collections::BTreeSet<&PaperId> = ids.into_iter().collect();
        for paper in &mut self.papers {
            if ids.contains(&paper.id) {
                paper.is_seed = true;
            }
        }
    }
}

impl GraphSource for GraphDocument {
    type Error = StoreError;

    fn papers(&self) -> Result<Vec<Paper>, Self::Error> {
        Ok(self.papers.iter().cloned().map(Paper::from).collect())
    }

    fn relations(&self) -> Result<Vec<Relation>, Self::Error> {
        Ok(self.edges.iter().cloned().map(Relation::from).collect())
    }
}
