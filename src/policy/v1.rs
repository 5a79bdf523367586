//! ThreadPolicy v1: thresholds and score weights for thread mining.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing to avoid cross-platform
//! serialization differences. The quantization factor is 1e6 (multiply by
//! 1,000,000 and round to i64), see [`quantize`].

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, quantize};
use crate::DEFAULT_POLICY_VERSION;

/// Configuration errors. Fatal, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Pruning requires at least one seed.
    #[error("No seed papers supplied")]
    NoSeeds,

    /// A threshold or weight is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidThreshold {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Policy document could not be parsed.
    #[error("Invalid policy document: {0}")]
    Parse(String),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidThreshold {
        field,
        reason: reason.into(),
    }
}

/// Weights of the three score components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of aggregate citation count.
    pub citation: f64,
    /// Weight of structural size (paper count).
    pub size: f64,
    /// Weight of relation purity.
    pub purity: f64,
}

impl ScoreWeights {
    /// Create new score weights.
    pub fn new(citation: f64, size: f64, purity: f64) -> Self {
        Self {
            citation,
            size,
            purity,
        }
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.citation + self.size + self.purity
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        for (field, value) in [
            ("weights.citation", self.citation),
            ("weights.size", self.size),
            ("weights.purity", self.purity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be finite and >= 0, got {value}")));
            }
        }
        if self.total() <= 0.0 {
            return Err(invalid("weights", "at least one weight must be positive"));
        }
        Ok(())
    }

    fn to_quantized(&self) -> QuantizedScoreWeights {
        QuantizedScoreWeights {
            citation: quantize(self.citation),
            size: quantize(self.size),
            purity: quantize(self.purity),
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            citation: 0.5,
            size: 0.2,
            purity: 0.3,
        }
    }
}

/// Quantized score weights for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedScoreWeights {
    citation: i64,
    size: i64,
    purity: i64,
}

/// Quantized policy parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedPolicyParams {
    version: String,
    min_chain_length: usize,
    min_star_branches: usize,
    max_route_depth: usize,
    max_threads: usize,
    overlap_threshold: i64,
    weights: QuantizedScoreWeights,
}

/// Thread policy version 1.
///
/// Controls candidate discovery thresholds, ranking weights and selection.
///
/// ## Parameters
///
/// - `min_chain_length`: Minimum number of edges in a reported chain
/// - `min_star_branches`: Minimum distinct branches out of a star hub
/// - `max_route_depth`: Maximum edges from the hub along one star route
/// - `max_threads`: Cap on selected threads
/// - `overlap_threshold`: Overlap fraction above which a lower-ranked candidate is suppressed
/// - `weights`: Score component weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadPolicyV1 {
    /// Policy version identifier.
    pub version: String,
    /// Minimum chain length in edges.
    pub min_chain_length: usize,
    /// Minimum distinct star branches.
    pub min_star_branches: usize,
    /// Maximum route depth in edges from the hub.
    pub max_route_depth: usize,
    /// Maximum number of selected threads.
    pub max_threads: usize,
    /// Overlap suppression threshold in (0, 1].
    pub overlap_threshold: f64,
    /// Score component weights.
    pub weights: ScoreWeights,
}

impl ThreadPolicyV1 {
    /// Load a policy from a (possibly partial) JSON document and validate it.
    ///
    /// Absent keys take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let policy: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check every threshold and weight.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_chain_length < 1 {
            return Err(invalid("min_chain_length", "must be >= 1"));
        }
        if self.min_star_branches < 2 {
            return Err(invalid(
                "min_star_branches",
                format!("must be >= 2, got {}", self.min_star_branches),
            ));
        }
        if self.max_route_depth < 1 {
            return Err(invalid("max_route_depth", "must be >= 1"));
        }
        if self.max_threads < 1 {
            return Err(invalid("max_threads", "must be >= 1"));
        }
        if !self.overlap_threshold.is_finite()
            || self.overlap_threshold <= 0.0
            || self.overlap_threshold > 1.0
        {
            return Err(invalid(
                "overlap_threshold",
                format!("must be in (0, 1], got {}", self.overlap_threshold),
            ));
        }
        self.weights.validate()
    }

    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Compute a hash of the policy parameters.
    ///
    /// Uses quantized float representation to ensure cross-platform consistency.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedPolicyParams {
        QuantizedPolicyParams {
            version: self.version.clone(),
            min_chain_length: self.min_chain_length,
            min_star_branches: self.min_star_branches,
            max_route_depth: self.max_route_depth,
            max_threads: self.max_threads,
            overlap_threshold: quantize(self.overlap_threshold),
            weights: self.weights.to_quantized(),
        }
    }
}

impl Default for ThreadPolicyV1 {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            min_chain_length: 3,
            min_star_branches: 2,
            max_route_depth: 3,
            max_threads: 5,
            overlap_threshold: 0.6,
            weights: ScoreWeights::default(),
        }
    }
}
