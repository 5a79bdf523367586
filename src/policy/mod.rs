//! Thread policy definitions.

pub mod v1;
pub mod scoring;

pub use v1::{ConfigurationError, ScoreWeights, ThreadPolicyV1};
pub use scoring::{score_candidates, ScoreBreakdown, ScoredCandidate};
