//! Relation classifier: label → strength class.
//!
//! A fixed, stateless lookup shared by the pruner and the miner. Only strong
//! relations may justify connectivity or thread membership; anything the
//! vocabulary does not recognize is weak.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::types::RelationType;

/// Strength class of a relation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationStrength {
    /// Substantive intellectual dependency.
    Strong,
    /// Citation or background reference only.
    Weak,
}

impl RelationStrength {
    /// Whether this is the strong class.
    pub fn is_strong(&self) -> bool {
        matches!(self, Self::Strong)
    }
}

impl std::fmt::Display for RelationStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Weak => write!(f, "weak"),
        }
    }
}

/// Classify a raw relation label.
///
/// Total over all strings; unknown labels are weak.
///
/// ```rust
/// use evolution_kernel::classifier::{classify, RelationStrength};
///
/// assert_eq!(classify("Overcomes"), RelationStrength::Strong);
/// assert_eq!(classify("adapts-to"), RelationStrength::Strong);
/// assert_eq!(classify("Baselines"), RelationStrength::Weak);
/// assert_eq!(classify("mentions in passing"), RelationStrength::Weak);
/// ```
pub fn classify(label: &str) -> RelationStrength {
    RelationType::parse(label).strength()
}

/// Normalize a relation label for vocabulary lookup.
///
/// Lowercases, trims, and collapses runs of whitespace, hyphens and
/// underscores into a single `_`.
pub fn normalize_label(label: &str) -> String {
    static SEPARATORS: OnceLock<Option<Regex>> = OnceLock::new();
    let lowered = label.trim().to_lowercase();
    match SEPARATORS.get_or_init(|| Regex::new(r"[\s_\-]+").ok()) {
        Some(re) => re.replace_all(&lowered, "_").trim_matches('_').to_string(),
        None => lowered,
    }
}
