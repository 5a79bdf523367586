//! Relation types for the citation graph.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use super::paper::PaperId;
use crate::classifier::{normalize_label, RelationStrength};

/// Semantic type of a relation between two papers.
///
/// The derived `Ord` follows declaration order, which is also the
/// dominant-relation priority order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationType {
    /// Source overcomes a limitation of the target.
    Overcomes,
    /// Source extends the target.
    Extends,
    /// Source realizes an idea of the target.
    Realizes,
    /// Source adapts the target to a new setting.
    AdaptsTo,
    /// Source is an alternative to the target.
    AlternativeTo,
    /// Source uses the target as a baseline.
    Baselines,
    /// Plain citation.
    Cites,
    /// Label outside the vocabulary (kept verbatim for statistics).
    Unknown(String),
}

impl RelationType {
    /// Parse a relation label. Never fails; unknown labels are preserved.
    pub fn parse(label: &str) -> Self {
        match normalize_label(label).as_str() {
            "overcomes" | "overcome" => Self::Overcomes,
            "extends" | "extend" => Self::Extends,
            "realizes" | "realises" | "realize" => Self::Realizes,
            "adapts_to" | "adapts" | "adapt_to" => Self::AdaptsTo,
            "alternative_to" | "alternative" | "is_alternative_to" => Self::AlternativeTo,
            "baselines" | "baseline" => Self::Baselines,
            "cites" | "cite" | "citation" | "references" | "" => Self::Cites,
            _ => Self::Unknown(label.trim().to_string()),
        }
    }

    /// Canonical label.
    pub fn label(&self) -> &str {
        match self {
            Self::Overcomes => "Overcomes",
            Self::Extends => "Extends",
            Self::Realizes => "Realizes",
            Self::AdaptsTo => "Adapts_to",
            Self::AlternativeTo => "Alternative_to",
            Self::Baselines => "Baselines",
            Self::Cites => "Cites",
            Self::Unknown(label) => label,
        }
    }

    /// Strength class of this relation type.
    pub fn strength(&self) -> RelationStrength {
        match self {
            Self::Overcomes
            | Self::Extends
            | Self::Realizes
            | Self::AdaptsTo
            | Self::AlternativeTo => RelationStrength::Strong,
            Self::Baselines | Self::Cites | Self::Unknown(_) => RelationStrength::Weak,
        }
    }

    /// Whether this relation type is strong.
    pub fn is_strong(&self) -> bool {
        self.strength().is_strong()
    }

    /// Priority rank (lower wins ties).
    pub fn priority(&self) -> u8 {
        match self {
            Self::Overcomes => 0,
            Self::Extends => 1,
            Self::Realizes => 2,
            Self::AdaptsTo => 3,
            Self::AlternativeTo => 4,
            Self::Baselines => 5,
            Self::Cites => 6,
            Self::Unknown(_) => 7,
        }
    }
}

impl Default for RelationType {
    fn default() -> Self {
        Self::Cites
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for RelationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RelationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}

/// Directed, typed relation between two papers.
///
/// Multiple relations between the same pair with different types are
/// distinct entities. Implements `Ord` for deterministic ordering:
/// (source, target, relation_type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Source paper.
    pub source: PaperId,
    /// Target paper.
    pub target: PaperId,
    /// Semantic relation type.
    pub relation_type: RelationType,
}

impl Relation {
    /// Create a new relation.
    pub fn new(source: impl Into<PaperId>, target: impl Into<PaperId>, relation_type: RelationType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation_type,
        }
    }

    /// Whether this relation is strong.
    pub fn is_strong(&self) -> bool {
        self.relation_type.is_strong()
    }
}

// Canonical ordering: source, then target, then relation_type
impl PartialOrd for Relation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Relation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.source.cmp(&other.source) {
            std::cmp::Ordering::Equal => match self.target.cmp(&other.target) {
                std::cmp::Ordering::Equal => self.relation_type.cmp(&other.relation_type),
                ord => ord,
            },
            ord => ord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_relation_ordering() {
        let e1 = Relation::new("A", "B", RelationType::Extends);
        let e2 = Relation::new("A", "C", RelationType::Extends);
        let e3 = Relation::new("B", "C", RelationType::Extends);

        // Same source, different target
        assert!(e1 < e2);
        // Different source
        assert!(e1 < e3);
        assert!(e2 < e3);
    }

    #[test]
    fn test_parallel_relations_are_distinct() {
        let e1 = Relation::new("A", "B", RelationType::Extends);
        let e2 = Relation::new("A", "B", RelationType::Overcomes);

        assert_ne!(e1, e2);
        // Overcomes sorts first
        assert!(e2 < e1);
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(RelationType::parse("Overcomes"), RelationType::Overcomes);
        assert_eq!(RelationType::parse("ADAPTS TO"), RelationType::AdaptsTo);
        assert_eq!(RelationType::parse("Alternative"), RelationType::AlternativeTo);
        assert_eq!(RelationType::parse("CITES"), RelationType::Cites);
        assert_eq!(
            RelationType::parse(" Inspires "),
            RelationType::Unknown("Inspires".to_string())
        );
    }

    #[test]
    fn test_priority_matches_ordering() {
        let mut all = vec![
            RelationType::Cites,
            RelationType::AlternativeTo,
            RelationType::Overcomes,
            RelationType::Realizes,
            RelationType::Extends,
            RelationType::AdaptsTo,
        ];
        all.sort();
        let priorities: Vec<u8> = all.iter().map(|r| r.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&RelationType::AdaptsTo).unwrap();
        assert_eq!(json, "\"Adapts_to\"");

        let parsed: RelationType = serde_json::from_str("\"extends\"").unwrap();
        assert_eq!(parsed, RelationType::Extends);
    }

    #[test]
    fn test_relation_type_as_map_key() {
        let mut counts = BTreeMap::new();
        counts.insert(RelationType::Overcomes, 2usize);
        counts.insert(RelationType::Extends, 1usize);

        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"Overcomes":2,"Extends":1}"#);
    }
}
