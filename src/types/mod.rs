//! Core types for the evolution kernel.

pub mod paper;
pub mod relation;

pub use paper::{Paper, PaperId};
pub use relation::{Relation, RelationType};
