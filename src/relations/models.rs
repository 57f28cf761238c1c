//! Relationship edge types.

use serde::{Deserialize, Serialize};

/// Why two notes are considered related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    DirectLink,
    SharedTags,
    ContentSimilarity,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectLink => write!(f, "direct-link"),
            Self::SharedTags => write!(f, "shared-tags"),
            Self::ContentSimilarity => write!(f, "content-similarity"),
        }
    }
}

/// An inferred, analytic relationship between two notes.
///
/// Not published; the graph compiler has its own relation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    /// Path of the earlier note in the input order
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
    /// In `[0, 1]`
    pub strength: f64,
}

/// One connected group of related notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteCluster {
    pub id: u32,
    /// Note paths, sorted
    pub members: Vec<String>,
}
