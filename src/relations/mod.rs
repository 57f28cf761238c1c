//! Relationship inference between notes.
//!
//! Produces analytic edges (direct link, shared tags, content similarity)
//! and a petgraph view over them. These edges are never published.

pub mod graph;
pub mod infer;
pub mod models;

pub use graph::RelationshipGraph;
pub use infer::{infer_relationships, jaccard, shared_tag_strength, significant_words};
pub use models::*;
