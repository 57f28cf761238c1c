//! Graph compilation data models.
//!
//! - [`GraphEntity`] / [`GraphRelation`]: compiled objects, each carrying
//!   the ops that create it
//! - [`CompiledNote`]: everything compiled from one note
//! - [`CompileOptions`] / [`IdentityStrategy`]: compilation switches

use super::ops::Op;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Note,
    Tag,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    HasTag,
    LinksTo,
}

/// An entity produced by compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEntity {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    /// Property, type and entity creation ops, in emission order
    pub ops: Vec<Op>,
}

/// A relation produced by compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelation {
    pub id: String,
    pub kind: RelationKind,
    pub from_entity: String,
    pub to_entity: String,
    /// Relation type creation followed by the relation op
    pub ops: Vec<Op>,
}

/// Output of compiling one note.
///
/// `entities` holds the note entity first, then tags, then links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledNote {
    pub entities: Vec<GraphEntity>,
    pub relations: Vec<GraphRelation>,
}

impl CompiledNote {
    /// Every op, entities before relations, each in compilation order.
    pub fn flatten_ops(&self) -> Vec<Op> {
        flatten_ops(&self.entities, &self.relations)
    }
}

/// Concatenate the ops of `entities` then `relations`, keeping relative order.
pub fn flatten_ops(entities: &[GraphEntity], relations: &[GraphRelation]) -> Vec<Op> {
    entities
        .iter()
        .flat_map(|e| e.ops.iter())
        .chain(relations.iter().flat_map(|r| r.ops.iter()))
        .cloned()
        .collect()
}

/// How compiled objects get their ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStrategy {
    /// New ids on every compilation
    #[default]
    Fresh,
    /// Ids derived from note path, tag name, link target and schema names,
    /// so recompiling an unchanged note yields the same ids
    PathKeyed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub include_tags: bool,
    pub include_links: bool,
    /// Space recorded on every relation op
    pub target_space: Option<String>,
    pub identity: IdentityStrategy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            include_tags: true,
            include_links: true,
            target_space: None,
            identity: IdentityStrategy::Fresh,
        }
    }
}
