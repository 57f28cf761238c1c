//! Vault data models
//!
//! Shapes of the data the host note storage hands to the pipeline: file
//! timestamps and the host's structural parse of a note (frontmatter, tags,
//! links, embeds, headings). Position spans are opaque to the pipeline and
//! copied through unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw frontmatter block, passed through unmodified.
pub type Frontmatter = BTreeMap<String, serde_json::Value>;

/// A location inside a note's raw text (0-based line and column, byte offset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
    pub offset: usize,
}

/// Start/end positions of a construct inside the raw text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A tag occurrence as reported by the host (may still carry the `#`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
    pub tag: String,
    pub position: Option<Span>,
}

/// A link or embed occurrence as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRef {
    /// Raw reference text (`Note`, `folder/Note#Heading`, `image.png`)
    pub link: String,
    pub display_text: Option<String>,
    pub position: Option<Span>,
}

/// A heading occurrence as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingRef {
    pub heading: String,
    pub level: u8,
    pub position: Option<Span>,
}

/// Host-provided structural parse of one note. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralMetadata {
    pub frontmatter: Option<Frontmatter>,
    pub tags: Vec<TagRef>,
    pub links: Vec<LinkRef>,
    pub embeds: Vec<LinkRef>,
    pub headings: Vec<HeadingRef>,
}

/// File timestamps of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl FileStat {
    pub fn new(created_at: DateTime<Utc>, modified_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            modified_at,
        }
    }
}
