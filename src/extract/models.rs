//! Note data models
//!
//! A [`Note`] is the normalized, immutable result of extracting one vault
//! file. It is rebuilt from scratch on every extraction.

use crate::vault::{Frontmatter, Span};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of a note link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// `[[Target]]` or a relative Markdown link
    Internal,
    /// `![[Target]]`
    Embed,
}

/// A reference from a note to another note or resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub target: String,
    /// Display text, the raw target when the link had none
    pub display_text: String,
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Code,
    Callout,
    Table,
}

/// A structural block found in the raw note text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub content: String,
}

impl Block {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// One extracted note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    /// Body with structural markup stripped
    pub content: String,
    /// Vault-relative identifier, stable across extractions
    pub path: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    /// Distinct tag names without the leading `#`
    pub tags: BTreeSet<String>,
    pub links: Vec<Link>,
    pub frontmatter: Frontmatter,
    pub headings: Vec<Heading>,
    /// Code blocks first, then callouts, then tables
    pub blocks: Vec<Block>,
}
