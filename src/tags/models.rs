//! Tag index result types.

use serde::{Deserialize, Serialize};

/// Vault-wide usage of one tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagMetadata {
    /// Tag name without the leading `#`
    pub name: String,
    /// Number of occurrences across the vault
    pub count: usize,
    /// Note path of every occurrence (a path repeats when a note uses the tag twice)
    pub notes: Vec<String>,
    /// Display colour from [`super::tag_color`]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TagMetadata {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            notes: Vec::new(),
            color: super::tag_color(name).to_string(),
            description: None,
        }
    }

    /// Distinct note paths using this tag.
    pub fn distinct_notes(&self) -> std::collections::BTreeSet<&str> {
        self.notes.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedTag {
    pub name: String,
    /// Shared notes divided by the larger of the two occurrence counts
    pub strength: f64,
    pub shared_notes: usize,
}

/// Two tags used together, names in alphabetical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPair {
    pub first: String,
    pub second: String,
    pub shared_notes: usize,
}

/// Aggregate figures over the whole tag index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagStatistics {
    pub total_tags: usize,
    pub total_usage: usize,
    pub file_count: usize,
    /// `total_usage / file_count`, zero for an empty vault
    pub average_tags_per_note: f64,
    pub most_used: Option<String>,
    pub least_used: Option<String>,
    /// Tags containing `/`
    pub hierarchical_tags: usize,
}
