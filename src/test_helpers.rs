//! Test helper factories
//!
//! Convenience constructors for notes, vaults and publish settings with
//! sensible defaults.
#![allow(dead_code)]

use crate::extract::{Link, LinkKind, Note};
use crate::publish::{Network, PublishSettings};
use crate::vault::{Frontmatter, MockVaultStore};
use chrono::{TimeZone, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

// ============================================================================
// Note factories
// ============================================================================

/// Create a note with the given tags and content, no links
pub fn note(path: &str, title: &str, tags: &[&str], content: &str) -> Note {
    let at = Utc
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("fixed test timestamp");
    Note {
        title: title.to_string(),
        content: content.to_string(),
        path: path.to_string(),
        created_date: at,
        modified_date: at,
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        links: vec![],
        frontmatter: Frontmatter::new(),
        headings: vec![],
        blocks: vec![],
    }
}

/// Create a note linking to each of `targets`
pub fn note_with_links(path: &str, title: &str, targets: &[&str]) -> Note {
    let mut n = note(path, title, &[], "");
    n.links = targets
        .iter()
        .map(|t| Link {
            target: t.to_string(),
            display_text: t.to_string(),
            kind: LinkKind::Internal,
            position: None,
        })
        .collect();
    n
}

// ============================================================================
// Vault and settings builders
// ============================================================================

/// Create an in-memory vault seeded with `(path, text)` pairs
pub async fn mock_vault(notes: &[(&str, &str)]) -> Arc<MockVaultStore> {
    let vault = Arc::new(MockVaultStore::new());
    for (path, text) in notes {
        vault.insert(path, text).await;
    }
    vault
}

/// Publish settings with every required field filled in
pub fn test_publish_settings() -> PublishSettings {
    PublishSettings {
        network: Network::Testnet,
        space_id: "space-test".to_string(),
        author_address: "0x0000000000000000000000000000000000000001".to_string(),
        private_key: Some("0xtest-private-key".to_string().into()),
        api_url: None,
    }
}
