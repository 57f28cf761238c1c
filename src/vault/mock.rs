//! In-memory mock implementation of VaultStore for testing without a real vault.

use super::models::{FileStat, StructuralMetadata};
use super::traits::VaultStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MockNote {
    text: String,
    metadata: Option<StructuralMetadata>,
    stat: FileStat,
}

/// In-memory vault for testing.
///
/// Notes live in a `BTreeMap` behind an async `RwLock`, so listings are
/// sorted. Notes inserted without metadata report `None` from
/// `structural_metadata`, which exercises the extractor's fallback parser.
/// Listing calls are counted so tests can observe cache behaviour.
pub struct MockVaultStore {
    notes: RwLock<BTreeMap<String, MockNote>>,
    failing_reads: RwLock<HashSet<String>>,
    unavailable: RwLock<bool>,
    list_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl MockVaultStore {
    /// Create a new empty mock vault.
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(BTreeMap::new()),
            failing_reads: RwLock::new(HashSet::new()),
            unavailable: RwLock::new(false),
            list_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }

    /// Fixed timestamp used for notes inserted without an explicit stat.
    pub fn default_stat() -> FileStat {
        let at = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .unwrap_or_else(Utc::now);
        FileStat::new(at, at)
    }

    /// Add or replace a note with no host metadata.
    pub async fn insert(&self, path: &str, text: &str) {
        self.insert_full(path, text, None, Self::default_stat()).await;
    }

    /// Add or replace a note with explicit metadata and timestamps.
    pub async fn insert_full(
        &self,
        path: &str,
        text: &str,
        metadata: Option<StructuralMetadata>,
        stat: FileStat,
    ) {
        self.notes.write().await.insert(
            path.to_string(),
            MockNote {
                text: text.to_string(),
                metadata,
                stat,
            },
        );
    }

    /// Make every subsequent read of `path` fail with an extraction error.
    pub async fn fail_reads_of(&self, path: &str) {
        self.failing_reads.write().await.insert(path.to_string());
    }

    /// Simulate a vault whose backing store has gone away.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Current raw text of a note, bypassing failure injection.
    pub async fn text_of(&self, path: &str) -> Option<String> {
        self.notes.read().await.get(path).map(|n| n.text.clone())
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    async fn check_available(&self) -> Result<()> {
        if *self.unavailable.read().await {
            return Err(Error::StorageUnavailable("mock vault is offline".into()));
        }
        Ok(())
    }

    async fn check_readable(&self, path: &str) -> Result<()> {
        self.check_available().await?;
        if self.failing_reads.read().await.contains(path) {
            return Err(Error::extraction(path, "injected read failure"));
        }
        Ok(())
    }
}

impl Default for MockVaultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VaultStore for MockVaultStore {
    async fn read_note_text(&self, path: &str) -> Result<String> {
        self.check_readable(path).await?;
        self.notes
            .read()
            .await
            .get(path)
            .map(|n| n.text.clone())
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    async fn structural_metadata(&self, path: &str) -> Result<Option<StructuralMetadata>> {
        self.check_readable(path).await?;
        self.notes
            .read()
            .await
            .get(path)
            .map(|n| n.metadata.clone())
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    async fn list_note_paths(&self) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available().await?;
        Ok(self.notes.read().await.keys().cloned().collect())
    }

    async fn write_note_text(&self, path: &str, text: &str) -> Result<()> {
        self.check_available().await?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut notes = self.notes.write().await;
        match notes.get_mut(path) {
            Some(note) => {
                note.text = text.to_string();
                // Host metadata is stale after a rewrite
                note.metadata = None;
            }
            None => {
                notes.insert(
                    path.to_string(),
                    MockNote {
                        text: text.to_string(),
                        metadata: None,
                        stat: Self::default_stat(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn stat(&self, path: &str) -> Result<FileStat> {
        self.check_available().await?;
        self.notes
            .read()
            .await
            .get(path)
            .map(|n| n.stat)
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }
}
