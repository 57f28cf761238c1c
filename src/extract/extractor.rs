//! Note extraction
//!
//! [`extract`] turns one raw note plus its structural metadata into a
//! [`Note`]. It never fails: anything missing or malformed degrades to an
//! empty value. [`NoteExtractor`] wraps it with vault I/O and batch handling.

use super::content::{clean_content, extract_blocks, extract_links, extract_tags, resolve_title};
use super::models::{Heading, Note};
use crate::error::{BatchOutcome, Error, Result};
use crate::vault::{
    file_stem, is_excluded, parse_structural_metadata, FileStat, StructuralMetadata, VaultStore,
};
use std::sync::Arc;

/// Build a [`Note`] from raw text.
///
/// When `metadata` is `None` the host parse is emulated with
/// [`parse_structural_metadata`]. Position spans are copied through.
pub fn extract(
    path: &str,
    raw_text: &str,
    metadata: Option<&StructuralMetadata>,
    fallback_name: &str,
    stat: FileStat,
) -> Note {
    let parsed;
    let metadata = match metadata {
        Some(metadata) => metadata,
        None => {
            parsed = parse_structural_metadata(raw_text);
            &parsed
        }
    };

    let frontmatter = metadata.frontmatter.clone().unwrap_or_default();
    let headings = metadata
        .headings
        .iter()
        .map(|h| Heading {
            level: h.level,
            text: h.heading.clone(),
        })
        .collect();

    Note {
        title: resolve_title(&frontmatter, raw_text, fallback_name),
        content: clean_content(raw_text),
        path: path.to_string(),
        created_date: stat.created_at,
        modified_date: stat.modified_at,
        tags: extract_tags(metadata, &frontmatter),
        links: extract_links(metadata),
        headings,
        blocks: extract_blocks(raw_text),
        frontmatter,
    }
}

/// Extracts notes straight from a [`VaultStore`].
pub struct NoteExtractor {
    vault: Arc<dyn VaultStore>,
}

impl NoteExtractor {
    pub fn new(vault: Arc<dyn VaultStore>) -> Self {
        Self { vault }
    }

    pub fn vault(&self) -> &Arc<dyn VaultStore> {
        &self.vault
    }

    /// Read and extract one note.
    ///
    /// Only an unreadable note is an error. Missing host metadata falls back
    /// to the built-in parser and a failed stat falls back to the current time.
    pub async fn extract_path(&self, path: &str) -> Result<Note> {
        let raw = self.vault.read_note_text(path).await.map_err(|e| match e {
            Error::StorageUnavailable(_) | Error::NotFound(_) | Error::Extraction { .. } => e,
            other => Error::extraction(path, other),
        })?;

        let metadata = match self.vault.structural_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "No host metadata, parsing note text");
                None
            }
        };

        let stat = match self.vault.stat(path).await {
            Ok(stat) => stat,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Stat failed, using current time");
                let now = chrono::Utc::now();
                FileStat::new(now, now)
            }
        };

        let note = extract(path, &raw, metadata.as_ref(), file_stem(path), stat);
        tracing::debug!(
            path = %path,
            title = %note.title,
            tags = note.tags.len(),
            links = note.links.len(),
            "Extracted note"
        );
        Ok(note)
    }

    /// Extract several notes in order. A failing note is logged and skipped.
    pub async fn extract_many(&self, paths: &[String]) -> BatchOutcome<Note> {
        let mut outcome = BatchOutcome::new();
        for path in paths {
            let result = self.extract_path(path).await;
            outcome.record(path, result);
        }
        outcome
    }

    /// Extract every note outside the excluded folders.
    ///
    /// An unavailable vault yields an empty outcome.
    pub async fn extract_vault(&self, excluded_folders: &[String]) -> BatchOutcome<Note> {
        let paths = match self.vault.list_note_paths().await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list vault notes");
                return BatchOutcome::new();
            }
        };

        let paths: Vec<String> = paths
            .into_iter()
            .filter(|p| !is_excluded(p, excluded_folders))
            .collect();

        let outcome = self.extract_many(&paths).await;
        tracing::info!(
            extracted = outcome.items.len(),
            failed = outcome.failures.len(),
            "Vault extraction complete"
        );
        outcome
    }
}
