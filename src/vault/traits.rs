//! VaultStore trait definition
//!
//! Abstract interface to the host note storage. The pipeline never touches
//! the filesystem directly; everything goes through this trait so the
//! filesystem vault, the in-memory mock and any embedding host are
//! interchangeable.

use super::models::{FileStat, StructuralMetadata};
use crate::error::Result;
use async_trait::async_trait;

/// Host note storage. Note identifiers are vault-relative paths.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Read the raw text of a note
    async fn read_note_text(&self, path: &str) -> Result<String>;

    /// Get the host's structural parse of a note, if it has one
    async fn structural_metadata(&self, path: &str) -> Result<Option<StructuralMetadata>>;

    /// List every note identifier in the vault
    async fn list_note_paths(&self) -> Result<Vec<String>>;

    /// Replace the raw text of a note (used only by tag rename/delete)
    async fn write_note_text(&self, path: &str, text: &str) -> Result<()>;

    /// Creation and modification timestamps of a note
    async fn stat(&self, path: &str) -> Result<FileStat>;
}
