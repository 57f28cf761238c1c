//! Filesystem-backed vault
//!
//! Treats a directory of Markdown files as the note store. Note identifiers
//! are `/`-separated paths relative to the vault root. Structural metadata is
//! produced by [`parse_structural_metadata`] the way a host editor would.

use super::metadata::parse_structural_metadata;
use super::models::{FileStat, StructuralMetadata};
use super::traits::VaultStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const NOTE_EXTENSION: &str = "md";

/// Vault rooted at a directory on disk.
pub struct FsVaultStore {
    root: PathBuf,
}

impl FsVaultStore {
    /// Create a vault over `root`. The directory is not required to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a vault-relative note path, refusing anything that escapes the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(Error::Validation(format!(
                        "note path escapes the vault: {}",
                        path
                    )))
                }
            }
        }
        Ok(self.root.join(relative))
    }

    fn ensure_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::StorageUnavailable(format!(
                "vault directory {} does not exist",
                self.root.display()
            )))
        }
    }

    async fn read_existing(&self, path: &str) -> Result<String> {
        self.ensure_root()?;
        let full = self.resolve(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Hidden entries (`.obsidian`, `.trash`, `.git`) are never part of the vault.
fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

#[async_trait]
impl VaultStore for FsVaultStore {
    async fn read_note_text(&self, path: &str) -> Result<String> {
        self.read_existing(path).await
    }

    async fn structural_metadata(&self, path: &str) -> Result<Option<StructuralMetadata>> {
        let text = self.read_existing(path).await?;
        Ok(Some(parse_structural_metadata(&text)))
    }

    async fn list_note_paths(&self) -> Result<Vec<String>> {
        if let Err(e) = self.ensure_root() {
            tracing::warn!(error = %e, "Vault unavailable, treating it as empty");
            return Ok(Vec::new());
        }

        let root = self.root.clone();
        let paths = tokio::task::spawn_blocking(move || {
            let mut paths = Vec::new();
            for entry in WalkDir::new(&root)
                .into_iter()
                .filter_entry(|e| !is_hidden(e))
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|e| e.to_str()) != Some(NOTE_EXTENSION)
                {
                    continue;
                }
                if let Ok(relative) = path.strip_prefix(&root) {
                    paths.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
            paths.sort();
            paths
        })
        .await
        .map_err(|e| Error::StorageUnavailable(format!("vault listing task failed: {}", e)))?;

        Ok(paths)
    }

    async fn write_note_text(&self, path: &str, text: &str) -> Result<()> {
        self.ensure_root()?;
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, text).await?;
        Ok(())
    }

    async fn stat(&self, path: &str) -> Result<FileStat> {
        self.ensure_root()?;
        let full = self.resolve(path)?;
        let meta = match tokio::fs::metadata(&full).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let modified: DateTime<Utc> = meta
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| Utc::now());
        // Not every filesystem records a birth time
        let created: DateTime<Utc> = meta.created().map(DateTime::from).unwrap_or(modified);

        Ok(FileStat::new(created, modified))
    }
}
