//! Local content-addressed op-log store
//!
//! Writes each published op log as `<dir>/<sha256>.json`. The content id is
//! `sha256:<hex>` of the serialized log, so identical logs share one file.

use super::models::PublishRequest;
use super::traits::ContentStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const CONTENT_ID_PREFIX: &str = "sha256:";

/// [`ContentStore`] writing JSON files into a directory.
pub struct FsContentStore {
    dir: PathBuf,
}

impl FsContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the op log for `content_id`.
    pub fn path_for(&self, content_id: &str) -> Result<PathBuf> {
        let hash = content_id
            .strip_prefix(CONTENT_ID_PREFIX)
            .filter(|h| h.len() == 64 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| Error::Validation(format!("not a local content id: {}", content_id)))?;
        Ok(self.dir.join(format!("{}.json", hash)))
    }

    /// Read a stored op log back.
    pub async fn load(&self, content_id: &str) -> Result<PublishRequest> {
        let path = self.path_for(content_id)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(content_id.to_string()),
            _ => Error::Io(e),
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn publish_operation_log(&self, request: &PublishRequest) -> Result<String> {
        let bytes = serde_json::to_vec_pretty(request)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = hex::encode(hasher.finalize());

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.json", hash));
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(
            path = %path.display(),
            ops = request.ops.len(),
            "Stored operation log"
        );
        Ok(format!("{}{}", CONTENT_ID_PREFIX, hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DataType, Op};
    use crate::publish::Network;

    fn request() -> PublishRequest {
        PublishRequest {
            name: "Demo".into(),
            ops: vec![Op::CreateProperty {
                id: "p".into(),
                name: "Title".into(),
                data_type: DataType::Text,
            }],
            author_address: "0xabc".into(),
            network: Network::Testnet,
        }
    }

    #[tokio::test]
    async fn test_store_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContentStore::new(dir.path().join("ops"));

        let first = store.publish_operation_log(&request()).await.unwrap();
        let second = store.publish_operation_log(&request()).await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("sha256:"));
        assert_eq!(first.len(), "sha256:".len() + 64);

        let loaded = store.load(&first).await.unwrap();
        assert_eq!(loaded, request());
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_load_rejects_foreign_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContentStore::new(dir.path());
        assert!(matches!(store.load("ipfs://x").await, Err(Error::Validation(_))));

        let missing = format!("sha256:{}", "0".repeat(64));
        assert!(matches!(store.load(&missing).await, Err(Error::NotFound(_))));
    }
}
