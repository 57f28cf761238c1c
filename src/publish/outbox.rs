//! Transaction outbox
//!
//! A [`WalletSigner`] that hands anchoring transactions to an external wallet
//! instead of signing them in process. Each transaction is written as
//! `<dir>/<sha256>.json` together with the sending address; the wallet picks
//! the files up, signs and broadcasts them. The returned hash is the sha256
//! of the queued file, prefixed `outbox:`.

use super::models::{TransactionRequest, TransactionResult};
use super::traits::WalletSigner;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const OUTBOX_PREFIX: &str = "outbox:";

/// One queued transaction as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTransaction {
    pub from: String,
    #[serde(flatten)]
    pub transaction: TransactionRequest,
}

/// [`WalletSigner`] queueing transactions as JSON files.
pub struct FsTransactionOutbox {
    dir: PathBuf,
    from: String,
}

impl FsTransactionOutbox {
    pub fn new(dir: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            from: from.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read back a queued transaction by the hash [`sign_and_send`] returned.
    ///
    /// [`sign_and_send`]: WalletSigner::sign_and_send
    pub async fn load(&self, hash: &str) -> Result<QueuedTransaction> {
        let digest = hash
            .strip_prefix(OUTBOX_PREFIX)
            .filter(|h| h.len() == 64 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| Error::Validation(format!("not an outbox hash: {}", hash)))?;
        let path = self.dir.join(format!("{}.json", digest));
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(hash.to_string()),
            _ => Error::Io(e),
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl WalletSigner for FsTransactionOutbox {
    async fn sign_and_send(&self, transaction: &TransactionRequest) -> Result<TransactionResult> {
        let queued = QueuedTransaction {
            from: self.from.clone(),
            transaction: transaction.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&queued)?;
        let digest = hex::encode(Sha256::digest(&bytes));

        let path = self.dir.join(format!("{}.json", digest));
        let written = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, &bytes).await
        }
        .await;
        written
            .map_err(|e| Error::Transaction(format!("failed to queue {}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), to = %transaction.to, "Queued anchor transaction");
        Ok(TransactionResult {
            hash: format!("{}{}", OUTBOX_PREFIX, digest),
        })
    }
}
