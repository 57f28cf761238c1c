//! In-memory mocks of the publication collaborators.
//!
//! Each mock records the calls it receives and can be told to fail, so tests
//! can check both the order of publication steps and abort behaviour.

use super::models::{AnchorPayload, PublishRequest, TransactionRequest, TransactionResult};
use super::traits::{AnchorService, ContentStore, WalletSigner};
use crate::error::{Error, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Content store that keeps every op log in memory.
pub struct MockContentStore {
    requests: RwLock<Vec<PublishRequest>>,
    fail_with: RwLock<Option<String>>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
            fail_with: RwLock::new(None),
        }
    }

    /// Make subsequent publishes fail with a network error.
    pub async fn fail_with(&self, message: &str) {
        *self.fail_with.write().await = Some(message.to_string());
    }

    pub async fn requests(&self) -> Vec<PublishRequest> {
        self.requests.read().await.clone()
    }
}

impl Default for MockContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn publish_operation_log(&self, request: &PublishRequest) -> Result<String> {
        if let Some(message) = self.fail_with.read().await.clone() {
            return Err(Error::Network(message));
        }
        let mut requests = self.requests.write().await;
        requests.push(request.clone());
        Ok(format!("ipfs://mock-cid-{}", requests.len()))
    }
}

/// Anchor service answering with a fixed payload.
pub struct MockAnchorService {
    calls: RwLock<Vec<(String, String)>>,
    fail_with: RwLock<Option<String>>,
}

impl MockAnchorService {
    pub fn new() -> Self {
        Self {
            calls: RwLock::new(Vec::new()),
            fail_with: RwLock::new(None),
        }
    }

    pub async fn fail_with(&self, message: &str) {
        *self.fail_with.write().await = Some(message.to_string());
    }

    /// `(space_id, content_id)` of every call
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.read().await.clone()
    }
}

impl Default for MockAnchorService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnchorService for MockAnchorService {
    async fn anchor_payload(&self, space_id: &str, content_id: &str) -> Result<AnchorPayload> {
        if let Some(message) = self.fail_with.read().await.clone() {
            return Err(Error::Network(message));
        }
        self.calls
            .write()
            .await
            .push((space_id.to_string(), content_id.to_string()));
        Ok(AnchorPayload {
            to: format!("0xspace-{}", space_id),
            data: format!("0xanchor:{}", content_id),
        })
    }
}

/// Wallet returning sequential fake transaction hashes.
pub struct MockWalletSigner {
    sent: RwLock<Vec<TransactionRequest>>,
    fail_with: RwLock<Option<String>>,
}

impl MockWalletSigner {
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            fail_with: RwLock::new(None),
        }
    }

    pub async fn fail_with(&self, message: &str) {
        *self.fail_with.write().await = Some(message.to_string());
    }

    pub async fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.read().await.clone()
    }
}

impl Default for MockWalletSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletSigner for MockWalletSigner {
    async fn sign_and_send(&self, transaction: &TransactionRequest) -> Result<TransactionResult> {
        if let Some(message) = self.fail_with.read().await.clone() {
            return Err(Error::Transaction(message));
        }
        let mut sent = self.sent.write().await;
        sent.push(transaction.clone());
        Ok(TransactionResult {
            hash: format!("0xtx{:04}", sent.len()),
        })
    }
}
