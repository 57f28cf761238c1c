//! Publication collaborator traits
//!
//! The coordinator reaches the outside world only through these traits:
//! the content-addressed op-log store, the anchor calldata service and the
//! wallet that signs and sends the anchoring transaction.

use super::models::{
    AnchorPayload, PublishReceipt, PublishRequest, TransactionRequest, TransactionResult,
};
use crate::error::Result;
use async_trait::async_trait;

/// Content-addressed store for operation logs.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store the op log and return its content identifier
    async fn publish_operation_log(&self, request: &PublishRequest) -> Result<String>;
}

/// Service producing anchor transaction calldata.
#[async_trait]
pub trait AnchorService: Send + Sync {
    async fn anchor_payload(&self, space_id: &str, content_id: &str) -> Result<AnchorPayload>;
}

/// Signs and submits transactions.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn sign_and_send(&self, transaction: &TransactionRequest) -> Result<TransactionResult>;
}

/// Anything able to publish a single vault note by path.
#[async_trait]
pub trait NotePublisher: Send + Sync {
    async fn publish_note(&self, path: &str) -> Result<PublishReceipt>;
}
