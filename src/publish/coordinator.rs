//! Publication coordinator
//!
//! Publishing is strictly sequential: flatten the compiled ops, store the op
//! log, fetch anchor calldata for the configured space, then sign and send
//! the anchoring transaction. The first failing step aborts the publish with
//! its own error. Nothing is retried and nothing is persisted on failure.

use super::models::{PublishReceipt, PublishRequest, PublishSettings, TransactionRequest};
use super::traits::{AnchorService, ContentStore, NotePublisher, WalletSigner};
use crate::error::{BatchOutcome, Result};
use crate::extract::NoteExtractor;
use crate::graph::{
    flatten_ops, CompileOptions, GraphCompiler, GraphEntity, GraphRelation, OpsFactory,
};
use crate::vault::VaultStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Name given to an op log when there is no entity to name it after.
const DEFAULT_EDIT_NAME: &str = "Obsidian notes";

/// Drives extraction, compilation and the three publication steps.
pub struct PublicationCoordinator {
    settings: PublishSettings,
    options: CompileOptions,
    excluded_folders: Vec<String>,
    extractor: NoteExtractor,
    compiler: GraphCompiler,
    content_store: Arc<dyn ContentStore>,
    anchor: Arc<dyn AnchorService>,
    signer: Arc<dyn WalletSigner>,
}

impl PublicationCoordinator {
    pub fn new(
        settings: PublishSettings,
        vault: Arc<dyn VaultStore>,
        factory: Arc<dyn OpsFactory>,
        content_store: Arc<dyn ContentStore>,
        anchor: Arc<dyn AnchorService>,
        signer: Arc<dyn WalletSigner>,
    ) -> Self {
        Self {
            settings,
            options: CompileOptions::default(),
            excluded_folders: Vec::new(),
            extractor: NoteExtractor::new(vault),
            compiler: GraphCompiler::new(factory),
            content_store,
            anchor,
            signer,
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_excluded_folders(mut self, excluded_folders: Vec<String>) -> Self {
        self.excluded_folders = excluded_folders;
        self
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Publish compiled entities and relations as one op log.
    pub async fn publish(
        &self,
        entities: &[GraphEntity],
        relations: &[GraphRelation],
    ) -> Result<PublishReceipt> {
        self.settings.validate()?;

        let request = PublishRequest {
            name: entities
                .first()
                .map(|e| e.name.clone())
                .unwrap_or_else(|| DEFAULT_EDIT_NAME.to_string()),
            ops: flatten_ops(entities, relations),
            author_address: self.settings.author_address.clone(),
            network: self.settings.network,
        };
        let op_count = request.ops.len();

        let content_id = self.content_store.publish_operation_log(&request).await?;
        tracing::debug!(cid = %content_id, ops = op_count, "Operation log stored");

        let payload = self
            .anchor
            .anchor_payload(&self.settings.space_id, &content_id)
            .await?;

        let transaction = self
            .signer
            .sign_and_send(&TransactionRequest {
                to: payload.to,
                value: 0,
                data: payload.data,
            })
            .await?;

        tracing::info!(
            cid = %content_id,
            tx = %transaction.hash,
            space = %self.settings.space_id,
            ops = op_count,
            "Published operation log"
        );
        Ok(PublishReceipt {
            content_id,
            transaction,
        })
    }

    /// Publish every note outside the excluded folders, one at a time.
    ///
    /// Invalid settings fail the whole call before the vault is touched.
    /// Per-note extraction or publication failures are collected.
    pub async fn publish_vault(&self) -> Result<BatchOutcome<PublishReceipt>> {
        self.settings.validate()?;

        let notes = self.extractor.extract_vault(&self.excluded_folders).await;
        let mut outcome = BatchOutcome::new();
        outcome.failures = notes.failures;

        for note in &notes.items {
            let compiled = self.compiler.compile(note, &self.options);
            let result = self.publish(&compiled.entities, &compiled.relations).await;
            outcome.record(&note.path, result);
        }

        tracing::info!(
            published = outcome.items.len(),
            failed = outcome.failures.len(),
            "Vault publication complete"
        );
        Ok(outcome)
    }
}

#[async_trait]
impl NotePublisher for PublicationCoordinator {
    /// Extract, compile and publish one note.
    async fn publish_note(&self, path: &str) -> Result<PublishReceipt> {
        self.settings.validate()?;

        let note = self.extractor.extract_path(path).await?;
        let compiled = self.compiler.compile(&note, &self.options);
        let receipt = self.publish(&compiled.entities, &compiled.relations).await?;
        tracing::info!(path = %path, cid = %receipt.content_id, "Published note");
        Ok(receipt)
    }
}
