//! Error types shared by every pipeline stage.
//!
//! Single-item operations return [`Result`] and propagate to the immediate
//! caller. Batch operations never abort on an item failure: they collect
//! failures into a [`BatchOutcome`] next to the items that succeeded.

use thiserror::Error;

/// Errors produced by the extraction, tag, compilation and publication stages.
#[derive(Debug, Error)]
pub enum Error {
    /// A single note could not be extracted (recoverable in batches)
    #[error("failed to extract note {path}: {reason}")]
    Extraction { path: String, reason: String },

    /// Required configuration is missing or invalid; raised before any I/O
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// Content store or calldata service unreachable / returned an error
    #[error("network failure: {0}")]
    Network(String),

    /// Signing or submitting the anchor transaction failed
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// The note storage backing store is missing
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The requested note does not exist in the vault
    #[error("note not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn extraction(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Extraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether a batch may skip this error and continue with the next item.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Extraction { .. } | Self::NotFound(_) | Self::Io(_) | Self::Json(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// One failed item of a batch operation.
#[derive(Debug)]
pub struct ItemFailure {
    /// Vault path of the item that failed
    pub path: String,
    pub error: Error,
}

/// Result of a sequential batch: the items that succeeded plus the failures.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub items: Vec<T>,
    pub failures: Vec<ItemFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record an item result, logging failures at warn level.
    pub fn record(&mut self, path: &str, result: Result<T>) {
        match result {
            Ok(item) => self.items.push(item),
            Err(error) => {
                if error.is_recoverable() {
                    tracing::warn!(path = %path, error = %error, "Skipping item after failure");
                } else {
                    tracing::error!(path = %path, error = %error, "Item failed");
                }
                self.failures.push(ItemFailure {
                    path: path.to_string(),
                    error,
                });
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}
