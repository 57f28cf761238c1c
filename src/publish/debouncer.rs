//! Per-note publish debouncer.
//!
//! Coalesces rapid publish triggers for the same note (e.g. from repeated
//! saves) into one `publish_note` call after a quiet period.
//!
//! ## Design
//!
//! Uses an mpsc channel + deadline loop:
//! 1. `trigger(path)` sends a non-blocking message
//! 2. The background task keeps one deadline per path; every new trigger
//!    for a path pushes its deadline back to `now + debounce`
//! 3. When the earliest deadline passes, every due path is published
//! 4. Publishes run one after another, never concurrently
//! 5. Once every sender is gone, the paths still pending are published
//!    before the task exits
//!
//! ## Usage
//!
//! ```ignore
//! let debouncer = PublishDebouncer::new(coordinator, 2000);
//! debouncer.trigger("notes/today.md"); // non-blocking
//! debouncer.shutdown().await; // flushes pending publishes
//! ```

use super::traits::NotePublisher;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Debounced publish trigger keyed by note path.
pub struct PublishDebouncer {
    trigger_tx: mpsc::Sender<String>,
    task: JoinHandle<()>,
}

impl PublishDebouncer {
    /// Create a debouncer that waits `debounce_ms` of silence per note before publishing.
    ///
    /// Spawns a background tokio task that lives until the debouncer is
    /// dropped or shut down.
    pub fn new(publisher: Arc<dyn NotePublisher>, debounce_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel::<String>(64);
        let task = tokio::spawn(Self::run_loop(publisher, rx, debounce_ms));
        Self {
            trigger_tx: tx,
            task,
        }
    }

    /// Schedule a publish of `path`, resetting its timer.
    ///
    /// Non-blocking. If the channel is full the trigger is dropped; any
    /// pending trigger for the path still fires.
    pub fn trigger(&self, path: &str) {
        let _ = self.trigger_tx.try_send(path.to_string());
    }

    /// Stop accepting triggers and wait until every pending path is published.
    pub async fn shutdown(self) {
        drop(self.trigger_tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Publish debouncer task failed");
        }
    }

    async fn run_loop(
        publisher: Arc<dyn NotePublisher>,
        mut rx: mpsc::Receiver<String>,
        debounce_ms: u64,
    ) {
        let debounce = Duration::from_millis(debounce_ms);
        let mut pending: HashMap<String, Instant> = HashMap::new();

        loop {
            let next_deadline = pending.values().min().copied();
            let received = match next_deadline {
                None => rx.recv().await,
                Some(deadline) => match tokio::time::timeout_at(deadline, rx.recv()).await {
                    Ok(received) => received,
                    Err(_) => {
                        Self::publish_due(&publisher, &mut pending, Instant::now()).await;
                        continue;
                    }
                },
            };

            match received {
                Some(path) => {
                    pending.insert(path, Instant::now() + debounce);
                }
                None => {
                    // all senders gone: flush whatever is still waiting
                    if let Some(last) = pending.values().max().copied() {
                        Self::publish_due(&publisher, &mut pending, last).await;
                    }
                    return;
                }
            }
        }
    }

    async fn publish_due(
        publisher: &Arc<dyn NotePublisher>,
        pending: &mut HashMap<String, Instant>,
        cutoff: Instant,
    ) {
        let mut due: Vec<String> = pending
            .iter()
            .filter(|(_, deadline)| **deadline <= cutoff)
            .map(|(path, _)| path.clone())
            .collect();
        due.sort();

        for path in due {
            pending.remove(&path);
            let start = std::time::Instant::now();
            match publisher.publish_note(&path).await {
                Ok(receipt) => {
                    tracing::info!(
                        path = %path,
                        cid = %receipt.content_id,
                        elapsed = ?start.elapsed(),
                        "Debounced publish complete"
                    );
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Debounced publish failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::publish::{PublishReceipt, TransactionResult};
    use tokio::sync::Mutex;

    /// Publisher recording every path it is asked to publish
    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl NotePublisher for RecordingPublisher {
        async fn publish_note(&self, path: &str) -> Result<PublishReceipt> {
            self.published.lock().await.push(path.to_string());
            Ok(PublishReceipt {
                content_id: format!("cid-{}", path),
                transaction: TransactionResult {
                    hash: "0x1".to_string(),
                },
            })
        }
    }

    #[tokio::test]
    async fn test_debounce_coalesces_rapid_triggers() {
        let publisher = Arc::new(RecordingPublisher::default());
        let debouncer = PublishDebouncer::new(publisher.clone(), 100);

        for _ in 0..10 {
            debouncer.trigger("a.md");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(
            *publisher.published.lock().await,
            vec!["a.md"],
            "10 rapid triggers should coalesce into 1 publish"
        );
    }

    #[tokio::test]
    async fn test_debounce_is_per_path() {
        let publisher = Arc::new(RecordingPublisher::default());
        let debouncer = PublishDebouncer::new(publisher.clone(), 50);

        debouncer.trigger("b.md");
        debouncer.trigger("a.md");
        debouncer.trigger("b.md");
        tokio::time::sleep(Duration::from_millis(250)).await;

        let mut published = publisher.published.lock().await.clone();
        published.sort();
        assert_eq!(published, vec!["a.md", "b.md"]);
    }

    #[tokio::test]
    async fn test_debounce_separate_bursts() {
        let publisher = Arc::new(RecordingPublisher::default());
        let debouncer = PublishDebouncer::new(publisher.clone(), 50);

        debouncer.trigger("a.md");
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.trigger("a.md");
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(publisher.published.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending() {
        let publisher = Arc::new(RecordingPublisher::default());
        let debouncer = PublishDebouncer::new(publisher.clone(), 10_000);

        debouncer.trigger("b.md");
        debouncer.trigger("a.md");
        debouncer.trigger("b.md");
        debouncer.shutdown().await;

        assert_eq!(*publisher.published.lock().await, vec!["a.md", "b.md"]);
    }

    #[tokio::test]
    async fn test_debounce_no_trigger_no_publish() {
        let publisher = Arc::new(RecordingPublisher::default());
        let _debouncer = PublishDebouncer::new(publisher.clone(), 50);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(publisher.published.lock().await.is_empty());
    }
}
