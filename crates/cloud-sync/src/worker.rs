//! Background sync loop

use crate::{Collector, SyncError};
use delivery_queue::{DeliveryQueue, QueueEntry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Sync worker configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Idle wait when the queue is drained
    pub poll_interval: Duration,
    /// Fixed backoff after a failed delivery attempt
    pub retry_backoff: Duration,
    /// Attempts before a non-decodable entry is dead-lettered
    pub max_poison_attempts: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            retry_backoff: Duration::from_secs(5),
            max_poison_attempts: 5,
        }
    }
}

/// Drains the delivery queue oldest-first to the collector.
///
/// The head entry is retried in place until it is delivered or dead-lettered,
/// so delivery order equals enqueue order and a stuck head blocks everything
/// behind it.
pub struct SyncWorker<C: Collector> {
    queue: Arc<DeliveryQueue>,
    collector: C,
    config: SyncConfig,
    shutdown: Arc<AtomicBool>,
}

impl<C: Collector> SyncWorker<C> {
    pub fn new(
        queue: Arc<DeliveryQueue>,
        collector: C,
        config: SyncConfig,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            queue,
            collector,
            config,
            shutdown,
        }
    }

    /// Run until the shutdown flag is raised.
    ///
    /// An upload in flight when the flag rises completes normally; a crash
    /// mid-delete at worst re-sends the same entry after restart, which the
    /// at-least-once contract allows.
    pub async fn run(self) {
        info!("sync worker started");

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.sync_next().await {
                Ok(true) => {
                    // Delivered; go straight for the next entry
                }
                Ok(false) => sleep(self.config.poll_interval).await,
                Err(e) => {
                    warn!(error = %e, "delivery attempt failed, backing off");
                    sleep(self.config.retry_backoff).await;
                }
            }
        }

        info!("sync worker stopped");
    }

    /// Attempt to deliver the head entry. Returns `Ok(true)` when an entry
    /// was delivered, `Ok(false)` when the queue is empty.
    pub async fn sync_next(&self) -> Result<bool, SyncError> {
        let Some(entry) = self.queue.peek_oldest().await? else {
            return Ok(false);
        };

        let payload = match entry.payload() {
            Ok(payload) => payload,
            Err(e) => return self.handle_poison(&entry, e.to_string()).await,
        };

        match self.collector.post_event(&payload).await {
            Ok(collector_id) => {
                // Event is delivered. Evidence upload is a secondary,
                // best-effort step: failure here is logged and skipped, the
                // entry is NOT re-queued.
                if let Err(e) = self.collector.upload_evidence(collector_id, &payload).await {
                    warn!(
                        entry_id = entry.id,
                        collector_id,
                        error = %e,
                        "evidence upload failed, event already delivered"
                    );
                }

                self.queue.delete(entry.id).await?;
                info!(
                    entry_id = entry.id,
                    collector_id,
                    kind = payload.event.kind.as_str(),
                    "event synced"
                );
                Ok(true)
            }
            Err(e) => {
                self.queue.mark_attempt(entry.id).await?;
                Err(e)
            }
        }
    }

    /// Bounded retries for entries that can no longer be decoded; everything
    /// else would wedge the queue forever on one corrupt record.
    async fn handle_poison(&self, entry: &QueueEntry, reason: String) -> Result<bool, SyncError> {
        self.queue.mark_attempt(entry.id).await?;

        if entry.attempts + 1 >= self.config.max_poison_attempts {
            self.queue.mark_dead(entry.id).await?;
        }

        Err(SyncError::Poison {
            id: entry.id,
            reason,
        })
    }
}
