//! SQLite-backed queue implementation

use crate::{EventPayload, QueueError};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info, warn};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS event_queue (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    payload    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    attempts   INTEGER NOT NULL DEFAULT 0,
    dead       INTEGER NOT NULL DEFAULT 0
)";

/// One durable queue record
#[derive(Debug, Clone)]
pub struct QueueEntry {
    /// Monotonic sequence id; delivery order follows this
    pub id: i64,
    /// Serialized `EventPayload`
    pub payload_json: String,
    pub created_at: DateTime<Utc>,
    /// Upload attempts so far
    pub attempts: i64,
}

impl QueueEntry {
    /// Decode the stored payload
    pub fn payload(&self) -> Result<EventPayload, QueueError> {
        Ok(serde_json::from_str(&self.payload_json)?)
    }
}

/// Durable store-and-forward queue
///
/// All mutations go through a single pooled connection, so the enqueue path
/// (sampling loop) and the drain path (sync worker) are serialized and an id
/// can never be delivered twice concurrently or lost to a racing update.
pub struct DeliveryQueue {
    pool: SqlitePool,
}

impl DeliveryQueue {
    /// Open (creating if missing) the queue database at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;

        let queue = Self { pool };
        let pending = queue.len().await?;
        info!(path = %path.as_ref().display(), pending, "delivery queue opened");
        Ok(queue)
    }

    /// Durably append an event; returns its sequence id.
    ///
    /// The record is committed before this returns. Any error is surfaced to
    /// the caller, since a failed enqueue means the event is lost.
    pub async fn enqueue(&self, payload: &EventPayload) -> Result<i64, QueueError> {
        let json = serde_json::to_string(payload)?;
        let created_at = Utc::now().to_rfc3339();

        let result = sqlx::query("INSERT INTO event_queue (payload, created_at) VALUES (?1, ?2)")
            .bind(&json)
            .bind(&created_at)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!(id, kind = payload.event.kind.as_str(), "event queued");
        Ok(id)
    }

    /// Oldest undelivered live entry, `None` when the queue is drained
    pub async fn peek_oldest(&self) -> Result<Option<QueueEntry>, QueueError> {
        let row = sqlx::query(
            "SELECT id, payload, created_at, attempts
             FROM event_queue WHERE dead = 0 ORDER BY id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let created_at_raw: String = row.try_get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_raw)
            .map_err(|e| QueueError::Corrupt(format!("created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Some(QueueEntry {
            id: row.try_get("id")?,
            payload_json: row.try_get("payload")?,
            created_at,
            attempts: row.try_get("attempts")?,
        }))
    }

    /// Record a failed upload attempt; the entry keeps its queue position
    pub async fn mark_attempt(&self, id: i64) -> Result<(), QueueError> {
        sqlx::query("UPDATE event_queue SET attempts = attempts + 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove an entry after confirmed upload
    pub async fn delete(&self, id: i64) -> Result<(), QueueError> {
        sqlx::query("DELETE FROM event_queue WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(id, "queue entry delivered and removed");
        Ok(())
    }

    /// Dead-letter a poison entry: skipped by the drain, kept for inspection
    pub async fn mark_dead(&self, id: i64) -> Result<(), QueueError> {
        sqlx::query("UPDATE event_queue SET dead = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        warn!(id, "queue entry dead-lettered");
        Ok(())
    }

    /// Number of live entries waiting for delivery
    pub async fn len(&self) -> Result<i64, QueueError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM event_queue WHERE dead = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    /// Number of dead-lettered entries
    pub async fn dead_count(&self) -> Result<i64, QueueError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM event_queue WHERE dead = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    /// Flush and close the underlying pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use event_detection::{DetectedEvent, Detection, EventKind, Severity};
    use evidence::EvidenceBundle;
    use sensor_core::AccelVector;

    fn payload(kind: EventKind, metric: f64) -> EventPayload {
        let event = DetectedEvent::from_detection(
            Detection {
                kind,
                severity: Severity::Medium,
                metric_value: metric,
            },
            Utc::now(),
        );
        EventPayload::new(
            "KL-01-TEST-001",
            event,
            AccelVector::new(0.0, 0.0, 1.0),
            30.0,
            None,
            &EvidenceBundle::default(),
        )
    }

    async fn open_temp() -> (tempfile::TempDir, DeliveryQueue) {
        let dir = tempfile::tempdir().unwrap();
        let queue = DeliveryQueue::open(dir.path().join("queue.db")).await.unwrap();
        (dir, queue)
    }

    #[tokio::test]
    async fn ids_are_monotonic() {
        let (_dir, queue) = open_temp().await;

        let a = queue.enqueue(&payload(EventKind::HarshBrake, -1.6)).await.unwrap();
        let b = queue.enqueue(&payload(EventKind::Tailgating, 12.0)).await.unwrap();
        let c = queue.enqueue(&payload(EventKind::HarshAccel, 1.2)).await.unwrap();

        assert!(a < b && b < c);
        assert_eq!(queue.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn peek_returns_oldest_and_round_trips_payload() {
        let (_dir, queue) = open_temp().await;

        let first = payload(EventKind::HarshBrake, -2.0);
        queue.enqueue(&first).await.unwrap();
        queue.enqueue(&payload(EventKind::Tailgating, 18.0)).await.unwrap();

        let head = queue.peek_oldest().await.unwrap().unwrap();
        assert_eq!(head.attempts, 0);
        assert_eq!(head.payload().unwrap(), first);
    }

    #[tokio::test]
    async fn failed_attempt_keeps_position_and_counts() {
        let (_dir, queue) = open_temp().await;

        queue.enqueue(&payload(EventKind::HarshBrake, -1.6)).await.unwrap();
        queue.enqueue(&payload(EventKind::HarshAccel, 1.3)).await.unwrap();

        let head = queue.peek_oldest().await.unwrap().unwrap();
        queue.mark_attempt(head.id).await.unwrap();

        let again = queue.peek_oldest().await.unwrap().unwrap();
        assert_eq!(again.id, head.id);
        assert_eq!(again.payload_json, head.payload_json);
        assert_eq!(again.attempts, 1);
    }

    #[tokio::test]
    async fn retry_then_success_leaves_remaining_in_order() {
        let (_dir, queue) = open_temp().await;

        let a = queue.enqueue(&payload(EventKind::HarshBrake, -1.6)).await.unwrap();
        let b = queue.enqueue(&payload(EventKind::Tailgating, 16.0)).await.unwrap();
        let c = queue.enqueue(&payload(EventKind::AggressiveTurn, 0.9)).await.unwrap();

        // First attempt fails with a network error
        queue.mark_attempt(a).await.unwrap();
        // Second attempt succeeds
        queue.delete(a).await.unwrap();

        let head = queue.peek_oldest().await.unwrap().unwrap();
        assert_eq!(head.id, b);
        queue.delete(b).await.unwrap();

        let head = queue.peek_oldest().await.unwrap().unwrap();
        assert_eq!(head.id, c);
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.db");

        let queue = DeliveryQueue::open(&path).await.unwrap();
        let id = queue.enqueue(&payload(EventKind::CloseOvertaking, 80.0)).await.unwrap();
        queue.close().await;

        let reopened = DeliveryQueue::open(&path).await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);
        let head = reopened.peek_oldest().await.unwrap().unwrap();
        assert_eq!(head.id, id);
        assert_eq!(head.payload().unwrap().event.kind, EventKind::CloseOvertaking);
    }

    #[tokio::test]
    async fn dead_entries_are_skipped_but_kept() {
        let (_dir, queue) = open_temp().await;

        let a = queue.enqueue(&payload(EventKind::HarshBrake, -1.6)).await.unwrap();
        let b = queue.enqueue(&payload(EventKind::HarshAccel, 1.2)).await.unwrap();

        queue.mark_dead(a).await.unwrap();

        let head = queue.peek_oldest().await.unwrap().unwrap();
        assert_eq!(head.id, b);
        assert_eq!(queue.len().await.unwrap(), 1);
        assert_eq!(queue.dead_count().await.unwrap(), 1);
    }
}
