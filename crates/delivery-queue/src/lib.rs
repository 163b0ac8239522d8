//! Delivery Queue
//!
//! Durable local queue between event detection and the sync worker. Entries
//! are written synchronously when an event fires, survive process restarts,
//! and are deleted only after a confirmed upload: at-least-once, never
//! silently dropped.

mod payload;
mod queue;

pub use payload::{EventPayload, Location};
pub use queue::{DeliveryQueue, QueueEntry};

use thiserror::Error;

/// Queue errors
///
/// A `Database` failure on enqueue is the one condition this pipeline treats
/// as a true failure: there is no fallback store, so the caller must handle
/// (at minimum log) the lost event.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt queue entry: {0}")]
    Corrupt(String),
}
