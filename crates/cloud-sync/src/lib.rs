//! Cloud Synchronization
//!
//! Drains the delivery queue to the remote collector over an unreliable
//! link: oldest entry first, fixed backoff on failure, strict FIFO with
//! at-least-once semantics. Event delivery matters more than evidence
//! delivery: a clip that fails to upload is logged and skipped, never a
//! reason to re-send the event.

mod client;
mod worker;

pub use client::{Collector, CollectorClient, CollectorConfig};
pub use worker::{SyncConfig, SyncWorker};

use delivery_queue::QueueError;
use thiserror::Error;

/// Sync error kinds, split so the retry policy can differentiate
#[derive(Debug, Error)]
pub enum SyncError {
    /// Connection failure or timeout; retried indefinitely
    #[error("network error: {0}")]
    Network(String),

    /// Collector answered with a non-2xx status; retried indefinitely,
    /// treated like a network failure
    #[error("collector rejected upload: HTTP {status}")]
    Rejected { status: u16 },

    /// Entry payload can no longer be decoded; dead-lettered after a
    /// bounded number of attempts
    #[error("poison entry {id}: {reason}")]
    Poison { id: i64, reason: String },

    /// Local queue failure
    #[error("storage error: {0}")]
    Storage(#[from] QueueError),
}
