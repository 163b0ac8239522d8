//! DriveGuard Detection Unit
//!
//! Wires the pipeline together: a fixed-rate sampling loop feeding the
//! estimator and detection engine, a frame-reader loop filling the evidence
//! ring, and the background sync worker draining the delivery queue. All
//! three run as independent tokio tasks sharing a cooperative shutdown flag.

pub mod config;
pub mod context;
pub mod drivers;
pub mod frames;
pub mod sampling;

pub use config::UnitConfig;
pub use context::UnitContext;
pub use frames::FrameReaderLoop;
pub use sampling::SamplingLoop;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Startup errors
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("queue error: {0}")]
    Queue(#[from] delivery_queue::QueueError),

    #[error("evidence error: {0}")]
    Evidence(#[from] evidence::EvidenceError),

    #[error("sync error: {0}")]
    Sync(#[from] cloud_sync::SyncError),
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    // Double initialization only happens in tests; ignore it
    let _ = tracing::subscriber::set_global_default(subscriber);
}
