//! Evidence Capture
//!
//! Turns the frame ring into files: a JPEG snapshot of the event moment and
//! an MJPEG clip of pre-event context plus a bounded post-event window. Both
//! paths fail soft; a unit without a working camera still reports events,
//! just without evidence attached.

mod capture;

pub use capture::{EvidenceCapture, EvidenceConfig};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Evidence capture errors
#[derive(Debug, Error)]
pub enum EvidenceError {
    /// No frame has ever been captured
    #[error("no camera frame available")]
    NoFrame,

    #[error("frame encode failed: {0}")]
    Encode(#[from] frame_ring::FrameError),

    #[error("evidence write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// File references produced for one event
///
/// Ownership of the files transfers to the delivery queue for upload; the
/// files themselves stay on local storage and are never deleted by this
/// subsystem, so evidence can be re-uploaded later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub snapshot_path: Option<PathBuf>,
    pub clip_path: Option<PathBuf>,
}

impl EvidenceBundle {
    /// True when neither a snapshot nor a clip was produced
    pub fn is_empty(&self) -> bool {
        self.snapshot_path.is_none() && self.clip_path.is_none()
    }
}
