//! Snapshot and clip assembly

use crate::{EvidenceBundle, EvidenceError};
use chrono::Utc;
use frame_ring::FrameRingBuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Evidence capture configuration
#[derive(Debug, Clone)]
pub struct EvidenceConfig {
    /// Directory receiving snapshot and clip files
    pub output_dir: PathBuf,
    /// Target frame rate for post-event sampling
    pub fps: u32,
    /// JPEG quality for snapshots and clip frames
    pub jpeg_quality: u8,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("recordings"),
            fps: 15,
            jpeg_quality: 80,
        }
    }
}

/// Writes event evidence from the frame ring
pub struct EvidenceCapture {
    config: EvidenceConfig,
    ring: Arc<FrameRingBuffer>,
}

impl EvidenceCapture {
    /// Create a capturer over the shared frame ring; ensures the output
    /// directory exists.
    pub fn new(config: EvidenceConfig, ring: Arc<FrameRingBuffer>) -> Result<Self, EvidenceError> {
        std::fs::create_dir_all(&config.output_dir)?;
        Ok(Self { config, ring })
    }

    /// Capture both snapshot and clip for an event, absorbing failures.
    ///
    /// Blocks the caller for roughly `duration_after` while the post-event
    /// window records; run it on a path that tolerates that latency.
    pub async fn capture(&self, kind: &str, duration_after: Duration) -> EvidenceBundle {
        let snapshot_path = match self.capture_snapshot(kind) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(kind, error = %e, "snapshot capture failed, event proceeds without it");
                None
            }
        };

        let clip_path = match self.save_clip(kind, duration_after).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(kind, error = %e, "clip capture failed, event proceeds without it");
                None
            }
        };

        EvidenceBundle {
            snapshot_path,
            clip_path,
        }
    }

    /// Write the current latest frame to a JPEG file
    pub fn capture_snapshot(&self, kind: &str) -> Result<PathBuf, EvidenceError> {
        let frame = self.ring.latest().ok_or(EvidenceError::NoFrame)?;

        let path = self.evidence_path(kind, "jpg");
        std::fs::write(&path, frame.to_jpeg(self.config.jpeg_quality)?)?;

        info!(path = %path.display(), "snapshot saved");
        Ok(path)
    }

    /// Write buffered pre-event frames plus `duration_after` of live capture
    /// into a single MJPEG stream file.
    pub async fn save_clip(
        &self,
        kind: &str,
        duration_after: Duration,
    ) -> Result<PathBuf, EvidenceError> {
        let buffered = self.ring.snapshot();
        if buffered.is_empty() && self.ring.latest().is_none() {
            return Err(EvidenceError::NoFrame);
        }

        let path = self.evidence_path(kind, "mjpeg");
        let mut writer = BufWriter::new(File::create(&path)?);
        let mut frames_written = 0usize;

        // Pre-event context from the ring
        for frame in &buffered {
            writer.write_all(&frame.to_jpeg(self.config.jpeg_quality)?)?;
            frames_written += 1;
        }

        // Post-event context: sample the latest-frame reference once per
        // frame interval. The frame-reader loop keeps filling the ring
        // meanwhile; duplicates are possible if the camera stalls.
        let frame_interval = Duration::from_secs_f64(1.0 / self.config.fps.max(1) as f64);
        let frames_after = (self.config.fps as f64 * duration_after.as_secs_f64()) as u32;

        for _ in 0..frames_after {
            tokio::time::sleep(frame_interval).await;
            if let Some(frame) = self.ring.latest() {
                writer.write_all(&frame.to_jpeg(self.config.jpeg_quality)?)?;
                frames_written += 1;
            }
        }

        writer.flush()?;
        info!(path = %path.display(), frames_written, "clip saved");
        Ok(path)
    }

    fn evidence_path(&self, kind: &str, extension: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S%.3f");
        self.config
            .output_dir
            .join(format!("{kind}_{stamp}.{extension}"))
    }
}
