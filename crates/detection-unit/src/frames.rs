//! Frame-reader loop
//!
//! Runs at the camera's native rate, independent of the sampling loop, and is
//! the only writer of the frame ring and its "latest frame" reference.

use frame_ring::{CameraSource, FrameRingBuffer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Continuous capture loop feeding the frame ring
pub struct FrameReaderLoop<C: CameraSource> {
    camera: C,
    ring: Arc<FrameRingBuffer>,
    fps: u32,
    shutdown: Arc<AtomicBool>,
}

impl<C: CameraSource> FrameReaderLoop<C> {
    pub fn new(camera: C, ring: Arc<FrameRingBuffer>, fps: u32, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            camera,
            ring,
            fps,
            shutdown,
        }
    }

    /// Run until the shutdown flag is raised
    pub async fn run(mut self) {
        info!(fps = self.fps, "frame reader started");

        let period = Duration::from_secs_f64(1.0 / self.fps.max(1) as f64);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !self.shutdown.load(Ordering::Relaxed) {
            ticker.tick().await;

            match self.camera.capture_frame() {
                Some(frame) => self.ring.push(frame),
                None => debug!("camera produced no frame"),
            }
        }

        info!("frame reader stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_ring::CameraFrame;

    /// Camera yielding a fixed number of frames, then nothing
    struct CountingCamera {
        remaining: u32,
        sequence: u64,
    }

    impl CameraSource for CountingCamera {
        fn capture_frame(&mut self) -> Option<CameraFrame> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            self.sequence += 1;
            CameraFrame::new(vec![0u8; 12], 2, 2, self.sequence * 10, self.sequence).ok()
        }
    }

    #[tokio::test]
    async fn fills_the_ring_and_stops_on_flag() {
        let ring = Arc::new(FrameRingBuffer::new(100));
        let shutdown = Arc::new(AtomicBool::new(false));
        let camera = CountingCamera {
            remaining: 5,
            sequence: 0,
        };

        let reader = FrameReaderLoop::new(camera, Arc::clone(&ring), 100, Arc::clone(&shutdown));
        let handle = tokio::spawn(reader.run());

        // Give the loop time to drain the camera
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown.store(true, Ordering::Relaxed);
        handle.await.unwrap();

        assert_eq!(ring.len(), 5);
        assert_eq!(ring.latest().unwrap().sequence, 5);
    }
}
