//! Ring Buffer Implementation

use crate::CameraFrame;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Bounded FIFO store of recent camera frames
///
/// Written only by the frame-reader loop; snapshot/clip readers take the lock
/// briefly and clone `Arc`s, so they never observe a half-written frame.
pub struct FrameRingBuffer {
    inner: Mutex<Inner>,
    capacity: usize,
}

struct Inner {
    frames: VecDeque<Arc<CameraFrame>>,
    latest: Option<Arc<CameraFrame>>,
}

impl FrameRingBuffer {
    /// Create a buffer holding `fps × window_secs` frames
    pub fn with_window(fps: u32, window_secs: u32) -> Self {
        Self::new((fps * window_secs).max(1) as usize)
    }

    /// Create a buffer with an explicit frame capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                frames: VecDeque::with_capacity(capacity),
                latest: None,
            }),
            capacity,
        }
    }

    /// Append a frame, evicting the oldest once the cap is exceeded.
    /// Also updates the "latest frame" reference.
    pub fn push(&self, frame: CameraFrame) {
        let frame = Arc::new(frame);
        let mut inner = self.lock();

        inner.latest = Some(Arc::clone(&frame));
        inner.frames.push_back(frame);
        while inner.frames.len() > self.capacity {
            inner.frames.pop_front();
        }
    }

    /// Most recently captured frame, `None` before the first capture
    pub fn latest(&self) -> Option<Arc<CameraFrame>> {
        self.lock().latest.clone()
    }

    /// Copy of all currently buffered frames, oldest first
    pub fn snapshot(&self) -> Vec<Arc<CameraFrame>> {
        self.lock().frames.iter().cloned().collect()
    }

    /// Number of frames currently buffered
    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of buffered frames
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a writer panicked; the Arc contents are
        // still consistent, so recover instead of propagating.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
