//! Shared runtime context
//!
//! One explicit owner for everything the loops share, built at startup and
//! passed by reference; there is no module-level process state.

use crate::{UnitConfig, UnitError};
use delivery_queue::DeliveryQueue;
use frame_ring::FrameRingBuffer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Resources shared between the sampling loop, the frame reader, and the
/// sync worker
pub struct UnitContext {
    pub config: UnitConfig,
    /// Pre-event frame store, written by the frame-reader loop only
    pub frame_ring: Arc<FrameRingBuffer>,
    /// Durable event queue
    pub queue: Arc<DeliveryQueue>,
    /// Cooperative stop signal, checked by every loop each iteration
    shutdown: Arc<AtomicBool>,
}

impl UnitContext {
    /// Build the context: allocate the frame ring and open the durable queue
    pub async fn new(config: UnitConfig) -> Result<Self, UnitError> {
        let frame_ring = Arc::new(FrameRingBuffer::with_window(
            config.camera.fps,
            config.camera.buffer_window_secs,
        ));
        let queue = Arc::new(DeliveryQueue::open(&config.sync.queue_path).await?);

        info!(
            bus = %config.bus_registration,
            frame_capacity = frame_ring.capacity(),
            "unit context ready"
        );

        Ok(Self {
            config,
            frame_ring,
            queue,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Handle to the shutdown flag for spawned loops
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Raise the stop signal; loops finish their current iteration and exit
    pub fn request_shutdown(&self) {
        info!("shutdown requested");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
