//! Sampling loop
//!
//! The fixed-rate tick at the heart of the unit: read sensors, fuse speed,
//! run detection, and on an event capture evidence and enqueue the payload.
//! The loop blocks through clip capture: no new events are detected during
//! the post-event window, which the cooldown already suppresses anyway.

use crate::UnitConfig;
use delivery_queue::{DeliveryQueue, EventPayload};
use event_detection::EventDetectionEngine;
use evidence::EvidenceCapture;
use frame_ring::FrameRingBuffer;
use sensor_core::{
    AccelVector, LocationSource, MotionSensor, ProximitySensor, SampleValidator, SensorSample,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use velocity_filter::VelocityEstimator;

/// Fixed-rate sensor sampling and event handling
pub struct SamplingLoop<M, L, P>
where
    M: MotionSensor,
    L: LocationSource,
    P: ProximitySensor,
{
    config: UnitConfig,
    motion: M,
    location: L,
    proximity: P,
    validator: SampleValidator,
    estimator: VelocityEstimator,
    engine: EventDetectionEngine,
    evidence: EvidenceCapture,
    ring: Arc<FrameRingBuffer>,
    queue: Arc<DeliveryQueue>,
    shutdown: Arc<AtomicBool>,
    last_predict: Instant,
    last_status: Instant,
    last_accel: AccelVector,
}

impl<M, L, P> SamplingLoop<M, L, P>
where
    M: MotionSensor,
    L: LocationSource,
    P: ProximitySensor,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: UnitConfig,
        motion: M,
        location: L,
        proximity: P,
        evidence: EvidenceCapture,
        ring: Arc<FrameRingBuffer>,
        queue: Arc<DeliveryQueue>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine: EventDetectionEngine::new(config.detection.clone()),
            config,
            motion,
            location,
            proximity,
            validator: SampleValidator::default(),
            estimator: VelocityEstimator::default(),
            evidence,
            ring,
            queue,
            shutdown,
            last_predict: Instant::now(),
            last_status: Instant::now(),
            last_accel: AccelVector::default(),
        }
    }

    /// Run until the shutdown flag is raised
    pub async fn run(mut self) {
        info!(rate_hz = self.config.sampling.rate_hz, "sampling loop started");

        let mut ticker = interval(self.config.tick_interval());
        // Clip capture can stall the loop for seconds; don't burst afterwards
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.shutdown.load(Ordering::Relaxed) {
            ticker.tick().await;
            self.tick().await;
        }

        info!("sampling loop stopped");
    }

    /// One sampling step: sensors -> estimator -> detection -> evidence -> queue.
    ///
    /// Public so integration tests can drive the pipeline tick by tick.
    pub async fn tick(&mut self) {
        let timestamp_ms = epoch_millis();
        let dt = self.last_predict.elapsed();
        self.last_predict = Instant::now();

        // Sensor reads; anything invalid becomes "no signal this tick"
        let accel = match self.motion.read_acceleration() {
            Ok(accel) => match self.validator.validate_accel(&accel) {
                Ok(()) => Some(accel),
                Err(e) => {
                    warn!(error = %e, "discarding accelerometer reading");
                    None
                }
            },
            Err(e) => {
                debug!(error = %e, "no acceleration this tick");
                None
            }
        };

        let gps = self
            .location
            .read()
            .filter(|reading| match self.validator.validate_gps(reading) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "discarding GPS reading");
                    false
                }
            });

        let ultrasonic_cm = self
            .proximity
            .measure_distance(Duration::from_millis(self.config.sampling.proximity_timeout_ms))
            .filter(|d| self.validator.validate_distance(*d).is_ok());

        // Sensor fusion: integrate the IMU, correct with GPS when present
        if let Some(accel) = accel {
            self.estimator.predict(accel.x, dt);
        }
        let speed_kmh = self.estimator.update(gps.and_then(|g| g.usable_speed()));

        let mut sample = SensorSample::new(accel.unwrap_or_default(), timestamp_ms);
        sample.gps = gps;
        sample.ultrasonic_cm = ultrasonic_cm;
        self.last_accel = sample.accel;

        let frame = self.ring.latest();
        if let Some(event) = self.engine.process(&sample, speed_kmh, frame.as_deref()) {
            self.handle_event(event, &sample, speed_kmh).await;
        }

        self.log_status(speed_kmh).await;
    }

    /// Capture evidence and durably enqueue the event
    async fn handle_event(
        &mut self,
        event: event_detection::DetectedEvent,
        sample: &SensorSample,
        speed_kmh: f64,
    ) {
        let clip_window = Duration::from_secs(self.config.camera.clip_duration_secs);
        let bundle = self.evidence.capture(event.kind.as_str(), clip_window).await;

        let payload = EventPayload::new(
            self.config.bus_registration.clone(),
            event,
            sample.accel,
            speed_kmh,
            sample.gps,
            &bundle,
        );

        match self.queue.enqueue(&payload).await {
            Ok(id) => info!(id, "event durably queued"),
            Err(e) => {
                // The one true failure: no fallback store exists, so this
                // event is lost. Say so loudly.
                error!(error = %e, kind = payload.event.kind.as_str(), "EVENT LOST: enqueue failed");
            }
        }
    }

    async fn log_status(&mut self, speed_kmh: f64) {
        let status_interval = Duration::from_secs(self.config.sampling.status_interval_secs);
        if self.last_status.elapsed() < status_interval {
            return;
        }
        self.last_status = Instant::now();

        let pending = self.queue.len().await.unwrap_or(-1);
        info!(
            accel_x_g = format!("{:.2}", self.last_accel.x),
            speed_kmh = format!("{:.1}", speed_kmh),
            events = self.engine.events_fired(),
            queue_pending = pending,
            "status"
        );
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
