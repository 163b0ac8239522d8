//! Engine: per-tick arbitration across the detectors

use crate::{
    DetectedEvent, Detection, DetectionConfig, InertialDetector, ProximityDetector,
    VisionDetector,
};
use chrono::{DateTime, Utc};
use frame_ring::CameraFrame;
use sensor_core::SensorSample;
use tracing::info;

/// Runs all detectors for one sampling tick and arbitrates to at most one
/// event.
///
/// Evaluation order is inertial → proximity → vision; the first detector to
/// produce a result wins and the rest are skipped for that tick. A single
/// process-wide cooldown gates the whole engine: while it is running, no
/// detector is evaluated, but their internal debounce counters keep whatever
/// state they had.
pub struct EventDetectionEngine {
    config: DetectionConfig,
    inertial: InertialDetector,
    proximity: ProximityDetector,
    vision: VisionDetector,
    /// Tick timestamp of the last fired event
    last_event_ms: Option<u64>,
    events_fired: u64,
}

impl EventDetectionEngine {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            inertial: InertialDetector::new(config.clone()),
            proximity: ProximityDetector::new(config.clone()),
            vision: VisionDetector::new(config.clone()),
            config,
            last_event_ms: None,
            events_fired: 0,
        }
    }

    /// Evaluate one sampling tick.
    ///
    /// `fused_speed_kmh` gates the proximity detector (parked buses get
    /// brushed against); `frame` is the newest camera frame if one exists.
    pub fn process(
        &mut self,
        sample: &SensorSample,
        fused_speed_kmh: f64,
        frame: Option<&CameraFrame>,
    ) -> Option<DetectedEvent> {
        let now_ms = sample.timestamp_ms;

        if let Some(last) = self.last_event_ms {
            if now_ms.saturating_sub(last) < self.config.cooldown_ms {
                return None;
            }
        }

        let detection = self.evaluate(sample, fused_speed_kmh, frame, now_ms)?;

        self.last_event_ms = Some(now_ms);
        self.events_fired += 1;

        let event = DetectedEvent::from_detection(detection, tick_time(sample));
        info!(
            kind = event.kind.as_str(),
            severity = ?event.severity,
            metric = event.metric_value,
            "event detected"
        );
        Some(event)
    }

    fn evaluate(
        &mut self,
        sample: &SensorSample,
        fused_speed_kmh: f64,
        frame: Option<&CameraFrame>,
        now_ms: u64,
    ) -> Option<Detection> {
        if let Some(detection) = self.inertial.analyze(&sample.accel) {
            return Some(detection);
        }

        if fused_speed_kmh > self.config.proximity_min_speed_kmh {
            if let Some(detection) = self.proximity.analyze(sample.ultrasonic_cm, now_ms) {
                return Some(detection);
            }
        }

        if let Some(frame) = frame {
            if let Some(detection) = self.vision.analyze_frame(frame) {
                return Some(detection);
            }
        }

        None
    }

    /// Events fired since startup
    pub fn events_fired(&self) -> u64 {
        self.events_fired
    }
}

fn tick_time(sample: &SensorSample) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(sample.timestamp_ms as i64).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventKind, Severity};
    use sensor_core::AccelVector;

    const TICK_MS: u64 = 100;

    fn engine() -> EventDetectionEngine {
        EventDetectionEngine::new(DetectionConfig::default())
    }

    fn sample_at(tick: u64, accel: AccelVector) -> SensorSample {
        SensorSample::new(accel, tick * TICK_MS)
    }

    fn calm(tick: u64) -> SensorSample {
        sample_at(tick, AccelVector::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn rest_with_zero_gps_fires_nothing() {
        let mut e = engine();
        for tick in 0..30 {
            assert!(e.process(&calm(tick), 0.0, None).is_none());
        }
        assert_eq!(e.events_fired(), 0);
    }

    #[test]
    fn hard_brake_fires_high_severity_event() {
        let mut e = engine();
        let sample = sample_at(1, AccelVector::new(-2.0, 0.0, 1.0));
        let event = e.process(&sample, 40.0, None).unwrap();
        assert_eq!(event.kind, EventKind::HarshBrake);
        assert_eq!(event.severity, Severity::High);
    }

    #[test]
    fn no_two_events_within_cooldown() {
        let mut e = engine();
        let brake = AccelVector::new(-2.0, 0.0, 1.0);

        let first = e.process(&sample_at(0, brake), 40.0, None);
        assert!(first.is_some());

        // Sustained braking through the whole cooldown window stays quiet
        for tick in 1..50 {
            assert!(e.process(&sample_at(tick, brake), 40.0, None).is_none());
        }

        // First tick past the cooldown may fire again
        assert!(e.process(&sample_at(50, brake), 40.0, None).is_some());
    }

    #[test]
    fn proximity_is_gated_by_speed() {
        let mut e = engine();

        // Crawling: sustained close object never fires
        for tick in 0..20 {
            let mut sample = calm(tick);
            sample.ultrasonic_cm = Some(80.0);
            assert!(e.process(&sample, 5.0, None).is_none());
        }

        // At speed: the same pattern fires CLOSE_OVERTAKING
        let mut e = engine();
        let event = (0..20).find_map(|tick| {
            let mut sample = calm(tick);
            sample.ultrasonic_cm = Some(80.0);
            e.process(&sample, 40.0, None)
        });
        let event = event.unwrap();
        assert_eq!(event.kind, EventKind::CloseOvertaking);
        assert_eq!(event.severity, Severity::High);
    }

    #[test]
    fn inertial_outranks_proximity_in_the_same_tick() {
        let mut e = engine();

        // Build proximity dwell right up to the firing point
        for tick in 0..5 {
            let mut sample = calm(tick);
            sample.ultrasonic_cm = Some(80.0);
            assert!(e.process(&sample, 40.0, None).is_none());
        }

        // Tick 5 satisfies the dwell, but a harsh brake lands the same tick
        let mut sample = sample_at(5, AccelVector::new(-2.0, 0.0, 1.0));
        sample.ultrasonic_cm = Some(80.0);
        let event = e.process(&sample, 40.0, None).unwrap();
        assert_eq!(event.kind, EventKind::HarshBrake);
    }

    #[test]
    fn events_get_distinct_ids() {
        let mut e = engine();
        let brake = AccelVector::new(-2.0, 0.0, 1.0);
        let a = e.process(&sample_at(0, brake), 40.0, None).unwrap();
        let b = e.process(&sample_at(100, brake), 40.0, None).unwrap();
        assert_ne!(a.id, b.id);
    }
}
