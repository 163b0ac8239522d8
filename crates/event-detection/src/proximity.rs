//! Proximity detector (close overtaking on the side-facing ultrasonic sensor)

use crate::{Detection, DetectionConfig, EventKind, Severity};
use tracing::debug;

/// Dwell-debounced distance classifier
///
/// An object entering the warning zone starts a dwell timer; only an object
/// that stays continuously inside the zone for the minimum dwell time fires.
/// A reading outside the zone, or an echo timeout, resets the timer, so a
/// single noisy sample cannot produce an event.
pub struct ProximityDetector {
    config: DetectionConfig,
    /// Tick timestamp at which the current object entered the warning zone
    dwell_start_ms: Option<u64>,
}

impl ProximityDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            dwell_start_ms: None,
        }
    }

    /// Feed one distance reading taken at `now_ms`
    pub fn analyze(&mut self, distance_cm: Option<f64>, now_ms: u64) -> Option<Detection> {
        let cfg = &self.config;

        let Some(distance) = distance_cm else {
            // Echo timeout: no object, or out of range
            self.dwell_start_ms = None;
            return None;
        };

        if distance >= cfg.proximity_warning_cm {
            self.dwell_start_ms = None;
            return None;
        }

        let start = *self.dwell_start_ms.get_or_insert(now_ms);
        let dwell_ms = now_ms.saturating_sub(start);

        if dwell_ms < cfg.proximity_dwell_ms {
            debug!(distance, dwell_ms, "object in warning zone, dwelling");
            return None;
        }

        let severity = if distance < cfg.proximity_close_cm {
            Severity::High
        } else {
            Severity::Medium
        };

        self.dwell_start_ms = None;
        Some(Detection {
            kind: EventKind::CloseOvertaking,
            severity,
            metric_value: distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_MS: u64 = 100;

    fn detector() -> ProximityDetector {
        ProximityDetector::new(DetectionConfig::default())
    }

    /// Feed a constant distance for `ticks` samples, returning the first detection
    fn sustain(d: &mut ProximityDetector, distance: f64, ticks: u64) -> Option<Detection> {
        (0..ticks).find_map(|i| d.analyze(Some(distance), i * TICK_MS))
    }

    #[test]
    fn sustained_close_object_fires_high() {
        let mut d = detector();
        // 80cm held across the full dwell window
        let detection = sustain(&mut d, 80.0, 10).unwrap();
        assert_eq!(detection.kind, EventKind::CloseOvertaking);
        assert_eq!(detection.severity, Severity::High);
        assert_eq!(detection.metric_value, 80.0);
    }

    #[test]
    fn warning_zone_object_fires_medium() {
        let mut d = detector();
        let detection = sustain(&mut d, 120.0, 10).unwrap();
        assert_eq!(detection.severity, Severity::Medium);
    }

    #[test]
    fn transient_spike_does_not_fire() {
        let mut d = detector();
        // Shorter than the 500ms dwell window
        assert!(d.analyze(Some(80.0), 0).is_none());
        assert!(d.analyze(Some(80.0), 200).is_none());
        // Object gone before the dwell elapsed
        assert!(d.analyze(Some(300.0), 400).is_none());
        // Re-entering starts a fresh dwell
        assert!(d.analyze(Some(80.0), 600).is_none());
    }

    #[test]
    fn echo_timeout_resets_dwell() {
        let mut d = detector();
        assert!(d.analyze(Some(90.0), 0).is_none());
        assert!(d.analyze(None, 200).is_none());
        // 400ms after re-entry is still short of the window
        assert!(d.analyze(Some(90.0), 400).is_none());
        assert!(d.analyze(Some(90.0), 800).is_none());
        // Continuous presence since 400: fires at 900
        assert!(d.analyze(Some(90.0), 900).is_some());
    }

    #[test]
    fn clear_distance_is_quiet() {
        let mut d = detector();
        assert!(sustain(&mut d, 250.0, 20).is_none());
    }
}
