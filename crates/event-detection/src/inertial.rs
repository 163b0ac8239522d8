//! Inertial detector (harsh braking, harsh acceleration, aggressive turns)

use crate::{Detection, DetectionConfig, EventKind, Severity};
use sensor_core::AccelVector;

/// Stateless threshold classifier over the acceleration triple
///
/// Checks run in fixed priority order (brake before acceleration before
/// turn), so one tick yields at most one inertial event.
pub struct InertialDetector {
    config: DetectionConfig,
}

impl InertialDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Classify one acceleration sample
    pub fn analyze(&self, accel: &AccelVector) -> Option<Detection> {
        let cfg = &self.config;

        if accel.x < cfg.harsh_brake_g {
            let severity = if accel.x < cfg.harsh_brake_high_g {
                Severity::High
            } else {
                Severity::Medium
            };
            return Some(Detection {
                kind: EventKind::HarshBrake,
                severity,
                metric_value: accel.x,
            });
        }

        if accel.x > cfg.harsh_accel_g {
            let severity = if accel.x > cfg.harsh_accel_high_g {
                Severity::High
            } else {
                Severity::Medium
            };
            return Some(Detection {
                kind: EventKind::HarshAccel,
                severity,
                metric_value: accel.x,
            });
        }

        if accel.y.abs() > cfg.aggressive_turn_g {
            let severity = if accel.y.abs() > cfg.aggressive_turn_high_g {
                Severity::High
            } else {
                Severity::Medium
            };
            return Some(Detection {
                kind: EventKind::AggressiveTurn,
                severity,
                metric_value: accel.y,
            });
        }

        None
    }
}
