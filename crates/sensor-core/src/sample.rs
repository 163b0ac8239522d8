//! Fixed-shape sensor sample types
//!
//! One `SensorSample` is produced per sampling tick from whatever drivers
//! responded; absent readings stay `None` rather than becoming errors.

use serde::{Deserialize, Serialize};

/// Acceleration triple in g units (1g = 9.80665 m/s²)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccelVector {
    /// Forward axis (positive = accelerating, negative = braking)
    pub x: f64,
    /// Lateral axis (turning)
    pub y: f64,
    /// Vertical axis
    pub z: f64,
}

impl AccelVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A parsed GPS reading from the location driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsReading {
    pub latitude: f64,
    pub longitude: f64,
    /// Ground speed in km/h; phones and cheap receivers may omit it
    pub speed_kmh: Option<f64>,
    /// False when the driver's staleness window lapsed without an update
    pub has_fix: bool,
}

impl GpsReading {
    /// Speed usable for fusion: only trusted while the fix is current
    pub fn usable_speed(&self) -> Option<f64> {
        if self.has_fix {
            self.speed_kmh
        } else {
            None
        }
    }
}

/// Everything the drivers produced for one sampling tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub accel: AccelVector,
    pub gps: Option<GpsReading>,
    /// Side-facing ultrasonic distance in cm, `None` on echo timeout
    pub ultrasonic_cm: Option<f64>,
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl SensorSample {
    pub fn new(accel: AccelVector, timestamp_ms: u64) -> Self {
        Self {
            accel,
            gps: None,
            ultrasonic_cm: None,
            timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_fix_yields_no_speed() {
        let reading = GpsReading {
            latitude: 8.89,
            longitude: 76.61,
            speed_kmh: Some(42.0),
            has_fix: false,
        };
        assert_eq!(reading.usable_speed(), None);
    }

    #[test]
    fn current_fix_yields_speed() {
        let reading = GpsReading {
            latitude: 8.89,
            longitude: 76.61,
            speed_kmh: Some(42.0),
            has_fix: true,
        };
        assert_eq!(reading.usable_speed(), Some(42.0));
    }
}
