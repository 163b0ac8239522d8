//! Range Validation at the Driver Boundary

use crate::{AccelVector, GpsReading, SensorError};
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Acceleration valid range per axis (g); MPU-6050 full scale is ±16g
    pub accel_range: (f64, f64),
    /// Latitude valid range (degrees)
    pub latitude_range: (f64, f64),
    /// Longitude valid range (degrees)
    pub longitude_range: (f64, f64),
    /// GPS speed valid range (km/h)
    pub speed_range: (f64, f64),
    /// Ultrasonic distance valid range (cm); HC-SR04 maxes out near 4m
    pub distance_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            accel_range: (-16.0, 16.0),
            latitude_range: (-90.0, 90.0),
            longitude_range: (-180.0, 180.0),
            speed_range: (0.0, 300.0),
            distance_range: (2.0, 400.0),
        }
    }
}

/// Validator for driver readings
///
/// A rejected reading is treated as "no signal this tick" by the sampling
/// loop, never as a fatal condition.
pub struct SampleValidator {
    config: ValidationConfig,
}

impl SampleValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    fn check_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), SensorError> {
        if !value.is_finite() || value < range.0 || value > range.1 {
            Err(SensorError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate an acceleration triple
    pub fn validate_accel(&self, accel: &AccelVector) -> Result<(), SensorError> {
        self.check_range("accel_x", accel.x, self.config.accel_range)?;
        self.check_range("accel_y", accel.y, self.config.accel_range)?;
        self.check_range("accel_z", accel.z, self.config.accel_range)?;
        Ok(())
    }

    /// Validate a GPS reading; stale readings pass, garbage coordinates do not
    pub fn validate_gps(&self, reading: &GpsReading) -> Result<(), SensorError> {
        self.check_range("latitude", reading.latitude, self.config.latitude_range)?;
        self.check_range("longitude", reading.longitude, self.config.longitude_range)?;
        if let Some(speed) = reading.speed_kmh {
            self.check_range("gps_speed", speed, self.config.speed_range)?;
        }
        Ok(())
    }

    /// Validate an ultrasonic distance
    pub fn validate_distance(&self, distance_cm: f64) -> Result<(), SensorError> {
        self.check_range("ultrasonic_cm", distance_cm, self.config.distance_range)
    }
}

impl Default for SampleValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
