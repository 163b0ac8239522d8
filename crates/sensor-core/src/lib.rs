//! Sensor Core
//!
//! Shared sensor sample types, the driver traits the detection unit consumes,
//! and range validation at the driver boundary.

mod drivers;
mod sample;
mod validate;

pub use drivers::{LocationSource, MotionSensor, ProximitySensor};
pub use sample::{AccelVector, GpsReading, SensorSample};
pub use validate::{SampleValidator, ValidationConfig};

use thiserror::Error;

/// Sensor boundary errors
#[derive(Debug, Clone, Error)]
pub enum SensorError {
    /// Value out of the physically plausible range for the sensor
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Driver returned no data this tick
    #[error("sensor unavailable: {0}")]
    Unavailable(&'static str),
}
