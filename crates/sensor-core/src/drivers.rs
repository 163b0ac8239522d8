//! Driver traits for the hardware layer
//!
//! Register-level access (I2C reads, NMEA parsing, echo timing) lives behind
//! these traits and outside this workspace. All methods are cheap polls; a
//! driver that has nothing fresh returns `None` rather than blocking.

use crate::{AccelVector, GpsReading, SensorError};
use std::time::Duration;

/// Inertial measurement unit (e.g. MPU-6050)
pub trait MotionSensor {
    /// Read the current acceleration triple in g units
    fn read_acceleration(&mut self) -> Result<AccelVector, SensorError>;
}

/// GPS position/speed source (hardware serial or phone companion over HTTP)
pub trait LocationSource {
    /// Latest reading; `has_fix` is false once the staleness window lapses
    fn read(&mut self) -> Option<GpsReading>;
}

/// Side-facing ultrasonic ranger (e.g. HC-SR04)
pub trait ProximitySensor {
    /// Distance to the nearest object in cm, `None` if no echo within `timeout`
    fn measure_distance(&mut self, timeout: Duration) -> Option<f64>;
}
