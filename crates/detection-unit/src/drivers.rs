//! Hardware driver wiring
//!
//! Real register-level drivers (I2C accelerometer, phone-GPS receiver,
//! ultrasonic ranger, camera) live in the hardware layer outside this
//! workspace and plug in through the `sensor-core` / `frame-ring` traits.
//! `Disconnected` is what the binary falls back to when no hardware crate is
//! wired in: every read reports "no signal", which the pipeline absorbs.

use frame_ring::{CameraFrame, CameraSource};
use sensor_core::{AccelVector, GpsReading, LocationSource, MotionSensor, ProximitySensor,
    SensorError};
use std::time::Duration;

/// A driver slot with no hardware behind it
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

impl MotionSensor for Disconnected {
    fn read_acceleration(&mut self) -> Result<AccelVector, SensorError> {
        Err(SensorError::Unavailable("motion sensor not wired"))
    }
}

impl LocationSource for Disconnected {
    fn read(&mut self) -> Option<GpsReading> {
        None
    }
}

impl ProximitySensor for Disconnected {
    fn measure_distance(&mut self, _timeout: Duration) -> Option<f64> {
        None
    }
}

impl CameraSource for Disconnected {
    fn capture_frame(&mut self) -> Option<CameraFrame> {
        None
    }
}
