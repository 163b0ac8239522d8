//! Speed Estimator Implementation

use crate::{MPS_TO_KMH, STANDARD_GRAVITY};
use std::time::Duration;
use tracing::trace;

/// Filter tuning parameters
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Starting speed estimate (km/h)
    pub initial_speed_kmh: f64,
    /// Initial estimate uncertainty (P)
    pub initial_uncertainty: f64,
    /// Process noise covariance (Q): how fast uncertainty grows while
    /// integrating acceleration blindly
    pub process_noise: f64,
    /// Measurement noise covariance (R): how much GPS speed is trusted
    pub measurement_noise: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            initial_speed_kmh: 0.0,
            initial_uncertainty: 5.0,
            process_noise: 0.1,
            measurement_noise: 2.0,
        }
    }
}

/// Recursive speed filter
///
/// State is owned exclusively by the estimator and mutated on every
/// `predict`/`update` call. Both calls return a valid non-negative speed;
/// absent input is "no new information", never an error.
pub struct VelocityEstimator {
    /// Current speed estimate (km/h)
    estimate_kmh: f64,
    /// Estimate uncertainty (P)
    uncertainty: f64,
    config: FilterConfig,
}

impl VelocityEstimator {
    /// Create a new estimator with given tuning
    pub fn new(config: FilterConfig) -> Self {
        Self {
            estimate_kmh: config.initial_speed_kmh.max(0.0),
            uncertainty: config.initial_uncertainty,
            config,
        }
    }

    /// Prediction step: integrate forward acceleration over the elapsed
    /// interval since the previous call.
    ///
    /// The vehicle is never modelled as moving backward, so the estimate is
    /// clamped to zero. Uncertainty grows by `Q·dt` because the prediction
    /// runs open-loop.
    pub fn predict(&mut self, accel_forward_g: f64, dt: Duration) -> f64 {
        let dt_s = dt.as_secs_f64();

        // g -> km/h per second
        let accel_kmh_s = accel_forward_g * STANDARD_GRAVITY * MPS_TO_KMH;

        self.estimate_kmh = (self.estimate_kmh + accel_kmh_s * dt_s).max(0.0);
        self.uncertainty += self.config.process_noise * dt_s;

        trace!(
            estimate_kmh = self.estimate_kmh,
            uncertainty = self.uncertainty,
            "predict"
        );
        self.estimate_kmh
    }

    /// Measurement step: blend a GPS speed reading into the estimate
    /// proportionally to the Kalman gain `P / (P + R)`.
    ///
    /// Called with `None` this is a no-op returning the unmodified estimate.
    pub fn update(&mut self, gps_speed_kmh: Option<f64>) -> f64 {
        let Some(measurement) = gps_speed_kmh else {
            return self.estimate_kmh;
        };

        let gain = self.uncertainty / (self.uncertainty + self.config.measurement_noise);
        let residual = measurement - self.estimate_kmh;

        self.estimate_kmh = (self.estimate_kmh + gain * residual).max(0.0);
        self.uncertainty *= 1.0 - gain;

        trace!(
            gain,
            residual,
            estimate_kmh = self.estimate_kmh,
            "update"
        );
        self.estimate_kmh
    }

    /// Current filtered speed estimate (km/h), always >= 0
    pub fn speed(&self) -> f64 {
        self.estimate_kmh
    }

    /// Current estimate uncertainty
    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}
