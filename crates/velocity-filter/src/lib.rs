//! Velocity Filter
//!
//! 1-D recursive (Kalman) filter for vehicle speed. Integrates forward
//! acceleration between sparse GPS fixes and corrects the accumulated drift
//! whenever a fix arrives, with the gain self-tuning toward whichever source
//! is currently more trustworthy.

mod estimator;

pub use estimator::{FilterConfig, VelocityEstimator};

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// m/s to km/h
pub const MPS_TO_KMH: f64 = 3.6;
