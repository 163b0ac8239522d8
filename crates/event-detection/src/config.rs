//! Detection thresholds

use serde::{Deserialize, Serialize};

/// Detection engine configuration
///
/// Acceleration thresholds are in g units, distances in cm, the vision
/// thresholds in percent of frame area.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Harsh braking fires below this forward acceleration
    pub harsh_brake_g: f64,
    /// Harsh braking escalates to HIGH below this
    pub harsh_brake_high_g: f64,

    /// Harsh acceleration fires above this forward acceleration
    pub harsh_accel_g: f64,
    /// Harsh acceleration escalates to HIGH above this
    pub harsh_accel_high_g: f64,

    /// Aggressive turn fires above this absolute lateral acceleration
    pub aggressive_turn_g: f64,
    /// Aggressive turn escalates to HIGH above this
    pub aggressive_turn_high_g: f64,

    /// Proximity warning zone; an object closer than this starts the dwell timer
    pub proximity_warning_cm: f64,
    /// Proximity HIGH severity zone
    pub proximity_close_cm: f64,
    /// How long an object must stay in the warning zone before firing
    pub proximity_dwell_ms: u64,
    /// Proximity detection is skipped below this fused speed (km/h)
    pub proximity_min_speed_kmh: f64,

    /// Vision fires once the largest blob covers this much of the frame (%)
    pub vision_warning_area_pct: f64,
    /// Vision escalates to HIGH past this area fraction (%)
    pub vision_tailgate_area_pct: f64,
    /// Consecutive over-threshold frames required before firing
    pub vision_min_frames: u32,

    /// Minimum time between two permitted event firings (any detector)
    pub cooldown_ms: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            harsh_brake_g: -1.5,
            harsh_brake_high_g: -1.8,
            harsh_accel_g: 1.0,
            harsh_accel_high_g: 1.5,
            aggressive_turn_g: 0.8,
            aggressive_turn_high_g: 1.0,
            proximity_warning_cm: 150.0,
            proximity_close_cm: 100.0,
            proximity_dwell_ms: 500,
            proximity_min_speed_kmh: 10.0,
            vision_warning_area_pct: 10.0,
            vision_tailgate_area_pct: 15.0,
            vision_min_frames: 5,
            cooldown_ms: 5_000,
        }
    }
}
