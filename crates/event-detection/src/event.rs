//! Event types produced by the detectors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Driving-safety event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    HarshBrake,
    HarshAccel,
    AggressiveTurn,
    CloseOvertaking,
    Tailgating,
}

impl EventKind {
    /// Wire/file name for the kind (matches the serialized form)
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::HarshBrake => "HARSH_BRAKE",
            EventKind::HarshAccel => "HARSH_ACCEL",
            EventKind::AggressiveTurn => "AGGRESSIVE_TURN",
            EventKind::CloseOvertaking => "CLOSE_OVERTAKING",
            EventKind::Tailgating => "TAILGATING",
        }
    }
}

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// What a single detector concluded this tick, before the engine stamps
/// identity and time onto it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub kind: EventKind,
    pub severity: Severity,
    /// The raw metric that crossed the threshold (g, cm, or area percent)
    pub metric_value: f64,
}

/// A classified driving-safety event
///
/// Created by exactly one detector per tick; immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEvent {
    /// Client-assigned id, lets the collector deduplicate at-least-once
    /// redelivery
    pub id: Uuid,
    #[serde(rename = "event_type")]
    pub kind: EventKind,
    pub severity: Severity,
    pub metric_value: f64,
    pub timestamp: DateTime<Utc>,
}

impl DetectedEvent {
    /// Stamp a detector result into a full event record
    pub fn from_detection(detection: Detection, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: detection.kind,
            severity: detection.severity,
            metric_value: detection.metric_value,
            timestamp,
        }
    }
}
