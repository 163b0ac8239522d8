//! Wire payload for one detected event

use event_detection::DetectedEvent;
use evidence::EvidenceBundle;
use sensor_core::{AccelVector, GpsReading};
use serde::{Deserialize, Serialize};

/// Position attached to an event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Everything the collector needs for one event, in one JSON record
///
/// This is both the durable queue payload and the POST body; the evidence
/// paths are local references resolved by the sync worker at upload time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Bus identity as registered with the collector
    pub bus_registration: String,
    #[serde(flatten)]
    pub event: DetectedEvent,
    /// Raw acceleration triple at the event tick (g)
    pub acceleration: AccelVector,
    /// Fused speed estimate at the event tick (km/h)
    pub speed_kmh: f64,
    pub location: Option<Location>,
    pub snapshot_path: Option<String>,
    pub clip_path: Option<String>,
}

impl EventPayload {
    /// Assemble the payload from what the sampling tick produced
    pub fn new(
        bus_registration: impl Into<String>,
        event: DetectedEvent,
        acceleration: AccelVector,
        speed_kmh: f64,
        gps: Option<GpsReading>,
        bundle: &EvidenceBundle,
    ) -> Self {
        let location = gps.filter(|g| g.has_fix).map(|g| Location {
            lat: g.latitude,
            lng: g.longitude,
        });

        Self {
            bus_registration: bus_registration.into(),
            event,
            acceleration,
            speed_kmh,
            location,
            snapshot_path: bundle
                .snapshot_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            clip_path: bundle
                .clip_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        }
    }
}
