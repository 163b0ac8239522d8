//! End-to-end pipeline test: scripted sensors through detection, evidence,
//! and the durable queue.

use delivery_queue::DeliveryQueue;
use detection_unit::{SamplingLoop, UnitConfig};
use event_detection::{EventKind, Severity};
use evidence::{EvidenceCapture, EvidenceConfig};
use frame_ring::{CameraFrame, FrameRingBuffer};
use sensor_core::{AccelVector, GpsReading, LocationSource, MotionSensor, ProximitySensor,
    SensorError};
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Motion driver replaying a scripted acceleration sequence, calm afterwards
struct ScriptedMotion {
    script: VecDeque<AccelVector>,
}

impl MotionSensor for ScriptedMotion {
    fn read_acceleration(&mut self) -> Result<AccelVector, SensorError> {
        Ok(self
            .script
            .pop_front()
            .unwrap_or(AccelVector::new(0.0, 0.0, 1.0)))
    }
}

/// GPS pinned to a fix at constant speed
struct FixedGps {
    speed_kmh: f64,
}

impl LocationSource for FixedGps {
    fn read(&mut self) -> Option<GpsReading> {
        Some(GpsReading {
            latitude: 8.8932,
            longitude: 76.6141,
            speed_kmh: Some(self.speed_kmh),
            has_fix: true,
        })
    }
}

/// Ultrasonic with nothing in range
struct ClearSide;

impl ProximitySensor for ClearSide {
    fn measure_distance(&mut self, _timeout: Duration) -> Option<f64> {
        None
    }
}

fn test_frame() -> CameraFrame {
    let data: Vec<u8> = (0..32 * 24).flat_map(|_| [60u8, 60, 60]).collect();
    CameraFrame::new(data, 32, 24, 1_000, 1).unwrap()
}

async fn build_loop(
    dir: &tempfile::TempDir,
    script: Vec<AccelVector>,
    ring: Arc<FrameRingBuffer>,
) -> (SamplingLoop<ScriptedMotion, FixedGps, ClearSide>, Arc<DeliveryQueue>) {
    let mut config = UnitConfig::default();
    config.bus_registration = "KL-01-TEST-001".to_string();
    config.sync.queue_path = dir.path().join("queue.db");
    config.camera.recordings_dir = dir.path().join("recordings");
    // Keep the post-event window at zero so ticks stay fast
    config.camera.clip_duration_secs = 0;

    let queue = Arc::new(DeliveryQueue::open(&config.sync.queue_path).await.unwrap());
    let evidence = EvidenceCapture::new(
        EvidenceConfig {
            output_dir: config.camera.recordings_dir.clone(),
            fps: config.camera.fps,
            jpeg_quality: config.camera.jpeg_quality,
        },
        Arc::clone(&ring),
    )
    .unwrap();

    let sampling = SamplingLoop::new(
        config,
        ScriptedMotion {
            script: script.into(),
        },
        FixedGps { speed_kmh: 40.0 },
        ClearSide,
        evidence,
        ring,
        Arc::clone(&queue),
        Arc::new(AtomicBool::new(false)),
    );

    (sampling, queue)
}

#[tokio::test]
async fn harsh_brake_lands_in_the_queue_with_evidence() {
    let dir = tempfile::tempdir().unwrap();
    let ring = Arc::new(FrameRingBuffer::new(16));
    ring.push(test_frame());

    let script = vec![
        AccelVector::new(0.0, 0.0, 1.0),
        AccelVector::new(0.1, 0.0, 1.0),
        AccelVector::new(-2.0, 0.0, 1.0), // slam
    ];
    let (mut sampling, queue) = build_loop(&dir, script, ring).await;

    for _ in 0..3 {
        sampling.tick().await;
    }

    assert_eq!(queue.len().await.unwrap(), 1);
    let entry = queue.peek_oldest().await.unwrap().unwrap();
    let payload = entry.payload().unwrap();

    assert_eq!(payload.event.kind, EventKind::HarshBrake);
    assert_eq!(payload.event.severity, Severity::High);
    assert_eq!(payload.event.metric_value, -2.0);
    assert_eq!(payload.bus_registration, "KL-01-TEST-001");
    assert!(payload.speed_kmh > 10.0);
    assert_eq!(payload.location.unwrap().lat, 8.8932);

    // Snapshot and clip were captured from the buffered frame
    let snapshot = payload.snapshot_path.expect("snapshot evidence");
    assert!(std::path::Path::new(&snapshot).exists());
    let clip = payload.clip_path.expect("clip evidence");
    assert!(std::path::Path::new(&clip).exists());
}

#[tokio::test]
async fn calm_driving_enqueues_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let ring = Arc::new(FrameRingBuffer::new(16));

    let (mut sampling, queue) = build_loop(&dir, Vec::new(), ring).await;
    for _ in 0..20 {
        sampling.tick().await;
    }

    assert_eq!(queue.len().await.unwrap(), 0);
}

#[tokio::test]
async fn camera_failure_still_delivers_the_event() {
    let dir = tempfile::tempdir().unwrap();
    // Ring never receives a frame: no camera
    let ring = Arc::new(FrameRingBuffer::new(16));

    let script = vec![AccelVector::new(-2.0, 0.0, 1.0)];
    let (mut sampling, queue) = build_loop(&dir, script, ring).await;
    sampling.tick().await;

    let entry = queue.peek_oldest().await.unwrap().unwrap();
    let payload = entry.payload().unwrap();
    assert_eq!(payload.event.kind, EventKind::HarshBrake);
    assert!(payload.snapshot_path.is_none());
    assert!(payload.clip_path.is_none());
}
