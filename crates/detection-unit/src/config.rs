//! Unit configuration
//!
//! Layered: defaults, then an optional config file, then `DRIVEGUARD_*`
//! environment variables (nested keys separated by `__`).

use cloud_sync::{CollectorConfig, SyncConfig};
use config::{Config, ConfigError, Environment, File};
use event_detection::DetectionConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level unit configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Bus identity as registered with the collector
    pub bus_registration: String,
    pub collector: CollectorSection,
    pub sampling: SamplingSection,
    pub camera: CameraSection,
    pub sync: SyncSection,
    pub detection: DetectionConfig,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            bus_registration: "UNREGISTERED".to_string(),
            collector: CollectorSection::default(),
            sampling: SamplingSection::default(),
            camera: CameraSection::default(),
            sync: SyncSection::default(),
            detection: DetectionConfig::default(),
        }
    }
}

/// Collector endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorSection {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            api_key: String::new(),
            request_timeout_secs: 10,
            upload_timeout_secs: 60,
        }
    }
}

/// Sampling loop settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingSection {
    /// Sensor polling rate (Hz)
    pub rate_hz: f64,
    /// Ultrasonic echo timeout (ms)
    pub proximity_timeout_ms: u64,
    /// Cadence of the periodic status log line (s)
    pub status_interval_secs: u64,
}

impl Default for SamplingSection {
    fn default() -> Self {
        Self {
            rate_hz: 10.0,
            proximity_timeout_ms: 100,
            status_interval_secs: 5,
        }
    }
}

/// Camera and evidence settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraSection {
    /// Camera capture rate (fps)
    pub fps: u32,
    /// Pre-event buffer window (s)
    pub buffer_window_secs: u32,
    /// Post-event clip recording window (s)
    pub clip_duration_secs: u64,
    /// Directory receiving snapshots and clips
    pub recordings_dir: PathBuf,
    /// JPEG quality for evidence frames
    pub jpeg_quality: u8,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            fps: 15,
            buffer_window_secs: 5,
            clip_duration_secs: 5,
            recordings_dir: PathBuf::from("recordings"),
            jpeg_quality: 80,
        }
    }
}

/// Delivery queue and sync worker settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    /// Durable queue database path
    pub queue_path: PathBuf,
    /// Idle wait when the queue is drained (s)
    pub poll_interval_secs: u64,
    /// Fixed backoff after a failed delivery attempt (s)
    pub retry_backoff_secs: u64,
    /// Attempts before a poison entry is dead-lettered
    pub max_poison_attempts: i64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            queue_path: PathBuf::from("events_queue.db"),
            poll_interval_secs: 2,
            retry_backoff_secs: 5,
            max_poison_attempts: 5,
        }
    }
}

impl UnitConfig {
    /// Load configuration, optionally from an explicit file path
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = match path {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("driveguard").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("DRIVEGUARD").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Sampling tick interval
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.sampling.rate_hz.max(0.1))
    }

    /// Collector client settings
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            base_url: self.collector.base_url.clone(),
            api_key: self.collector.api_key.clone(),
            request_timeout: Duration::from_secs(self.collector.request_timeout_secs),
            upload_timeout: Duration::from_secs(self.collector.upload_timeout_secs),
        }
    }

    /// Sync worker settings
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            poll_interval: Duration::from_secs(self.sync.poll_interval_secs),
            retry_backoff: Duration::from_secs(self.sync.retry_backoff_secs),
            max_poison_attempts: self.sync.max_poison_attempts,
        }
    }
}
