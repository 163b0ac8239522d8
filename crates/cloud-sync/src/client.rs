//! HTTP client for the remote collector

use crate::SyncError;
use async_trait::async_trait;
use delivery_queue::EventPayload;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Collector endpoint configuration
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Collector base URL, e.g. `http://collector.fleet:5000`
    pub base_url: String,
    /// Shared API key sent as `X-API-Key`
    pub api_key: String,
    /// Per-request timeout for the event POST
    pub request_timeout: Duration,
    /// Per-request timeout for evidence uploads (larger files)
    pub upload_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(60),
        }
    }
}

/// Upload surface the sync worker drives; split out so the worker logic can
/// be exercised against a scripted collector in tests
#[async_trait]
pub trait Collector: Send + Sync {
    /// POST the event record; returns the collector-assigned event id
    async fn post_event(&self, payload: &EventPayload) -> Result<i64, SyncError>;

    /// Upload evidence files tagged to a delivered event (best effort)
    async fn upload_evidence(&self, event_id: i64, payload: &EventPayload)
        -> Result<(), SyncError>;
}

/// What the collector returns for an accepted event
#[derive(Debug, Deserialize)]
struct EventAccepted {
    id: i64,
}

/// reqwest-backed collector client
pub struct CollectorClient {
    config: CollectorConfig,
    http: reqwest::Client,
}

impl CollectorClient {
    pub fn new(config: CollectorConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn check_status(status: StatusCode) -> Result<(), SyncError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(SyncError::Rejected {
                status: status.as_u16(),
            })
        }
    }

    /// Read an evidence file into a multipart part; a missing file is
    /// skipped, since evidence may have been pruned by the operator
    async fn file_part(path: &str, mime: &str) -> Option<Part> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path, error = %e, "evidence file unreadable, skipping");
                return None;
            }
        };
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "evidence".to_string());
        Part::bytes(bytes).file_name(name).mime_str(mime).ok()
    }
}

#[async_trait]
impl Collector for CollectorClient {
    async fn post_event(&self, payload: &EventPayload) -> Result<i64, SyncError> {
        let url = format!("{}/api/events", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .header("X-API-Key", &self.config.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Self::check_status(response.status())?;

        let accepted: EventAccepted = response
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("invalid collector response: {e}")))?;

        debug!(event_id = accepted.id, "event accepted by collector");
        Ok(accepted.id)
    }

    async fn upload_evidence(
        &self,
        event_id: i64,
        payload: &EventPayload,
    ) -> Result<(), SyncError> {
        let mut form = Form::new();
        let mut parts = 0usize;

        if let Some(path) = &payload.snapshot_path {
            if let Some(part) = Self::file_part(path, "image/jpeg").await {
                form = form.part("snapshot", part);
                parts += 1;
            }
        }
        if let Some(path) = &payload.clip_path {
            if let Some(part) = Self::file_part(path, "video/x-motion-jpeg").await {
                form = form.part("clip", part);
                parts += 1;
            }
        }

        if parts == 0 {
            return Ok(());
        }

        let url = format!("{}/api/events/{}/media", self.config.base_url, event_id);

        let response = self
            .http
            .post(&url)
            .header("X-API-Key", &self.config.api_key)
            .timeout(self.config.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Self::check_status(response.status())?;

        debug!(event_id, parts, "evidence uploaded");
        Ok(())
    }
}
