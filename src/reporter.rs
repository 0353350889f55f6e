//! Report client for pushing magnitude changes to a remote endpoint.
//!
//! One PUT per magnitude change, carrying the device coordinate and the
//! level name. Failures are returned to the caller, which logs and drops
//! them; there is no queue and no retry.

use crate::collector::types::LocationFix;
use crate::core::classifier::MagnitudeLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reporter configuration.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Base URL of the report service, e.g. `http://127.0.0.1:9000`
    pub base_url: String,
}

impl ReporterConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Get the report endpoint URL.
    pub fn report_url(&self) -> String {
        format!("{}/v1/report", self.base_url)
    }

    /// Get the health check endpoint URL.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

/// Reporter error types.
#[derive(Debug)]
pub enum ReporterError {
    /// Configuration error
    Config(String),
    /// Network/HTTP error
    Network(String),
    /// Server returned an error response
    Server { status: u16, message: String },
}

impl std::fmt::Display for ReporterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReporterError::Config(msg) => write!(f, "Reporter config error: {msg}"),
            ReporterError::Network(msg) => write!(f, "Reporter network error: {msg}"),
            ReporterError::Server { status, message } => {
                write!(f, "Reporter server error ({status}): {message}")
            }
        }
    }
}

impl std::error::Error for ReporterError {}

/// Wire payload for one quake report.
///
/// All fields are string-encoded, matching what the report service
/// expects: coordinates as decimal strings, the magnitude by level name,
/// and the timestamp as epoch seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuakeReport {
    pub longitude: String,
    pub latitude: String,
    pub magnitude: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    /// Reporting device, for multi-device endpoints
    pub device_id: String,
}

impl QuakeReport {
    pub fn new(
        level: MagnitudeLevel,
        fix: &LocationFix,
        at: DateTime<Utc>,
        device_id: &str,
    ) -> Self {
        Self {
            longitude: fix.longitude.to_string(),
            latitude: fix.latitude.to_string(),
            magnitude: level.as_str().to_string(),
            time_stamp: at.timestamp().to_string(),
            device_id: device_id.to_string(),
        }
    }
}

/// Async report client.
pub struct Reporter {
    config: ReporterConfig,
    client: reqwest::Client,
    device_id: String,
}

impl Reporter {
    pub fn new(config: ReporterConfig) -> Result<Self, ReporterError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ReporterError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Device ID from hostname + instance
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let device_id = format!(
            "tremor-{}-{}",
            hostname,
            &uuid::Uuid::new_v4().to_string()[..8]
        );

        Ok(Self {
            config,
            client,
            device_id,
        })
    }

    /// Test connection to the report service.
    pub async fn test_connection(&self) -> Result<bool, ReporterError> {
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| ReporterError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }

    /// Send one report for a magnitude change.
    pub async fn send_report(
        &self,
        level: MagnitudeLevel,
        fix: &LocationFix,
        at: DateTime<Utc>,
    ) -> Result<(), ReporterError> {
        let report = QuakeReport::new(level, fix, at, &self.device_id);

        let response = self
            .client
            .put(self.config.report_url())
            .json(&report)
            .send()
            .await
            .map_err(|e| ReporterError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ReporterError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Get the device ID.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// Blocking report client for use in the synchronous run loop.
pub struct BlockingReporter {
    inner: Reporter,
    runtime: tokio::runtime::Runtime,
}

impl BlockingReporter {
    pub fn new(config: ReporterConfig) -> Result<Self, ReporterError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ReporterError::Config(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: Reporter::new(config)?,
            runtime,
        })
    }

    /// Test connection to the report service.
    pub fn test_connection(&self) -> Result<bool, ReporterError> {
        self.runtime.block_on(self.inner.test_connection())
    }

    /// Send one report for a magnitude change.
    pub fn send_report(
        &self,
        level: MagnitudeLevel,
        fix: &LocationFix,
        at: DateTime<Utc>,
    ) -> Result<(), ReporterError> {
        self.runtime
            .block_on(self.inner.send_report(level, fix, at))
    }

    /// Get the device ID.
    pub fn device_id(&self) -> &str {
        self.inner.device_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reporter_config_urls() {
        let config = ReporterConfig::new("http://127.0.0.1:9000");
        assert_eq!(config.report_url(), "http://127.0.0.1:9000/v1/report");
        assert_eq!(config.health_url(), "http://127.0.0.1:9000/health");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = ReporterConfig::new("http://example.com/");
        assert_eq!(config.report_url(), "http://example.com/v1/report");
    }

    #[test]
    fn test_report_payload_wire_format() {
        let fix = LocationFix {
            timestamp: Utc::now(),
            latitude: 37.5665,
            longitude: 126.978,
        };
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let report = QuakeReport::new(MagnitudeLevel::Medium, &fix, at, "tremor-test-1234");

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["longitude"], "126.978");
        assert_eq!(json["latitude"], "37.5665");
        assert_eq!(json["magnitude"], "Medium");
        assert_eq!(json["timeStamp"], at.timestamp().to_string());
    }

    #[test]
    fn test_device_id_prefix() {
        let reporter =
            Reporter::new(ReporterConfig::new("http://127.0.0.1:9000")).expect("reporter");
        assert!(reporter.device_id().starts_with("tremor-"));
    }
}
