//! Configuration for the tremor sensor agent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Nominal accelerometer sample rate in Hz
    pub sample_rate_hz: f64,

    /// Duration of each classification window in milliseconds
    pub window_ms: i64,

    /// Variability metric must exceed this to count as shaking
    pub shake_threshold: f64,

    /// Quiet time before the face settles back to steady, in milliseconds
    pub grace_ms: i64,

    /// Base URL of the quake report endpoint; `None` disables reporting
    pub report_endpoint: Option<String>,

    /// Path for storing session stats
    pub data_path: PathBuf,

    /// Whether collection is currently paused
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tremor-sensor-agent");

        Self {
            sample_rate_hz: 30.0,
            window_ms: crate::core::DEFAULT_WINDOW_MS,
            shake_threshold: crate::core::DEFAULT_SHAKE_THRESHOLD,
            grace_ms: crate::core::DEFAULT_GRACE_MS,
            report_endpoint: None,
            data_path: data_dir,
            paused: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::Io(e.to_string()))?;
            let config: Config =
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::Io(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tremor-sensor-agent")
            .join("config.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Window duration as a chrono duration.
    pub fn window_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.window_ms)
    }

    /// Grace interval as a chrono duration.
    pub fn grace_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.grace_ms)
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Serialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Parse(e) => write!(f, "Parse error: {e}"),
            ConfigError::Serialize(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_rate_hz, 30.0);
        assert_eq!(config.window_ms, 500);
        assert_eq!(config.shake_threshold, 1.0);
        assert_eq!(config.grace_ms, 1_000);
        assert!(config.report_endpoint.is_none());
        assert!(!config.paused);
    }

    #[test]
    fn test_duration_helpers() {
        let config = Config::default();
        assert_eq!(config.window_duration().num_milliseconds(), 500);
        assert_eq!(config.grace_duration().num_milliseconds(), 1_000);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = Config::default();
        config.report_endpoint = Some("http://127.0.0.1:9000".to_string());
        config.paused = true;

        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: Config = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed.report_endpoint, config.report_endpoint);
        assert!(parsed.paused);
    }
}
