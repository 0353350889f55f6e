//! Event types shared by all sample sources.
//!
//! Both the acceleration feed and the location feed are delivered through
//! the same channel as [`SensorEvent`] values, and the replay capture
//! format is one JSON-encoded event per line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accelerometer reading: three axis values at a point in time.
///
/// Immutable once captured. Samples live only inside the current window
/// and are discarded after each evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccelerationSample {
    /// Timestamp when the reading was taken
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerationSample {
    /// Create a sample timestamped "now".
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            x,
            y,
            z,
        }
    }

    /// Create a sample with an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp, x, y, z }
    }
}

/// A device coordinate from the location feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationFix {
    /// Timestamp when the fix was obtained
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            latitude,
            longitude,
        }
    }
}

/// Unified event type delivered by sample sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorEvent {
    Acceleration(AccelerationSample),
    Location(LocationFix),
}

impl SensorEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SensorEvent::Acceleration(s) => s.timestamp,
            SensorEvent::Location(f) => f.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_timestamp_accessor() {
        let sample = AccelerationSample::new(0.1, -0.2, 0.98);
        let event = SensorEvent::Acceleration(sample);
        assert_eq!(event.timestamp(), sample.timestamp);
    }

    #[test]
    fn test_capture_line_parses() {
        let line = r#"{"kind":"acceleration","timestamp":"2024-03-01T12:00:00Z","x":0.0,"y":0.1,"z":0.98}"#;
        let event: SensorEvent = serde_json::from_str(line).expect("valid capture line");
        match event {
            SensorEvent::Acceleration(s) => assert!((s.z - 0.98).abs() < 1e-9),
            SensorEvent::Location(_) => panic!("expected an acceleration event"),
        }
    }

    #[test]
    fn test_location_fix_line_parses() {
        let line = r#"{"kind":"location","timestamp":"2024-03-01T12:00:00Z","latitude":37.55,"longitude":126.99}"#;
        let event: SensorEvent = serde_json::from_str(line).expect("valid capture line");
        match event {
            SensorEvent::Location(f) => assert!((f.latitude - 37.55).abs() < 1e-9),
            SensorEvent::Acceleration(_) => panic!("expected a location event"),
        }
    }
}
