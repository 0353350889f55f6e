//! Tremor Sensor Agent - accelerometer shake detection with magnitude grading.
//!
//! This library classifies a stream of accelerometer samples as steady or
//! shaking, grades each window into a magnitude level, and optionally
//! reports magnitude changes (with the device coordinate) to a remote
//! endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Tremor Sensor Agent                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Source    │──▶│ Classifier  │──▶│   Monitor   │       │
//! │  │(synth/replay)│  │(0.5s window)│   │ (hysteresis)│       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │   Session   │                     │  Reporter   │       │
//! │  │    Stats    │                     │  (HTTP PUT) │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The classifier is deliberately free of platform and UI concerns: it is
//! a plain value with an `ingest`/`evaluate_window` contract, driven by
//! whatever delivers samples, and unit-testable on its own.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use tremor_sensor_agent::collector::AccelerationSample;
//! use tremor_sensor_agent::core::{MotionClassifier, ShakeMonitor};
//!
//! let mut classifier = MotionClassifier::new(Duration::milliseconds(500), 1.0);
//! let mut monitor = ShakeMonitor::default();
//!
//! classifier.ingest(AccelerationSample::new(0.0, 0.1, -1.0));
//! classifier.ingest(AccelerationSample::new(0.1, 0.0, -0.9));
//!
//! if let Some(verdict) = classifier.evaluate_window(Utc::now()) {
//!     let update = monitor.apply(&verdict);
//!     println!("metric {} face {:?}", update.metric_label, update.face);
//! }
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod reporter;
pub mod stats;

// Re-export key types at crate root for convenience
pub use collector::{AccelerationSample, LocationFix, SampleSource, SensorEvent, SourceError};
pub use config::{Config, ConfigError};
pub use core::{
    MagnitudeLevel, MotionClassifier, ShakeMonitor, StateUpdate, VibrationState, WindowVerdict,
};
pub use reporter::{BlockingReporter, QuakeReport, Reporter, ReporterConfig, ReporterError};
pub use stats::{SessionStats, SharedStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
