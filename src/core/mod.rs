//! Core motion classification.
//!
//! [`classifier`] turns windows of raw samples into verdicts;
//! [`monitor`] turns verdicts into debounced display state and report
//! triggers.

pub mod classifier;
pub mod monitor;

pub use classifier::{
    MagnitudeLevel, MotionClassifier, WindowVerdict, DEFAULT_SHAKE_THRESHOLD, DEFAULT_WINDOW_MS,
};
pub use monitor::{ShakeMonitor, StateUpdate, VibrationState, DEFAULT_GRACE_MS};
