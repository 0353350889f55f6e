//! Display state and report triggering with hysteresis.
//!
//! The monitor consumes window verdicts and maintains the two pieces of
//! user-visible state: the coarse vibration state (with a grace interval
//! before settling back to steady, so the face does not flicker) and the
//! graded magnitude (updated every window, reported only on change).

use crate::core::classifier::{MagnitudeLevel, WindowVerdict};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default grace interval before reverting to steady, in milliseconds.
pub const DEFAULT_GRACE_MS: i64 = 1_000;

/// Coarse display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VibrationState {
    Steady,
    Earthquake,
}

impl VibrationState {
    /// Image asset key for this state.
    pub fn asset_key(&self) -> &'static str {
        match self {
            VibrationState::Steady => "sleeping",
            VibrationState::Earthquake => "weary",
        }
    }
}

/// What changed after applying one verdict.
#[derive(Debug, Clone)]
pub struct StateUpdate {
    /// New vibration state, set only when it actually changed
    pub face: Option<VibrationState>,
    /// Magnitude after this window
    pub magnitude: MagnitudeLevel,
    /// True when the magnitude differs from the previous window;
    /// the only condition that triggers a remote report
    pub magnitude_changed: bool,
    /// Metric formatted for the readout label
    pub metric_label: String,
}

/// Tracks vibration state across windows.
pub struct ShakeMonitor {
    grace: Duration,
    vibration: VibrationState,
    magnitude: MagnitudeLevel,
    last_quake_at: Option<DateTime<Utc>>,
}

impl ShakeMonitor {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            vibration: VibrationState::Steady,
            magnitude: MagnitudeLevel::Steady,
            last_quake_at: None,
        }
    }

    pub fn vibration(&self) -> VibrationState {
        self.vibration
    }

    pub fn magnitude(&self) -> MagnitudeLevel {
        self.magnitude
    }

    pub fn last_quake_at(&self) -> Option<DateTime<Utc>> {
        self.last_quake_at
    }

    /// Apply one window verdict.
    ///
    /// Idempotent with respect to outputs: reapplying an identical verdict
    /// changes nothing and triggers nothing.
    pub fn apply(&mut self, verdict: &WindowVerdict) -> StateUpdate {
        let mut face = None;

        if verdict.shaking {
            self.last_quake_at = Some(verdict.evaluated_at);
            if self.vibration != VibrationState::Earthquake {
                self.vibration = VibrationState::Earthquake;
                face = Some(self.vibration);
            }
        } else if self.can_settle(verdict.evaluated_at) && self.vibration != VibrationState::Steady
        {
            self.vibration = VibrationState::Steady;
            face = Some(self.vibration);
        }

        let magnitude_changed = verdict.magnitude != self.magnitude;
        self.magnitude = verdict.magnitude;

        StateUpdate {
            face,
            magnitude: verdict.magnitude,
            magnitude_changed,
            metric_label: format!("{:.2}", verdict.metric),
        }
    }

    /// Whether enough quiet time has passed to settle back to steady.
    fn can_settle(&self, now: DateTime<Utc>) -> bool {
        match self.last_quake_at {
            Some(at) => now - at >= self.grace,
            None => true,
        }
    }
}

impl Default for ShakeMonitor {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_GRACE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(metric: f64, at: DateTime<Utc>) -> WindowVerdict {
        WindowVerdict {
            shaking: metric > 1.0,
            metric,
            magnitude: MagnitudeLevel::from_metric(metric),
            sample_count: 15,
            evaluated_at: at,
        }
    }

    #[test]
    fn test_quake_flips_face_and_records_time() {
        let mut monitor = ShakeMonitor::default();
        let at = Utc::now();

        let update = monitor.apply(&verdict(1.2, at));
        assert_eq!(update.face, Some(VibrationState::Earthquake));
        assert_eq!(monitor.vibration(), VibrationState::Earthquake);
        assert_eq!(monitor.last_quake_at(), Some(at));
    }

    #[test]
    fn test_grace_interval_holds_the_face() {
        let mut monitor = ShakeMonitor::default();
        let at = Utc::now();
        monitor.apply(&verdict(1.2, at));

        // Half a second later the stream is quiet, but the grace interval
        // has not elapsed yet.
        let update = monitor.apply(&verdict(0.1, at + Duration::milliseconds(500)));
        assert_eq!(update.face, None);
        assert_eq!(monitor.vibration(), VibrationState::Earthquake);
    }

    #[test]
    fn test_settles_after_grace() {
        let mut monitor = ShakeMonitor::default();
        let at = Utc::now();
        monitor.apply(&verdict(1.2, at));

        let update = monitor.apply(&verdict(0.1, at + Duration::milliseconds(1_100)));
        assert_eq!(update.face, Some(VibrationState::Steady));
        assert_eq!(monitor.vibration(), VibrationState::Steady);
    }

    #[test]
    fn test_never_quaked_settles_immediately() {
        let mut monitor = ShakeMonitor::default();
        let update = monitor.apply(&verdict(0.05, Utc::now()));
        // Already steady, so no change either.
        assert_eq!(update.face, None);
        assert_eq!(monitor.vibration(), VibrationState::Steady);
    }

    #[test]
    fn test_magnitude_reports_only_on_change() {
        let mut monitor = ShakeMonitor::default();
        let at = Utc::now();

        let first = monitor.apply(&verdict(0.45, at));
        assert_eq!(first.magnitude, MagnitudeLevel::Mild);
        assert!(first.magnitude_changed);

        let second = monitor.apply(&verdict(0.5, at + Duration::milliseconds(500)));
        assert_eq!(second.magnitude, MagnitudeLevel::Mild);
        assert!(!second.magnitude_changed);

        let third = monitor.apply(&verdict(0.7, at + Duration::milliseconds(1_000)));
        assert_eq!(third.magnitude, MagnitudeLevel::Medium);
        assert!(third.magnitude_changed);
    }

    #[test]
    fn test_reapplying_identical_verdict_is_idempotent() {
        let mut monitor = ShakeMonitor::default();
        let v = verdict(1.2, Utc::now());

        let first = monitor.apply(&v);
        assert!(first.magnitude_changed);
        assert!(first.face.is_some());

        let second = monitor.apply(&v);
        assert!(!second.magnitude_changed);
        assert!(second.face.is_none());
    }

    #[test]
    fn test_metric_label_format() {
        let mut monitor = ShakeMonitor::default();
        let update = monitor.apply(&verdict(0.4567, Utc::now()));
        assert_eq!(update.metric_label, "0.46");
    }

    #[test]
    fn test_asset_keys() {
        assert_eq!(VibrationState::Steady.asset_key(), "sleeping");
        assert_eq!(VibrationState::Earthquake.asset_key(), "weary");
    }
}
