//! Motion classification over time-bounded sample windows.
//!
//! Samples accumulate in a window for a fixed duration (default 0.5 s).
//! Each evaluation computes the summed per-axis variance of the window as
//! a single variability metric, flags shaking when the metric exceeds the
//! shake threshold, grades the metric into a magnitude level, and clears
//! the window. All arithmetic is bounded and constant-time per sample.

use crate::collector::types::AccelerationSample;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default window duration in milliseconds.
pub const DEFAULT_WINDOW_MS: i64 = 500;

/// Default shake threshold: the metric must exceed this to count as shaking.
pub const DEFAULT_SHAKE_THRESHOLD: f64 = 1.0;

/// Magnitude band edges, inclusive on the lower side.
const MILD_EDGE: f64 = 0.3;
const MEDIUM_EDGE: f64 = 0.6;
const STRONG_EDGE: f64 = 1.0;

/// Graded magnitude derived from the variability metric.
///
/// Bands are contiguous and non-overlapping over `[0, inf)`:
/// `[0, 0.3)` Steady, `[0.3, 0.6)` Mild, `[0.6, 1.0)` Medium,
/// `[1.0, inf)` Strong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagnitudeLevel {
    Steady,
    Mild,
    Medium,
    Strong,
}

impl MagnitudeLevel {
    pub fn from_metric(metric: f64) -> Self {
        match metric {
            m if m >= STRONG_EDGE => MagnitudeLevel::Strong,
            m if m >= MEDIUM_EDGE => MagnitudeLevel::Medium,
            m if m >= MILD_EDGE => MagnitudeLevel::Mild,
            _ => MagnitudeLevel::Steady,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MagnitudeLevel::Steady => "Steady",
            MagnitudeLevel::Mild => "Mild",
            MagnitudeLevel::Medium => "Medium",
            MagnitudeLevel::Strong => "Strong",
        }
    }
}

impl std::fmt::Display for MagnitudeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one window evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowVerdict {
    /// Whether the metric exceeded the shake threshold
    pub shaking: bool,
    /// Summed per-axis variance over the window
    pub metric: f64,
    /// Magnitude band the metric falls into
    pub magnitude: MagnitudeLevel,
    /// Number of samples evaluated
    pub sample_count: usize,
    /// When the evaluation ran
    pub evaluated_at: DateTime<Utc>,
}

/// Accumulates samples and evaluates them one window at a time.
pub struct MotionClassifier {
    window_duration: Duration,
    shake_threshold: f64,
    samples: Vec<AccelerationSample>,
    window_started: Option<DateTime<Utc>>,
}

impl MotionClassifier {
    pub fn new(window_duration: Duration, shake_threshold: f64) -> Self {
        Self {
            window_duration,
            shake_threshold,
            samples: Vec::new(),
            window_started: None,
        }
    }

    /// Append a sample to the current window.
    ///
    /// The first sample after a clear opens the window clock.
    pub fn ingest(&mut self, sample: AccelerationSample) {
        if self.window_started.is_none() {
            self.window_started = Some(sample.timestamp);
        }
        self.samples.push(sample);
    }

    /// Number of samples waiting in the current window.
    pub fn pending_samples(&self) -> usize {
        self.samples.len()
    }

    /// Whether the current window has covered its full duration.
    ///
    /// False before any window has opened; the classifier idles when no
    /// samples arrive at all.
    pub fn window_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.window_started {
            Some(started) => now - started >= self.window_duration,
            None => false,
        }
    }

    /// Drop any pending samples and close the window clock.
    ///
    /// Used when collection pauses; partial windows are discarded rather
    /// than evaluated against a stale clock.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.window_started = None;
    }

    /// Evaluate and clear the current window.
    ///
    /// An empty window yields `None` and only resets the window clock, so
    /// an interval with no samples never divides by zero and never changes
    /// state downstream.
    pub fn evaluate_window(&mut self, now: DateTime<Utc>) -> Option<WindowVerdict> {
        if self.samples.is_empty() {
            self.window_started = Some(now);
            return None;
        }

        let metric = summed_variance(&self.samples);
        let sample_count = self.samples.len();

        self.samples.clear();
        self.window_started = Some(now);

        Some(WindowVerdict {
            shaking: metric > self.shake_threshold,
            metric,
            magnitude: MagnitudeLevel::from_metric(metric),
            sample_count,
            evaluated_at: now,
        })
    }
}

/// Sum of the three per-axis variances over a non-empty sample slice.
fn summed_variance(samples: &[AccelerationSample]) -> f64 {
    let n = samples.len() as f64;

    let mut mean = [0.0f64; 3];
    for s in samples {
        mean[0] += s.x;
        mean[1] += s.y;
        mean[2] += s.z;
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut variance = [0.0f64; 3];
    for s in samples {
        variance[0] += (s.x - mean[0]).powi(2);
        variance[1] += (s.y - mean[1]).powi(2);
        variance[2] += (s.z - mean[2]).powi(2);
    }

    (variance[0] + variance[1] + variance[2]) / n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, z: f64) -> AccelerationSample {
        AccelerationSample::new(x, y, z)
    }

    fn classifier() -> MotionClassifier {
        MotionClassifier::new(Duration::milliseconds(DEFAULT_WINDOW_MS), DEFAULT_SHAKE_THRESHOLD)
    }

    #[test]
    fn test_identical_samples_are_steady() {
        let mut c = classifier();
        for _ in 0..3 {
            c.ingest(sample(0.0, 0.0, 0.0));
        }
        let verdict = c.evaluate_window(Utc::now()).expect("non-empty window");
        assert!(!verdict.shaking);
        assert_eq!(verdict.metric, 0.0);
        assert_eq!(verdict.magnitude, MagnitudeLevel::Steady);
        assert_eq!(verdict.sample_count, 3);
    }

    #[test]
    fn test_known_variance() {
        // x values 2,4,4,4,5,5,7,9 have mean 5 and variance exactly 4.
        let mut c = classifier();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            c.ingest(sample(x, 0.0, 0.0));
        }
        let verdict = c.evaluate_window(Utc::now()).expect("non-empty window");
        assert_eq!(verdict.metric, 4.0);
        assert!(verdict.shaking);
        assert_eq!(verdict.magnitude, MagnitudeLevel::Strong);
    }

    #[test]
    fn test_metric_is_order_independent() {
        let values = [0.1, -0.7, 0.4, 1.3, -0.2, 0.9];
        let forward: Vec<_> = values.iter().map(|&v| sample(v, -v, v * 0.5)).collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(summed_variance(&forward), summed_variance(&reversed));
    }

    #[test]
    fn test_metric_is_non_negative() {
        let samples: Vec<_> = (0..50)
            .map(|i| {
                let v = (i as f64 * 0.37).sin() * 2.0 - 0.5;
                sample(v, -v * 1.3, v * v)
            })
            .collect();
        assert!(summed_variance(&samples) >= 0.0);
    }

    #[test]
    fn test_magnitude_bands_lower_edge_inclusive() {
        assert_eq!(MagnitudeLevel::from_metric(0.0), MagnitudeLevel::Steady);
        assert_eq!(MagnitudeLevel::from_metric(0.29), MagnitudeLevel::Steady);
        assert_eq!(MagnitudeLevel::from_metric(0.3), MagnitudeLevel::Mild);
        assert_eq!(MagnitudeLevel::from_metric(0.59), MagnitudeLevel::Mild);
        assert_eq!(MagnitudeLevel::from_metric(0.6), MagnitudeLevel::Medium);
        assert_eq!(MagnitudeLevel::from_metric(0.99), MagnitudeLevel::Medium);
        assert_eq!(MagnitudeLevel::from_metric(1.0), MagnitudeLevel::Strong);
        assert_eq!(MagnitudeLevel::from_metric(12.5), MagnitudeLevel::Strong);
    }

    #[test]
    fn test_shake_uses_strict_exceeds() {
        // A metric of exactly 1.0 grades Strong but does not flip the
        // shaking flag; the threshold must be exceeded.
        let mut c = classifier();
        for x in [1.0, -1.0] {
            c.ingest(sample(x, 0.0, 0.0));
        }
        let verdict = c.evaluate_window(Utc::now()).expect("non-empty window");
        assert_eq!(verdict.metric, 1.0);
        assert!(!verdict.shaking);
        assert_eq!(verdict.magnitude, MagnitudeLevel::Strong);
    }

    #[test]
    fn test_empty_window_is_skipped() {
        let mut c = classifier();
        let now = Utc::now();
        assert!(c.evaluate_window(now).is_none());
        // The clock was reset, so the next window runs from `now`.
        assert!(!c.window_elapsed(now + Duration::milliseconds(100)));
        assert!(c.window_elapsed(now + Duration::milliseconds(600)));
    }

    #[test]
    fn test_window_clears_after_evaluation() {
        let mut c = classifier();
        c.ingest(sample(0.5, 0.5, 0.5));
        c.ingest(sample(-0.5, -0.5, -0.5));
        assert_eq!(c.pending_samples(), 2);

        c.evaluate_window(Utc::now());
        assert_eq!(c.pending_samples(), 0);
    }

    #[test]
    fn test_window_elapsed_tracks_first_sample() {
        let mut c = classifier();
        let start = Utc::now();
        assert!(!c.window_elapsed(start));

        c.ingest(AccelerationSample::at(start, 0.0, 0.0, -1.0));
        assert!(!c.window_elapsed(start + Duration::milliseconds(400)));
        assert!(c.window_elapsed(start + Duration::milliseconds(500)));
    }

    #[test]
    fn test_deterministic_verdicts() {
        let values: Vec<_> = (0..15).map(|i| (i as f64 * 0.61).cos()).collect();
        let run = |values: &[f64]| {
            let mut c = classifier();
            for &v in values {
                c.ingest(sample(v, v * 0.2, -1.0 + v));
            }
            c.evaluate_window(Utc::now()).expect("non-empty window")
        };

        let a = run(&values);
        let b = run(&values);
        assert_eq!(a.metric, b.metric);
        assert_eq!(a.shaking, b.shaking);
        assert_eq!(a.magnitude, b.magnitude);
    }
}
