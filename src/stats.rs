//! Session statistics.
//!
//! Counts what the agent did this session without retaining any sample
//! data, and persists cumulative totals across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current session.
#[derive(Debug)]
pub struct SessionStats {
    samples_ingested: AtomicU64,
    location_fixes: AtomicU64,
    windows_evaluated: AtomicU64,
    quakes_detected: AtomicU64,
    reports_sent: AtomicU64,
    reports_skipped: AtomicU64,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            samples_ingested: AtomicU64::new(0),
            location_fixes: AtomicU64::new(0),
            windows_evaluated: AtomicU64::new(0),
            quakes_detected: AtomicU64::new(0),
            reports_sent: AtomicU64::new(0),
            reports_skipped: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create stats with persistence, seeding counters from a previous run.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            eprintln!("Note: Could not load previous session stats: {e}");
        }

        stats
    }

    pub fn record_sample(&self) {
        self.samples_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_location_fix(&self) {
        self.location_fixes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_evaluated(&self) {
        self.windows_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_quake_detected(&self) {
        self.quakes_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_sent(&self) {
        self.reports_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// A magnitude change happened but no coordinate was available.
    pub fn record_report_skipped(&self) {
        self.reports_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            samples_ingested: self.samples_ingested.load(Ordering::Relaxed),
            location_fixes: self.location_fixes.load(Ordering::Relaxed),
            windows_evaluated: self.windows_evaluated.load(Ordering::Relaxed),
            quakes_detected: self.quakes_detected.load(Ordering::Relaxed),
            reports_sent: self.reports_sent.load(Ordering::Relaxed),
            reports_skipped: self.reports_skipped.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let s = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Samples ingested: {}\n\
             - Location fixes: {}\n\
             - Windows evaluated: {}\n\
             - Quakes detected: {}\n\
             - Reports sent: {}\n\
             - Reports skipped (no coordinate): {}\n\
             - Session duration: {} seconds",
            s.samples_ingested,
            s.location_fixes,
            s.windows_evaluated,
            s.quakes_detected,
            s.reports_sent,
            s.reports_skipped,
            s.session_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let s = self.snapshot();
            let persisted = PersistedStats {
                samples_ingested: s.samples_ingested,
                location_fixes: s.location_fixes,
                windows_evaluated: s.windows_evaluated,
                quakes_detected: s.quakes_detected,
                reports_sent: s.reports_sent,
                reports_skipped: s.reports_skipped,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load counters from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.samples_ingested
                    .store(persisted.samples_ingested, Ordering::Relaxed);
                self.location_fixes
                    .store(persisted.location_fixes, Ordering::Relaxed);
                self.windows_evaluated
                    .store(persisted.windows_evaluated, Ordering::Relaxed);
                self.quakes_detected
                    .store(persisted.quakes_detected, Ordering::Relaxed);
                self.reports_sent
                    .store(persisted.reports_sent, Ordering::Relaxed);
                self.reports_skipped
                    .store(persisted.reports_skipped, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.samples_ingested.store(0, Ordering::Relaxed);
        self.location_fixes.store(0, Ordering::Relaxed);
        self.windows_evaluated.store(0, Ordering::Relaxed);
        self.quakes_detected.store(0, Ordering::Relaxed);
        self.reports_sent.store(0, Ordering::Relaxed);
        self.reports_skipped.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub samples_ingested: u64,
    pub location_fixes: u64,
    pub windows_evaluated: u64,
    pub quakes_detected: u64,
    pub reports_sent: u64,
    pub reports_skipped: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Persisted counter format.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    samples_ingested: u64,
    location_fixes: u64,
    windows_evaluated: u64,
    quakes_detected: u64,
    reports_sent: u64,
    reports_skipped: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared stats handle.
pub type SharedStats = Arc<SessionStats>;

pub fn create_shared_stats() -> SharedStats {
    Arc::new(SessionStats::new())
}

pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedStats {
    Arc::new(SessionStats::with_persistence(path))
}
