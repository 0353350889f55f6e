//! Replay source for captured sample streams.
//!
//! Reads a JSONL capture (one [`SensorEvent`] per line), then replays it on
//! a background thread with the recorded inter-event pacing. Events are
//! re-stamped to the emission time so the downstream window clock sees a
//! live stream.

use crate::collector::types::{AccelerationSample, LocationFix, SensorEvent};
use crate::collector::SourceError;
use chrono::Utc;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Gaps longer than this are compressed during replay.
const MAX_GAP: Duration = Duration::from_secs(1);

/// Replays a recorded event capture at its original pace.
pub struct ReplaySource {
    events: Vec<SensorEvent>,
    sender: Sender<SensorEvent>,
    receiver: Receiver<SensorEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Load a capture file. Every line must parse; a malformed line is a
    /// setup error, not something to skip silently mid-run.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SourceError::Io(format!("{}: {e}", path.as_ref().display())))?;

        let mut events = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let event: SensorEvent = serde_json::from_str(line)
                .map_err(|e| SourceError::Parse(format!("line {}: {e}", lineno + 1)))?;
            events.push(event);
        }

        if events.is_empty() {
            return Err(SourceError::Parse("capture contains no events".to_string()));
        }

        let (sender, receiver) = bounded(10_000);
        Ok(Self {
            events,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        })
    }

    /// Number of events loaded from the capture.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Start replaying. The source stops on its own when the capture ends.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);

        let events = self.events.clone();
        let sender = self.sender.clone();
        let running = self.running.clone();

        self.handle = Some(thread::spawn(move || {
            replay_loop(events, sender, running);
        }));

        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn receiver(&self) -> &Receiver<SensorEvent> {
        &self.receiver
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn replay_loop(events: Vec<SensorEvent>, sender: Sender<SensorEvent>, running: Arc<AtomicBool>) {
    let mut previous: Option<chrono::DateTime<Utc>> = None;

    for event in events {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let recorded_at = event.timestamp();
        if let Some(prev) = previous {
            let gap = (recorded_at - prev)
                .to_std()
                .unwrap_or(Duration::ZERO)
                .min(MAX_GAP);
            thread::sleep(gap);
        }
        previous = Some(recorded_at);

        let _ = sender.try_send(restamp(event));
    }

    running.store(false, Ordering::SeqCst);
}

/// Re-stamp a recorded event to "now", keeping its payload.
fn restamp(event: SensorEvent) -> SensorEvent {
    let now = Utc::now();
    match event {
        SensorEvent::Acceleration(s) => {
            SensorEvent::Acceleration(AccelerationSample::at(now, s.x, s.y, s.z))
        }
        SensorEvent::Location(f) => SensorEvent::Location(LocationFix {
            timestamp: now,
            ..f
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_capture(lines: &[&str]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("tremor-capture-{}.jsonl", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).expect("create capture");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        path
    }

    #[test]
    fn test_load_and_replay() {
        let path = write_capture(&[
            r#"{"kind":"location","timestamp":"2024-03-01T12:00:00Z","latitude":37.5,"longitude":127.0}"#,
            r#"{"kind":"acceleration","timestamp":"2024-03-01T12:00:00.033Z","x":0.0,"y":0.0,"z":-1.0}"#,
            r#"{"kind":"acceleration","timestamp":"2024-03-01T12:00:00.066Z","x":0.9,"y":-0.4,"z":-0.2}"#,
        ]);

        let mut source = ReplaySource::from_path(&path).expect("load capture");
        assert_eq!(source.event_count(), 3);

        source.start().expect("start");
        let mut received = Vec::new();
        while let Ok(event) = source.receiver().recv_timeout(Duration::from_secs(2)) {
            received.push(event);
            if received.len() == 3 {
                break;
            }
        }
        source.stop();

        assert_eq!(received.len(), 3);
        // Events are re-stamped to replay time.
        let age = Utc::now() - received[0].timestamp();
        assert!(age.num_seconds() < 60);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_malformed_line_is_a_setup_error() {
        let path = write_capture(&[r#"{"kind":"acceleration""#]);
        assert!(matches!(
            ReplaySource::from_path(&path),
            Err(SourceError::Parse(_))
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_empty_capture_rejected() {
        let path = write_capture(&[]);
        assert!(matches!(
            ReplaySource::from_path(&path),
            Err(SourceError::Parse(_))
        ));
        let _ = std::fs::remove_file(path);
    }
}
