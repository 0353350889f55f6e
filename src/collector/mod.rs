//! Sample sources for the tremor agent.
//!
//! A source owns a producer thread and hands events to the run loop over a
//! bounded channel. An unavailable source simply sends nothing; the
//! classifier stays idle without it.

pub mod replay;
pub mod synthetic;
pub mod types;

pub use replay::ReplaySource;
pub use synthetic::{SyntheticConfig, SyntheticSource};
pub use types::{AccelerationSample, LocationFix, SensorEvent};

use crossbeam_channel::Receiver;

/// Errors raised while setting up or starting a sample source.
#[derive(Debug)]
pub enum SourceError {
    AlreadyRunning,
    Io(String),
    Parse(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::AlreadyRunning => write!(f, "Source is already running"),
            SourceError::Io(e) => write!(f, "IO error: {e}"),
            SourceError::Parse(e) => write!(f, "Capture parse error: {e}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Either sample source, so the run loop can hold one of each kind.
pub enum SampleSource {
    Synthetic(SyntheticSource),
    Replay(ReplaySource),
}

impl SampleSource {
    pub fn start(&mut self) -> Result<(), SourceError> {
        match self {
            SampleSource::Synthetic(s) => s.start(),
            SampleSource::Replay(s) => s.start(),
        }
    }

    pub fn stop(&mut self) {
        match self {
            SampleSource::Synthetic(s) => s.stop(),
            SampleSource::Replay(s) => s.stop(),
        }
    }

    pub fn is_running(&self) -> bool {
        match self {
            SampleSource::Synthetic(s) => s.is_running(),
            SampleSource::Replay(s) => s.is_running(),
        }
    }

    pub fn receiver(&self) -> &Receiver<SensorEvent> {
        match self {
            SampleSource::Synthetic(s) => s.receiver(),
            SampleSource::Replay(s) => s.receiver(),
        }
    }
}
