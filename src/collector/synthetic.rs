//! Synthetic accelerometer source.
//!
//! Produces a paced stream of samples from a deterministic noise generator,
//! with optional periodic shake bursts. Used for demos and soak runs where
//! no real accelerometer feed is wired up.

use crate::collector::types::{AccelerationSample, LocationFix, SensorEvent};
use crate::collector::SourceError;
use chrono::Utc;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the synthetic sample stream.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Nominal sample rate in Hz
    pub sample_rate_hz: f64,
    /// Noise amplitude while quiet, in g
    pub quiet_amplitude: f64,
    /// Inject a shake burst this often; `None` stays quiet forever
    pub burst_every: Option<Duration>,
    /// Length of each shake burst
    pub burst_duration: Duration,
    /// Noise amplitude during a burst, in g
    pub burst_amplitude: f64,
    /// Emit this coordinate as a location fix on startup
    pub initial_fix: Option<(f64, f64)>,
    /// Seed for the noise generator
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 30.0,
            quiet_amplitude: 0.05,
            burst_every: None,
            burst_duration: Duration::from_millis(600),
            burst_amplitude: 1.5,
            initial_fix: None,
            seed: 0x5eed_5eed_5eed_5eed,
        }
    }
}

/// A synthetic source that streams generated samples on a background thread.
pub struct SyntheticSource {
    config: SyntheticConfig,
    sender: Sender<SensorEvent>,
    receiver: Receiver<SensorEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            config,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start generating samples.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);

        let config = self.config.clone();
        let sender = self.sender.clone();
        let running = self.running.clone();

        self.handle = Some(thread::spawn(move || {
            generate_loop(config, sender, running);
        }));

        Ok(())
    }

    /// Stop generating samples and join the producer thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for generated events.
    pub fn receiver(&self) -> &Receiver<SensorEvent> {
        &self.receiver
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn generate_loop(config: SyntheticConfig, sender: Sender<SensorEvent>, running: Arc<AtomicBool>) {
    let tick = Duration::from_secs_f64(1.0 / config.sample_rate_hz.max(1.0));
    let started = Instant::now();
    let mut noise = Xorshift64::new(config.seed);

    if let Some((latitude, longitude)) = config.initial_fix {
        let _ = sender.try_send(SensorEvent::Location(LocationFix::new(latitude, longitude)));
    }

    while running.load(Ordering::SeqCst) {
        let amplitude = if in_burst(&config, started.elapsed()) {
            config.burst_amplitude
        } else {
            config.quiet_amplitude
        };

        // Gravity keeps z near -1 g when the device lies flat.
        let sample = AccelerationSample::at(
            Utc::now(),
            noise.next_signed() * amplitude,
            noise.next_signed() * amplitude,
            -1.0 + noise.next_signed() * amplitude,
        );

        // Drop samples rather than block if the consumer falls behind.
        let _ = sender.try_send(SensorEvent::Acceleration(sample));

        thread::sleep(tick);
    }
}

fn in_burst(config: &SyntheticConfig, elapsed: Duration) -> bool {
    match config.burst_every {
        // First burst only after one full quiet period.
        Some(period) if !period.is_zero() && elapsed >= period => {
            let phase = Duration::from_nanos((elapsed.as_nanos() % period.as_nanos()) as u64);
            phase < config.burst_duration
        }
        _ => false,
    }
}

/// xorshift64 noise generator.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform value in [-1, 1].
    fn next_signed(&mut self) -> f64 {
        (self.next_u64() as f64 / u64::MAX as f64) * 2.0 - 1.0
    }
}
