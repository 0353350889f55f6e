//! Tremor Sensor Agent CLI
//!
//! Accelerometer shake detection with magnitude grading and remote reports.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tremor_sensor_agent::{
    collector::{ReplaySource, SampleSource, SensorEvent, SyntheticConfig, SyntheticSource},
    config::Config,
    core::{MotionClassifier, ShakeMonitor},
    stats::create_shared_stats_with_persistence,
    BlockingReporter, LocationFix, ReporterConfig, VERSION,
};

#[derive(Parser)]
#[command(name = "tremor-sensor")]
#[command(version = VERSION)]
#[command(about = "Accelerometer shake detector with magnitude grading", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start classifying accelerometer samples
    Start {
        /// Sample source: "synthetic" or a path to a JSONL capture
        #[arg(long, default_value = "synthetic")]
        source: String,

        /// Report endpoint base URL (overrides the configured one)
        #[arg(long)]
        endpoint: Option<String>,

        /// Device latitude for reports (synthetic source only)
        #[arg(long, requires = "longitude")]
        latitude: Option<f64>,

        /// Device longitude for reports (synthetic source only)
        #[arg(long, requires = "latitude")]
        longitude: Option<f64>,

        /// Inject a synthetic shake burst every N seconds
        #[arg(long)]
        burst_every: Option<u64>,

        /// Synthetic noise amplitude while quiet, in g
        #[arg(long, default_value = "0.05")]
        quiet_amp: f64,
    },

    /// Pause classification
    Pause,

    /// Resume classification
    Resume,

    /// Show current status and cumulative statistics
    Status,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            source,
            endpoint,
            latitude,
            longitude,
            burst_every,
            quiet_amp,
        } => {
            cmd_start(&source, endpoint, latitude, longitude, burst_every, quiet_amp);
        }
        Commands::Pause => {
            cmd_pause();
        }
        Commands::Resume => {
            cmd_resume();
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_start(
    source: &str,
    endpoint: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    burst_every: Option<u64>,
    quiet_amp: f64,
) {
    println!("Tremor Sensor Agent v{VERSION}");
    println!();

    // Load or create configuration
    let mut config = Config::load().unwrap_or_default();
    if let Some(url) = endpoint {
        config.report_endpoint = Some(url);
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    // Build the sample source
    let mut sample_source = match build_source(source, &config, latitude, longitude, burst_every, quiet_amp) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("Starting classification...");
    println!("  Source: {source}");
    println!("  Sample rate: {} Hz", config.sample_rate_hz);
    println!("  Window: {} ms", config.window_ms);
    println!("  Shake threshold: {}", config.shake_threshold);
    println!("  Grace interval: {} ms", config.grace_ms);

    // Set up the reporter if an endpoint is configured
    let reporter = match config.report_endpoint {
        Some(ref url) => match BlockingReporter::new(ReporterConfig::new(url.clone())) {
            Ok(reporter) => {
                println!("  Reporting: enabled ({url})");
                println!("  Device ID: {}", reporter.device_id());

                match reporter.test_connection() {
                    Ok(true) => println!("  Report service: OK"),
                    Ok(false) => eprintln!("Warning: Report service health check failed"),
                    Err(e) => eprintln!("Warning: Could not reach report service: {e}"),
                }
                Some(reporter)
            }
            Err(e) => {
                eprintln!("Warning: Reporter initialization failed: {e}");
                eprintln!("Continuing without reporting.");
                None
            }
        },
        None => {
            println!("  Reporting: disabled");
            None
        }
    };

    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Session stats with persistence
    let stats = create_shared_stats_with_persistence(config.data_path.join("stats.json"));

    // Classifier and monitor
    let mut classifier = MotionClassifier::new(config.window_duration(), config.shake_threshold);
    let mut monitor = ShakeMonitor::new(config.grace_duration());

    // Last known device coordinate; reports are skipped without one.
    let mut last_fix: Option<LocationFix> = None;

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc_handler(r);

    // Support pause/resume from another process by polling the config file.
    let mut paused = config.paused;
    let mut last_config_check = std::time::Instant::now();

    if paused {
        println!("Classification is currently paused.");
        println!("Run `tremor-sensor resume` to start.");
        println!();
    } else if let Err(e) = sample_source.start() {
        eprintln!("Error starting source: {e}");
        std::process::exit(1);
    }

    let receiver = sample_source.receiver().clone();

    // Main event loop
    while running.load(Ordering::SeqCst) {
        // Periodically reload config so `tremor-sensor pause/resume` can
        // control a running agent.
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if cfg.paused != paused {
                    paused = cfg.paused;

                    if paused {
                        println!();
                        println!("Pausing classification...");
                        sample_source.stop();

                        // Discard the partial window and queued events.
                        classifier.reset();
                        while receiver.try_recv().is_ok() {}
                    } else {
                        println!();
                        println!("Resuming classification...");
                        if let Err(e) = sample_source.start() {
                            eprintln!("Error resuming source: {e}");
                            std::process::exit(1);
                        }
                    }
                }
            }
            last_config_check = std::time::Instant::now();
        }

        if paused {
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        // Process events with timeout
        match receiver.recv_timeout(Duration::from_millis(50)) {
            Ok(SensorEvent::Acceleration(sample)) => {
                stats.record_sample();
                classifier.ingest(sample);
            }
            Ok(SensorEvent::Location(fix)) => {
                stats.record_location_fix();
                last_fix = Some(fix);
                println!(
                    "[{}] Location fix: {:.4}, {:.4}",
                    fix.timestamp.format("%H:%M:%S"),
                    fix.latitude,
                    fix.longitude
                );
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                // A replay source stops itself when the capture ends.
                if !sample_source.is_running() && receiver.is_empty() {
                    println!("Capture finished.");
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                eprintln!("Source disconnected unexpectedly");
                break;
            }
        }

        // Evaluate the window once its duration has elapsed
        let now = Utc::now();
        if classifier.window_elapsed(now) {
            if let Some(verdict) = classifier.evaluate_window(now) {
                stats.record_window_evaluated();
                if verdict.shaking {
                    stats.record_quake_detected();
                }

                let update = monitor.apply(&verdict);

                println!(
                    "[{}] Window: {} samples | metric {} | {}",
                    now.format("%H:%M:%S"),
                    verdict.sample_count,
                    update.metric_label,
                    update.magnitude
                );

                if let Some(face) = update.face {
                    println!(
                        "[{}] Face -> {:?} ({})",
                        now.format("%H:%M:%S"),
                        face,
                        face.asset_key()
                    );
                }

                if update.magnitude_changed {
                    match (&reporter, &last_fix) {
                        (Some(reporter), Some(fix)) => {
                            match reporter.send_report(update.magnitude, fix, now) {
                                Ok(()) => {
                                    stats.record_report_sent();
                                    println!("[Report] {} sent", update.magnitude);
                                }
                                Err(e) => {
                                    tracing::warn!("report failed: {e}");
                                    eprintln!("[Report] Failed: {e}");
                                }
                            }
                        }
                        (Some(_), None) => {
                            stats.record_report_skipped();
                            tracing::debug!(
                                "magnitude changed to {} but no coordinate is known; report skipped",
                                update.magnitude
                            );
                        }
                        (None, _) => {}
                    }
                }
            }
        }
    }

    // Stop collection and evaluate whatever is left in the window.
    println!();
    println!("Stopping...");
    sample_source.stop();

    let now = Utc::now();
    if let Some(verdict) = classifier.evaluate_window(now) {
        stats.record_window_evaluated();
        if verdict.shaking {
            stats.record_quake_detected();
        }
        monitor.apply(&verdict);
    }

    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save session stats: {e}");
    }

    println!();
    println!("{}", stats.summary());
}

/// Build a sample source from the `--source` argument.
fn build_source(
    source: &str,
    config: &Config,
    latitude: Option<f64>,
    longitude: Option<f64>,
    burst_every: Option<u64>,
    quiet_amp: f64,
) -> Result<SampleSource, tremor_sensor_agent::SourceError> {
    if source == "synthetic" {
        let synthetic = SyntheticConfig {
            sample_rate_hz: config.sample_rate_hz,
            quiet_amplitude: quiet_amp,
            burst_every: burst_every.map(Duration::from_secs),
            initial_fix: latitude.zip(longitude),
            ..SyntheticConfig::default()
        };
        Ok(SampleSource::Synthetic(SyntheticSource::new(synthetic)))
    } else {
        let replay = ReplaySource::from_path(PathBuf::from(source))?;
        println!("Loaded {} events from capture", replay.event_count());
        Ok(SampleSource::Replay(replay))
    }
}

fn cmd_pause() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = true;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Classification paused. Use 'tremor-sensor resume' to continue.");
}

fn cmd_resume() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = false;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Classification resumed.");
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Tremor Sensor Agent Status");
    println!("==========================");
    println!();

    println!("Configuration:");
    println!("  Sample rate: {} Hz", config.sample_rate_hz);
    println!("  Window: {} ms", config.window_ms);
    println!("  Shake threshold: {}", config.shake_threshold);
    println!("  Grace interval: {} ms", config.grace_ms);
    println!(
        "  Report endpoint: {}",
        config.report_endpoint.as_deref().unwrap_or("disabled")
    );
    println!("  Paused: {}", config.paused);
    println!();

    // Load and show cumulative stats if available
    let stats_path = config.data_path.join("stats.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(v) = stats.get("samples_ingested") {
                    println!("  Samples ingested: {v}");
                }
                if let Some(v) = stats.get("windows_evaluated") {
                    println!("  Windows evaluated: {v}");
                }
                if let Some(v) = stats.get("quakes_detected") {
                    println!("  Quakes detected: {v}");
                }
                if let Some(v) = stats.get("reports_sent") {
                    println!("  Reports sent: {v}");
                }
                if let Some(v) = stats.get("reports_skipped") {
                    println!("  Reports skipped: {v}");
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
