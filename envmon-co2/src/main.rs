//! envmon CO2 exporter.
//!
//! Polls an MH-Z19 sensor over serial at a fixed interval, gates readings
//! through the plausibility validator, and republishes accepted values as
//! Prometheus gauges.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use envmon_co2::{metrics, mhz19, validate};
use envmon_common::{HttpState, LogConfig, Readiness, init_logging, start_server};
use tracing::{debug, info, warn};

/// Default serial device for the sensor.
const DEFAULT_SERIAL: &str = "/dev/tty.usbserial";

/// Baud rate the MH-Z19 talks at.
const BAUD_RATE: u32 = 9600;

/// Per-read timeout on the serial port.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "envmon-co2")]
#[command(author, version, about = "MH-Z19 CO2 Prometheus exporter")]
struct Cli {
    /// Serial device the sensor is attached to
    #[arg(short = 's', long, default_value = DEFAULT_SERIAL)]
    serial_port: String,

    /// Port for the HTTP metrics endpoint
    #[arg(short = 'p', long, default_value = "8001")]
    listen_port: u16,

    /// Seconds to sleep between poll cycles
    #[arg(long, default_value = "5")]
    sleep: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("info");
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    init_logging(&log_config)?;

    info!("Starting CO2 exporter...");

    if let Err(e) = metrics::register_metrics() {
        warn!("Failed to register some metrics: {}", e);
    }
    metrics::set_exporter_info(env!("CARGO_PKG_VERSION"));

    let port = serialport::new(&cli.serial_port, BAUD_RATE)
        .timeout(READ_TIMEOUT)
        .open()
        .with_context(|| format!("Failed to open serial port {}", cli.serial_port))?;
    info!("Polling {} at {} baud", cli.serial_port, BAUD_RATE);

    let readiness = Readiness::new();
    let http_state = HttpState {
        registry: metrics::REGISTRY.clone(),
        readiness: readiness.clone(),
        version: env!("CARGO_PKG_VERSION"),
        started_at: Instant::now(),
        pid: std::process::id(),
    };
    let _http_handle = start_server(cli.listen_port, http_state).await;

    let shutdown = Arc::new(AtomicBool::new(false));
    let poller_flag = shutdown.clone();
    let serial_label = cli.serial_port.clone();
    let sleep = Duration::from_secs(cli.sleep);
    let mut poller = tokio::task::spawn_blocking(move || {
        poll_loop(port, &serial_label, sleep, &readiness, &poller_flag)
    });

    tokio::select! {
        result = &mut poller => {
            result.context("Poll loop task panicked")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            shutdown.store(true, Ordering::Relaxed);
            let _ = poller.await;
        }
    }

    info!("CO2 exporter stopped");
    Ok(())
}

/// Synchronous poll loop: read, validate, publish, sleep.
fn poll_loop(
    mut port: Box<dyn serialport::SerialPort>,
    serial_label: &str,
    sleep: Duration,
    readiness: &Readiness,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match mhz19::read_concentration(&mut port) {
            Ok(reading) => post_reading(serial_label, reading, readiness),
            Err(e) => {
                metrics::READ_ERRORS_TOTAL.inc();
                warn!("CO2 read failed: {}", e);
            }
        }

        debug!(seconds = sleep.as_secs(), "sleeping");
        std::thread::sleep(sleep);
    }
}

/// Publish a reading unless the validator withholds it.
fn post_reading(serial_label: &str, reading: mhz19::Reading, readiness: &Readiness) {
    info!("CO2: {} ppm, temp: {} C", reading.ppm, reading.temp);

    if let Err(reason) = validate(reading.ppm) {
        metrics::inc_rejected(reason);
        warn!("Not posting: {}", reason);
        return;
    }

    metrics::set_reading(serial_label, reading);
    readiness.set_ready();
}
