//! envmon particulate-matter exporter.
//!
//! Synchronizes to the sensor's wire frames on a serial port, smooths each
//! size bin over a rolling window, and republishes the means as Prometheus
//! gauges.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use envmon_common::{HttpState, LogConfig, Readiness, init_logging, start_server};
use envmon_pms::{frame, metrics, rollup};
use tracing::{debug, info, warn};

/// Default serial device for the sensor.
const DEFAULT_SERIAL: &str = "/dev/cu.usbserial";

/// Baud rate the PMS family talks at.
const BAUD_RATE: u32 = 9600;

/// Per-read timeout on the serial port.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "envmon-pms")]
#[command(author, version, about = "Particulate-matter Prometheus exporter")]
struct Cli {
    /// Serial device the sensor is attached to
    #[arg(short = 's', long, default_value = DEFAULT_SERIAL)]
    serial_port: String,

    /// Port for the HTTP metrics endpoint
    #[arg(short = 'p', long, default_value = "8002")]
    listen_port: u16,

    /// Rolling window size per size bin
    #[arg(short = 'm', long, default_value = "60")]
    samples: usize,

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

    info!("Starting particulate-matter exporter...");

    if let Err(e) = metrics::register_metrics() {
        warn!("Failed to register some metrics: {}", e);
    }
    metrics::set_exporter_info(env!("CARGO_PKG_VERSION"));

    let port = serialport::new(&cli.serial_port, BAUD_RATE)
        .timeout(READ_TIMEOUT)
        .open()
        .with_context(|| format!("Failed to open serial port {}", cli.serial_port))?;
    info!("Reading frames from {} at {} baud", cli.serial_port, BAUD_RATE);

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
    let reader_flag = shutdown.clone();
    let serial_label = cli.serial_port.clone();
    let samples = cli.samples;
    let mut reader = tokio::task::spawn_blocking(move || {
        read_loop(port, &serial_label, samples, &readiness, &reader_flag)
    });

    tokio::select! {
        result = &mut reader => {
            result.context("Frame reader task panicked")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            shutdown.store(true, Ordering::Relaxed);
            let _ = reader.await;
        }
    }

    info!("Particulate-matter exporter stopped");
    Ok(())
}

/// Synchronous frame loop: sync, decode, aggregate, publish.
///
/// There is no sleep between iterations; frame arrival is paced by the
/// device. The shutdown flag is checked at each iteration boundary, so the
/// loop exits within one transport timeout of a shutdown request.
fn read_loop(
    mut port: Box<dyn serialport::SerialPort>,
    serial_label: &str,
    samples: usize,
    readiness: &Readiness,
    shutdown: &AtomicBool,
) {
    let mut rollup = rollup::Rollup::new(samples);

    while !shutdown.load(Ordering::Relaxed) {
        let frame = match frame::read_frame(&mut port) {
            Ok(frame) => frame,
            Err(e) => {
                metrics::READ_ERRORS_TOTAL.inc();
                warn!("Serial read failed: {}", e);
                continue;
            }
        };

        metrics::FRAMES_TOTAL.inc();
        for (size, count) in frame.fields() {
            debug!(size, count, "decoded reading");
            if let Some(mean) = rollup.record(size, count) {
                debug!(size, mean, "publishing rolling mean");
                metrics::set_reading(serial_label, size, mean);
                readiness.set_ready();
            }
        }
    }
}
