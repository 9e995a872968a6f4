//! envmon BMP280 exporter.
//!
//! Polls a BMP280 over I2C at a fixed interval and republishes pressure,
//! derived altitude, and temperature as Prometheus gauges.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use envmon_bmp::{BaroSensor, altitude_m, metrics};
use envmon_common::{HttpState, LogConfig, Readiness, init_logging, start_server};
use tracing::{debug, info, warn};

/// Default I2C bus device.
const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

#[derive(Parser)]
#[command(name = "envmon-bmp")]
#[command(author, version, about = "BMP280 barometric Prometheus exporter")]
struct Cli {
    /// I2C bus device the sensor is attached to
    #[arg(short = 'b', long, default_value = DEFAULT_I2C_BUS)]
    i2c_bus: String,

    /// Port for the HTTP metrics endpoint
    #[arg(short = 'p', long, default_value = "8003")]
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

    info!("Starting BMP280 exporter...");

    if let Err(e) = metrics::register_metrics() {
        warn!("Failed to register some metrics: {}", e);
    }
    metrics::set_exporter_info(env!("CARGO_PKG_VERSION"));

    let mut sensor = open_sensor(&cli.i2c_bus)
        .with_context(|| format!("Failed to open BMP280 on {}", cli.i2c_bus))?;
    info!("Polling BMP280 on {}", cli.i2c_bus);

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
    let sleep = Duration::from_secs(cli.sleep);
    let mut poller = tokio::task::spawn_blocking(move || {
        poll_loop(sensor.as_mut(), sleep, &readiness, &poller_flag)
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

    info!("BMP280 exporter stopped");
    Ok(())
}

/// Synchronous poll loop: read, publish, sleep.
fn poll_loop(
    sensor: &mut dyn BaroSensor,
    sleep: Duration,
    readiness: &Readiness,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match sensor.sample() {
            Ok(sample) => {
                let altitude = altitude_m(sample.pressure_pa);
                info!(
                    "BMP: pressure: {} altitude: {} temperature: {}",
                    sample.pressure_pa, altitude, sample.temperature
                );
                metrics::BMP_PRESSURE.set(sample.pressure_pa);
                metrics::BMP_ALTITUDE.set(altitude);
                metrics::BMP_TEMPERATURE.set(sample.temperature);
                readiness.set_ready();
            }
            Err(e) => {
                metrics::READ_ERRORS_TOTAL.inc();
                warn!("BMP280 read failed: {}", e);
            }
        }

        debug!(seconds = sleep.as_secs(), "sleeping");
        std::thread::sleep(sleep);
    }
}

#[cfg(feature = "hardware")]
fn open_sensor(bus: &str) -> Result<Box<dyn BaroSensor + Send>> {
    Ok(Box::new(envmon_bmp::sensor::hardware::I2cBmp280::open(
        bus,
    )?))
}

#[cfg(not(feature = "hardware"))]
fn open_sensor(_bus: &str) -> Result<Box<dyn BaroSensor + Send>> {
    anyhow::bail!("built without BMP280 support; rebuild with --features hardware")
}
