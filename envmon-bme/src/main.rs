//! envmon BME680 exporter.
//!
//! Polls a BME680 over I2C at a fixed interval once the gas heater has
//! stabilized, and republishes temperature, pressure, humidity, and gas
//! resistance as Prometheus gauges.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use envmon_bme::poll::{WARMUP_SLEEP, poll_loop};
use envmon_bme::{GasSensor, metrics};
use envmon_common::{HttpState, LogConfig, Readiness, init_logging, start_server};
use tracing::{info, warn};

/// Default I2C bus device.
const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

#[derive(Parser)]
#[command(name = "envmon-bme")]
#[command(author, version, about = "BME680 environmental Prometheus exporter")]
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

    info!("Starting BME680 exporter...");

    if let Err(e) = metrics::register_metrics() {
        warn!("Failed to register some metrics: {}", e);
    }
    metrics::set_exporter_info(env!("CARGO_PKG_VERSION"));

    let mut sensor = open_sensor(&cli.i2c_bus)
        .with_context(|| format!("Failed to open BME680 on {}", cli.i2c_bus))?;
    info!("Polling BME680 on {}", cli.i2c_bus);

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
        poll_loop(
            sensor.as_mut(),
            sleep,
            WARMUP_SLEEP,
            &readiness,
            &poller_flag,
        )
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

    info!("BME680 exporter stopped");
    Ok(())
}

#[cfg(feature = "hardware")]
fn open_sensor(bus: &str) -> Result<Box<dyn GasSensor + Send>> {
    Ok(Box::new(envmon_bme::sensor::hardware::I2cBme680::open(
        bus,
    )?))
}

#[cfg(not(feature = "hardware"))]
fn open_sensor(_bus: &str) -> Result<Box<dyn GasSensor + Send>> {
    anyhow::bail!("built without BME680 support; rebuild with --features hardware")
}
