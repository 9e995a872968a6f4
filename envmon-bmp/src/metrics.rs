//! Prometheus metrics for the BMP280 exporter.

use anyhow::Result;
use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, GaugeVec, Opts, Registry};

lazy_static! {
    /// Registry for all envmon-bmp metrics.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Barometric pressure.
    pub static ref BMP_PRESSURE: Gauge = Gauge::new(
        "bmp_pressure", "Pressure in Pa"
    ).expect("Failed to create BMP_PRESSURE metric");

    /// Altitude derived from pressure.
    pub static ref BMP_ALTITUDE: Gauge = Gauge::new(
        "bmp_altitude", "Altitude in M"
    ).expect("Failed to create BMP_ALTITUDE metric");

    /// Ambient temperature.
    pub static ref BMP_TEMPERATURE: Gauge = Gauge::new(
        "bmp_temperature", "Temperature in C"
    ).expect("Failed to create BMP_TEMPERATURE metric");

    /// Exporter version info (always 1, with version label).
    pub static ref EXPORTER_INFO: GaugeVec = GaugeVec::new(
        Opts::new("bmp_exporter_info", "Exporter version info (always 1)"),
        &["version"]
    ).expect("Failed to create EXPORTER_INFO metric");

    /// Sensor read failures since startup.
    pub static ref READ_ERRORS_TOTAL: Counter = Counter::new(
        "bmp_read_errors_total", "Sensor read failures since startup"
    ).expect("Failed to create READ_ERRORS_TOTAL metric");
}

/// Register all metrics with the exporter registry.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(BMP_PRESSURE.clone()))?;
    REGISTRY.register(Box::new(BMP_ALTITUDE.clone()))?;
    REGISTRY.register(Box::new(BMP_TEMPERATURE.clone()))?;
    REGISTRY.register(Box::new(EXPORTER_INFO.clone()))?;
    REGISTRY.register(Box::new(READ_ERRORS_TOTAL.clone()))?;
    Ok(())
}

/// Set the exporter info metric.
pub fn set_exporter_info(version: &str) {
    EXPORTER_INFO.with_label_values(&[version]).set(1.0);
}
