//! Prometheus metrics for the BME680 exporter.

use anyhow::Result;
use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, GaugeVec, Opts, Registry};

lazy_static! {
    /// Registry for all envmon-bme metrics.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Ambient temperature.
    pub static ref BME_TEMPERATURE: Gauge = Gauge::new(
        "bme_temperature", "bme_temperature in DegC"
    ).expect("Failed to create BME_TEMPERATURE metric");

    /// Barometric pressure.
    pub static ref BME_PRESSURE: Gauge = Gauge::new(
        "bme_pressure", "bme_pressure in hPa"
    ).expect("Failed to create BME_PRESSURE metric");

    /// Relative humidity.
    pub static ref BME_HUMIDITY: Gauge = Gauge::new(
        "bme_humidity", "bme_humidity in %RH"
    ).expect("Failed to create BME_HUMIDITY metric");

    /// Gas sensing resistance.
    pub static ref BME_GAS_RESISTANCE: Gauge = Gauge::new(
        "bme_gas_resistance", "bme_gas_resistance in Ohm"
    ).expect("Failed to create BME_GAS_RESISTANCE metric");

    /// Exporter version info (always 1, with version label).
    pub static ref EXPORTER_INFO: GaugeVec = GaugeVec::new(
        Opts::new("bme_exporter_info", "Exporter version info (always 1)"),
        &["version"]
    ).expect("Failed to create EXPORTER_INFO metric");

    /// Sensor read failures since startup.
    pub static ref READ_ERRORS_TOTAL: Counter = Counter::new(
        "bme_read_errors_total", "Sensor read failures since startup"
    ).expect("Failed to create READ_ERRORS_TOTAL metric");
}

/// Register all metrics with the exporter registry.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(BME_TEMPERATURE.clone()))?;
    REGISTRY.register(Box::new(BME_PRESSURE.clone()))?;
    REGISTRY.register(Box::new(BME_HUMIDITY.clone()))?;
    REGISTRY.register(Box::new(BME_GAS_RESISTANCE.clone()))?;
    REGISTRY.register(Box::new(EXPORTER_INFO.clone()))?;
    REGISTRY.register(Box::new(READ_ERRORS_TOTAL.clone()))?;
    Ok(())
}

/// Set the exporter info metric.
pub fn set_exporter_info(version: &str) {
    EXPORTER_INFO.with_label_values(&[version]).set(1.0);
}
