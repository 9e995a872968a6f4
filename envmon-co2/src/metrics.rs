//! Prometheus metrics for the CO2 exporter.

use anyhow::Result;
use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, GaugeVec, Opts, Registry};

use crate::Reading;
use crate::validate::RejectedReading;

lazy_static! {
    /// Registry for all envmon-co2 metrics.
    pub static ref REGISTRY: Registry = Registry::new();

    /// CO2 concentration by serial port.
    pub static ref CO2_PPM: GaugeVec = GaugeVec::new(
        Opts::new("co2_ppm", "CO2 concentration in PPM"),
        &["serial_port"]
    ).expect("Failed to create CO2_PPM metric");

    /// Sensor die temperature by serial port.
    pub static ref CO2_TEMP: GaugeVec = GaugeVec::new(
        Opts::new("co2_temp", "CO2 sensor temp in C"),
        &["serial_port"]
    ).expect("Failed to create CO2_TEMP metric");

    /// Exporter version info (always 1, with version label).
    pub static ref EXPORTER_INFO: GaugeVec = GaugeVec::new(
        Opts::new("co2_exporter_info", "Exporter version info (always 1)"),
        &["version"]
    ).expect("Failed to create EXPORTER_INFO metric");

    /// Readings withheld from publication, by reason.
    pub static ref REJECTED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("co2_rejected_total", "Readings withheld from publication"),
        &["reason"]
    ).expect("Failed to create REJECTED_TOTAL metric");

    /// Serial read failures since startup.
    pub static ref READ_ERRORS_TOTAL: Counter = Counter::new(
        "co2_read_errors_total", "Serial read failures since startup"
    ).expect("Failed to create READ_ERRORS_TOTAL metric");
}

/// Register all metrics with the exporter registry.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(CO2_PPM.clone()))?;
    REGISTRY.register(Box::new(CO2_TEMP.clone()))?;
    REGISTRY.register(Box::new(EXPORTER_INFO.clone()))?;
    REGISTRY.register(Box::new(REJECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READ_ERRORS_TOTAL.clone()))?;
    Ok(())
}

/// Publish one accepted reading.
pub fn set_reading(serial_port: &str, reading: Reading) {
    CO2_PPM
        .with_label_values(&[serial_port])
        .set(f64::from(reading.ppm));
    CO2_TEMP
        .with_label_values(&[serial_port])
        .set(f64::from(reading.temp));
}

/// Count one withheld reading.
pub fn inc_rejected(reason: RejectedReading) {
    REJECTED_TOTAL.with_label_values(&[reason.kind()]).inc();
}

/// Set the exporter info metric.
pub fn set_exporter_info(version: &str) {
    EXPORTER_INFO.with_label_values(&[version]).set(1.0);
}
