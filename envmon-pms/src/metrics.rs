//! Prometheus metrics for the particulate-matter exporter.

use anyhow::Result;
use lazy_static::lazy_static;
use prometheus::{Counter, GaugeVec, Opts, Registry};

lazy_static! {
    /// Registry for all envmon-pms metrics.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Rolling-mean particulate readings by serial port and size bin.
    pub static ref PMS: GaugeVec = GaugeVec::new(
        Opts::new("pms", "PM Sensor ug/m3"),
        &["serial_port", "size"]
    ).expect("Failed to create PMS metric");

    /// Exporter version info (always 1, with version label).
    pub static ref EXPORTER_INFO: GaugeVec = GaugeVec::new(
        Opts::new("pms_exporter_info", "Exporter version info (always 1)"),
        &["version"]
    ).expect("Failed to create EXPORTER_INFO metric");

    /// Frames decoded since startup.
    pub static ref FRAMES_TOTAL: Counter = Counter::new(
        "pms_frames_total", "Frames decoded since startup"
    ).expect("Failed to create FRAMES_TOTAL metric");

    /// Serial read failures since startup.
    pub static ref READ_ERRORS_TOTAL: Counter = Counter::new(
        "pms_read_errors_total", "Serial read failures since startup"
    ).expect("Failed to create READ_ERRORS_TOTAL metric");
}

/// Register all metrics with the exporter registry.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(PMS.clone()))?;
    REGISTRY.register(Box::new(EXPORTER_INFO.clone()))?;
    REGISTRY.register(Box::new(FRAMES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READ_ERRORS_TOTAL.clone()))?;
    Ok(())
}

/// Publish one rolling mean for a size bin.
pub fn set_reading(serial_port: &str, size: &str, value: f64) {
    PMS.with_label_values(&[serial_port, size]).set(value);
}

/// Set the exporter info metric.
pub fn set_exporter_info(version: &str) {
    EXPORTER_INFO.with_label_values(&[version]).set(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_set() {
        register_metrics().expect("metrics should register once");
        set_exporter_info("test");
        set_reading("/dev/ttyUSB9", "pm2.5", 12.5);

        let families = REGISTRY.gather();
        let names: Vec<_> = families.iter().map(|f| f.get_name()).collect();
        assert!(names.contains(&"pms"));
        assert!(names.contains(&"pms_exporter_info"));
    }
}
