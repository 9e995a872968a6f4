//! BMP280 exporter internals.

#![forbid(unsafe_code)]

pub mod metrics;
pub mod sensor;

pub use sensor::{BaroSample, BaroSensor, altitude_m};
