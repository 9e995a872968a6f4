//! BME680 exporter internals.

#![forbid(unsafe_code)]

pub mod metrics;
pub mod poll;
pub mod sensor;

pub use sensor::{GasSample, GasSensor};
