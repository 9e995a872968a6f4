//! CO2 exporter internals.
//!
//! The binary drives a real serial port; the library form exists so the
//! sensor protocol and the publication gate are testable against in-memory
//! transports.

#![forbid(unsafe_code)]

pub mod metrics;
pub mod mhz19;
pub mod validate;

pub use mhz19::Reading;
pub use validate::{RejectedReading, validate};
