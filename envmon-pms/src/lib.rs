//! Particulate-matter exporter internals.
//!
//! The binary wires these pieces to a real serial port; the library form
//! exists so the frame protocol and aggregation logic are testable against
//! in-memory byte streams.

#![forbid(unsafe_code)]

pub mod frame;
pub mod metrics;
pub mod rollup;

pub use frame::{Frame, read_frame};
pub use rollup::Rollup;
