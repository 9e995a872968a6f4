//! envmon - Common Library
//!
//! Shared logging, readiness, and metrics-endpoint plumbing used by the
//! envmon sensor exporter daemons.

#![forbid(unsafe_code)]

pub mod http;
pub mod logging;
pub mod readiness;

pub use http::{HttpState, create_router, start_server};
pub use logging::{LogConfig, LogFormat, init_logging};
pub use readiness::Readiness;
