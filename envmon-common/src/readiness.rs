//! First-sample readiness tracking.
//!
//! A sensor exporter is not useful until it has published at least one
//! reading; until then `/ready` reports 503 so orchestration can hold
//! scrape targets back (e.g. while a gas sensor heater stabilizes).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable flag flipped once the daemon has published its first reading.
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    /// Create a new, not-yet-ready flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the daemon ready. Idempotent.
    pub fn set_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the daemon has published at least one reading.
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_transitions_once() {
        let readiness = Readiness::new();
        assert!(!readiness.is_ready());

        let shared = readiness.clone();
        shared.set_ready();
        assert!(readiness.is_ready());

        // Setting again is a no-op.
        readiness.set_ready();
        assert!(readiness.is_ready());
    }
}
