//! Rolling per-field aggregation of decoded readings.
//!
//! Individual frames are noisy; the exporter publishes the arithmetic mean
//! over a window of recent samples instead of instantaneous values. Each
//! field accumulates readings until the window first fills, then slides
//! forward by one sample per frame.

use std::collections::HashMap;

/// Sliding-window averager over per-field sample lists.
#[derive(Debug)]
pub struct Rollup {
    window: usize,
    samples: HashMap<&'static str, Vec<f64>>,
}

impl Rollup {
    /// Create an aggregator holding up to `window` samples per field.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            samples: HashMap::new(),
        }
    }

    /// Append one reading; returns the mean once the field's window is full.
    ///
    /// The mean covers every sample currently held, after which the list is
    /// cut back to its `window` most recent entries. A list already at
    /// exactly the window size is unchanged by the cut, so after the first
    /// fill this is a sliding window of exactly `window` samples.
    pub fn record(&mut self, field: &'static str, value: u16) -> Option<f64> {
        let samples = self.samples.entry(field).or_default();
        samples.push(f64::from(value));

        if samples.len() < self.window {
            return None;
        }

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let cut = samples.len() - self.window;
        samples.drain(..cut);
        Some(mean)
    }

    /// Number of samples currently held for a field.
    pub fn held(&self, field: &str) -> usize {
        self.samples.get(field).map_or(0, Vec::len)
    }
}
