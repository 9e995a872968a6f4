//! Warm-up handling and the gauge-publication step.
//!
//! The gas resistance reading is meaningless until the sensor's heater
//! stabilizes, and the sensor reports fixed warm-up sentinels in the
//! meantime, so publication is held back until the first heat-stable
//! sample. After that every sample publishes, heater glitches included;
//! operators watch the gas gauge itself for those.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use envmon_common::Readiness;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::sensor::{GasSample, GasSensor};

/// Sleep between warm-up attempts.
pub const WARMUP_SLEEP: Duration = Duration::from_secs(1);

/// Synchronous poll loop: wait for heat-stable, then read and publish at
/// a fixed cadence until shutdown.
pub fn poll_loop(
    sensor: &mut dyn GasSensor,
    sleep: Duration,
    warmup_sleep: Duration,
    readiness: &Readiness,
    shutdown: &AtomicBool,
) {
    let mut warmed_up = false;

    while !shutdown.load(Ordering::Relaxed) {
        match sensor.sample() {
            Ok(sample) if !warmed_up && !sample.heat_stable => {
                info!("sensor not ready, sleeping 1...");
                std::thread::sleep(warmup_sleep);
                continue;
            }
            Ok(sample) => {
                warmed_up = true;
                post_sample(&sample);
                readiness.set_ready();
            }
            Err(e) => {
                metrics::READ_ERRORS_TOTAL.inc();
                warn!("BME680 read failed: {}", e);
            }
        }

        debug!(seconds = sleep.as_secs(), "sleeping");
        std::thread::sleep(sleep);
    }
}

/// Set all four gauges from one sample.
pub fn post_sample(sample: &GasSample) {
    debug!(
        temperature = f64::from(sample.temperature),
        pressure = f64::from(sample.pressure),
        humidity = f64::from(sample.humidity),
        gas_resistance = sample.gas_resistance,
        "posting sample"
    );
    metrics::BME_TEMPERATURE.set(f64::from(sample.temperature));
    metrics::BME_PRESSURE.set(f64::from(sample.pressure));
    metrics::BME_HUMIDITY.set(f64::from(sample.humidity));
    metrics::BME_GAS_RESISTANCE.set(f64::from(sample.gas_resistance));
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    /// Scripted sensor: replays samples, then trips the shutdown flag.
    struct ScriptedSensor {
        script: VecDeque<anyhow::Result<GasSample>>,
        taken: usize,
        shutdown: Arc<AtomicBool>,
    }

    impl GasSensor for ScriptedSensor {
        fn sample(&mut self) -> anyhow::Result<GasSample> {
            match self.script.pop_front() {
                Some(result) => {
                    self.taken += 1;
                    result
                }
                None => {
                    self.shutdown.store(true, Ordering::Relaxed);
                    Err(anyhow!("script exhausted"))
                }
            }
        }
    }

    fn warming(temperature: f32) -> GasSample {
        GasSample {
            temperature,
            pressure: 1000.0,
            humidity: 40.0,
            gas_resistance: 0,
            heat_stable: false,
        }
    }

    fn stable(temperature: f32) -> GasSample {
        GasSample {
            gas_resistance: 120_000,
            heat_stable: true,
            ..warming(temperature)
        }
    }

    #[test]
    fn test_holds_publication_until_heat_stable() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut sensor = ScriptedSensor {
            script: VecDeque::from([
                Ok(warming(19.0)),
                Ok(warming(20.0)),
                Ok(stable(21.5)),
            ]),
            taken: 0,
            shutdown: shutdown.clone(),
        };
        let readiness = Readiness::new();

        poll_loop(
            &mut sensor,
            Duration::from_millis(1),
            Duration::from_millis(1),
            &readiness,
            &shutdown,
        );

        assert_eq!(sensor.taken, 3);
        assert!(readiness.is_ready());
        assert!((metrics::BME_TEMPERATURE.get() - 21.5).abs() < 1e-6);
        assert!((metrics::BME_GAS_RESISTANCE.get() - 120_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_read_errors_do_not_mark_ready() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut sensor = ScriptedSensor {
            script: VecDeque::from([Err(anyhow!("bus glitch"))]),
            taken: 0,
            shutdown: shutdown.clone(),
        };
        let readiness = Readiness::new();

        poll_loop(
            &mut sensor,
            Duration::from_millis(1),
            Duration::from_millis(1),
            &readiness,
            &shutdown,
        );

        assert!(!readiness.is_ready());
        assert!(metrics::READ_ERRORS_TOTAL.get() >= 1.0);
    }
}
