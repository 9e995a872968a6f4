//! BME680 sampling behind an opaque sensor seam.
//!
//! The daemon only needs "take one combined measurement"; everything
//! register-level belongs to the driver crate behind the `hardware`
//! feature. The trait keeps the poll loop testable without a bus.

use anyhow::Result;

/// One combined reading from the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasSample {
    /// Temperature in degrees C.
    pub temperature: f32,
    /// Pressure in hPa.
    pub pressure: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
    /// Gas sensing resistance in Ohm.
    pub gas_resistance: u32,
    /// Whether the gas heater had stabilized for this measurement.
    pub heat_stable: bool,
}

/// A gas/temperature/humidity/pressure sensor the daemon can poll.
pub trait GasSensor {
    /// Take one measurement.
    fn sample(&mut self) -> Result<GasSample>;
}

#[cfg(feature = "hardware")]
pub mod hardware {
    //! I2C-attached BME680 with the measurement profile the exporter has
    //! always run: 2x/4x/8x oversampling, IIR filter 3, gas heater at
    //! 320 C for 150 ms.

    use std::time::Duration;

    use anyhow::{Context, Result, anyhow};
    use bme680::{
        Bme680, I2CAddress, IIRFilterSize, OversamplingSetting, PowerMode, SettingsBuilder,
    };
    use linux_embedded_hal::{Delay, I2cdev};

    use super::{GasSample, GasSensor};

    pub struct I2cBme680 {
        dev: Bme680<I2cdev, Delay>,
        delay: Delay,
    }

    impl I2cBme680 {
        /// Open the sensor on an I2C bus and apply the measurement profile.
        pub fn open(bus: &str) -> Result<Self> {
            let i2c = I2cdev::new(bus).with_context(|| format!("Failed to open I2C bus {bus}"))?;
            let mut delay = Delay {};

            let mut dev = Bme680::init(i2c, &mut delay, I2CAddress::Secondary)
                .map_err(|e| anyhow!("BME680 init failed: {e:?}"))?;

            let settings = SettingsBuilder::new()
                .with_humidity_oversampling(OversamplingSetting::OS2x)
                .with_pressure_oversampling(OversamplingSetting::OS4x)
                .with_temperature_oversampling(OversamplingSetting::OS8x)
                .with_temperature_filter(IIRFilterSize::Size3)
                .with_gas_measurement(Duration::from_millis(150), 320, 25)
                .with_run_gas(true)
                .build();
            dev.set_sensor_settings(&mut delay, settings)
                .map_err(|e| anyhow!("BME680 settings rejected: {e:?}"))?;

            Ok(Self { dev, delay })
        }
    }

    impl GasSensor for I2cBme680 {
        fn sample(&mut self) -> Result<GasSample> {
            self.dev
                .set_sensor_mode(&mut self.delay, PowerMode::ForcedMode)
                .map_err(|e| anyhow!("BME680 trigger failed: {e:?}"))?;

            let (data, _state) = self
                .dev
                .get_sensor_data(&mut self.delay)
                .map_err(|e| anyhow!("BME680 read failed: {e:?}"))?;

            Ok(GasSample {
                temperature: data.temperature_celsius(),
                pressure: data.pressure_hpa(),
                humidity: data.humidity_percent(),
                gas_resistance: data.gas_resistance_ohm(),
                heat_stable: data.heat_stable(),
            })
        }
    }
}
