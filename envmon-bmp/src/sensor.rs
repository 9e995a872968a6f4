//! BMP280 sampling behind an opaque sensor seam.
//!
//! The driver crate hands back pressure and temperature; the altitude
//! gauge is derived here from pressure, so it stays daemon logic and gets
//! tested without a bus.

use anyhow::Result;

/// Sea-level reference pressure for the altitude conversion, in Pa.
pub const SEA_LEVEL_PA: f64 = 101_325.0;

/// One reading from the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaroSample {
    /// Barometric pressure in Pa.
    pub pressure_pa: f64,
    /// Temperature in degrees C.
    pub temperature: f64,
}

/// A barometric pressure sensor the daemon can poll.
pub trait BaroSensor {
    /// Take one measurement.
    fn sample(&mut self) -> Result<BaroSample>;
}

/// Altitude above the sea-level reference, in meters, via the
/// international barometric formula.
pub fn altitude_m(pressure_pa: f64) -> f64 {
    44_330.0 * (1.0 - (pressure_pa / SEA_LEVEL_PA).powf(1.0 / 5.255))
}

#[cfg(feature = "hardware")]
pub mod hardware {
    //! I2C-attached BMP280 in normal power mode with the oversampling the
    //! exporter has always run: temperature 2x, pressure 16x.

    use anyhow::{Context, Result, anyhow};
    use bmp280_ehal::{BMP280, Control, Oversampling, PowerMode};
    use linux_embedded_hal::I2cdev;

    use super::{BaroSample, BaroSensor};

    pub struct I2cBmp280 {
        dev: BMP280<I2cdev>,
    }

    impl I2cBmp280 {
        /// Open the sensor on an I2C bus and start continuous measurement.
        pub fn open(bus: &str) -> Result<Self> {
            let i2c = I2cdev::new(bus).with_context(|| format!("Failed to open I2C bus {bus}"))?;
            let mut dev = BMP280::new(i2c).map_err(|e| anyhow!("BMP280 init failed: {e:?}"))?;
            dev.set_control(Control {
                osrs_t: Oversampling::x2,
                osrs_p: Oversampling::x16,
                mode: PowerMode::Normal,
            });
            Ok(Self { dev })
        }
    }

    impl BaroSensor for I2cBmp280 {
        fn sample(&mut self) -> Result<BaroSample> {
            let pressure_pa = self.dev.pressure();
            let temperature = self.dev.temp();
            Ok(BaroSample {
                pressure_pa,
                temperature,
            })
        }
    }
}
