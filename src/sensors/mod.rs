//! Analog front end: the calibrated view over the ADS1115.
//!
//! Conversion math lives in [`shunt`] and [`battery`]; this module wires
//! it to the ADC driver behind [`AnalogPort`]. A failed conversion holds
//! the previous good value — no retry and no error path on the hot loop,
//! matching the "a bad read is a stale read" policy of the original
//! installation.

pub mod battery;
pub mod shunt;

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::AnalogPort;
use crate::config::SystemConfig;
use crate::drivers::ads1115::{Ads1115, Gain};

pub struct AnalogFrontEnd<I2C> {
    adc: Ads1115<I2C>,
    shunt_gain: Gain,
    shunt_rating_amps: f32,
    voltage_offset_v: f32,
    last_amps: f32,
    last_volts: f32,
}

impl<I2C: I2c> AnalogFrontEnd<I2C> {
    pub fn new(adc: Ads1115<I2C>, config: &SystemConfig) -> Self {
        Self {
            adc,
            shunt_gain: config.adc_gain,
            shunt_rating_amps: config.shunt_rating_amps,
            voltage_offset_v: config.voltage_offset_v,
            last_amps: 0.0,
            last_volts: 0.0,
        }
    }
}

impl<I2C: I2c> AnalogPort for AnalogFrontEnd<I2C> {
    fn read_current(&mut self) -> f32 {
        match self.adc.read_differential_a0_a1(self.shunt_gain) {
            Ok(raw) => {
                self.last_amps =
                    shunt::raw_to_amps(raw, self.shunt_gain.lsb_mv(), self.shunt_rating_amps);
            }
            Err(_) => warn!("Shunt read failed, holding {:.3} A", self.last_amps),
        }
        self.last_amps
    }

    fn read_voltage(&mut self) -> f32 {
        // The divider needs the full input range, so the voltage channel
        // always reads at 2/3x regardless of the shunt gain.
        match self.adc.read_single_a3(Gain::TwoThirds) {
            Ok(raw) => self.last_volts = battery::raw_to_volts(raw, self.voltage_offset_v),
            Err(_) => warn!("Battery read failed, holding {:.1} V", self.last_volts),
        }
        self.last_volts
    }
}
