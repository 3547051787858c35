//! Peripheral drivers.
//!
//! The ADS1115 and DS3231 drivers are generic over
//! [`embedded_hal::i2c::I2c`] and run unmodified against the ESP-IDF I2C
//! driver on target or a scripted bus in tests. `hw_init` is the one-shot
//! ESP-IDF bring-up (SPI bus, SD mount) and is target-only.

pub mod ads1115;
pub mod ds3231;
pub mod hw_init;
