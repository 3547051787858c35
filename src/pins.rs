//! Board pin assignments (Wemos Lolin32).

#![allow(dead_code)]

/// I2C bus shared by the ADS1115 ADC and the DS3231 RTC.
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;

/// SPI bus for the SD-card reader.
pub const SD_MOSI_GPIO: i32 = 23;
pub const SD_MISO_GPIO: i32 = 19;
pub const SD_SCLK_GPIO: i32 = 18;
pub const SD_CS_GPIO: i32 = 5;

/// 7-bit I2C addresses.
pub const ADS1115_ADDR: u8 = 0x48;
pub const DS3231_ADDR: u8 = 0x68;
