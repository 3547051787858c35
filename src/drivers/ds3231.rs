//! DS3231 real-time clock.
//!
//! Reads the seven timekeeping registers in one burst and decodes the BCD
//! fields into a [`CalendarTime`]. The clock is assumed to run in 24-hour
//! mode (it is configured that way once, on the bench). Generic over
//! [`embedded_hal::i2c::I2c`].

use embedded_hal::i2c::I2c;

use crate::clock::CalendarTime;

/// First timekeeping register (seconds).
const REG_SECONDS: u8 = 0x00;

/// Century flag in the month register: set when the year counter wrapped
/// past 2099.
const MONTH_CENTURY_BIT: u8 = 0x80;

pub struct Ds3231<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Read the current time. An I2C failure propagates; the caller maps
    /// it to an invalid (pre-2000) timestamp.
    pub fn now(&mut self) -> Result<CalendarTime, I2C::Error> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(self.address, &[REG_SECONDS], &mut regs)?;
        Ok(decode_registers(&regs))
    }
}

/// Decode the DS3231 register block (seconds, minutes, hours, weekday,
/// date, month, year) into civil time.
pub fn decode_registers(regs: &[u8; 7]) -> CalendarTime {
    let second = bcd_to_dec(regs[0] & 0x7F);
    let minute = bcd_to_dec(regs[1] & 0x7F);
    let hour = bcd_to_dec(regs[2] & 0x3F); // 24-hour mode
    let day = bcd_to_dec(regs[4] & 0x3F);
    let month = bcd_to_dec(regs[5] & 0x1F);
    let century = if regs[5] & MONTH_CENTURY_BIT != 0 { 100 } else { 0 };
    let year = 2000 + u16::from(bcd_to_dec(regs[6])) + century;

    CalendarTime::new(year, month, day, hour, minute, second)
}

const fn bcd_to_dec(b: u8) -> u8 {
    (b >> 4) * 10 + (b & 0x0F)
}
