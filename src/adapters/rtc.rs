//! Clock adapters.
//!
//! [`RtcClock`] wraps the DS3231 behind [`ClockPort`]; a failed bus read
//! answers with an epoch-era time, which the sampler then classifies as
//! clock-invalid and skips — no partial records out of a half-read RTC.
//! [`SystemClock`] backs bench runs from the host's wall clock.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::ClockPort;
use crate::clock::CalendarTime;
use crate::drivers::ds3231::Ds3231;

pub struct RtcClock<I2C> {
    rtc: Ds3231<I2C>,
}

impl<I2C: I2c> RtcClock<I2C> {
    pub fn new(rtc: Ds3231<I2C>) -> Self {
        Self { rtc }
    }
}

impl<I2C: I2c> ClockPort for RtcClock<I2C> {
    fn now(&mut self) -> CalendarTime {
        match self.rtc.now() {
            Ok(t) => t,
            Err(_) => {
                warn!("RTC read failed");
                CalendarTime::from_unix(0)
            }
        }
    }
}

/// Host wall clock, for running the sampler off-target.
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&mut self) -> CalendarTime {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        CalendarTime::from_unix(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    struct DeadBus;

    impl ErrorType for DeadBus {
        type Error = ErrorKind;
    }

    impl I2c for DeadBus {
        fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            Err(ErrorKind::Bus)
        }
    }

    #[test]
    fn dead_rtc_reports_invalid_time() {
        let mut clock = RtcClock::new(Ds3231::new(DeadBus, 0x68));
        assert!(!clock.now().is_valid());
    }

    #[test]
    fn system_clock_is_valid() {
        assert!(SystemClock.now().is_valid());
    }
}
