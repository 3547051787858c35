//! Calendar time as reported by the RTC.
//!
//! The logger only ever needs a broken-down civil timestamp: the date
//! selects the day-file, the time-of-day heads each minute line. A DS3231
//! that has lost its backup battery resets to 2000-01-01 minus a century,
//! so any pre-2000 date is treated as "clock not set".

use core::fmt::{self, Write as _};

/// Year below which a timestamp is considered unusable for logging.
pub const MIN_VALID_YEAR: u16 = 2000;

/// A broken-down civil timestamp (no timezone, no sub-second part).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CalendarTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Whether this timestamp may be used for logging.
    pub fn is_valid(&self) -> bool {
        self.year >= MIN_VALID_YEAR
    }

    /// ISO date, `YYYY-MM-DD`. Selects the day-file.
    pub fn date_string(&self) -> heapless::String<10> {
        let mut s = heapless::String::new();
        let _ = write!(s, "{:04}-{:02}-{:02}", self.year, self.month, self.day);
        s
    }

    /// Time of day, `HH:MM:SS`. Heads each minute line in the log.
    pub fn time_string(&self) -> heapless::String<8> {
        let mut s = heapless::String::new();
        let _ = write!(s, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
        s
    }

    /// Full timestamp, `YYYY-MM-DD HH:MM:SS`, used in MQTT payloads.
    pub fn timestamp_string(&self) -> heapless::String<19> {
        let mut s = heapless::String::new();
        let _ = write!(
            s,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        );
        s
    }

    /// Convert a unix timestamp (seconds, UTC) to civil time.
    ///
    /// Days-to-civil conversion after Howard Hinnant's algorithm; exact
    /// over the full range the RTC can represent.
    pub fn from_unix(secs: i64) -> Self {
        let days = secs.div_euclid(86_400);
        let rem = secs.rem_euclid(86_400);

        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z - era * 146_097; // [0, 146096]
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
        let y = yoe + era * 400;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
        let mp = (5 * doy + 2) / 153; // [0, 11]
        let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
        let m = if mp < 10 { mp + 3 } else { mp - 9 }; // [1, 12]
        let year = if m <= 2 { y + 1 } else { y };

        Self {
            year: year as u16,
            month: m as u8,
            day: d as u8,
            hour: (rem / 3600) as u8,
            minute: ((rem % 3600) / 60) as u8,
            second: (rem % 60) as u8,
        }
    }
}

impl fmt::Display for CalendarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
