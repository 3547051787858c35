//! Durable day-file writer.
//!
//! Appends one formatted value per call into the correct per-day,
//! per-channel text file. Each call is its own open/append/close
//! transaction — no file handle survives between samples, which is the
//! only defense this logger has against corruption on abrupt power loss.
//!
//! File layout (one file per calendar day per channel):
//!
//! ```text
//! Amps 2024-03-07.txt
//! ─────────────────────
//!
//! 14:02:00 --> 0.114, 0.117, 0.113, … , 0.115
//! 14:03:00 --> 0.116, 0.112, …
//! ```
//!
//! A minute line opens at slot 0 (newline + `HH:MM:SS --> `) and closes at
//! slot 59. A midnight rollover mid-batch therefore splits one batch's
//! line across two day-files; downstream analysis scripts expect exactly
//! that, so it is preserved, not repaired.

use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::app::ports::StoragePort;
use crate::clock::CalendarTime;
use crate::error::{ClockError, Error};

/// Samples per minute batch; also the line width in values.
pub const SLOTS_PER_BATCH: u8 = 60;

/// Highest slot index; writing it terminates the minute line.
pub const LAST_SLOT: u8 = SLOTS_PER_BATCH - 1;

/// Which measurement channel a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureKind {
    Current,
    Voltage,
}

impl MeasureKind {
    /// Day-file name prefix.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Current => "Amps",
            Self::Voltage => "Volts",
        }
    }

    /// Physical unit, for telemetry payloads.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Current => "A",
            Self::Voltage => "V",
        }
    }
}

/// Deterministic day-file name: `"<prefix> YYYY-MM-DD.txt"`.
///
/// Depends only on the channel and the calendar *date* — time-of-day never
/// changes the target file.
pub fn day_filename(kind: MeasureKind, timestamp: &CalendarTime) -> heapless::String<24> {
    let mut name = heapless::String::new();
    let _ = write!(name, "{} {}.txt", kind.prefix(), timestamp.date_string());
    name
}

/// Append one sample to its day-file.
///
/// Protocol per call:
/// 1. Skip entirely (no file touched) when the timestamp is pre-2000.
/// 2. Open in append mode, creating the file on the first write of a day.
///    An open failure gets exactly one card re-init plus one retry.
/// 3. At slot 0, start a new minute line: newline, `HH:MM:SS`, ` --> `.
/// 4. Write the value with three decimals, then `", "` (slots 0–58) or a
///    terminating newline (slot 59).
/// 5. Close unconditionally before returning.
pub fn write_sample(
    storage: &mut impl StoragePort,
    kind: MeasureKind,
    value: f32,
    slot: u8,
    timestamp: &CalendarTime,
) -> Result<(), Error> {
    debug_assert!(slot <= LAST_SLOT);

    if !timestamp.is_valid() {
        return Err(ClockError::InvalidDate.into());
    }
    let name = day_filename(kind, timestamp);

    if storage.open_append(&name).is_err() {
        // One re-init, one retry — never more, so a dead card cannot
        // stall the sampling cadence.
        storage.reinit()?;
        storage.open_append(&name)?;
    }

    let result = write_record(storage, value, slot, timestamp);
    storage.close();
    result
}

fn write_record(
    storage: &mut impl StoragePort,
    value: f32,
    slot: u8,
    timestamp: &CalendarTime,
) -> Result<(), Error> {
    let mut chunk: heapless::String<64> = heapless::String::new();
    if slot == 0 {
        let _ = write!(chunk, "\n{} --> ", timestamp.time_string());
    }
    let _ = write!(chunk, "{value:.3}");
    if slot < LAST_SLOT {
        let _ = chunk.push_str(", ");
    } else {
        let _ = chunk.push('\n');
    }
    storage.write(chunk.as_bytes())?;
    Ok(())
}

/// End-of-batch health check: the day-file written during the batch must
/// exist and be non-empty. Catches the silently-failing card that accepts
/// writes but persists nothing.
pub fn verify_day_file(
    storage: &mut impl StoragePort,
    kind: MeasureKind,
    timestamp: &CalendarTime,
) -> Result<(), Error> {
    if !timestamp.is_valid() {
        return Err(ClockError::InvalidDate.into());
    }
    let name = day_filename(kind, timestamp);
    let size = storage.file_size(&name)?;
    if size == 0 {
        return Err(crate::error::StorageError::EmptyFile.into());
    }
    Ok(())
}
