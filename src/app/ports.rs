//! Port traits — the boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SamplerService (domain)
//! ```
//!
//! Driven adapters (RTC, ADC front end, SD card, WiFi, MQTT, event sinks)
//! implement these traits. The [`SamplerService`](super::service::SamplerService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every tick can be replayed against mocks.

use crate::clock::CalendarTime;
use crate::error::StorageError;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: RTC → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source. Implementations must not block for longer than a
/// single I2C transaction; a dead RTC is reported as a pre-2000 date,
/// never as a panic.
pub trait ClockPort {
    fn now(&mut self) -> CalendarTime;
}

// ───────────────────────────────────────────────────────────────
// Analog port (driven adapter: ADC front end → domain)
// ───────────────────────────────────────────────────────────────

/// Calibrated analog readings. Both reads are one hardware conversion; a
/// failed conversion returns the previous good value (stale-value policy),
/// so the sampling cadence is never disturbed by a flaky bus.
pub trait AnalogPort {
    /// Shunt current in amperes (signed: negative while charging).
    fn read_current(&mut self) -> f32;

    /// Battery voltage in volts, rounded to one decimal.
    fn read_voltage(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ SD card)
// ───────────────────────────────────────────────────────────────

/// Single-handle file protocol for the day-file writer.
///
/// At most one file is open at a time. The writer pairs every successful
/// [`open_append`](StoragePort::open_append) with exactly one
/// [`close`](StoragePort::close) before returning, so a crash between
/// samples can never corrupt an already-closed record.
pub trait StoragePort {
    /// Open `name` for append, creating it if absent.
    fn open_append(&mut self, name: &str) -> Result<(), StorageError>;

    /// Append bytes to the currently open file.
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError>;

    /// Close the currently open file. Idempotent.
    fn close(&mut self);

    /// Re-initialize the storage backend (SD controller remount) after an
    /// open failure. Called at most once per write attempt.
    fn reinit(&mut self) -> Result<(), StorageError>;

    /// Size of `name` in bytes, for the end-of-batch health check.
    fn file_size(&mut self, name: &str) -> Result<u64, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: WiFi → domain)
// ───────────────────────────────────────────────────────────────

/// Read-only view of the network link. The domain never manages the
/// connection — association, retry pacing, and teardown belong to the
/// adapter; the gate merely asks whether an uplink currently exists.
pub trait LinkPort {
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → MQTT)
// ───────────────────────────────────────────────────────────────

/// Telemetry uplink. `publish` returns `false` after the adapter's bounded
/// retry policy is exhausted; the caller drops the message and moves on.
pub trait RelayPort {
    fn publish(&mut self, topic: &str, payload: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, MQTT
/// status topic, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
