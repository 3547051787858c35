//! Outbound application events.
//!
//! The [`SamplerService`](super::service::SamplerService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — log to serial, publish on
//! the MQTT status topic, or record in a test.

use crate::clock::CalendarTime;
use crate::error::Error;
use crate::logwriter::MeasureKind;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy)]
pub enum AppEvent {
    /// The sampler has started.
    Started,

    /// One full sample was acquired (both channels).
    SampleTaken(SampleRecord),

    /// Slot 59 was written; a minute batch closed.
    BatchComplete {
        /// Number of completed batches since startup.
        batch: u64,
        /// Parked state at batch close (drives status reporting).
        parked: bool,
    },

    /// A non-fatal fault was raised while handling one sample.
    Fault {
        /// Which channel's pipeline raised it, if attributable.
        kind: Option<MeasureKind>,
        error: Error,
    },
}

/// A point-in-time sample of both measurement channels.
#[derive(Debug, Clone, Copy)]
pub struct SampleRecord {
    pub amps: f32,
    pub volts: f32,
    /// Position within the minute batch, 0–59.
    pub slot: u8,
    pub timestamp: CalendarTime,
    /// Debounced parked state after this sample was folded in.
    pub parked: bool,
}
