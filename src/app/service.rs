//! Sampling scheduler — the application core.
//!
//! [`SamplerService`] owns the minute-batch state machine and the parked
//! gate, and drives one acquisition per wall-clock second:
//!
//! ```text
//!  ClockPort ──▶ ┌──────────────────────────┐ ──▶ StoragePort (day-files)
//! AnalogPort ──▶ │      SamplerService      │ ──▶ RelayPort   (MQTT)
//!   LinkPort ──▶ │  slot 0..59 · gate       │ ──▶ EventSink   (status)
//!                └──────────────────────────┘
//! ```
//!
//! The cadence is drift-correcting relative to processing time: a tick
//! fires once at least `sample_interval_ms` have elapsed since the
//! *previous* tick fired, so a slow SD write delays the phase but does not
//! accumulate lag. Log writes and publishes are independent failure
//! domains; neither can stall the other or the cadence itself.

use log::{info, warn};

use crate::clock::CalendarTime;
use crate::config::SystemConfig;
use crate::error::CommsError;
use crate::gate::{ConnectivityGate, ConnectivityState};
use crate::logwriter::{self, MeasureKind, SLOTS_PER_BATCH};
use crate::relay;

use super::events::{AppEvent, SampleRecord};
use super::ports::{AnalogPort, ClockPort, EventSink, LinkPort, RelayPort, StoragePort};

/// The sampling scheduler. All mutable loop state lives here — there are
/// no process-wide globals.
pub struct SamplerService {
    interval_ms: u64,
    /// Position within the current minute batch, 0–59.
    slot: u8,
    /// Completed minute batches since startup.
    batch_count: u64,
    /// Total samples acquired since startup.
    sample_count: u64,
    /// Monotonic time the previous sample fired, `None` before the first.
    last_sample_ms: Option<u64>,
    gate: ConnectivityGate,
}

impl SamplerService {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            interval_ms: u64::from(config.sample_interval_ms),
            slot: 0,
            batch_count: 0,
            sample_count: 0,
            last_sample_ms: None,
            gate: ConnectivityGate::new(config),
        }
    }

    /// Announce startup through the sink.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!("Sampler started ({} ms cadence)", self.interval_ms);
    }

    // ── Cadence ───────────────────────────────────────────────

    /// Poll the scheduler with the current monotonic time. Acquires one
    /// sample when the interval has elapsed; returns whether it fired.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl AnalogPort + ClockPort),
        storage: &mut impl StoragePort,
        net: &mut (impl LinkPort + RelayPort),
        sink: &mut impl EventSink,
    ) -> bool {
        let due = match self.last_sample_ms {
            None => true,
            Some(prev) => now_ms.wrapping_sub(prev) >= self.interval_ms,
        };
        if !due {
            return false;
        }
        self.last_sample_ms = Some(now_ms);
        self.acquire(hw, storage, net, sink);
        true
    }

    // ── One acquisition ───────────────────────────────────────

    fn acquire(
        &mut self,
        hw: &mut (impl AnalogPort + ClockPort),
        storage: &mut impl StoragePort,
        net: &mut (impl LinkPort + RelayPort),
        sink: &mut impl EventSink,
    ) {
        let timestamp = hw.now();
        let amps = hw.read_current();
        let volts = hw.read_voltage();
        self.sample_count += 1;

        let state = self.gate.update(amps, net.is_connected());
        let slot = self.slot;

        if timestamp.is_valid() {
            self.log_both(storage, net, amps, volts, slot, &timestamp, &state, sink);
        } else {
            // RTC not set: skip logging for this sample, keep sampling.
            warn!("Sample {} dropped from log: {}", self.sample_count, timestamp);
            sink.emit(&AppEvent::Fault {
                kind: None,
                error: crate::ClockError::InvalidDate.into(),
            });
        }

        if state.uplink_available && timestamp.is_valid() {
            self.publish_both(net, amps, volts, &timestamp, sink);
        }

        sink.emit(&AppEvent::SampleTaken(SampleRecord {
            amps,
            volts,
            slot,
            timestamp,
            parked: state.is_parked,
        }));

        self.slot += 1;
        if self.slot >= SLOTS_PER_BATCH {
            self.slot = 0;
            self.batch_count += 1;
            sink.emit(&AppEvent::BatchComplete {
                batch: self.batch_count,
                parked: state.is_parked,
            });
            if timestamp.is_valid() {
                self.close_batch(storage, net, &state, &timestamp, sink);
            }
        }
    }

    /// Two independent day-file writes. A fault on one channel never
    /// blocks the other, and neither reverts: there is no cross-file
    /// transaction (a crash between them is an accepted inconsistency).
    #[allow(clippy::too_many_arguments)]
    fn log_both(
        &mut self,
        storage: &mut impl StoragePort,
        net: &mut (impl LinkPort + RelayPort),
        amps: f32,
        volts: f32,
        slot: u8,
        timestamp: &CalendarTime,
        state: &ConnectivityState,
        sink: &mut impl EventSink,
    ) {
        for (kind, value) in [
            (MeasureKind::Current, amps),
            (MeasureKind::Voltage, volts),
        ] {
            if let Err(error) = logwriter::write_sample(storage, kind, value, slot, timestamp) {
                warn!("{:?} write failed at slot {}: {}", kind, slot, error);
                sink.emit(&AppEvent::Fault {
                    kind: Some(kind),
                    error,
                });
                // Best-effort: surface the storage fault on the error
                // topic while an uplink happens to exist.
                if state.uplink_available {
                    let payload =
                        relay::status_json("logwriter", "day-file write failed", "error", timestamp);
                    let _ = net.publish(relay::topics::ERROR, &payload);
                }
            }
        }
    }

    /// Publish both measurements. The relay adapter owns the bounded
    /// retry; an exhausted publish is dropped, never queued.
    fn publish_both(
        &mut self,
        net: &mut (impl LinkPort + RelayPort),
        amps: f32,
        volts: f32,
        timestamp: &CalendarTime,
        sink: &mut impl EventSink,
    ) {
        for (kind, value) in [
            (MeasureKind::Current, amps),
            (MeasureKind::Voltage, volts),
        ] {
            let payload = relay::measurement_json(kind, value, timestamp);
            if !net.publish(relay::topic_for(kind), &payload) {
                sink.emit(&AppEvent::Fault {
                    kind: Some(kind),
                    error: CommsError::MqttPublishFailed.into(),
                });
            }
        }
    }

    /// End-of-batch bookkeeping: day-file health check plus a status
    /// message when the uplink is up.
    fn close_batch(
        &mut self,
        storage: &mut impl StoragePort,
        net: &mut (impl LinkPort + RelayPort),
        state: &ConnectivityState,
        timestamp: &CalendarTime,
        sink: &mut impl EventSink,
    ) {
        for kind in [MeasureKind::Current, MeasureKind::Voltage] {
            if let Err(error) = logwriter::verify_day_file(storage, kind, timestamp) {
                warn!("{:?} day-file failed verification: {}", kind, error);
                sink.emit(&AppEvent::Fault {
                    kind: Some(kind),
                    error,
                });
            }
        }
        if state.uplink_available {
            let payload = relay::status_json("sampler", "minute batch complete", "ok", timestamp);
            let _ = net.publish(relay::topics::STATUS, &payload);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Next slot to be written, 0–59.
    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Completed minute batches since startup.
    pub fn batches_completed(&self) -> u64 {
        self.batch_count
    }

    /// Total samples acquired since startup.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Debounced parked state (for the binary's link-pacing decision).
    pub fn is_parked(&self) -> bool {
        self.gate.is_parked()
    }

    /// Gate snapshot folded with the given link answer.
    pub fn connectivity(&self, link_up: bool) -> ConnectivityState {
        self.gate.state(link_up)
    }
}
