//! Telemetry relay support: topics, payload shapes, and the bounded
//! publish retry policy.
//!
//! The relay itself is an adapter behind
//! [`RelayPort`](crate::app::ports::RelayPort); this module holds the
//! transport-independent pieces so payloads and retry behavior are
//! testable without a broker.

use serde::Serialize;

use crate::clock::CalendarTime;
use crate::config::SystemConfig;
use crate::logwriter::MeasureKind;

/// Fixed MQTT topic strings.
pub mod topics {
    pub const CURRENT: &str = "leakwatch/current";
    pub const VOLTAGE: &str = "leakwatch/voltage";
    pub const STATUS: &str = "leakwatch/status";
    pub const ERROR: &str = "leakwatch/error";
    pub const LOG: &str = "leakwatch/log";
}

/// Topic a measurement of the given kind is published on.
pub const fn topic_for(kind: MeasureKind) -> &'static str {
    match kind {
        MeasureKind::Current => topics::CURRENT,
        MeasureKind::Voltage => topics::VOLTAGE,
    }
}

// ───────────────────────────────────────────────────────────────
// Payloads
// ───────────────────────────────────────────────────────────────

/// One measured value with its acquisition timestamp.
#[derive(Debug, Serialize)]
pub struct MeasurementPayload<'a> {
    pub timestamp: &'a str,
    pub value: f32,
    pub unit: &'a str,
}

/// Status / error / log message body.
#[derive(Debug, Serialize)]
pub struct StatusPayload<'a> {
    pub timestamp: &'a str,
    pub source: &'a str,
    pub message: &'a str,
    pub status: &'a str,
}

/// Serialize one measurement for its topic.
pub fn measurement_json(kind: MeasureKind, value: f32, timestamp: &CalendarTime) -> String {
    let ts = timestamp.timestamp_string();
    let payload = MeasurementPayload {
        timestamp: ts.as_str(),
        value,
        unit: kind.unit(),
    };
    serde_json::to_string(&payload).unwrap_or_default()
}

/// Serialize a status/error/log message.
pub fn status_json(
    source: &str,
    message: &str,
    status: &str,
    timestamp: &CalendarTime,
) -> String {
    let ts = timestamp.timestamp_string();
    let payload = StatusPayload {
        timestamp: ts.as_str(),
        source,
        message,
        status,
    };
    serde_json::to_string(&payload).unwrap_or_default()
}

// ───────────────────────────────────────────────────────────────
// Retry policy
// ───────────────────────────────────────────────────────────────

/// Bounded publish retry: `max_attempts` tries with a fixed backoff in
/// between, then the message is dropped. There is no outbox — a sample
/// that cannot be relayed still lives in the day-file on the card.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub backoff_ms: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            max_attempts: config.publish_max_attempts,
            backoff_ms: config.publish_backoff_ms,
        }
    }

    /// Run `attempt` until it succeeds or the attempt budget is spent.
    /// `delay` is called between attempts (not after the last one), so
    /// tests can count sleeps instead of actually sleeping.
    pub fn run(&self, mut attempt: impl FnMut() -> bool, mut delay: impl FnMut(u32)) -> bool {
        for n in 0..self.max_attempts {
            if attempt() {
                return true;
            }
            if n + 1 < self.max_attempts {
                delay(self.backoff_ms);
            }
        }
        false
    }
}
