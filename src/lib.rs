//! Leakwatch firmware library.
//!
//! Battery current/voltage data logger for a vehicle leakage-current
//! investigation: samples an ADS1115 once per second, timestamps with a
//! DS3231 RTC, appends per-day text files on the SD card, and relays
//! samples over MQTT while the vehicle is parked.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod clock;
pub mod config;
pub mod gate;
pub mod logwriter;
pub mod relay;

mod error;
pub mod pins;

pub use error::{ClockError, CommsError, Error, StorageError};

// Re-export the ESP-IDF-facing modules so the crate compiles everywhere;
// hardware-only paths are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
pub mod sensors;
