//! Application core — pure domain logic, zero I/O.
//!
//! The sampling scheduler, parked-state gate, and day-file writer live
//! behind the **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals, an SD card, or a broker.

pub mod events;
pub mod ports;
pub mod service;
