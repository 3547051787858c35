//! System configuration parameters
//!
//! All tunable parameters for the logger. These are fixed at build time
//! today; the struct exists so the sampler, gate, and relay can be wired
//! with alternative values in tests without touching global state.

use serde::{Deserialize, Serialize};

use crate::drivers::ads1115::Gain;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Current shunt ---
    /// Shunt rating in amps per 75 mV drop (stamped on the shunt body).
    pub shunt_rating_amps: f32,
    /// ADS1115 gain used for the differential shunt reading.
    pub adc_gain: Gain,

    // --- Battery voltage ---
    /// Calibration offset added after the divider correction (volts).
    pub voltage_offset_v: f32,

    // --- Parked heuristic ---
    /// Current magnitude (A) below which the vehicle may be parked.
    pub parked_current_threshold_a: f32,
    /// Consecutive below-threshold seconds required to confirm parked.
    pub parked_confirmation_secs: u32,

    // --- Timing ---
    /// Sampling cadence (milliseconds between samples).
    pub sample_interval_ms: u32,
    /// Minimum seconds between WiFi reconnect attempts.
    pub wifi_retry_interval_secs: u32,

    // --- Uplink ---
    /// Maximum publish attempts per message before giving up.
    pub publish_max_attempts: u8,
    /// Fixed delay between publish attempts (milliseconds).
    pub publish_backoff_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Shunt: 50 A / 75 mV, read at 16x gain (+/- 256 mV full scale)
            shunt_rating_amps: 50.0,
            adc_gain: Gain::Sixteen,

            // Divider bias measured against a bench multimeter
            voltage_offset_v: 0.3,

            // Parked heuristic
            parked_current_threshold_a: 0.5,
            parked_confirmation_secs: 300, // 5 minutes

            // Timing
            sample_interval_ms: 1000, // 1 Hz
            wifi_retry_interval_secs: 30,

            // Uplink
            publish_max_attempts: 3,
            publish_backoff_ms: 250,
        }
    }
}
