//! Connectivity gate — the parked-vehicle heuristic.
//!
//! The uplink must stay silent while the vehicle is driven: RF activity in
//! motion is unwanted and irrelevant to the leakage investigation. A
//! vehicle is considered parked only after the shunt current has stayed
//! below a threshold for a confirmation window of consecutive samples;
//! a single above-threshold sample resets the debounce from zero.
//!
//! The gate never manages the link. It folds the link adapter's
//! `is_connected` answer into [`ConnectivityState::uplink_available`] and
//! leaves association entirely to the adapter.

use log::info;

use crate::config::SystemConfig;

/// Snapshot of the gate after folding in one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    /// Debounced "vehicle is stationary" flag.
    pub is_parked: bool,
    /// Consecutive below-threshold samples so far (resets on any
    /// disqualifying sample).
    pub confirmation_counter: u32,
    /// True only while parked *and* the link layer reports a connection.
    pub uplink_available: bool,
}

/// Debounced parked-state tracker, advanced once per sample.
pub struct ConnectivityGate {
    threshold_a: f32,
    confirmation_samples: u32,
    counter: u32,
    parked: bool,
}

impl ConnectivityGate {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            threshold_a: config.parked_current_threshold_a,
            confirmation_samples: config.parked_confirmation_secs,
            counter: 0,
            parked: false,
        }
    }

    /// Fold one current sample into the debounce and return the updated
    /// state. `link_up` is the link adapter's current answer.
    pub fn update(&mut self, current_a: f32, link_up: bool) -> ConnectivityState {
        if current_a.abs() < self.threshold_a {
            self.counter = self.counter.saturating_add(1);
            if self.counter >= self.confirmation_samples && !self.parked {
                self.parked = true;
                info!(
                    "Gate: parked confirmed after {}s below {:.2} A",
                    self.counter, self.threshold_a
                );
            }
        } else {
            self.counter = 0;
            if self.parked {
                self.parked = false;
                info!("Gate: vehicle in motion, uplink gated off");
            }
        }

        self.state(link_up)
    }

    /// Current state without folding in a new sample.
    pub fn state(&self, link_up: bool) -> ConnectivityState {
        ConnectivityState {
            is_parked: self.parked,
            confirmation_counter: self.counter,
            uplink_available: self.parked && link_up,
        }
    }

    pub fn is_parked(&self) -> bool {
        self.parked
    }
}
