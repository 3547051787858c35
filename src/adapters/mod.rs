//! Adapters — implementations of the port traits over real backends.
//!
//! Everything ESP-IDF-specific is cfg-gated inside each module; the
//! host-side paths back bench runs and the integration tests.

pub mod file_browser;
pub mod log_sink;
pub mod mqtt;
pub mod rtc;
pub mod sd_storage;
pub mod uptime;
pub mod wifi;
