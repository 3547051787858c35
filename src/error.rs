//! Unified error types for the logger firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! sampling loop's fault handling uniform. All variants are `Copy` so they
//! can be carried in events and inspected inline without allocation.
//!
//! Faults are local to the sample that raised them: the scheduler inspects
//! the result, surfaces it through the event sink, and keeps ticking.
//! Only peripheral *initialization* failures at startup are fatal.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The RTC reported an unusable date (pre-2000).
    Clock(ClockError),
    /// SD-card open/write/verify failure.
    Storage(StorageError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed (fatal at startup).
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The RTC returned a pre-2000 calendar date, typically after battery
    /// loss. Samples carrying such a timestamp are not logged.
    InvalidDate,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate => write!(f, "RTC date invalid (pre-2000)"),
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Day-file open failed even after one card re-initialization.
    OpenFailed,
    /// Append to an open day-file failed.
    WriteFailed,
    /// SD controller re-initialization failed.
    ReinitFailed,
    /// File missing during the end-of-batch verification.
    NotFound,
    /// Day-file verified as zero bytes after a completed batch.
    EmptyFile,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed => write!(f, "file open failed"),
            Self::WriteFailed => write!(f, "file write failed"),
            Self::ReinitFailed => write!(f, "card re-init failed"),
            Self::NotFound => write!(f, "file not found"),
            Self::EmptyFile => write!(f, "day-file is empty after batch"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    WifiDisconnected,
    MqttPublishFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::WifiDisconnected => write!(f, "WiFi disconnected"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
