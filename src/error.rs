//! Unified error types for the sous-vide controller.
//!
//! Each subsystem has its own error enum so callers can tell a failed
//! probe read apart from an unreachable plug.  None of these may terminate
//! the control loop: sensor errors trip the fail-safe path, connection
//! errors are retried by the reconciler, telemetry errors become warnings.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    /// The probe could not be read (missing device, bad CRC, etc.).
    #[error("probe read failed: {0}")]
    ReadFailed(String),
    /// Reading is outside the physically plausible range.
    #[error("reading out of range: {0:.2}\u{00b0}C")]
    OutOfRange(f32),
    /// The probe did not answer in time.
    #[error("probe read timed out")]
    Timeout,
}

// ---------------------------------------------------------------------------
// Actuator transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The outlet did not answer.
    #[error("plug unreachable: {0}")]
    Unreachable(String),
    /// The outlet answered too late.
    #[error("plug request timed out")]
    Timeout,
}

// ---------------------------------------------------------------------------
// Telemetry errors
// ---------------------------------------------------------------------------

/// Raised internally by the telemetry file operations and always
/// downgraded to a warning before it reaches a caller.
#[derive(Debug, Error)]
pub enum LogIoError {
    #[error("telemetry write to {path} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("telemetry rotation of {path} failed: {source}")]
    Rotate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file at the given path.
    #[error("config not found: {0}")]
    NotFound(PathBuf),
    /// The file exists but could not be read.
    #[error("config read failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid YAML or has wrong field types.
    #[error("config corrupted: {0}")]
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    #[error("validation failed: {0}")]
    ValidationFailed(&'static str),
}
