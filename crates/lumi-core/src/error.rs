//! Error types for a gamma swap run.
//!
//! Every failure that aborts a run is a [`LumiError`]. Failing to retire the
//! superseded profile is not: by then the new profile is already the default,
//! so that failure is only logged.
//!
//! # Exit codes
//!
//! [`LumiError::exit_code`] maps each variant to one of the codes in
//! [`exit`], which the binary returns unchanged.

use lumi_icc::IccError;
use lumi_service::ServiceError;
use lumi_vcgt::VcgtError;
use thiserror::Error;

/// Result type alias using [`LumiError`].
pub type LumiResult<T> = std::result::Result<T, LumiError>;

/// Process exit codes.
pub mod exit {
    /// Run completed.
    pub const SUCCESS: u8 = 0;
    /// Service, ICC or I/O failure.
    pub const FAILURE: u8 = 1;
    /// No arguments or unparsable command line; help was printed.
    pub const USAGE: u8 = 2;
    /// A numeric argument was malformed or out of range.
    pub const CONFIG: u8 = 3;
    /// Display index out of range.
    pub const DEVICE_NOT_FOUND: u8 = 4;
    /// Neither a device profile nor the standard sRGB profile was available.
    pub const NO_BASE_PROFILE: u8 = 5;
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum LumiError {
    /// Malformed or out-of-range argument.
    #[error("invalid {field} {value:?}: {reason}")]
    Configuration {
        /// Argument name.
        field: &'static str,
        /// Value as given.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Display index past the end of the display list.
    #[error("display {index} not found ({count} display device(s) available)")]
    DeviceNotFound {
        /// Requested index.
        index: usize,
        /// Number of displays the service reported.
        count: usize,
    },

    /// The device has no profile and the standard sRGB profile is missing.
    #[error("no base profile for {device}: it has no profiles and sRGB is unavailable")]
    NoBaseProfileAvailable {
        /// Device id.
        device: String,
    },

    /// A service call failed.
    #[error("color service: {0}")]
    Service(#[from] ServiceError),

    /// Curve synthesis rejected its input.
    #[error("curve: {0}")]
    Curve(#[from] VcgtError),

    /// ICC data could not be parsed or edited.
    #[error("ICC: {0}")]
    Icc(#[from] IccError),

    /// Local I/O (temporary profile file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LumiError {
    /// Exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            LumiError::Configuration { .. } | LumiError::Curve(_) => exit::CONFIG,
            LumiError::DeviceNotFound { .. } => exit::DEVICE_NOT_FOUND,
            LumiError::NoBaseProfileAvailable { .. } => exit::NO_BASE_PROFILE,
            LumiError::Service(_) | LumiError::Icc(_) | LumiError::Io(_) => exit::FAILURE,
        }
    }
}
