//! VCGT error types.

use thiserror::Error;

/// Result type for curve synthesis.
pub type VcgtResult<T> = Result<T, VcgtError>;

/// Errors that can occur while synthesizing a gamma ramp.
#[derive(Debug, Error)]
pub enum VcgtError {
    /// Gamma must be finite and strictly positive.
    #[error("invalid gamma {0}: must be a finite value greater than zero")]
    InvalidGamma(f64),

    /// Brightness outside the `[0, 1]` range.
    #[error("invalid brightness {0}: must lie in [0, 1]")]
    InvalidBrightness(f64),

    /// Temperature the blackbody source cannot work with.
    #[error("invalid color temperature {0}K")]
    InvalidTemperature(f64),

    /// White point component negative or not finite.
    #[error("invalid white point ({r}, {g}, {b})")]
    InvalidWhitePoint {
        /// Red component
        r: f64,
        /// Green component
        g: f64,
        /// Blue component
        b: f64,
    },
}
