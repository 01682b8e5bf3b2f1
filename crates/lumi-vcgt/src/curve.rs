//! Sampled per-channel gamma ramps.
//!
//! A [`Curve`] is what ends up in the `vcgt` tag of a display profile: 512
//! RGB samples, applied by the video card after everything else in the
//! pipeline. [`generate`] builds one from a target gamma, a white point and
//! a brightness scale:
//!
//! ```text
//! t         = i / 511
//! sample[i] = brightness * t^(1/gamma) * white
//! ```
//!
//! The exponent is the inverse of the requested gamma so the parameter reads
//! like a display gamma: `1.0` is a linear ramp, larger values lift midtones.

use crate::{VcgtError, VcgtResult, WhitePoint};
use tracing::debug;

/// Number of samples per channel in a generated ramp.
pub const VCGT_SAMPLES: usize = 512;

/// One point of a ramp, each component in `[0, brightness]`.
pub type CurveSample = [f64; 3];

/// A gamma ramp of exactly [`VCGT_SAMPLES`] RGB samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    samples: Vec<CurveSample>,
}

impl Curve {
    /// All samples in index order.
    pub fn samples(&self) -> &[CurveSample] {
        &self.samples
    }

    /// Number of samples, always [`VCGT_SAMPLES`].
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for parity with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Black end of the ramp.
    pub fn first(&self) -> CurveSample {
        self.samples[0]
    }

    /// White end of the ramp.
    pub fn last(&self) -> CurveSample {
        self.samples[self.samples.len() - 1]
    }

    /// Values of one channel (0 = red, 1 = green, 2 = blue).
    ///
    /// # Panics
    ///
    /// Panics if `channel > 2`.
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        assert!(channel < 3, "channel index out of range: {}", channel);
        self.samples.iter().map(|s| s[channel]).collect()
    }

    /// Returns true if every channel is non-decreasing.
    pub fn is_monotonic(&self) -> bool {
        self.samples
            .windows(2)
            .all(|w| (0..3).all(|c| w[0][c] <= w[1][c]))
    }
}

/// Ramp coefficient for sample `index`: `(index / 511)^(1/gamma)`.
///
/// Exact at both ends: `0` for index 0 and `1` for index 511.
pub fn coefficient(index: usize, gamma: f64) -> f64 {
    let t = index as f64 / (VCGT_SAMPLES - 1) as f64;
    if gamma == 1.0 { t } else { t.powf(1.0 / gamma) }
}

/// Synthesizes a 512-sample ramp.
///
/// # Errors
///
/// - [`VcgtError::InvalidGamma`] if `gamma` is not finite or `<= 0`
/// - [`VcgtError::InvalidBrightness`] if `brightness` is outside `[0, 1]`
/// - [`VcgtError::InvalidWhitePoint`] for negative or non-finite components
///
/// # Example
///
/// ```rust
/// use lumi_vcgt::{generate, WhitePoint};
///
/// let curve = generate(1.0, WhitePoint::NEUTRAL, 0.5).unwrap();
/// assert_eq!(curve.len(), 512);
/// assert_eq!(curve.first(), [0.0, 0.0, 0.0]);
/// assert_eq!(curve.last(), [0.5, 0.5, 0.5]);
/// ```
pub fn generate(gamma: f64, white_point: WhitePoint, brightness: f64) -> VcgtResult<Curve> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(VcgtError::InvalidGamma(gamma));
    }
    if !(0.0..=1.0).contains(&brightness) {
        return Err(VcgtError::InvalidBrightness(brightness));
    }
    let white = white_point.validate()?.to_array();

    debug!(gamma, brightness, ?white, "generating vcgt ramp");

    let samples = (0..VCGT_SAMPLES)
        .map(|i| {
            let coeff = coefficient(i, gamma);
            white.map(|c| brightness * coeff * c)
        })
        .collect();

    Ok(Curve { samples })
}
