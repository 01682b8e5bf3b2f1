//! # lumi-vcgt
//!
//! Synthesis of video-card gamma tables (VCGT) for display profiles.
//!
//! Turns `{gamma, color temperature, brightness}` into a 512-sample RGB ramp:
//!
//! - [`ColorTemperatureModel`] resolves a [`WhitePoint`] for a temperature
//!   through a pluggable [`BlackbodySource`] ([`PlanckianTable`] by default)
//! - [`generate`] builds the [`Curve`]
//!
//! # Example
//!
//! ```rust
//! use lumi_vcgt::{generate, ColorTemperatureModel, PlanckianTable};
//!
//! let model = ColorTemperatureModel::new(PlanckianTable);
//! let white = model.white_point(5000.0).unwrap();
//! let curve = generate(1.2, white, 0.8).unwrap();
//! assert!(curve.is_monotonic());
//! ```

#![warn(missing_docs)]

mod curve;
mod error;
mod white_point;

pub use curve::{coefficient, generate, Curve, CurveSample, VCGT_SAMPLES};
pub use error::{VcgtError, VcgtResult};
pub use white_point::{
    BlackbodySource, ColorTemperatureModel, PlanckianTable, WhitePoint, MAX_TEMPERATURE,
    MIN_TEMPERATURE,
};
