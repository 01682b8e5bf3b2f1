//! # lumi-icc
//!
//! ICC display profile data for the lumi gamma tool, built on Little CMS 2.
//!
//! - Load profiles from bytes or files, or synthesize standard ones
//! - Read and write string metadata
//! - Embed and read back a video-card gamma table (`vcgt` tag)
//! - Serialize back to ICC bytes or a file
//!
//! # Example
//!
//! ```rust
//! use lumi_icc::IccProfile;
//! use lumi_vcgt::{generate, WhitePoint};
//!
//! let mut profile = IccProfile::srgb();
//! let curve = generate(2.2, WhitePoint::NEUTRAL, 1.0).unwrap();
//! profile.set_vcgt(&curve).unwrap();
//! assert!(profile.vcgt().is_some());
//! ```

#![warn(missing_docs)]

mod error;
mod profile;
mod standard;

pub use error::{IccError, IccResult};
pub use profile::{IccProfile, VcgtChannels};
pub use standard::StandardProfile;
