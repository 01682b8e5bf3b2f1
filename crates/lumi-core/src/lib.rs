//! # lumi-core
//!
//! Adjusts a display's gamma, white point and brightness by installing a
//! generated color profile whose video-card gamma table carries the change.
//!
//! Each run clones the display's current profile, embeds a fresh VCGT ramp,
//! installs the result as the new default and deletes the profile an earlier
//! run generated, so at most one generated profile stays installed per display.
//!
//! # Example
//!
//! ```rust
//! use lumi_core::{apply, Config};
//! use lumi_service::MemoryColorService;
//!
//! let service = MemoryColorService::new().with_display("xrandr-eDP-1");
//! let config = Config::new(0, 1.0, 5500.0, 0.9).unwrap();
//!
//! let outcome = apply(&service, &config).unwrap();
//! assert_eq!(service.default_profile("xrandr-eDP-1").unwrap().id, outcome.installed.id);
//! ```
//!
//! # Concurrency
//!
//! Runs are single-threaded and fully synchronous. Nothing guards against two
//! processes working on the same display at once.

#![warn(missing_docs)]

mod config;
mod error;
mod lifecycle;

pub use config::{Config, RawArgs};
pub use error::{exit, LumiError, LumiResult};
pub use lifecycle::{
    apply, temp_file_name, ProfileLifecycleManager, SwapOutcome, TaggedProfile, PROFILE_PREFIX,
    STANDARD_PROFILE, UUID_KEY,
};
