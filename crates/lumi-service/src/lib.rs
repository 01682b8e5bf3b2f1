//! # lumi-service
//!
//! The boundary between lumi and the color-management service that owns
//! devices and installed profiles.
//!
//! - [`ColorService`]: the operations lumi needs from a service
//! - [`LocalColorService`]: a service backed by a profile directory and a
//!   YAML device registry, with displays discovered from DRM sysfs
//! - [`MemoryColorService`]: an in-memory service that logs every mutation
//!
//! # Example
//!
//! ```rust,no_run
//! use lumi_service::{ColorService, LocalColorService, StoreConfig};
//!
//! let service = LocalColorService::open(StoreConfig::from_env().unwrap()).unwrap();
//! for device in service.list_display_devices().unwrap() {
//!     println!("{} enabled={}", device.id, device.enabled);
//! }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod local;
pub mod memory;
pub mod sysfs;
mod types;

pub use client::ColorService;
pub use error::{ServiceError, ServiceResult};
pub use local::{LocalColorService, StoreConfig, DATA_DIR_ENV, SYSFS_DRM_ENV};
pub use memory::{MemoryColorService, Mutation};
pub use types::{Device, DeviceKind, Profile, Relation};
