//! The service boundary the lifecycle code is written against.

use crate::{Device, DeviceKind, Profile, Relation, ServiceResult};
use std::path::Path;

/// Operations a color-management service must provide.
///
/// Every call is synchronous and may block on the backend. Implementations
/// own the device and profile state; callers hold no locks and see whatever
/// the backend reports at the time of the call.
pub trait ColorService {
    /// Every device the service knows about, in service order.
    fn list_devices(&self) -> ServiceResult<Vec<Device>>;

    /// Devices of kind [`DeviceKind::Display`], in service order.
    fn list_display_devices(&self) -> ServiceResult<Vec<Device>> {
        Ok(self
            .list_devices()?
            .into_iter()
            .filter(|d| d.kind == DeviceKind::Display)
            .collect())
    }

    /// Whether color management is currently enabled for `device`.
    fn is_enabled(&self, device: &Device) -> ServiceResult<bool>;

    /// Enables or disables color management for `device`.
    fn set_enabled(&self, device: &Device, enabled: bool) -> ServiceResult<()>;

    /// Profiles attached to `device`, default first.
    fn profiles_of(&self, device: &Device) -> ServiceResult<Vec<Profile>>;

    /// Raw ICC bytes of `profile`.
    fn load_icc_bytes(&self, profile: &Profile) -> ServiceResult<Vec<u8>>;

    /// Looks up a well-known profile such as `sRGB`.
    fn find_standard_profile(&self, name: &str) -> ServiceResult<Option<Profile>>;

    /// Installs the profile stored at `path` and returns its service handle.
    ///
    /// The service keeps its own copy; `path` may be deleted afterwards.
    fn import_profile(&self, path: &Path) -> ServiceResult<Profile>;

    /// Attaches `profile` to `device`.
    fn attach_profile(
        &self,
        device: &Device,
        profile: &Profile,
        relation: Relation,
    ) -> ServiceResult<()>;

    /// Makes `profile` the default (first) profile of `device`.
    fn set_default(&self, device: &Device, profile: &Profile) -> ServiceResult<()>;

    /// Deletes the resource backing `profile`.
    ///
    /// Succeeds without doing anything when the profile has no backing file.
    fn remove_underlying_resource(&self, profile: &Profile) -> ServiceResult<()>;
}
