//! In-memory color service.
//!
//! Mirrors [`crate::LocalColorService`] semantics without touching the file
//! system (imports still read the offered file). Every mutating call is
//! appended to a log so callers can check exactly what was changed.

use crate::{ColorService, Device, DeviceKind, Profile, Relation, ServiceError, ServiceResult};
use lumi_icc::{IccProfile, StandardProfile};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

const VIRTUAL_ICC_DIR: &str = "/memory/icc";

/// A state change performed through the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Color management toggled.
    SetEnabled {
        /// Device id.
        device: String,
        /// New state.
        enabled: bool,
    },
    /// Profile imported.
    Import {
        /// New profile id.
        profile: String,
    },
    /// Profile attached to a device.
    Attach {
        /// Device id.
        device: String,
        /// Profile id.
        profile: String,
        /// Attachment strength.
        relation: Relation,
    },
    /// Default profile changed.
    SetDefault {
        /// Device id.
        device: String,
        /// Profile id.
        profile: String,
    },
    /// Profile resource deleted.
    Remove {
        /// Profile id.
        profile: String,
    },
}

#[derive(Debug)]
struct StoredDevice {
    device: Device,
    profiles: Vec<(String, Relation)>,
}

#[derive(Debug)]
struct StoredProfile {
    profile: Profile,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    devices: Vec<StoredDevice>,
    profiles: Vec<StoredProfile>,
    mutations: Vec<Mutation>,
    next_id: usize,
    fail_import: bool,
    no_standard_profiles: bool,
}

impl State {
    fn device_mut(&mut self, id: &str) -> ServiceResult<&mut StoredDevice> {
        self.devices
            .iter_mut()
            .find(|d| d.device.id == id)
            .ok_or_else(|| ServiceError::DeviceNotFound(id.to_string()))
    }

    fn device(&self, id: &str) -> ServiceResult<&StoredDevice> {
        self.devices
            .iter()
            .find(|d| d.device.id == id)
            .ok_or_else(|| ServiceError::DeviceNotFound(id.to_string()))
    }

    fn profile(&self, id: &str) -> Option<&StoredProfile> {
        self.profiles.iter().find(|p| p.profile.id == id)
    }

    fn add_profile(&mut self, data: Vec<u8>, file: &str) -> ServiceResult<Profile> {
        let icc = IccProfile::from_icc(&data)?;
        self.next_id += 1;
        let profile = Profile {
            id: format!("icc-mem-{}", self.next_id),
            filename: Some(PathBuf::from(VIRTUAL_ICC_DIR).join(file)),
            title: icc.description(),
            metadata: icc.metadata().clone(),
            vcgt: icc.vcgt(),
        };
        self.profiles.push(StoredProfile {
            profile: profile.clone(),
            data,
        });
        Ok(profile)
    }
}

/// Color service whose whole state lives in memory.
///
/// Single-threaded: state sits in a [`RefCell`].
#[derive(Debug, Default)]
pub struct MemoryColorService {
    state: RefCell<State>,
}

impl MemoryColorService {
    /// Empty service: no devices, standard profiles available on request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an enabled display with no profiles.
    pub fn with_display(self, id: &str) -> Self {
        self.with_device(id, DeviceKind::Display, true)
    }

    /// Adds a device.
    pub fn with_device(self, id: &str, kind: DeviceKind, enabled: bool) -> Self {
        self.state.borrow_mut().devices.push(StoredDevice {
            device: Device {
                id: id.to_string(),
                kind,
                model: None,
                enabled,
            },
            profiles: Vec::new(),
        });
        self
    }

    /// Installs `icc` as `file` and attaches it to `device` (hard relation).
    ///
    /// Setup helper, not recorded as a mutation.
    pub fn with_profile(self, device: &str, file: &str, icc: &IccProfile) -> ServiceResult<Self> {
        {
            let mut state = self.state.borrow_mut();
            let profile = state.add_profile(icc.to_icc()?, file)?;
            state
                .device_mut(device)?
                .profiles
                .push((profile.id, Relation::Hard));
        }
        Ok(self)
    }

    /// Makes `find_standard_profile` return nothing.
    pub fn without_standard_profiles(self) -> Self {
        self.state.borrow_mut().no_standard_profiles = true;
        self
    }

    /// Makes every subsequent import fail.
    pub fn fail_import(&self, fail: bool) {
        self.state.borrow_mut().fail_import = fail;
    }

    /// Everything changed through the service so far.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.state.borrow().mutations.clone()
    }

    /// Drops a profile's resource without going through the service, as if
    /// it vanished from disk. The profile keeps its id but loses its file.
    pub fn forget_file(&self, profile_id: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(stored) = state.profiles.iter_mut().find(|p| p.profile.id == profile_id) {
            stored.profile.filename = None;
        }
    }

    /// Current default profile of `device`.
    pub fn default_profile(&self, device: &str) -> Option<Profile> {
        let state = self.state.borrow();
        let (id, _) = state.device(device).ok()?.profiles.first()?;
        state.profile(id).map(|p| p.profile.clone())
    }

    /// Ids of profiles attached to `device`, default first.
    pub fn attached(&self, device: &str) -> Vec<String> {
        let state = self.state.borrow();
        state
            .device(device)
            .map(|d| d.profiles.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    /// Relation of `profile` on `device`, if attached.
    pub fn relation(&self, device: &str, profile: &str) -> Option<Relation> {
        let state = self.state.borrow();
        state
            .device(device)
            .ok()?
            .profiles
            .iter()
            .find(|(id, _)| id == profile)
            .map(|(_, r)| *r)
    }

    /// Returns true if the service still holds `profile`.
    pub fn contains_profile(&self, profile: &str) -> bool {
        self.state.borrow().profile(profile).is_some()
    }
}

impl ColorService for MemoryColorService {
    fn list_devices(&self) -> ServiceResult<Vec<Device>> {
        Ok(self
            .state
            .borrow()
            .devices
            .iter()
            .map(|d| d.device.clone())
            .collect())
    }

    fn is_enabled(&self, device: &Device) -> ServiceResult<bool> {
        Ok(self.state.borrow().device(&device.id)?.device.enabled)
    }

    fn set_enabled(&self, device: &Device, enabled: bool) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        state.device_mut(&device.id)?.device.enabled = enabled;
        state.mutations.push(Mutation::SetEnabled {
            device: device.id.clone(),
            enabled,
        });
        Ok(())
    }

    fn profiles_of(&self, device: &Device) -> ServiceResult<Vec<Profile>> {
        let state = self.state.borrow();
        Ok(state
            .device(&device.id)?
            .profiles
            .iter()
            .filter_map(|(id, _)| state.profile(id))
            .map(|p| p.profile.clone())
            .collect())
    }

    fn load_icc_bytes(&self, profile: &Profile) -> ServiceResult<Vec<u8>> {
        let state = self.state.borrow();
        let stored = state
            .profile(&profile.id)
            .ok_or_else(|| ServiceError::ProfileNotFound(profile.id.clone()))?;
        if stored.profile.filename.is_none() {
            return Err(ServiceError::NoBackingFile(profile.id.clone()));
        }
        Ok(stored.data.clone())
    }

    fn find_standard_profile(&self, name: &str) -> ServiceResult<Option<Profile>> {
        let mut state = self.state.borrow_mut();
        if state.no_standard_profiles {
            return Ok(None);
        }
        let Some(standard) = StandardProfile::from_name(name) else {
            return Ok(None);
        };
        let file = standard.filename();
        if let Some(existing) = state
            .profiles
            .iter()
            .find(|p| p.profile.basename().as_deref() == Some(file.as_str()))
        {
            return Ok(Some(existing.profile.clone()));
        }
        let data = standard.to_profile().to_icc()?;
        state.add_profile(data, &file).map(Some)
    }

    fn import_profile(&self, path: &Path) -> ServiceResult<Profile> {
        let mut state = self.state.borrow_mut();
        if state.fail_import {
            return Err(ServiceError::ImportRejected {
                path: path.to_path_buf(),
                reason: "import disabled".into(),
            });
        }
        let data = std::fs::read(path)?;
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let profile = state.add_profile(data, &file)?;
        state.mutations.push(Mutation::Import {
            profile: profile.id.clone(),
        });
        Ok(profile)
    }

    fn attach_profile(
        &self,
        device: &Device,
        profile: &Profile,
        relation: Relation,
    ) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        if state.profile(&profile.id).is_none() {
            return Err(ServiceError::ProfileNotFound(profile.id.clone()));
        }
        let stored = state.device_mut(&device.id)?;
        match stored.profiles.iter_mut().find(|(id, _)| *id == profile.id) {
            Some((_, existing)) => {
                if relation == Relation::Hard {
                    *existing = Relation::Hard;
                }
            }
            None => stored.profiles.push((profile.id.clone(), relation)),
        }
        state.mutations.push(Mutation::Attach {
            device: device.id.clone(),
            profile: profile.id.clone(),
            relation,
        });
        Ok(())
    }

    fn set_default(&self, device: &Device, profile: &Profile) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        if state.profile(&profile.id).is_none() {
            return Err(ServiceError::ProfileNotFound(profile.id.clone()));
        }
        let stored = state.device_mut(&device.id)?;
        let entry = match stored.profiles.iter().position(|(id, _)| *id == profile.id) {
            Some(pos) => stored.profiles.remove(pos),
            None => (profile.id.clone(), Relation::Hard),
        };
        stored.profiles.insert(0, entry);
        state.mutations.push(Mutation::SetDefault {
            device: device.id.clone(),
            profile: profile.id.clone(),
        });
        Ok(())
    }

    fn remove_underlying_resource(&self, profile: &Profile) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        let has_file = state
            .profile(&profile.id)
            .is_some_and(|p| p.profile.filename.is_some());
        if !has_file {
            return Ok(());
        }
        state.profiles.retain(|p| p.profile.id != profile.id);
        for device in &mut state.devices {
            device.profiles.retain(|(id, _)| *id != profile.id);
        }
        state.mutations.push(Mutation::Remove {
            profile: profile.id.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_profile_lookup() {
        let service = MemoryColorService::new();
        let a = service.find_standard_profile("sRGB").unwrap().unwrap();
        let b = service.find_standard_profile("sRGB").unwrap().unwrap();
        assert_eq!(a.id, b.id);
        assert!(service.mutations().is_empty());

        let none = MemoryColorService::new().without_standard_profiles();
        assert!(none.find_standard_profile("sRGB").unwrap().is_none());
    }

    #[test]
    fn test_set_default_moves_to_front() {
        let service = MemoryColorService::new()
            .with_display("d0")
            .with_profile("d0", "a.icc", &IccProfile::srgb())
            .unwrap();
        let device = service.list_devices().unwrap().remove(0);
        let b = service.find_standard_profile("sRGB").unwrap().unwrap();

        service.attach_profile(&device, &b, Relation::Soft).unwrap();
        assert_eq!(service.attached("d0")[1], b.id);

        service.set_default(&device, &b).unwrap();
        assert_eq!(service.default_profile("d0").unwrap().id, b.id);
        assert_eq!(service.attached("d0").len(), 2);
    }

    #[test]
    fn test_remove_without_file_is_noop() {
        let service = MemoryColorService::new()
            .with_display("d0")
            .with_profile("d0", "a.icc", &IccProfile::srgb())
            .unwrap();
        let device = service.list_devices().unwrap().remove(0);
        let profile = service.profiles_of(&device).unwrap().remove(0);

        service.forget_file(&profile.id);
        service.remove_underlying_resource(&profile).unwrap();
        assert!(service.contains_profile(&profile.id));
        assert!(service.mutations().is_empty());
    }
}
