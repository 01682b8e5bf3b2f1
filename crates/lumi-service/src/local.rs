//! File-system backed color service.
//!
//! Profiles live as plain `.icc` files under `<data_dir>/icc/`. Devices,
//! their enable flags and their attachment lists are kept in
//! `<data_dir>/devices.yaml`. Connected displays are discovered from DRM
//! sysfs on every enumeration and merged into the registry. A discovered
//! display whose connector is no longer connected keeps its record and
//! attachments but is left out of [`ColorService::list_devices`].
//!
//! # Layout
//!
//! ```text
//! <data_dir>/
//!   devices.yaml
//!   icc/
//!     sRGB.icc
//!     lumi-3f0c....icc
//! ```
//!
//! No locking is done. Two processes mutating the same store can interleave
//! and the last registry write wins.

use crate::sysfs::connected_displays;
use crate::{
    ColorService, Device, DeviceKind, Profile, Relation, ServiceError, ServiceResult,
};
use lumi_icc::{IccProfile, StandardProfile};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Environment variable overriding the store location.
pub const DATA_DIR_ENV: &str = "LUMI_DATA_DIR";
/// Environment variable overriding the DRM sysfs root.
pub const SYSFS_DRM_ENV: &str = "LUMI_SYSFS_DRM";

const REGISTRY_FILE: &str = "devices.yaml";
const DEFAULT_SYSFS_DRM: &str = "/sys/class/drm";

/// Where a [`LocalColorService`] keeps its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Root of the store.
    pub data_dir: PathBuf,
    /// DRM sysfs directory scanned for connected displays.
    pub sysfs_drm: PathBuf,
}

impl StoreConfig {
    /// Store rooted at `data_dir`, scanning the system DRM sysfs.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sysfs_drm: PathBuf::from(DEFAULT_SYSFS_DRM),
        }
    }

    /// Resolves the store from the environment.
    ///
    /// `LUMI_DATA_DIR` wins, otherwise `lumi` under the platform data
    /// directory. `LUMI_SYSFS_DRM` overrides the sysfs root.
    pub fn from_env() -> ServiceResult<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join("lumi"))
                .ok_or_else(|| ServiceError::Discovery("no user data directory".into()))?,
        };
        let mut config = Self::new(data_dir);
        if let Some(sysfs) = std::env::var_os(SYSFS_DRM_ENV) {
            config.sysfs_drm = PathBuf::from(sysfs);
        }
        Ok(config)
    }

    /// Replaces the sysfs root.
    pub fn with_sysfs(mut self, sysfs_drm: impl Into<PathBuf>) -> Self {
        self.sysfs_drm = sysfs_drm.into();
        self
    }

    /// Directory holding installed profiles.
    pub fn icc_dir(&self) -> PathBuf {
        self.data_dir.join("icc")
    }

    /// Path of the device registry.
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(REGISTRY_FILE)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Registry {
    #[serde(default)]
    devices: Vec<DeviceRecord>,
    #[serde(default)]
    profiles: Vec<ProfileRecord>,
    /// Device ids of the connectors found connected by the last scan.
    #[serde(skip)]
    connected: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeviceRecord {
    id: String,
    kind: DeviceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(default = "enabled_default")]
    enabled: bool,
    /// Created by sysfs discovery rather than registered by hand.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    discovered: bool,
    #[serde(default)]
    profiles: Vec<Attachment>,
}

fn enabled_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Attachment {
    profile: String,
    #[serde(default)]
    relation: Relation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileRecord {
    id: String,
    /// File name inside the store's `icc/` directory.
    file: String,
    #[serde(default)]
    title: String,
}

impl DeviceRecord {
    fn to_device(&self) -> Device {
        Device {
            id: self.id.clone(),
            kind: self.kind,
            model: self.model.clone(),
            enabled: self.enabled,
        }
    }
}

impl Registry {
    fn device_mut(&mut self, id: &str) -> ServiceResult<&mut DeviceRecord> {
        self.devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ServiceError::DeviceNotFound(id.to_string()))
    }

    fn device(&self, id: &str) -> ServiceResult<&DeviceRecord> {
        self.devices
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ServiceError::DeviceNotFound(id.to_string()))
    }

    fn profile(&self, id: &str) -> Option<&ProfileRecord> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Hand-registered devices are always present; discovered displays only
    /// while their connector is connected.
    fn is_present(&self, record: &DeviceRecord) -> bool {
        !record.discovered || self.connected.contains(&record.id)
    }
}

/// Color service backed by a directory on the local file system.
///
/// Holds no state besides its [`StoreConfig`]: every call reads the registry
/// and every mutation writes it back.
#[derive(Debug, Clone)]
pub struct LocalColorService {
    config: StoreConfig,
}

impl LocalColorService {
    /// Opens (and if needed creates) the store described by `config`.
    pub fn open(config: StoreConfig) -> ServiceResult<Self> {
        std::fs::create_dir_all(config.icc_dir())?;
        debug!("opened profile store at {}", config.data_dir.display());
        Ok(Self { config })
    }

    /// Store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Registers a device by hand, e.g. a printer or a display that sysfs
    /// does not report. Existing records are left untouched.
    pub fn register_device(
        &self,
        id: &str,
        kind: DeviceKind,
        model: Option<&str>,
    ) -> ServiceResult<()> {
        let mut registry = self.load()?;
        if registry.devices.iter().any(|d| d.id == id) {
            return Ok(());
        }
        registry.devices.push(DeviceRecord {
            id: id.to_string(),
            kind,
            model: model.map(str::to_string),
            enabled: true,
            discovered: false,
            profiles: Vec::new(),
        });
        self.save(&registry)
    }

    fn load(&self) -> ServiceResult<Registry> {
        let path = self.config.registry_path();
        let mut registry: Registry = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            serde_yaml::from_str(&text)?
        } else {
            Registry::default()
        };

        for connector in connected_displays(&self.config.sysfs_drm)? {
            let id = connector.device_id();
            if !registry.devices.iter().any(|d| d.id == id) {
                trace!("discovered display {}", id);
                registry.devices.push(DeviceRecord {
                    id: id.clone(),
                    kind: DeviceKind::Display,
                    model: Some(connector.name),
                    enabled: true,
                    discovered: true,
                    profiles: Vec::new(),
                });
            }
            registry.connected.insert(id);
        }
        Ok(registry)
    }

    fn save(&self, registry: &Registry) -> ServiceResult<()> {
        let path = self.config.registry_path();
        let tmp = path.with_extension("yaml.tmp");
        std::fs::write(&tmp, serde_yaml::to_string(registry)?)?;
        std::fs::rename(&tmp, &path)?;
        trace!("wrote registry {}", path.display());
        Ok(())
    }

    fn to_profile(&self, record: &ProfileRecord) -> Profile {
        let path = self.config.icc_dir().join(&record.file);
        if !path.is_file() {
            return Profile {
                id: record.id.clone(),
                filename: None,
                title: record.title.clone(),
                metadata: BTreeMap::new(),
                vcgt: None,
            };
        }
        let (metadata, vcgt) = match IccProfile::from_file(&path) {
            Ok(icc) => (icc.metadata().clone(), icc.vcgt()),
            Err(e) => {
                warn!("cannot parse {}: {}", path.display(), e);
                (BTreeMap::new(), None)
            }
        };
        Profile {
            id: record.id.clone(),
            filename: Some(path),
            title: record.title.clone(),
            metadata,
            vcgt,
        }
    }

    /// Copies `data` into the store as `file` and registers it.
    fn install(
        &self,
        registry: &mut Registry,
        data: &[u8],
        file: &str,
        origin: &Path,
    ) -> ServiceResult<Profile> {
        let icc = IccProfile::from_icc(data).map_err(|e| ServiceError::ImportRejected {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        let id = profile_id(data);
        if let Some(existing) = registry.profile(&id) {
            debug!("{} already installed as {}", origin.display(), id);
            return Ok(self.to_profile(existing));
        }

        let dest = self.config.icc_dir().join(file);
        if dest.exists() {
            return Err(ServiceError::ImportRejected {
                path: origin.to_path_buf(),
                reason: format!("{} already exists in the store", file),
            });
        }
        std::fs::write(&dest, data)?;

        let record = ProfileRecord {
            id,
            file: file.to_string(),
            title: icc.description(),
        };
        let profile = self.to_profile(&record);
        registry.profiles.push(record);
        Ok(profile)
    }
}

/// `icc-` followed by the first 32 hex digits of the SHA-256 of `data`.
fn profile_id(data: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(data));
    format!("icc-{}", &digest[..32])
}

impl ColorService for LocalColorService {
    fn list_devices(&self) -> ServiceResult<Vec<Device>> {
        let registry = self.load()?;
        Ok(registry
            .devices
            .iter()
            .filter(|d| registry.is_present(d))
            .map(DeviceRecord::to_device)
            .collect())
    }

    fn is_enabled(&self, device: &Device) -> ServiceResult<bool> {
        Ok(self.load()?.device(&device.id)?.enabled)
    }

    fn set_enabled(&self, device: &Device, enabled: bool) -> ServiceResult<()> {
        let mut registry = self.load()?;
        registry.device_mut(&device.id)?.enabled = enabled;
        self.save(&registry)
    }

    fn profiles_of(&self, device: &Device) -> ServiceResult<Vec<Profile>> {
        let registry = self.load()?;
        let record = registry.device(&device.id)?;
        Ok(record
            .profiles
            .iter()
            .filter_map(|a| registry.profile(&a.profile))
            .map(|p| self.to_profile(p))
            .collect())
    }

    fn load_icc_bytes(&self, profile: &Profile) -> ServiceResult<Vec<u8>> {
        let path = profile
            .filename
            .as_ref()
            .ok_or_else(|| ServiceError::NoBackingFile(profile.id.clone()))?;
        Ok(std::fs::read(path)?)
    }

    fn find_standard_profile(&self, name: &str) -> ServiceResult<Option<Profile>> {
        let mut registry = self.load()?;
        let stem = |file: &str| -> String {
            Path::new(file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        if let Some(record) = registry
            .profiles
            .iter()
            .find(|p| stem(&p.file).eq_ignore_ascii_case(name) || p.title == name)
        {
            return Ok(Some(self.to_profile(record)));
        }

        let Some(standard) = StandardProfile::from_name(name) else {
            return Ok(None);
        };
        let data = standard.to_profile().to_icc()?;
        let file = standard.filename();
        let profile = self.install(&mut registry, &data, &file, Path::new(&file))?;
        self.save(&registry)?;
        info!("installed standard profile {} as {}", name, profile.id);
        Ok(Some(profile))
    }

    fn import_profile(&self, path: &Path) -> ServiceResult<Profile> {
        let data = std::fs::read(path)?;
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ServiceError::ImportRejected {
                path: path.to_path_buf(),
                reason: "path has no file name".into(),
            })?;
        let mut registry = self.load()?;
        let profile = self.install(&mut registry, &data, &file, path)?;
        self.save(&registry)?;
        debug!("imported {} as {}", path.display(), profile.id);
        Ok(profile)
    }

    fn attach_profile(
        &self,
        device: &Device,
        profile: &Profile,
        relation: Relation,
    ) -> ServiceResult<()> {
        let mut registry = self.load()?;
        if registry.profile(&profile.id).is_none() {
            return Err(ServiceError::ProfileNotFound(profile.id.clone()));
        }
        let record = registry.device_mut(&device.id)?;
        match record.profiles.iter_mut().find(|a| a.profile == profile.id) {
            Some(existing) => {
                if relation == Relation::Hard {
                    existing.relation = Relation::Hard;
                }
            }
            None => record.profiles.push(Attachment {
                profile: profile.id.clone(),
                relation,
            }),
        }
        self.save(&registry)
    }

    fn set_default(&self, device: &Device, profile: &Profile) -> ServiceResult<()> {
        let mut registry = self.load()?;
        if registry.profile(&profile.id).is_none() {
            return Err(ServiceError::ProfileNotFound(profile.id.clone()));
        }
        let record = registry.device_mut(&device.id)?;
        let attachment = match record.profiles.iter().position(|a| a.profile == profile.id) {
            Some(pos) => record.profiles.remove(pos),
            None => Attachment {
                profile: profile.id.clone(),
                relation: Relation::Hard,
            },
        };
        record.profiles.insert(0, attachment);
        self.save(&registry)
    }

    fn remove_underlying_resource(&self, profile: &Profile) -> ServiceResult<()> {
        let Some(path) = profile.filename.as_ref().filter(|p| p.is_file()) else {
            debug!("{} has no backing file, nothing to remove", profile.id);
            return Ok(());
        };
        std::fs::remove_file(path)?;

        let mut registry = self.load()?;
        registry.profiles.retain(|p| p.id != profile.id);
        for device in &mut registry.devices {
            device.profiles.retain(|a| a.profile != profile.id);
        }
        self.save(&registry)?;
        debug!("removed {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalColorService) {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("data")).with_sysfs(dir.path().join("drm"));
        let service = LocalColorService::open(config).unwrap();
        (dir, service)
    }

    #[test]
    fn test_empty_store() {
        let (_dir, service) = store();
        assert!(service.list_devices().unwrap().is_empty());
        assert!(service.list_display_devices().unwrap().is_empty());
    }

    #[test]
    fn test_discovers_connected_displays() {
        let (dir, service) = store();
        let connector = dir.path().join("drm/card1-HDMI-A-1");
        std::fs::create_dir_all(&connector).unwrap();
        std::fs::write(connector.join("status"), "connected\n").unwrap();
        service.register_device("cups-Laser", DeviceKind::Printer, None).unwrap();

        let all = service.list_devices().unwrap();
        assert_eq!(all.len(), 2);
        let displays = service.list_display_devices().unwrap();
        assert_eq!(displays.len(), 1);
        assert_eq!(displays[0].id, "xrandr-HDMI-A-1");
        assert!(displays[0].enabled);
    }

    #[test]
    fn test_standard_profile_is_created_once() {
        let (_dir, service) = store();
        let first = service.find_standard_profile("sRGB").unwrap().unwrap();
        let second = service.find_standard_profile("sRGB").unwrap().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.basename().as_deref(), Some("sRGB.icc"));
        assert!(service.find_standard_profile("NoSuchSpace").unwrap().is_none());
    }

    #[test]
    fn test_profile_id_is_stable() {
        assert_eq!(profile_id(b"abc"), profile_id(b"abc"));
        assert_ne!(profile_id(b"abc"), profile_id(b"abd"));
        assert_eq!(profile_id(b"abc").len(), 4 + 32);
    }

    #[test]
    fn test_default_store_under_platform_data_dir() {
        if std::env::var_os(DATA_DIR_ENV).is_some() {
            return;
        }
        let Some(base) = dirs::data_dir() else {
            return;
        };
        assert_eq!(StoreConfig::from_env().unwrap().data_dir, base.join("lumi"));
    }

    #[test]
    fn test_enable_flag_persists() {
        let (_dir, service) = store();
        service.register_device("xrandr-virtual", DeviceKind::Display, None).unwrap();
        let device = service.list_display_devices().unwrap().remove(0);

        service.set_enabled(&device, false).unwrap();
        assert!(!service.is_enabled(&device).unwrap());
        let reopened = LocalColorService::open(service.config().clone()).unwrap();
        assert!(!reopened.is_enabled(&device).unwrap());
    }
}
