//! Replacing a display's generated profile.
//!
//! One run walks these steps in order, each waiting on the service call
//! before it:
//!
//! 1. [`ProfileLifecycleManager::initialize`]: pick the display, enable color
//!    management on it if needed
//! 2. [`resolve_base_profile`](ProfileLifecycleManager::resolve_base_profile):
//!    the device's current default, or sRGB attached on the spot
//! 3. [`clone_and_tag`](ProfileLifecycleManager::clone_and_tag): copy the
//!    base profile's ICC data and stamp it with a fresh uuid
//! 4. [`embed_curve`](ProfileLifecycleManager::embed_curve): write the VCGT
//! 5. [`install`](ProfileLifecycleManager::install): import through a
//!    temporary file, attach with a hard relation
//! 6. [`set_default`](ProfileLifecycleManager::set_default)
//! 7. [`retire_if_generated`](ProfileLifecycleManager::retire_if_generated):
//!    delete the superseded profile if an earlier run created it
//!
//! Steps 1 and 2 fail before anything is created. A failure after a remote
//! import is not rolled back.

use crate::{Config, LumiError, LumiResult};
use lumi_icc::IccProfile;
use lumi_service::{ColorService, Device, Profile, Relation};
use lumi_vcgt::{generate, BlackbodySource, ColorTemperatureModel, Curve, PlanckianTable};
use std::io::Write;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Marks profiles created by lumi, matched against filename or id.
pub const PROFILE_PREFIX: &str = "lumi-";
/// Metadata key holding the per-profile tag.
pub const UUID_KEY: &str = "uuid";
/// Profile used when a device has none.
pub const STANDARD_PROFILE: &str = "sRGB";

/// Profile data cloned from a base profile and tagged for installation.
#[derive(Debug)]
pub struct TaggedProfile {
    /// Editable copy of the ICC data.
    pub data: IccProfile,
    /// Uuid stored under [`UUID_KEY`].
    pub tag: String,
}

impl TaggedProfile {
    /// File name the profile is materialized under, `lumi-<tag>.icc`.
    pub fn file_name(&self) -> String {
        temp_file_name(&self.tag)
    }
}

/// File name for the temporary profile carrying `tag`.
pub fn temp_file_name(tag: &str) -> String {
    format!("{}{}.icc", PROFILE_PREFIX, tag)
}

/// What a completed run changed.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    /// Device whose default changed.
    pub device: Device,
    /// Profile the new one was cloned from.
    pub base: Profile,
    /// Newly installed default profile.
    pub installed: Profile,
    /// Id of the profile retired after the swap.
    pub retired: Option<String>,
    /// Tag written into the new profile.
    pub tag: String,
    /// Embedded ramp.
    pub curve: Curve,
}

/// Drives one profile swap against a [`ColorService`].
///
/// Holds a borrowed service handle and the temperature model; the selected
/// device is fixed at [`initialize`](Self::initialize).
pub struct ProfileLifecycleManager<'a, C, S = PlanckianTable> {
    service: &'a C,
    temperature: ColorTemperatureModel<S>,
    device: Device,
}

impl<'a, C: ColorService> ProfileLifecycleManager<'a, C, PlanckianTable> {
    /// Selects display `display_index`, using the built-in blackbody table.
    pub fn initialize(service: &'a C, display_index: usize) -> LumiResult<Self> {
        Self::with_model(service, ColorTemperatureModel::new(PlanckianTable), display_index)
    }
}

impl<'a, C: ColorService, S: BlackbodySource> ProfileLifecycleManager<'a, C, S> {
    /// Selects display `display_index` with a custom temperature model.
    ///
    /// # Errors
    ///
    /// [`LumiError::DeviceNotFound`] if the index is past the display list;
    /// nothing has been changed in that case.
    pub fn with_model(
        service: &'a C,
        temperature: ColorTemperatureModel<S>,
        display_index: usize,
    ) -> LumiResult<Self> {
        let displays = service.list_display_devices()?;
        let count = displays.len();
        let device = displays
            .into_iter()
            .nth(display_index)
            .ok_or(LumiError::DeviceNotFound {
                index: display_index,
                count,
            })?;
        debug!("selected display {} ({} of {})", device.id, display_index, count);

        if !service.is_enabled(&device)? {
            info!("enabling color management for {}", device.id);
            service.set_enabled(&device, true)?;
        }

        Ok(Self {
            service,
            temperature,
            device,
        })
    }

    /// The selected device.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Runs every step for `config` and reports what changed.
    pub fn run(&self, config: &Config) -> LumiResult<SwapOutcome> {
        let base = self.resolve_base_profile()?;
        let mut tagged = self.clone_and_tag(&base)?;
        let curve = self.embed_curve(&mut tagged, config)?;
        let installed = self.install(&tagged)?;
        self.set_default(&installed)?;
        let retired = self.retire_if_generated(&base);

        Ok(SwapOutcome {
            device: self.device.clone(),
            base,
            installed,
            retired,
            tag: tagged.tag,
            curve,
        })
    }

    /// Current default profile, or sRGB attached with a hard relation when
    /// the device has none.
    pub fn resolve_base_profile(&self) -> LumiResult<Profile> {
        if let Some(current) = self.service.profiles_of(&self.device)?.into_iter().next() {
            debug!("base profile {}", current.info());
            return Ok(current);
        }

        let standard = self
            .service
            .find_standard_profile(STANDARD_PROFILE)?
            .ok_or_else(|| LumiError::NoBaseProfileAvailable {
                device: self.device.id.clone(),
            })?;
        info!("{} has no profile, attaching {}", self.device.id, standard.info());
        self.service
            .attach_profile(&self.device, &standard, Relation::Hard)?;
        Ok(standard)
    }

    /// Copies `base`'s ICC data and tags the copy with a new uuid.
    ///
    /// The stored base profile is not modified.
    pub fn clone_and_tag(&self, base: &Profile) -> LumiResult<TaggedProfile> {
        let bytes = self.service.load_icc_bytes(base)?;
        let mut data = IccProfile::from_icc(&bytes)?;
        let tag = Uuid::new_v4().to_string();
        data.add_metadata(UUID_KEY, &tag)?;
        debug!("cloned {} as {}", base.id, tag);
        Ok(TaggedProfile { data, tag })
    }

    /// Generates the ramp for `config` and embeds it in `tagged`.
    pub fn embed_curve(&self, tagged: &mut TaggedProfile, config: &Config) -> LumiResult<Curve> {
        let white = self.temperature.white_point(config.temperature_kelvin)?;
        let curve = generate(config.gamma, white, config.brightness)?;
        tagged.data.set_vcgt(&curve)?;
        Ok(curve)
    }

    /// Imports `tagged` and attaches it with a hard relation.
    ///
    /// The profile is written to `lumi-<tag>.icc` in the system temporary
    /// directory; that file is gone once this returns, whether or not the
    /// import succeeded.
    pub fn install(&self, tagged: &TaggedProfile) -> LumiResult<Profile> {
        let bytes = tagged.data.to_icc()?;
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}{}", PROFILE_PREFIX, tagged.tag))
            .suffix(".icc")
            .rand_bytes(0)
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;
        debug!("materialized {}", file.path().display());

        let imported = self.service.import_profile(file.path());
        if let Err(e) = file.close() {
            warn!("failed to remove temporary profile: {}", e);
        }
        let profile = imported?;

        self.service
            .attach_profile(&self.device, &profile, Relation::Hard)?;
        debug!("installed {} on {}", profile.id, self.device.id);
        Ok(profile)
    }

    /// Makes `profile` the device default.
    pub fn set_default(&self, profile: &Profile) -> LumiResult<()> {
        self.service.set_default(&self.device, profile)?;
        debug!("{} is now the default profile of {}", profile.id, self.device.id);
        Ok(())
    }

    /// Removes `base` if an earlier run generated it.
    ///
    /// Returns the retired profile's id. Removal failures are logged and
    /// swallowed: the new profile is already the default.
    pub fn retire_if_generated(&self, base: &Profile) -> Option<String> {
        if !base.is_generated(PROFILE_PREFIX) {
            return None;
        }
        match self.service.remove_underlying_resource(base) {
            Ok(()) => {
                info!("retired previous profile {}", base.info());
                Some(base.id.clone())
            }
            Err(e) => {
                warn!("could not retire {}: {}", base.info(), e);
                None
            }
        }
    }
}

/// Selects display `config.display_index` and performs a full swap.
pub fn apply<C: ColorService>(service: &C, config: &Config) -> LumiResult<SwapOutcome> {
    ProfileLifecycleManager::initialize(service, config.display_index)?.run(config)
}
