//! Devices and profiles as seen through the service.

use lumi_icc::VcgtChannels;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Category of a color-managed device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Monitor or panel.
    Display,
    /// Printer.
    Printer,
    /// Camera.
    Camera,
    /// Scanner.
    Scanner,
    /// Anything else.
    Other,
}

/// Handle to a color-managed device.
///
/// `enabled` is the state at the time the handle was obtained; use
/// [`crate::ColorService::is_enabled`] for the live value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Service-assigned identifier, e.g. `xrandr-DP-1`.
    pub id: String,
    /// Device category.
    pub kind: DeviceKind,
    /// Human-readable model, if known.
    pub model: Option<String>,
    /// Whether color management is enabled for the device.
    pub enabled: bool,
}

/// Strength of a device-profile attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Suggested by heuristics, may be replaced automatically.
    #[default]
    Soft,
    /// Explicitly assigned, authoritative for the device.
    Hard,
}

/// An installed color profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Opaque service identifier.
    pub id: String,
    /// File backing the profile, if it still exists.
    pub filename: Option<PathBuf>,
    /// Profile description.
    pub title: String,
    /// Metadata stored in the profile.
    pub metadata: BTreeMap<String, String>,
    /// Embedded gamma table, if any.
    pub vcgt: Option<VcgtChannels>,
}

impl Profile {
    /// Returns true if `prefix` appears in the profile's filename or, when it
    /// has none, its id.
    ///
    /// This is a plain substring test. A user-renamed profile that happens to
    /// contain the prefix is treated as generated too.
    pub fn is_generated(&self, prefix: &str) -> bool {
        self.info().contains(prefix)
    }

    /// Filename if present, otherwise the id.
    pub fn info(&self) -> String {
        match &self.filename {
            Some(path) => path.display().to_string(),
            None => self.id.clone(),
        }
    }

    /// File name component, if the profile has a file.
    pub fn basename(&self) -> Option<String> {
        self.filename
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, filename: Option<&str>) -> Profile {
        Profile {
            id: id.to_string(),
            filename: filename.map(PathBuf::from),
            title: String::new(),
            metadata: BTreeMap::new(),
            vcgt: None,
        }
    }

    #[test]
    fn test_generated_by_filename() {
        let p = profile("icc-1234", Some("/home/u/.local/share/icc/lumi-abcd.icc"));
        assert!(p.is_generated("lumi-"));
        assert_eq!(p.basename().as_deref(), Some("lumi-abcd.icc"));
    }

    #[test]
    fn test_generated_by_id_without_filename() {
        assert!(profile("lumi-abcd", None).is_generated("lumi-"));
        assert!(!profile("icc-1234", None).is_generated("lumi-"));
    }

    #[test]
    fn test_filename_takes_precedence_over_id() {
        let p = profile("lumi-abcd", Some("/usr/share/color/icc/sRGB.icc"));
        assert!(!p.is_generated("lumi-"));
    }

    #[test]
    fn test_prefix_match_is_loose() {
        let p = profile("icc-1", Some("/tmp/my-lumi-backup.icc"));
        assert!(p.is_generated("lumi-"));
    }
}
