//! Standard profiles the service can hand out when a device has none.

use crate::IccProfile;
use lcms2::Profile as LcmsProfile;

/// Well-known RGB profiles that can be synthesized without a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardProfile {
    /// IEC 61966-2-1 sRGB.
    Srgb,
}

impl StandardProfile {
    /// All known standards.
    pub const ALL: [StandardProfile; 1] = [StandardProfile::Srgb];

    /// Canonical short name, also the file stem used on disk.
    pub fn name(self) -> &'static str {
        match self {
            StandardProfile::Srgb => "sRGB",
        }
    }

    /// File name the profile is stored under, e.g. `sRGB.icc`.
    pub fn filename(self) -> String {
        format!("{}.icc", self.name())
    }

    /// Case-insensitive lookup by short name or file name.
    pub fn from_name(name: &str) -> Option<Self> {
        let stem = name
            .strip_suffix(".icc")
            .or_else(|| name.strip_suffix(".icm"))
            .unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(stem))
    }

    /// Creates the ICC profile for this standard.
    pub fn to_profile(self) -> IccProfile {
        let inner = match self {
            StandardProfile::Srgb => LcmsProfile::new_srgb(),
        };
        IccProfile::wrap(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_standards() {
        for std in StandardProfile::ALL {
            let profile = std.to_profile();
            assert!(profile.is_rgb(), "{:?} should be RGB", std);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(StandardProfile::from_name("sRGB"), Some(StandardProfile::Srgb));
        assert_eq!(StandardProfile::from_name("srgb.icc"), Some(StandardProfile::Srgb));
        assert_eq!(StandardProfile::from_name("AdobeRGB1998"), None);
        assert_eq!(StandardProfile::from_name("ProPhoto"), None);
    }
}
