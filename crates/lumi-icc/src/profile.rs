//! ICC profile data held in memory.

use crate::{IccError, IccResult, StandardProfile};
use lcms2::{
    InfoType, Locale, MLU, Profile as LcmsProfile, Tag, TagSignature, ToneCurve, ToneCurveRef,
};
use lumi_vcgt::{Curve, VCGT_SAMPLES};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};

/// Per-channel VCGT values read back from a profile, resampled to
/// [`VCGT_SAMPLES`] points.
pub type VcgtChannels = [Vec<f32>; 3];

/// An ICC profile loaded into memory for inspection and editing.
///
/// Mutations (metadata, VCGT) only touch this copy. Nothing reaches disk until
/// [`IccProfile::save_file`] or [`IccProfile::to_icc`] is used.
///
/// Metadata entries are kept as `key=value` lines in the characterization
/// target text tag, so they survive serialization.
///
/// # Example
///
/// ```rust
/// use lumi_icc::IccProfile;
///
/// let mut profile = IccProfile::srgb();
/// profile.add_metadata("uuid", "0f1e2d3c").unwrap();
///
/// let bytes = profile.to_icc().unwrap();
/// let reloaded = IccProfile::from_icc(&bytes).unwrap();
/// assert_eq!(reloaded.metadata_value("uuid"), Some("0f1e2d3c"));
/// ```
pub struct IccProfile {
    inner: LcmsProfile,
    metadata: BTreeMap<String, String>,
}

impl IccProfile {
    /// Parses a profile from raw ICC bytes.
    pub fn from_icc(data: &[u8]) -> IccResult<Self> {
        let inner = LcmsProfile::new_icc(data)
            .map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Ok(Self::wrap(inner))
    }

    /// Loads a profile from an `.icc`/`.icm` file.
    pub fn from_file(path: &Path) -> IccResult<Self> {
        let inner = LcmsProfile::new_file(path)
            .map_err(|e| IccError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(Self::wrap(inner))
    }

    /// The built-in IEC 61966-2-1 sRGB profile.
    pub fn srgb() -> Self {
        StandardProfile::Srgb.to_profile()
    }

    pub(crate) fn wrap(inner: LcmsProfile) -> Self {
        let metadata = read_metadata(&inner);
        trace!(entries = metadata.len(), "loaded profile metadata");
        Self { inner, metadata }
    }

    /// Profile description, empty if the profile carries none.
    pub fn description(&self) -> String {
        self.inner
            .info(InfoType::Description, Locale::none())
            .unwrap_or_default()
    }

    /// All metadata entries, sorted by key.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Value stored under `key`.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Adds or replaces a metadata entry.
    pub fn add_metadata(&mut self, key: &str, value: &str) -> IccResult<()> {
        if key.is_empty() || key.contains(['=', '\n']) {
            return Err(IccError::InvalidMetadata(key.to_string()));
        }
        if value.contains('\n') {
            return Err(IccError::InvalidMetadata(value.to_string()));
        }
        self.metadata.insert(key.to_string(), value.to_string());
        self.write_metadata()
    }

    fn write_metadata(&mut self) -> IccResult<()> {
        let text: String = self
            .metadata
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect();
        let mut mlu = MLU::new(1);
        if !mlu.set_text_ascii(&text, Locale::none()) {
            return Err(IccError::TagWriteFailed { tag: "targ" });
        }
        if self.inner.write_tag(TagSignature::CharTargetTag, Tag::MLU(&mlu)) {
            Ok(())
        } else {
            Err(IccError::TagWriteFailed { tag: "targ" })
        }
    }

    /// Replaces the `vcgt` tag with `curve`.
    pub fn set_vcgt(&mut self, curve: &Curve) -> IccResult<()> {
        let [r, g, b] = [0, 1, 2].map(|c| {
            let values: Vec<f32> = curve.channel(c).into_iter().map(|v| v as f32).collect();
            ToneCurve::new_tabulated_float(&values)
        });
        let curves: [&ToneCurveRef; 3] = [&r, &g, &b];
        debug!(samples = curve.len(), "writing vcgt tag");
        if self.inner.write_tag(TagSignature::VcgtTag, Tag::VcgtCurves(curves)) {
            Ok(())
        } else {
            Err(IccError::TagWriteFailed { tag: "vcgt" })
        }
    }

    /// Returns the stored `vcgt` ramp, if any.
    pub fn vcgt(&self) -> Option<VcgtChannels> {
        match self.inner.read_tag(TagSignature::VcgtTag) {
            Tag::VcgtCurves(curves) => Some(curves.map(|curve| {
                (0..VCGT_SAMPLES)
                    .map(|i| curve.eval(i as f32 / (VCGT_SAMPLES - 1) as f32))
                    .collect()
            })),
            _ => None,
        }
    }

    /// Returns true if this is an RGB profile.
    pub fn is_rgb(&self) -> bool {
        matches!(self.inner.color_space(), lcms2::ColorSpaceSignature::RgbData)
    }

    /// Serializes the profile to ICC bytes.
    pub fn to_icc(&self) -> IccResult<Vec<u8>> {
        self.inner
            .icc()
            .map_err(|e| IccError::SaveFailed(e.to_string()))
    }

    /// Writes the profile to `path`, without any special save flags.
    pub fn save_file(&self, path: &Path) -> IccResult<()> {
        let data = self.to_icc()?;
        std::fs::write(path, data)?;
        debug!("saved profile to {}", path.display());
        Ok(())
    }

    /// Deep copy through serialization.
    pub fn try_clone(&self) -> IccResult<Self> {
        Self::from_icc(&self.to_icc()?)
    }
}

fn read_metadata(profile: &LcmsProfile) -> BTreeMap<String, String> {
    let text = match profile.read_tag(TagSignature::CharTargetTag) {
        Tag::MLU(mlu) => mlu.text(Locale::none()).unwrap_or_default(),
        _ => return BTreeMap::new(),
    };
    text.lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl std::fmt::Debug for IccProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IccProfile")
            .field("description", &self.description())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lumi_vcgt::{generate, WhitePoint};

    #[test]
    fn test_srgb() {
        let profile = IccProfile::srgb();
        assert!(profile.is_rgb());
        assert!(!profile.description().is_empty());
        assert!(profile.metadata().is_empty());
        assert!(profile.vcgt().is_none());
    }

    #[test]
    fn test_metadata_survives_serialization() {
        let mut profile = IccProfile::srgb();
        profile.add_metadata("uuid", "abc-123").unwrap();
        profile.add_metadata("CMF_product", "lumi").unwrap();
        profile.add_metadata("uuid", "def-456").unwrap();

        let reloaded = IccProfile::from_icc(&profile.to_icc().unwrap()).unwrap();
        assert_eq!(reloaded.metadata_value("uuid"), Some("def-456"));
        assert_eq!(reloaded.metadata_value("CMF_product"), Some("lumi"));
        assert_eq!(reloaded.metadata().len(), 2);
    }

    #[test]
    fn test_rejects_bad_metadata() {
        let mut profile = IccProfile::srgb();
        assert!(profile.add_metadata("", "x").is_err());
        assert!(profile.add_metadata("a=b", "x").is_err());
        assert!(profile.add_metadata("key", "two\nlines").is_err());
        assert!(profile.metadata().is_empty());
    }

    #[test]
    fn test_vcgt_survives_serialization() {
        let curve = generate(1.0, WhitePoint::new(1.0, 0.8, 0.5), 0.6).unwrap();
        let mut profile = IccProfile::srgb();
        profile.set_vcgt(&curve).unwrap();

        let reloaded = IccProfile::from_icc(&profile.to_icc().unwrap()).unwrap();
        let [r, g, b] = reloaded.vcgt().expect("vcgt tag");
        assert_eq!(r.len(), VCGT_SAMPLES);
        assert_relative_eq!(r[0], 0.0, epsilon = 1e-3);
        assert_relative_eq!(r[511], 0.6, epsilon = 1e-3);
        assert_relative_eq!(g[511], 0.48, epsilon = 1e-3);
        assert_relative_eq!(b[511], 0.3, epsilon = 1e-3);
        assert_relative_eq!(r[255], 0.6 * 255.0 / 511.0, epsilon = 5e-3);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = IccProfile::srgb();
        let mut copy = original.try_clone().unwrap();
        copy.add_metadata("uuid", "x").unwrap();
        assert!(original.metadata().is_empty());
        assert_eq!(copy.description(), original.description());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagged.icc");

        let mut profile = IccProfile::srgb();
        profile.add_metadata("uuid", "file-test").unwrap();
        profile.save_file(&path).unwrap();

        let loaded = IccProfile::from_file(&path).unwrap();
        assert_eq!(loaded.metadata_value("uuid"), Some("file-test"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(IccProfile::from_icc(b"definitely not icc").is_err());
    }
}
