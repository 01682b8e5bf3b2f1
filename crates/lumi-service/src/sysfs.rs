//! Display discovery from DRM connectors in sysfs.

use crate::{ServiceError, ServiceResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A connected DRM connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    /// Card the connector belongs to, e.g. `card0`.
    pub card: String,
    /// Connector name, e.g. `DP-1`.
    pub name: String,
}

impl Connector {
    /// Service device id for this connector.
    pub fn device_id(&self) -> String {
        format!("xrandr-{}", self.name)
    }
}

/// Lists connectors under `root` (normally `/sys/class/drm`) whose status is
/// `connected`, sorted by card and name.
///
/// A missing `root` yields an empty list.
pub fn connected_displays(root: &Path) -> ServiceResult<Vec<Connector>> {
    if !root.is_dir() {
        debug!("no DRM sysfs at {}", root.display());
        return Ok(Vec::new());
    }

    let pattern = root.join("card*-*").join("status");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| ServiceError::Discovery(format!("non UTF-8 path {}", root.display())))?;
    let entries = glob::glob(pattern).map_err(|e| ServiceError::Discovery(e.to_string()))?;

    let re = Regex::new(r"^(card\d+)-(.+)$").map_err(|e| ServiceError::Discovery(e.to_string()))?;
    let mut found = Vec::new();
    for entry in entries {
        let status_path: PathBuf = entry.map_err(|e| ServiceError::Discovery(e.to_string()))?;
        let Some(dir_name) = status_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        else {
            continue;
        };
        let Some(caps) = re.captures(dir_name) else {
            continue;
        };
        let status = std::fs::read_to_string(&status_path)?;
        trace!("{}: {}", dir_name, status.trim());
        if status.trim() == "connected" {
            found.push(Connector {
                card: caps[1].to_string(),
                name: caps[2].to_string(),
            });
        }
    }

    found.sort_by(|a, b| (&a.card, &a.name).cmp(&(&b.card, &b.name)));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn connector(root: &Path, dir: &str, status: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("status"), format!("{}\n", status)).unwrap();
    }

    #[test]
    fn test_lists_connected_only() {
        let root = tempfile::tempdir().unwrap();
        connector(root.path(), "card0-HDMI-A-1", "disconnected");
        connector(root.path(), "card0-eDP-1", "connected");
        connector(root.path(), "card0-DP-2", "connected");
        fs::create_dir_all(root.path().join("renderD128")).unwrap();

        let found = connected_displays(root.path()).unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["DP-2", "eDP-1"]);
        assert_eq!(found[0].card, "card0");
        assert_eq!(found[0].device_id(), "xrandr-DP-2");
    }

    #[test]
    fn test_missing_root() {
        let root = tempfile::tempdir().unwrap();
        let found = connected_displays(&root.path().join("nope")).unwrap();
        assert!(found.is_empty());
    }
}
