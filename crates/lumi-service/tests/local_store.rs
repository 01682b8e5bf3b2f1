//! Integration tests for the file-system backed service.

use lumi_icc::IccProfile;
use lumi_service::{
    ColorService, DeviceKind, LocalColorService, Relation, ServiceError, StoreConfig,
};
use lumi_vcgt::{generate, WhitePoint};
use std::path::{Path, PathBuf};

fn open(root: &Path) -> LocalColorService {
    let config = StoreConfig::new(root.join("data")).with_sysfs(root.join("drm"));
    LocalColorService::open(config).unwrap()
}

fn plug(root: &Path, connector: &str, status: &str) {
    let dir = root.join("drm").join(connector);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("status"), format!("{}\n", status)).unwrap();
}

fn display_ids(service: &LocalColorService) -> Vec<String> {
    service
        .list_display_devices()
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect()
}

fn write_profile(dir: &Path, name: &str, uuid: &str) -> PathBuf {
    let mut icc = IccProfile::srgb();
    icc.add_metadata("uuid", uuid).unwrap();
    let path = dir.join(name);
    icc.save_file(&path).unwrap();
    path
}

#[test]
fn import_attach_default_remove() {
    let root = tempfile::tempdir().unwrap();
    let service = open(root.path());
    service.register_device("xrandr-HDMI-1", DeviceKind::Display, Some("HDMI-1")).unwrap();
    let device = service.list_display_devices().unwrap().remove(0);

    let srgb = service.find_standard_profile("sRGB").unwrap().unwrap();
    service.attach_profile(&device, &srgb, Relation::Hard).unwrap();

    let staged = write_profile(root.path(), "lumi-one.icc", "one");
    let imported = service.import_profile(&staged).unwrap();
    assert!(imported.id.starts_with("icc-"));
    assert_eq!(imported.basename().as_deref(), Some("lumi-one.icc"));
    assert_eq!(imported.metadata.get("uuid").map(String::as_str), Some("one"));

    std::fs::remove_file(&staged).unwrap();
    let stored = imported.filename.clone().unwrap();
    assert!(stored.starts_with(service.config().icc_dir()));
    assert!(stored.is_file());

    service.attach_profile(&device, &imported, Relation::Hard).unwrap();
    service.set_default(&device, &imported).unwrap();
    let ids: Vec<_> = service
        .profiles_of(&device)
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, [imported.id.clone(), srgb.id.clone()]);

    service.remove_underlying_resource(&imported).unwrap();
    assert!(!stored.exists());
    let remaining = service.profiles_of(&device).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, srgb.id);

    // Second removal finds no file and does nothing.
    service.remove_underlying_resource(&imported).unwrap();
}

#[test]
fn identical_bytes_import_once() {
    let root = tempfile::tempdir().unwrap();
    let service = open(root.path());
    let path = write_profile(root.path(), "a.icc", "same");

    let first = service.import_profile(&path).unwrap();
    let second = service.import_profile(&path).unwrap();
    assert_eq!(first.id, second.id);
}

#[test]
fn name_clash_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let service = open(root.path());
    let staging_a = root.path().join("a");
    let staging_b = root.path().join("b");
    std::fs::create_dir_all(&staging_a).unwrap();
    std::fs::create_dir_all(&staging_b).unwrap();

    service
        .import_profile(&write_profile(&staging_a, "x.icc", "first"))
        .unwrap();
    let err = service
        .import_profile(&write_profile(&staging_b, "x.icc", "second"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ImportRejected { .. }));
}

#[test]
fn garbage_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let service = open(root.path());
    let path = root.path().join("junk.icc");
    std::fs::write(&path, b"not a profile").unwrap();

    let err = service.import_profile(&path).unwrap_err();
    assert!(matches!(err, ServiceError::ImportRejected { .. }));
    assert!(!service.config().icc_dir().join("junk.icc").exists());
}

#[test]
fn vcgt_is_visible_after_import() {
    let root = tempfile::tempdir().unwrap();
    let service = open(root.path());
    let mut icc = IccProfile::srgb();
    icc.set_vcgt(&generate(1.0, WhitePoint::NEUTRAL, 0.5).unwrap()).unwrap();
    let path = root.path().join("ramp.icc");
    icc.save_file(&path).unwrap();

    let profile = service.import_profile(&path).unwrap();
    let [r, g, b] = profile.vcgt.expect("vcgt");
    for channel in [r, g, b] {
        assert!((channel[511] - 0.5).abs() < 1e-3);
    }
}

#[test]
fn hand_written_registry() {
    let root = tempfile::tempdir().unwrap();
    let data = root.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("devices.yaml"),
        "devices:\n  - id: cups-Laser\n    kind: printer\n  \
         - id: xrandr-DP-3\n    kind: display\n    enabled: false\n",
    )
    .unwrap();
    let service = open(root.path());

    assert_eq!(service.list_devices().unwrap().len(), 2);
    let displays = service.list_display_devices().unwrap();
    assert_eq!(displays.len(), 1);
    assert!(!service.is_enabled(&displays[0]).unwrap());
    assert!(service.profiles_of(&displays[0]).unwrap().is_empty());
}

#[test]
fn unknown_device_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let service = open(root.path());
    let ghost = lumi_service::Device {
        id: "xrandr-ghost".into(),
        kind: DeviceKind::Display,
        model: None,
        enabled: true,
    };
    assert!(matches!(
        service.is_enabled(&ghost),
        Err(ServiceError::DeviceNotFound(_))
    ));
}

#[test]
fn unplugged_display_is_not_listed() {
    let root = tempfile::tempdir().unwrap();
    let service = open(root.path());
    service.register_device("xrandr-VIRTUAL-1", DeviceKind::Display, None).unwrap();
    plug(root.path(), "card0-DP-1", "connected");
    plug(root.path(), "card0-eDP-1", "connected");
    assert_eq!(display_ids(&service), ["xrandr-VIRTUAL-1", "xrandr-DP-1", "xrandr-eDP-1"]);

    let dp = service.list_display_devices().unwrap().remove(1);
    let srgb = service.find_standard_profile("sRGB").unwrap().unwrap();
    service.attach_profile(&dp, &srgb, Relation::Hard).unwrap();

    plug(root.path(), "card0-DP-1", "disconnected");
    assert_eq!(display_ids(&service), ["xrandr-VIRTUAL-1", "xrandr-eDP-1"]);
    assert_eq!(service.list_display_devices().unwrap()[1].id, "xrandr-eDP-1");

    // Reconnecting brings back the same record with its attachments.
    plug(root.path(), "card0-DP-1", "connected");
    assert_eq!(display_ids(&service), ["xrandr-VIRTUAL-1", "xrandr-DP-1", "xrandr-eDP-1"]);
    let ids: Vec<_> = service.profiles_of(&dp).unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, [srgb.id]);
}
