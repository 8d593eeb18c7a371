use keyframe_transfer_core::{
    FrameRange, KeyValue, KeyframeSample, KeyframeTransfer, MemoryScene, MemoryStore,
    SnapshotStore, TransferConfig, TransferError,
};
use keyframe_transfer_fixtures::configs;

fn key(t: f64, v: f64) -> KeyframeSample {
    KeyframeSample::new(t, KeyValue::Number(v))
}

fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn rig() -> MemoryScene {
    let mut s = MemoryScene::new();
    for (t, v) in [(10.0, 0.0), (14.0, 45.0), (20.0, 90.0)] {
        s.insert_key("rig:L_arm_ctrl", "rotateX", key(t, v));
    }
    s.add_attribute("rig:L_arm_ctrl", "translateY", 2.0);
    s.add_attribute("rig:R_arm_ctrl", "rotateX", 0.0);
    s.add_attribute("rig:R_arm_ctrl", "translateY", 0.0);
    s
}

fn times(scene: &MemoryScene, node: &str, attr: &str) -> Vec<f64> {
    scene.keys(node, attr).into_iter().map(|k| k.time).collect()
}

fn memory_transfer(config: TransferConfig) -> KeyframeTransfer<MemoryStore> {
    KeyframeTransfer::new(MemoryStore::new(), config)
}

#[test]
fn copy_selection_then_paste_at_current_frame() {
    let mut scene = rig();
    let mut transfer = memory_transfer(TransferConfig::default());

    scene.select(["rig:L_arm_ctrl"]);
    let summary = transfer.copy(&mut scene, None).unwrap();
    assert_eq!(summary.nodes, names(&["rig:L_arm_ctrl"]));
    assert_eq!(summary.attributes, 2);
    assert_eq!(summary.keys, 3);
    assert_eq!(summary.keyframe_span, Some((10.0, 20.0)));
    assert!(transfer.store().document().is_some());

    scene.select(["rig:R_arm_ctrl"]);
    scene.set_current_time(50.0);
    let report = transfer.paste(&mut scene, None).unwrap();
    assert!(report.is_clean());
    assert_eq!(times(&scene, "rig:R_arm_ctrl", "rotateX"), vec![50.0, 54.0, 60.0]);
    assert_eq!(
        scene.static_value("rig:R_arm_ctrl", "translateY"),
        Some(KeyValue::Number(2.0))
    );
}

#[test]
fn paste_before_any_copy_reports_no_snapshot() {
    let mut scene = rig();
    let transfer = memory_transfer(TransferConfig::default());
    let err = transfer.paste(&mut scene, None).unwrap_err();
    assert_eq!(err, TransferError::NoSnapshotAvailable);
    assert!(err.is_user_correctable());
}

#[test]
fn copy_with_nothing_selected_leaves_store_untouched() {
    let mut scene = rig();
    let mut transfer = memory_transfer(TransferConfig::default());
    let err = transfer.copy(&mut scene, None).unwrap_err();
    assert_eq!(err, TransferError::EmptySelection);
    assert_eq!(transfer.store().load().unwrap(), None);
}

#[test]
fn empty_selection_pastes_back_onto_stored_nodes() {
    let mut scene = rig();
    let mut transfer = memory_transfer(TransferConfig::default());
    transfer
        .copy(&mut scene, Some(&names(&["rig:L_arm_ctrl"])))
        .unwrap();

    let mut target = rig();
    target.attribute_mut("rig:L_arm_ctrl", "rotateX").unwrap().keys.clear();
    target.set_current_time(1.0);
    transfer.paste(&mut target, None).unwrap();
    assert_eq!(times(&target, "rig:L_arm_ctrl", "rotateX"), vec![1.0, 5.0, 11.0]);
    assert!(target.keys("rig:R_arm_ctrl", "rotateX").is_empty());
}

#[test]
fn explicit_targets_override_selection() {
    let mut scene = rig();
    let mut transfer = memory_transfer(TransferConfig::default());
    transfer
        .copy(&mut scene, Some(&names(&["rig:L_arm_ctrl"])))
        .unwrap();
    scene.select(["rig:L_arm_ctrl"]);
    transfer.config_mut().paste.use_current_time = false;
    transfer
        .paste(&mut scene, Some(&names(&["rig:R_arm_ctrl"])))
        .unwrap();
    assert_eq!(times(&scene, "rig:R_arm_ctrl", "rotateX"), vec![10.0, 14.0, 20.0]);
}

#[test]
fn mirror_config_renames_stored_nodes() {
    let config = TransferConfig::from_json_str(&configs::json("mirror-paste").unwrap()).unwrap();
    assert_eq!(config.paste.substitution(), Some(("L_", "R_")));

    let mut scene = rig();
    scene.set_selected_key_range(FrameRange::new(0.0, 1.0));
    let mut transfer = memory_transfer(config);
    // all_keyframes ignores the narrow key range
    let summary = transfer
        .copy(&mut scene, Some(&names(&["rig:L_arm_ctrl"])))
        .unwrap();
    assert_eq!(summary.keys, 3);

    // use_selection is off, so the selection is ignored
    scene.select(["rig:L_arm_ctrl"]);
    scene.set_current_time(99.0);
    let report = transfer.paste(&mut scene, None).unwrap();
    assert_eq!(report.applied_nodes[0].target, "rig:R_arm_ctrl");
    assert_eq!(report.applied_nodes[0].source, "rig:L_arm_ctrl");
    assert_eq!(times(&scene, "rig:R_arm_ctrl", "rotateX"), vec![10.0, 14.0, 20.0]);
}

#[test]
fn reverse_setting_reaches_apply() {
    let mut scene = rig();
    let mut config = TransferConfig::default();
    config.paste.reverse = true;
    config.paste.use_current_time = false;
    let mut transfer = memory_transfer(config);
    transfer
        .copy(&mut scene, Some(&names(&["rig:L_arm_ctrl"])))
        .unwrap();
    transfer
        .paste(&mut scene, Some(&names(&["rig:R_arm_ctrl"])))
        .unwrap();
    let values: Vec<f64> = scene
        .keys("rig:R_arm_ctrl", "rotateX")
        .into_iter()
        .map(|k| k.value.as_f64())
        .collect();
    assert_eq!(values, vec![90.0, 45.0, 0.0]);
}

#[test]
fn file_backed_transfer_survives_new_instance() {
    let dir = tempfile::tempdir().unwrap();
    let config = TransferConfig {
        snapshot_dir: dir.path().join("user_data"),
        ..TransferConfig::default()
    };
    let path = config.snapshot_path();

    let mut scene = rig();
    KeyframeTransfer::from_config(config.clone())
        .copy(&mut scene, Some(&names(&["rig:L_arm_ctrl"])))
        .unwrap();
    assert!(path.exists());

    let later = KeyframeTransfer::from_config(config);
    assert_eq!(later.store().path(), path.as_path());
    later
        .paste(&mut scene, Some(&names(&["rig:R_arm_ctrl"])))
        .unwrap();
    assert_eq!(times(&scene, "rig:R_arm_ctrl", "rotateX").len(), 3);
}
