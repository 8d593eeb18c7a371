use keyframe_transfer_core::{
    apply, parse_snapshot_json, snapshot_to_json, ApplyOptions, FrameTime, KeyValue, MemoryScene,
    Snapshot, TangentShape, TangentType, TransferError,
};
use keyframe_transfer_fixtures::snapshots;

fn load(name: &str) -> Snapshot {
    let json = snapshots::json(name).expect("fixture readable");
    parse_snapshot_json(&json).unwrap_or_else(|e| panic!("{name}: {e}"))
}

#[test]
fn valid_fixtures_parse_and_reserialize_stably() {
    let valid = snapshots::valid_keys();
    assert!(valid.len() >= 3);
    for name in valid {
        let snap = load(&name);
        let text = snapshot_to_json(&snap).unwrap();
        let again = parse_snapshot_json(&text).unwrap();
        assert_eq!(again, snap, "{name}");
        assert_eq!(snapshot_to_json(&again).unwrap(), text, "{name}");
    }
}

#[test]
fn invalid_fixtures_are_rejected() {
    let valid = snapshots::valid_keys();
    let invalid: Vec<String> = snapshots::keys()
        .into_iter()
        .filter(|k| !valid.contains(k))
        .collect();
    assert_eq!(invalid, vec!["empty-nodes".to_string(), "mismatched-range".to_string()]);
    for name in invalid {
        let json = snapshots::json(&name).unwrap();
        let err = parse_snapshot_json(&json).unwrap_err();
        assert!(matches!(err, TransferError::InvalidSnapshot { .. }), "{name}: {err:?}");
    }
}

#[test]
fn two_node_arm_document_matches_serializer_output() {
    let snap = load("two-node-arm");
    let ours: serde_json::Value = serde_json::from_str(&snapshot_to_json(&snap).unwrap()).unwrap();
    let on_disk: serde_json::Value = snapshots::load("two-node-arm").unwrap();
    assert_eq!(ours, on_disk);
}

#[test]
fn two_node_arm_contents() {
    let snap = load("two-node-arm");
    assert_eq!(snap.node_order, vec!["rig:L_arm_ctrl", "rig:L_hand_ctrl"]);
    assert_eq!(snap.global_keyframe_times, vec![10.0, 14.0, 20.0]);

    let rx = &snap.nodes["rig:L_arm_ctrl"].attributes["rotateX"];
    assert_eq!(rx.current_value, KeyValue::Number(12.5));
    let k14 = &rx.samples[&FrameTime(14.0)];
    assert_eq!(k14.in_tangent, TangentType::Clamped);
    assert_eq!(
        k14.shape,
        TangentShape::Unweighted {
            in_angle: 30.5,
            out_angle: 30.5
        }
    );
    assert!(snap.nodes["rig:L_arm_ctrl"].attributes["translateY"].is_static());

    let tz = &snap.nodes["rig:L_hand_ctrl"].attributes["translateZ"];
    let k10 = &tz.samples[&FrameTime(10.0)];
    assert_eq!(k10.shape.weights(), Some((2.5, 0.75)));
    assert!(!k10.tangents_locked);
    assert_eq!(k10.out_tangent, TangentType::Linear);
}

#[test]
fn integer_time_keys_and_bool_values() {
    let snap = load("bool-stepped");
    let vis = &snap.nodes["switch_ctrl"].attributes["visibility"];
    let times: Vec<f64> = vis.times().collect();
    assert_eq!(times, vec![1.0, 12.5]);
    assert_eq!(vis.samples[&FrameTime(1.0)].value, KeyValue::Bool(true));
    assert_eq!(vis.samples[&FrameTime(12.5)].in_tangent, TangentType::StepNext);

    let text = snapshot_to_json(&snap).unwrap();
    assert!(text.contains("\"1.0\": {"));
}

#[test]
fn static_only_fixture_pastes_current_values() {
    let snap = load("static-only");
    assert!(snap.global_keyframe_times.is_empty());

    let mut scene = MemoryScene::new();
    scene.add_attribute("prop_ctrl", "translateX", 0.0);
    scene.add_attribute("prop_ctrl", "visibility", false);
    scene.set_current_time(7.0);
    let opts = ApplyOptions {
        use_current_time: true,
        ..ApplyOptions::default()
    };
    let report = apply(&mut scene, &snap, &[], &opts).unwrap();
    assert_eq!(report.offset, 0.0);
    assert_eq!(report.static_values_written, 2);
    assert_eq!(
        scene.static_value("prop_ctrl", "visibility"),
        Some(KeyValue::Bool(true))
    );
    assert!(scene.keys("prop_ctrl", "translateX").is_empty());
}

#[test]
fn duplicate_time_keys_are_rejected() {
    let doc = r#"{
        "nodes": ["a"],
        "keyframe_range": [1.0],
        "animation_data": {"a": {"tx": {"current_value": 0.0, "key_frame_data": {
            "1": {"value": 1.0, "in_tangent": "auto", "out_tangent": "auto",
                  "in_angle": 0.0, "out_angle": 0.0, "in_weight": 1.0, "out_weight": 1.0,
                  "ix": 1.0, "iy": 0.0, "ox": 1.0, "oy": 0.0,
                  "lock": true, "weight_lock": true, "weighted_tangents": false},
            "1.0": {"value": 2.0, "in_tangent": "auto", "out_tangent": "auto",
                  "in_angle": 0.0, "out_angle": 0.0, "in_weight": 1.0, "out_weight": 1.0,
                  "ix": 1.0, "iy": 0.0, "ox": 1.0, "oy": 0.0,
                  "lock": true, "weight_lock": true, "weighted_tangents": false}
        }}}}
    }"#;
    let err = parse_snapshot_json(doc).unwrap_err();
    assert!(matches!(err, TransferError::InvalidSnapshot { .. }), "{err:?}");
}
