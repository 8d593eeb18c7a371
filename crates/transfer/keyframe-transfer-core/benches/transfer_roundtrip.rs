use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyframe_transfer_core::{
    apply, capture, parse_snapshot_json, snapshot_to_json, ApplyOptions, CaptureOptions, KeyValue,
    KeyframeSample, MemoryScene, TangentType,
};

const ATTRS: [&str; 6] = ["tx", "ty", "tz", "rx", "ry", "rz"];

fn rig(nodes: usize, keys_per_curve: usize) -> (MemoryScene, Vec<String>) {
    let mut scene = MemoryScene::new();
    let names: Vec<String> = (0..nodes).map(|i| format!("ctrl_{i}")).collect();
    for name in &names {
        for attr in ATTRS {
            for k in 0..keys_per_curve {
                let t = k as f64 * 2.0;
                let sample = KeyframeSample::new(t, KeyValue::Number(t.sin()))
                    .with_tangents(TangentType::Spline, TangentType::Spline);
                scene.insert_key(name, attr, sample);
            }
        }
    }
    (scene, names)
}

fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");
    for nodes in [1usize, 16, 64] {
        let (mut scene, names) = rig(nodes, 48);
        let opts = CaptureOptions::all_keyframes();
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, _| {
            b.iter(|| black_box(capture(&mut scene, &names, &opts).unwrap()))
        });
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let (mut scene, names) = rig(16, 48);
    let snapshot = capture(&mut scene, &names, &CaptureOptions::all_keyframes()).unwrap();
    let text = snapshot_to_json(&snapshot).unwrap();

    c.bench_function("snapshot_to_json/16x6x48", |b| {
        b.iter(|| black_box(snapshot_to_json(&snapshot).unwrap()))
    });
    c.bench_function("parse_snapshot_json/16x6x48", |b| {
        b.iter(|| black_box(parse_snapshot_json(&text).unwrap()))
    });
}

fn bench_apply(c: &mut Criterion) {
    let (mut source, names) = rig(16, 48);
    let snapshot = capture(&mut source, &names, &CaptureOptions::all_keyframes()).unwrap();
    let opts = ApplyOptions {
        use_current_time: true,
        ..ApplyOptions::default()
    };
    c.bench_function("apply/16x6x48", |b| {
        b.iter_batched(
            || source.clone(),
            |mut target| {
                target.set_current_time(200.0);
                black_box(apply(&mut target, &snapshot, &names, &opts).unwrap())
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_capture, bench_codec, bench_apply);
criterion_main!(benches);
