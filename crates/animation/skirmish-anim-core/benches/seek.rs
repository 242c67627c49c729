use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use skirmish_anim_core::{decode, PlaybackInstance, SeekTarget};
use skirmish_test_fixtures::three_part_rig;

fn bench_seek(c: &mut Criterion) {
    let asset = Arc::new(decode(&three_part_rig()).unwrap());

    c.bench_function("seek_three_part_rig", |b| {
        let mut instance = PlaybackInstance::new(Arc::clone(&asset));
        instance.looping = true;
        let mut events = Vec::new();
        let mut t = 0.0f32;
        b.iter(|| {
            t = (t + 0.016) % 1.0;
            events.clear();
            instance.seek(SeekTarget::Absolute(t), &mut events);
            criterion::black_box(instance.snapshot(2));
        });
    });

    c.bench_function("decode_three_part_rig", |b| {
        let bytes = three_part_rig();
        b.iter(|| decode(criterion::black_box(&bytes)).unwrap());
    });
}

criterion_group!(benches, bench_seek);
criterion_main!(benches);
