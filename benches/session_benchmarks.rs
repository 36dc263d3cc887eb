//! Benchmarks for per-frame session work

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hand_pointer::{
    geometry::ScreenSize,
    landmarks::{index, HandFrame, Landmark},
    session::{NoFrames, Session},
    touch::TouchDetector,
};
use std::time::{Duration, Instant};

/// Hand drifting across the frame with a pinch every 20 frames
fn hand_sequence(len: usize) -> Vec<HandFrame> {
    (0..len)
        .map(|i| {
            let t = i as f64 * 0.05;
            let x = 0.5 + 0.3 * t.sin() + 0.01 * rand::random::<f64>();
            let y = 0.5 + 0.2 * t.cos() + 0.01 * rand::random::<f64>();
            let gap = if i % 20 < 3 { 0.01 } else { 0.15 };
            let z = 0.02 + 0.03 * rand::random::<f64>();

            let mut landmarks = vec![Landmark::new(x, y, 0.2); 21];
            landmarks[index::INDEX_FINGER_TIP] = Landmark::new(x, y, z);
            landmarks[index::THUMB_TIP] = Landmark::new(x + gap, y, 0.2);
            HandFrame::new(landmarks)
        })
        .collect()
}

fn benchmark_session_tick(c: &mut Criterion) {
    let hands = hand_sequence(100);
    let period = Duration::from_secs(1) / 60;

    c.bench_function("session_tick_100_frames", |b| {
        b.iter(|| {
            let mut session = Session::with_defaults(ScreenSize::new(1920.0, 1080.0));
            let mut now = Instant::now();
            for hand in &hands {
                black_box(session.tick(now, Some(black_box(hand)), &mut NoFrames));
                now += period;
            }
        });
    });
}

fn benchmark_touch_detector(c: &mut Criterion) {
    let hands = hand_sequence(100);

    c.bench_function("touch_update_100_frames", |b| {
        b.iter(|| {
            let mut detector = TouchDetector::default();
            for hand in &hands {
                black_box(detector.update(Some(black_box(hand))));
            }
        });
    });
}

criterion_group!(benches, benchmark_session_tick, benchmark_touch_detector);
criterion_main!(benches);
