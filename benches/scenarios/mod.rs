//! Whole-engine frame benchmarks.
//!
//! A row of zones, each with a looping ambience proxy, walked through by a
//! simulated avatar.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use glam::Vec3;
use zonal_audio::{
    backend::sim::{SimAvatar, SimVoice},
    prelude::*,
};

use crate::ZONE_COUNTS;

fn build(zones: usize, avatar: &SimAvatar) -> AudioEngine {
    let (one_shot, _) = SimVoice::bank(16);
    let (looping, _) = SimVoice::bank(zones.max(5));
    let mut engine = AudioEngine::builder()
        .one_shot_voices(one_shot)
        .looping_voices(looping)
        .clips(ClipBank::new().with_clip("ambience", 20.0))
        .position(avatar.clone())
        .build();

    for i in 0..zones {
        let proxy = engine.add_proxy(ProxyConfig {
            looping: true,
            ..ProxyConfig::new("ambience")
        });
        let center = Vec3::new(i as f32 * 10.0, 0.0, 0.0);
        engine.add_zone(ZoneConfig {
            bounds: Some(ZoneBounds::from_center_size(center, Vec3::splat(8.0))),
            enter_delay: 0.05,
            exit_delay: 0.05,
            fade_in_duration: 0.5,
            fade_out_duration: 0.5,
            ..ZoneConfig::new(format!("zone {i}"), vec![proxy])
        });
    }
    engine
}

pub fn bench_idle_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/idle");

    for &zones in ZONE_COUNTS {
        let avatar = SimAvatar::at(Vec3::new(0.0, 0.0, 500.0));
        let mut engine = build(zones, &avatar);
        let mut clock = FrameClock::new();

        group.bench_with_input(BenchmarkId::new("tick", zones), &zones, |b, _| {
            b.iter(|| engine.tick(black_box(clock.advance(1.0 / 90.0))))
        });
    }

    group.finish();
}

pub fn bench_busy_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/walk");

    for &zones in ZONE_COUNTS {
        let avatar = SimAvatar::at(Vec3::ZERO);
        let mut engine = build(zones, &avatar);
        let mut clock = FrameClock::new();
        let span = zones as f32 * 10.0;
        let mut x = 0.0f32;

        // Avatar walks the row at 20 m/s, wrapping at the end
        group.bench_with_input(BenchmarkId::new("tick", zones), &zones, |b, _| {
            b.iter(|| {
                x = (x + 20.0 / 90.0) % span;
                avatar.move_to(Vec3::new(x, 0.0, 0.0));
                engine.tick(black_box(clock.advance(1.0 / 90.0)));
            })
        });
    }

    group.finish();
}
