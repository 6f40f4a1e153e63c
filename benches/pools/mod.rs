//! Benchmarks for voice allocation, deferred release and fade integration.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use zonal_audio::{
    backend::sim::SimVoice,
    engine::allocator::{PoolKind, VoiceAllocator},
    playback::fade::FadeEnvelope,
};

const POOL_SIZES: &[usize] = &[16, 64, 256];

pub fn bench_allocate_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("pools/allocate_release");

    for &size in POOL_SIZES {
        let (voices, _) = SimVoice::bank(size);
        let mut alloc = VoiceAllocator::new(voices, Vec::new());

        group.bench_with_input(BenchmarkId::new("drain_refill", size), &size, |b, _| {
            b.iter(|| {
                while let Some(index) = alloc.allocate(PoolKind::OneShot) {
                    black_box(index);
                }
                for index in 0..size {
                    let _ = alloc.release(PoolKind::OneShot, black_box(index));
                }
            })
        });
    }

    group.finish();
}

pub fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("pools/sweep");

    for &size in POOL_SIZES {
        let (voices, _) = SimVoice::bank(size);
        let mut alloc = VoiceAllocator::new(voices, Vec::new());
        let mut now = 0.0;

        // Full table, half of it expiring each pass
        group.bench_with_input(BenchmarkId::new("full_table", size), &size, |b, _| {
            b.iter(|| {
                while let Some(index) = alloc.allocate(PoolKind::OneShot) {
                    let delay = if index % 2 == 0 { 0.0 } else { 1.0 };
                    let _ = alloc.schedule_release(PoolKind::OneShot, index, delay, now);
                }
                now += 0.5;
                black_box(alloc.sweep(now));
            })
        });
    }

    group.finish();
}

pub fn bench_fade(c: &mut Criterion) {
    let mut group = c.benchmark_group("pools/fade");

    let mut env = FadeEnvelope::new(2.0);
    group.bench_function("advance", |b| {
        b.iter(|| {
            if env.level() >= 0.99 {
                env.start(1.0);
            }
            black_box(env.advance(black_box(1.0), 1.0 / 90.0));
        })
    });

    group.finish();
}
