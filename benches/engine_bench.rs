//! Benchmarks for the voice pools and full engine frames.
//!
//! Run with: cargo bench
//!
//! Everything here runs once per game frame, so the budget is a small slice
//! of a 16.7 ms (60 Hz) or 11.1 ms (90 Hz) frame.
//!
//! Benchmark groups:
//!   - pools/*      Allocate/release and the deferred-release sweep
//!   - scenarios/*  Whole-engine ticks with many zones and proxies

use criterion::{criterion_group, criterion_main};

mod pools;
mod scenarios;

/// Zone counts used by the scenario benches.
pub const ZONE_COUNTS: &[usize] = &[8, 32, 128];

criterion_group!(
    benches,
    pools::bench_allocate_release,
    pools::bench_sweep,
    pools::bench_fade,
    scenarios::bench_idle_frames,
    scenarios::bench_busy_frames,
);
criterion_main!(benches);
