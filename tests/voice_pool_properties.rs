//! Randomized allocate/release sequences against the voice pools.

use std::collections::HashSet;

use proptest::prelude::*;
use zonal_audio::{
    backend::sim::SimVoice,
    engine::allocator::{PoolKind, VoiceAllocator, VoicePool},
};

#[derive(Debug, Clone)]
enum Op {
    Allocate,
    Release(usize),
    Schedule(usize, f32),
    Advance(f32),
}

fn op(capacity: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Allocate),
        (0..capacity + 2).prop_map(Op::Release),
        (0..capacity, 0.0f32..3.0).prop_map(|(i, d)| Op::Schedule(i, d)),
        (0.0f32..1.0).prop_map(Op::Advance),
    ]
}

fn check_pool(pool: &VoicePool) -> Result<(), TestCaseError> {
    let free: HashSet<usize> = pool.free_indices().iter().copied().collect();
    prop_assert_eq!(free.len(), pool.free_indices().len(), "duplicate free index");
    prop_assert!(pool.in_use_count() <= pool.capacity());
    prop_assert_eq!(pool.free_count() + pool.in_use_count(), pool.capacity());
    for index in free {
        prop_assert!(!pool.is_in_use(index));
    }
    Ok(())
}

proptest! {
    #[test]
    fn pool_invariants_hold(
        capacity in 1usize..8,
        ops in prop::collection::vec(op(8), 0..200),
    ) {
        let (voices, _) = SimVoice::bank(capacity);
        let mut alloc = VoiceAllocator::new(voices, Vec::new());
        let mut now = 0.0f64;

        for op in ops {
            match op {
                Op::Allocate => {
                    let before = alloc.pool(PoolKind::OneShot).free_count();
                    let got = alloc.allocate(PoolKind::OneShot);
                    if before == 0 {
                        prop_assert!(got.is_none());
                    }
                }
                Op::Release(index) => {
                    let result = alloc.release(PoolKind::OneShot, index);
                    prop_assert_eq!(result.is_err(), index >= capacity);
                }
                Op::Schedule(index, delay) => {
                    if index < capacity && alloc.pool(PoolKind::OneShot).is_in_use(index) {
                        let _ = alloc.schedule_release(PoolKind::OneShot, index, delay, now);
                    }
                }
                Op::Advance(dt) => {
                    now += f64::from(dt);
                    alloc.sweep(now);
                }
            }
            check_pool(alloc.pool(PoolKind::OneShot))?;
        }
    }

    #[test]
    fn releasing_a_free_voice_changes_nothing(capacity in 1usize..8, index in 0usize..8) {
        let (voices, _) = SimVoice::bank(capacity);
        let mut pool = VoicePool::new(PoolKind::Looping, voices);
        let index = index % capacity;
        let before = pool.free_indices().to_vec();

        prop_assert_eq!(pool.release(index), Ok(false));
        prop_assert_eq!(pool.free_indices(), &before[..]);
    }
}
