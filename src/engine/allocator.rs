//! Voice pools and the allocator that owns them.
//!
//! Each pool keeps a LIFO stack of free indices next to an in-use table, so
//! allocate and release are O(1) with no scanning. The allocator pairs the
//! one-shot and looping pools with a [`ReleaseScheduler`] that hands one-shot
//! voices back once their clip has run out.

use std::fmt;

use tracing::{debug, warn};

use super::scheduler::ReleaseScheduler;
use crate::{
    backend::{ClipHandle, Voice},
    error::AudioError,
};

/// Which pool a voice lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    OneShot,
    Looping,
}

impl PoolKind {
    pub fn for_looping(looping: bool) -> Self {
        if looping {
            PoolKind::Looping
        } else {
            PoolKind::OneShot
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::OneShot => f.write_str("one-shot"),
            PoolKind::Looping => f.write_str("looping"),
        }
    }
}

/// Address of one voice: pool plus index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceSlot {
    pub pool: PoolKind,
    pub index: usize,
}

impl fmt::Display for VoiceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.pool, self.index)
    }
}

/// A voice slot as seen by whoever allocated it.
///
/// The generation pins the lease to one allocation: once the voice is
/// released (by its owner, the release sweep or the idle fallback) the lease
/// goes stale and no longer reaches the voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceLease {
    pub slot: VoiceSlot,
    generation: u32,
}

/// A fixed set of voices with O(1) allocate/release.
pub struct VoicePool {
    kind: PoolKind,
    voices: Vec<Box<dyn Voice>>,
    in_use: Vec<bool>,
    generations: Vec<u32>,
    free: Vec<usize>,
}

impl VoicePool {
    pub fn new(kind: PoolKind, voices: Vec<Box<dyn Voice>>) -> Self {
        let capacity = voices.len();
        // Lowest index on top of the stack
        let mut free = Vec::with_capacity(capacity);
        free.extend((0..capacity).rev());

        Self {
            kind,
            voices,
            in_use: vec![false; capacity],
            generations: vec![0; capacity],
            free,
        }
    }

    /// Pop a free voice. `None` when the pool is exhausted; the pool is left untouched.
    pub fn allocate(&mut self) -> Option<usize> {
        let index = self.free.pop()?;
        debug_assert!(!self.in_use[index], "free stack held an in-use voice");

        self.in_use[index] = true;
        self.generations[index] = self.generations[index].wrapping_add(1);
        Some(index)
    }

    /// Stop the voice, clear its clip and push it back on the free stack.
    ///
    /// Returns `Ok(false)` if the voice was already free.
    pub fn release(&mut self, index: usize) -> Result<bool, AudioError> {
        if index >= self.voices.len() {
            return Err(AudioError::VoiceOutOfBounds {
                pool: self.kind,
                index,
                capacity: self.voices.len(),
            });
        }
        if !self.in_use[index] {
            return Ok(false);
        }

        self.in_use[index] = false;
        let voice = &mut self.voices[index];
        voice.stop();
        voice.set_clip(None);

        self.free.push(index);
        debug_assert!(self.free.len() <= self.voices.len());
        Ok(true)
    }

    /// First voice that is allocated but no longer playing.
    pub fn first_idle_in_use(&self) -> Option<usize> {
        (0..self.voices.len()).find(|&i| self.in_use[i] && !self.voices[i].is_playing())
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn in_use_count(&self) -> usize {
        self.voices.len() - self.free.len()
    }

    pub fn is_in_use(&self, index: usize) -> bool {
        self.in_use.get(index).copied().unwrap_or(false)
    }

    /// Free indices, bottom of the stack first.
    pub fn free_indices(&self) -> &[usize] {
        &self.free
    }

    pub fn voice(&self, index: usize) -> Option<&(dyn Voice + 'static)> {
        self.voices.get(index).map(|v| v.as_ref())
    }

    pub fn voice_mut(&mut self, index: usize) -> Option<&mut (dyn Voice + 'static)> {
        self.voices.get_mut(index).map(|v| v.as_mut())
    }

    fn generation(&self, index: usize) -> Option<u32> {
        self.generations.get(index).copied()
    }
}

/// The one-shot and looping pools plus their deferred-release table.
pub struct VoiceAllocator {
    one_shot: VoicePool,
    looping: VoicePool,
    releases: ReleaseScheduler,
    /// Schedule requests that overflowed the table and still need an idle voice reclaimed
    fallback_pending: usize,
}

impl VoiceAllocator {
    pub fn new(one_shot: Vec<Box<dyn Voice>>, looping: Vec<Box<dyn Voice>>) -> Self {
        let releases = ReleaseScheduler::new(one_shot.len() + looping.len());
        Self {
            one_shot: VoicePool::new(PoolKind::OneShot, one_shot),
            looping: VoicePool::new(PoolKind::Looping, looping),
            releases,
            fallback_pending: 0,
        }
    }

    pub fn pool(&self, kind: PoolKind) -> &VoicePool {
        match kind {
            PoolKind::OneShot => &self.one_shot,
            PoolKind::Looping => &self.looping,
        }
    }

    fn pool_mut(&mut self, kind: PoolKind) -> &mut VoicePool {
        match kind {
            PoolKind::OneShot => &mut self.one_shot,
            PoolKind::Looping => &mut self.looping,
        }
    }

    pub fn releases(&self) -> &ReleaseScheduler {
        &self.releases
    }

    pub fn allocate(&mut self, kind: PoolKind) -> Option<usize> {
        self.pool_mut(kind).allocate()
    }

    /// Allocate and wrap the result in a generation-checked lease.
    pub fn lease(&mut self, kind: PoolKind) -> Option<VoiceLease> {
        let pool = self.pool_mut(kind);
        let index = pool.allocate()?;
        let generation = pool.generation(index)?;
        Some(VoiceLease {
            slot: VoiceSlot { pool: kind, index },
            generation,
        })
    }

    /// Whether `lease` still refers to the allocation it was issued for.
    pub fn is_current(&self, lease: VoiceLease) -> bool {
        let pool = self.pool(lease.slot.pool);
        pool.is_in_use(lease.slot.index) && pool.generation(lease.slot.index) == Some(lease.generation)
    }

    pub fn voice(&self, lease: VoiceLease) -> Option<&(dyn Voice + 'static)> {
        if !self.is_current(lease) {
            return None;
        }
        self.pool(lease.slot.pool).voice(lease.slot.index)
    }

    pub fn voice_mut(&mut self, lease: VoiceLease) -> Option<&mut (dyn Voice + 'static)> {
        if !self.is_current(lease) {
            return None;
        }
        self.pool_mut(lease.slot.pool).voice_mut(lease.slot.index)
    }

    /// Return a voice to its pool, dropping any pending scheduled release for it.
    pub fn release(&mut self, kind: PoolKind, index: usize) -> Result<bool, AudioError> {
        let released = self.pool_mut(kind).release(index)?;
        if released {
            self.releases.cancel(VoiceSlot { pool: kind, index });
        }
        Ok(released)
    }

    /// Release through a lease; stale leases are a no-op.
    pub fn release_lease(&mut self, lease: VoiceLease) -> bool {
        if !self.is_current(lease) {
            debug!(slot = %lease.slot, "lease already stale, nothing to release");
            return false;
        }
        self.release(lease.slot.pool, lease.slot.index).unwrap_or(false)
    }

    /// Release `index` once `delay` seconds (clamped at zero) past `now` have elapsed.
    ///
    /// When the table is full the request is not lost: the next sweeps reclaim
    /// the first allocated voice that has stopped playing instead.
    pub fn schedule_release(
        &mut self,
        kind: PoolKind,
        index: usize,
        delay: f32,
        now: f64,
    ) -> Result<(), AudioError> {
        let pool = self.pool(kind);
        if index >= pool.capacity() {
            return Err(AudioError::VoiceOutOfBounds {
                pool: kind,
                index,
                capacity: pool.capacity(),
            });
        }

        let deadline = now + f64::from(delay.max(0.0));
        match self.releases.enqueue(VoiceSlot { pool: kind, index }, deadline) {
            Err(AudioError::ScheduleFull) => {
                warn!(pool = %kind, index, "release table full, falling back to idle sweep");
                self.fallback_pending += 1;
                Err(AudioError::ScheduleFull)
            }
            other => other,
        }
    }

    /// Per-frame sweep: fire expired releases, then run one idle fallback pass if owed.
    pub fn sweep(&mut self, now: f64) -> usize {
        let Self {
            one_shot,
            looping,
            releases,
            ..
        } = self;

        let mut released = 0;
        releases.tick(now, |slot| {
            let pool = match slot.pool {
                PoolKind::OneShot => &mut *one_shot,
                PoolKind::Looping => &mut *looping,
            };
            if let Ok(true) = pool.release(slot.index) {
                released += 1;
            }
        });

        if self.fallback_pending > 0 {
            if let Some(slot) = self.release_first_idle() {
                debug!(%slot, "fallback release reclaimed an idle voice");
                self.fallback_pending -= 1;
                released += 1;
            }
        }
        released
    }

    /// Release the first allocated-but-silent voice, one-shot pool first.
    pub fn release_first_idle(&mut self) -> Option<VoiceSlot> {
        for kind in [PoolKind::OneShot, PoolKind::Looping] {
            if let Some(index) = self.pool(kind).first_idle_in_use() {
                if let Ok(true) = self.release(kind, index) {
                    return Some(VoiceSlot { pool: kind, index });
                }
            }
        }
        None
    }

    /// Release the first looping voice that is playing `clip`.
    pub(crate) fn release_looping_clip(&mut self, clip: ClipHandle) -> bool {
        let pool = &self.looping;
        let found = (0..pool.capacity()).find(|&i| {
            pool.is_in_use(i)
                && pool
                    .voice(i)
                    .is_some_and(|v| v.clip() == Some(clip) && v.is_playing())
        });
        match found {
            Some(index) => self.release(PoolKind::Looping, index).unwrap_or(false),
            None => false,
        }
    }

    pub fn fallback_pending(&self) -> usize {
        self.fallback_pending
    }
}
