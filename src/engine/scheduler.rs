use std::collections::HashMap;

use super::allocator::VoiceSlot;
use crate::error::AudioError;

/// Smallest release table the engine will build, whatever the pool sizes.
pub const MIN_SCHEDULE_CAPACITY: usize = 16;

/// A voice waiting to be returned to its pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledRelease {
    pub slot: VoiceSlot,
    /// Absolute frame-clock time (seconds) at which the voice is released
    pub deadline: f64,
}

/// Fixed-capacity table of deferred voice releases.
///
/// Slots are reused in place; the table never grows after construction.
/// Lookups by voice go through `index`, free rows come off the `free` stack,
/// so only [`tick`](Self::tick) walks the table.
pub struct ReleaseScheduler {
    entries: Vec<Option<ScheduledRelease>>,
    free: Vec<usize>,
    index: HashMap<VoiceSlot, usize>,
}

impl ReleaseScheduler {
    /// Table sized for `voice_count` voices (at least [`MIN_SCHEDULE_CAPACITY`]).
    pub fn new(voice_count: usize) -> Self {
        let capacity = voice_count.max(MIN_SCHEDULE_CAPACITY);
        Self {
            entries: vec![None; capacity],
            // popped from the back, so row 0 is handed out first
            free: (0..capacity).rev().collect(),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Add a release for `slot` at `deadline`.
    ///
    /// A voice may only have one pending release at a time.
    pub fn enqueue(&mut self, slot: VoiceSlot, deadline: f64) -> Result<(), AudioError> {
        if self.index.contains_key(&slot) {
            return Err(AudioError::AlreadyScheduled(slot));
        }

        let row = self.free.pop().ok_or(AudioError::ScheduleFull)?;
        self.entries[row] = Some(ScheduledRelease { slot, deadline });
        self.index.insert(slot, row);
        Ok(())
    }

    /// Drop the pending release for `slot`, if any.
    pub fn cancel(&mut self, slot: VoiceSlot) -> bool {
        let Some(row) = self.index.remove(&slot) else {
            return false;
        };
        self.entries[row] = None;
        self.free.push(row);
        true
    }

    /// Hand every entry whose deadline has passed to `release` and free its slot.
    pub fn tick(&mut self, now: f64, mut release: impl FnMut(VoiceSlot)) -> usize {
        if self.index.is_empty() {
            return 0;
        }

        let mut fired = 0;
        for (row, entry) in self.entries.iter_mut().enumerate() {
            let Some(scheduled) = *entry else { continue };
            if now >= scheduled.deadline {
                *entry = None;
                self.index.remove(&scheduled.slot);
                self.free.push(row);
                fired += 1;
                release(scheduled.slot);
            }
        }
        fired
    }

    pub fn contains(&self, slot: VoiceSlot) -> bool {
        self.index.contains_key(&slot)
    }

    pub fn deadline(&self, slot: VoiceSlot) -> Option<f64> {
        let row = *self.index.get(&slot)?;
        self.entries[row].map(|e| e.deadline)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}
