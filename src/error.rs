use thiserror::Error;

use crate::engine::{
    allocator::{PoolKind, VoiceSlot},
    registry::{GroupId, ProxyId, ZoneId},
};

/// Conditions detected while driving voices.
///
/// None of these are fatal. Contract-level methods log them and leave audio
/// silent; the `try_*` variants hand them back to callers that care.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("voice index {index} is outside the {pool} pool (capacity {capacity})")]
    VoiceOutOfBounds {
        pool: PoolKind,
        index: usize,
        capacity: usize,
    },

    #[error("voice {0} already has a scheduled release")]
    AlreadyScheduled(VoiceSlot),

    #[error("scheduled release table is full")]
    ScheduleFull,

    #[error("no free voice in the {0} pool")]
    NoFreeVoice(PoolKind),

    #[error("audio clip not found: {0}")]
    MissingAsset(String),

    #[error("unknown proxy {0:?}")]
    UnknownProxy(ProxyId),

    #[error("unknown zone {0:?}")]
    UnknownZone(ZoneId),

    #[error("unknown zone group {0:?}")]
    UnknownGroup(GroupId),
}
