//! Sound emitters and their volume control.

/// Rate-based fade envelope
pub mod fade;
/// Cross-thread control messages
pub mod message;
pub mod proxy;
pub mod volume_group;

pub use fade::{FadeEnvelope, FadeStep};
pub use message::{EngineMessage, MessageReceiver};
pub use proxy::{PlaybackCtx, PlaybackProxy};
pub use volume_group::VolumeGroup;
