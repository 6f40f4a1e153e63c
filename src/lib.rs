//! Zone-triggered audio playback over bounded voice pools.
//!
//! ```ignore
//! use zonal_audio::{prelude::*, backend::sim::SimVoice};
//!
//! let (one_shot, _) = SimVoice::bank(10);
//! let (looping, _) = SimVoice::bank(5);
//! let mut engine = AudioEngine::builder()
//!     .one_shot_voices(one_shot)
//!     .looping_voices(looping)
//!     .clips(ClipBank::new().with_clip("wind", 12.0))
//!     .build();
//!
//! let wind = engine.add_proxy(ProxyConfig { looping: true, ..ProxyConfig::new("wind") });
//! let cave = engine.add_zone(ZoneConfig::new("cave", vec![wind]));
//!
//! let mut clock = FrameClock::new();
//! engine.on_zone_enter(cave, Occupant::Local);
//! engine.tick(clock.advance(1.0 / 60.0));
//! ```

pub mod backend; // Voice, clip and position contracts
pub mod config;
pub mod engine; // Manager, pools, deferred release, frame clock
pub mod error;
pub mod modules;
pub mod playback; // Proxies and fades
pub mod zones; // Occupancy, debounce, groups

pub use error::AudioError;

pub mod prelude {
    pub use crate::{
        backend::{ClipBank, ClipRepository, PositionProvider, Voice},
        config::{EngineSettings, GroupConfig, ProxyConfig, VolumeGroupConfig, ZoneConfig},
        engine::{
            clock::{FrameClock, FrameContext},
            registry::{GroupId, ProxyId, ZoneId},
            AudioEngine,
        },
        zones::{GroupPolicy, Occupant, ZoneBounds},
    };
}
