//! Collaborator contracts the engine plays through.
//!
//! The engine never decodes, mixes or spatializes audio itself. It drives a
//! bounded set of externally supplied [`Voice`]s, resolves clips through a
//! [`ClipRepository`] and asks a [`PositionProvider`] where the local avatar is.
//! `clips` holds a ready-made key-indexed repository and `sim` an in-memory
//! voice used by tests, benches and the walkthrough simulator.

/// Key-indexed clip repository.
pub mod clips;
/// In-memory voice backend with inspection probes.
pub mod sim;

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use clips::ClipBank;

/// Opaque handle to a resolved clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipHandle(pub u32);

/// Distance attenuation curve applied by the voice backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RolloffCurve {
    Logarithmic,
    #[default]
    Linear,
    Custom,
}

/// 3D falloff parameters handed to a voice when it is configured.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialParams {
    pub min_distance: f32,
    pub max_distance: f32,
    pub rolloff: RolloffCurve,
    /// 0.0 = fully 2D, 1.0 = fully 3D
    pub blend: f32,
}

impl Default for SpatialParams {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 25.0,
            rolloff: RolloffCurve::Linear,
            blend: 1.0,
        }
    }
}

/// One unit of concurrent playback capacity.
///
/// Voices are constructed by the host and handed to the engine's pools; the
/// engine only ever addresses them by pool index.
pub trait Voice {
    fn set_clip(&mut self, clip: Option<ClipHandle>);

    fn clip(&self) -> Option<ClipHandle>;

    fn set_volume(&mut self, volume: f32);

    fn set_loop(&mut self, looping: bool);

    fn set_spatial(&mut self, params: SpatialParams);

    fn set_pitch(&mut self, pitch: f32);

    fn set_pan(&mut self, pan: f32);

    fn set_position(&mut self, position: Vec3);

    /// Start playback now.
    fn play_immediate(&mut self);

    /// Start playback after `seconds`.
    fn play_delayed(&mut self, seconds: f32);

    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Mixer priority (0 = highest). Default: ignored.
    fn set_priority(&mut self, _priority: u16) {}

    /// Default: ignored.
    fn set_doppler_level(&mut self, _level: f32) {}

    /// Toggle HRTF-style spatialization. Default: ignored.
    fn set_spatialize(&mut self, _enabled: bool) {}
}

/// Allow boxed voices to be used as voices (for dynamic dispatch)
impl Voice for Box<dyn Voice> {
    fn set_clip(&mut self, clip: Option<ClipHandle>) {
        (**self).set_clip(clip)
    }

    fn clip(&self) -> Option<ClipHandle> {
        (**self).clip()
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }

    fn set_loop(&mut self, looping: bool) {
        (**self).set_loop(looping)
    }

    fn set_spatial(&mut self, params: SpatialParams) {
        (**self).set_spatial(params)
    }

    fn set_pitch(&mut self, pitch: f32) {
        (**self).set_pitch(pitch)
    }

    fn set_pan(&mut self, pan: f32) {
        (**self).set_pan(pan)
    }

    fn set_position(&mut self, position: Vec3) {
        (**self).set_position(position)
    }

    fn play_immediate(&mut self) {
        (**self).play_immediate()
    }

    fn play_delayed(&mut self, seconds: f32) {
        (**self).play_delayed(seconds)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn set_priority(&mut self, priority: u16) {
        (**self).set_priority(priority)
    }

    fn set_doppler_level(&mut self, level: f32) {
        (**self).set_doppler_level(level)
    }

    fn set_spatialize(&mut self, enabled: bool) {
        (**self).set_spatialize(enabled)
    }
}

/// Resolves clip keys to playable clips.
///
/// Duplicate keys are tolerated; the first match wins.
pub trait ClipRepository {
    fn resolve(&self, key: &str) -> Option<ClipHandle>;

    /// Clip length in seconds.
    fn duration(&self, clip: ClipHandle) -> f32;
}

/// Reports where the local avatar is.
pub trait PositionProvider {
    /// `None` when there is no local avatar (e.g. headless host).
    fn local_position(&self) -> Option<Vec3>;

    /// Whether the avatar is standing on the ground.
    fn is_grounded(&self) -> bool {
        true
    }
}

/// Position provider for hosts without a local avatar.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

impl PositionProvider for NoPosition {
    fn local_position(&self) -> Option<Vec3> {
        None
    }
}
