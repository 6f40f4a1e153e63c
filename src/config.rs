//! Configuration for the engine and everything it drives.
//!
//! Defaults match what a freshly placed component gets in the editor. With the
//! `serde` feature every type here can be (de)serialized; loading files is left
//! to the host.

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    backend::SpatialParams,
    engine::registry::{ProxyId, ZoneId},
    zones::{bounds::ZoneBounds, group::GroupPolicy},
};

/// Engine-wide playback settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineSettings {
    pub master_volume: f32,
    /// Extra time a fire-and-forget one-shot keeps its voice after the clip ends
    pub fade_out_duration: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            fade_out_duration: 0.5,
        }
    }
}

/// One sound emitter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProxyConfig {
    pub clip_key: String,
    /// Base volume, 0..=2
    pub volume: f32,
    pub looping: bool,
    /// Seconds between `play` and audible start
    pub delay: f32,
    pub fade_in_time: f32,
    /// `None` shares `fade_in_time` for fade-outs
    pub fade_out_time: Option<f32>,
    /// Let the driving zone/group overwrite the fade times
    pub zone_controls_fade: bool,
    pub spatial: SpatialParams,
    pub priority: u16,
    /// Normalized pitch control, 0.5 = unity
    pub pitch: f32,
    pub doppler_level: f32,
    pub pan: f32,
    pub position: Vec3,
    /// Drop to 2D when the listener is within `spatialize_distance`
    pub use_spatialize_distance: bool,
    pub spatialize_distance: f32,
}

impl ProxyConfig {
    pub fn new(clip_key: impl Into<String>) -> Self {
        Self {
            clip_key: clip_key.into(),
            ..Self::default()
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            clip_key: String::new(),
            volume: 1.0,
            looping: false,
            delay: 0.0,
            fade_in_time: 0.0,
            fade_out_time: None,
            zone_controls_fade: false,
            spatial: SpatialParams::default(),
            priority: 128,
            pitch: 0.5,
            doppler_level: 1.0,
            pan: 0.0,
            position: Vec3::ZERO,
            use_spatialize_distance: false,
            spatialize_distance: 1.0,
        }
    }
}

/// A trigger zone and the proxies it drives.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZoneConfig {
    pub name: String,
    pub proxies: Vec<ProxyId>,
    pub play_on_enter: bool,
    pub stop_on_exit: bool,
    pub fade_in_duration: f32,
    pub fade_out_duration: f32,
    pub require_local_player: bool,
    pub one_time_play: bool,
    /// Queue an enter at initialization without a boundary crossing
    pub start_inside: bool,
    pub enter_delay: f32,
    pub exit_delay: f32,
    /// Volume tested against the local position each frame; `None` = events only
    pub bounds: Option<ZoneBounds>,
}

impl ZoneConfig {
    pub fn new(name: impl Into<String>, proxies: Vec<ProxyId>) -> Self {
        Self {
            name: name.into(),
            proxies,
            ..Self::default()
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            name: String::from("Audio Zone"),
            proxies: Vec::new(),
            play_on_enter: true,
            stop_on_exit: true,
            fade_in_duration: 1.0,
            fade_out_duration: 1.0,
            require_local_player: true,
            one_time_play: false,
            start_inside: false,
            enter_delay: 0.1,
            exit_delay: 0.3,
            bounds: None,
        }
    }
}

/// Several zones acting as one occupancy signal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GroupConfig {
    pub name: String,
    pub children: Vec<ZoneId>,
    pub proxies: Vec<ProxyId>,
    /// Silence the children and let only the group drive playback
    pub treat_as_one_zone: bool,
    pub policy: GroupPolicy,
    pub play_on_enter: bool,
    pub stop_on_exit: bool,
    pub fade_in_duration: f32,
    pub fade_out_duration: f32,
    pub enter_delay: f32,
    pub exit_delay: f32,
}

impl GroupConfig {
    pub fn new(name: impl Into<String>, children: Vec<ZoneId>, proxies: Vec<ProxyId>) -> Self {
        Self {
            name: name.into(),
            children,
            proxies,
            ..Self::default()
        }
    }
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: String::from("Audio Zone Group"),
            children: Vec::new(),
            proxies: Vec::new(),
            treat_as_one_zone: true,
            policy: GroupPolicy::Any,
            play_on_enter: true,
            stop_on_exit: true,
            fade_in_duration: 1.0,
            fade_out_duration: 1.0,
            enter_delay: 0.1,
            exit_delay: 0.3,
        }
    }
}

/// Shared volume control over a set of proxies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VolumeGroupConfig {
    pub proxies: Vec<ProxyId>,
    pub default_value: f32,
    pub min_value: f32,
    pub max_value: f32,
}

impl Default for VolumeGroupConfig {
    fn default() -> Self {
        Self {
            proxies: Vec::new(),
            default_value: 1.0,
            min_value: 0.0,
            max_value: 2.0,
        }
    }
}

/// Surface-specific footstep clips.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FootstepZoneConfig {
    pub name: String,
    pub clips: Vec<String>,
    /// Highest priority wins when zones overlap
    pub priority: i32,
    pub bounds: Option<ZoneBounds>,
}

impl Default for FootstepZoneConfig {
    fn default() -> Self {
        Self {
            name: String::from("Footstep Zone"),
            clips: default_footstep_clips(),
            priority: 0,
            bounds: None,
        }
    }
}

/// Distance-triggered footstep one-shots.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FootstepConfig {
    /// Horizontal metres per step
    pub step_distance: f32,
    pub volume: f32,
    pub min_time_between_steps: f32,
    pub clips: Vec<String>,
    pub zones: Vec<FootstepZoneConfig>,
}

impl Default for FootstepConfig {
    fn default() -> Self {
        Self {
            step_distance: 2.0,
            volume: 0.8,
            min_time_between_steps: 0.3,
            clips: default_footstep_clips(),
            zones: Vec::new(),
        }
    }
}

fn default_footstep_clips() -> Vec<String> {
    vec![String::from("Footstep 1"), String::from("Footstep 2")]
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn partial_zone_config_fills_defaults() {
        let json = r#"{ "name": "cave", "enter_delay": 0.5, "proxies": [0, 2] }"#;
        let config: ZoneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name, "cave");
        assert_eq!(config.proxies, vec![ProxyId(0), ProxyId(2)]);
        assert_eq!(config.enter_delay, 0.5);
        assert_eq!(config.exit_delay, 0.3);
        assert!(config.require_local_player);
    }

    #[test]
    fn group_policy_is_named() {
        let json = r#"{ "children": [1, 2], "policy": "All" }"#;
        let config: GroupConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.policy, GroupPolicy::All);
        assert!(config.treat_as_one_zone);
    }
}
