//! The demo map: a one-dimensional strip of zones along X.

use glam::Vec3;
use zonal_audio::{
    backend::sim::{SimAvatar, SimProbe, SimVoice},
    config::{FootstepConfig, FootstepZoneConfig},
    modules::FootstepAudio,
    prelude::*,
};

use crate::ui::state::{ZoneStaticInfo, MAX_ZONES};

/// Walkable extent of the strip.
pub const MAP_MIN_X: f32 = -10.0;
pub const MAP_MAX_X: f32 = 70.0;

pub struct Scene {
    pub engine: AudioEngine,
    pub avatar: SimAvatar,
    pub zones: Vec<ZoneStaticInfo>,
    /// Probes on the one-shot pool, used to count footsteps
    pub one_shot_probes: Vec<SimProbe>,
}

fn strip(min_x: f32, max_x: f32) -> ZoneBounds {
    ZoneBounds::new(Vec3::new(min_x, -5.0, -5.0), Vec3::new(max_x, 5.0, 5.0))
}

/// Build the engine and the static zone layout for the UI.
///
/// Must run on the thread that will tick the engine.
pub fn build() -> Scene {
    let clips = ClipBank::new()
        .with_clip("Meadow", 40.0)
        .with_clip("Creek", 25.0)
        .with_clip("Cave Drip", 18.0)
        .with_clip("Choir", 60.0)
        .with_clip("Footstep 1", 0.3)
        .with_clip("Footstep 2", 0.3)
        .with_clip("Stone 1", 0.3)
        .with_clip("Stone 2", 0.3);

    let footsteps = FootstepAudio::new(FootstepConfig {
        zones: vec![FootstepZoneConfig {
            name: "cave floor".into(),
            clips: vec!["Stone 1".into(), "Stone 2".into()],
            priority: 1,
            bounds: Some(strip(30.0, 45.0)),
        }],
        ..FootstepConfig::default()
    });

    let avatar = SimAvatar::at(Vec3::new(MAP_MIN_X, 0.0, 0.0));
    let (one_shot, one_shot_probes) = SimVoice::bank(14);
    let (looping, _) = SimVoice::bank(5);
    let mut engine = AudioEngine::builder()
        .one_shot_voices(one_shot)
        .looping_voices(looping)
        .clips(clips)
        .position(avatar.clone())
        .module(footsteps)
        .build();

    let ambience = |engine: &mut AudioEngine, key: &str| {
        engine.add_proxy(ProxyConfig {
            looping: true,
            zone_controls_fade: true,
            ..ProxyConfig::new(key)
        })
    };
    let meadow = ambience(&mut engine, "Meadow");
    let creek = ambience(&mut engine, "Creek");
    let cave = ambience(&mut engine, "Cave Drip");
    let choir = engine.add_proxy(ProxyConfig {
        looping: true,
        fade_in_time: 3.0,
        ..ProxyConfig::new("Choir")
    });

    let layout = [
        ("meadow", 0.0, 20.0, vec![meadow], 1.0),
        ("creek", 18.0, 26.0, vec![creek], 0.5),
        ("cave", 30.0, 45.0, vec![cave], 2.0),
        ("nave", 50.0, 60.0, Vec::new(), 1.0),
        ("apse", 60.0, 65.0, Vec::new(), 1.0),
    ];

    let mut zones = Vec::new();
    let mut ids = Vec::new();
    for (name, min_x, max_x, proxies, fade) in layout.into_iter().take(MAX_ZONES) {
        let id = engine.add_zone(ZoneConfig {
            bounds: Some(strip(min_x, max_x)),
            fade_in_duration: fade,
            fade_out_duration: fade,
            ..ZoneConfig::new(name, proxies)
        });
        ids.push(id);
        zones.push(ZoneStaticInfo {
            name: name.to_owned(),
            min_x,
            max_x,
        });
    }
    engine.add_group(GroupConfig::new("chapel", vec![ids[3], ids[4]], vec![choir]));

    Scene {
        engine,
        avatar,
        zones,
        one_shot_probes,
    }
}
