//! Headless walkthrough: an avatar strolls across a small map of zones while
//! the engine logs what it does.
//!
//! Run with: RUST_LOG=zonal_audio=debug cargo run --example walkthrough

use glam::Vec3;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zonal_audio::{
    backend::sim::{SimAvatar, SimVoice},
    config::{FootstepConfig, FootstepZoneConfig},
    engine::allocator::PoolKind,
    modules::FootstepAudio,
    prelude::*,
};

const FRAME: f32 = 1.0 / 60.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let clips = ClipBank::new()
        .with_clip("Forest", 40.0)
        .with_clip("Creek", 25.0)
        .with_clip("Chapel Choir", 60.0)
        .with_clip("Footstep 1", 0.3)
        .with_clip("Footstep 2", 0.3)
        .with_clip("Gravel 1", 0.3)
        .with_clip("Gravel 2", 0.3);

    let footsteps = FootstepAudio::new(FootstepConfig {
        zones: vec![FootstepZoneConfig {
            name: "path".into(),
            clips: vec!["Gravel 1".into(), "Gravel 2".into()],
            priority: 1,
            bounds: Some(ZoneBounds::new(Vec3::new(-5.0, -2.0, -2.0), Vec3::new(60.0, 4.0, 2.0))),
        }],
        ..FootstepConfig::default()
    });

    let avatar = SimAvatar::at(Vec3::new(-10.0, 0.0, 0.0));
    let (one_shot, _) = SimVoice::bank(14);
    let (looping, _) = SimVoice::bank(5);
    let mut engine = AudioEngine::builder()
        .one_shot_voices(one_shot)
        .looping_voices(looping)
        .clips(clips)
        .position(avatar.clone())
        .module(footsteps)
        .build();

    let forest = engine.add_proxy(ProxyConfig {
        looping: true,
        volume: 0.6,
        zone_controls_fade: true,
        ..ProxyConfig::new("Forest")
    });
    let creek = engine.add_proxy(ProxyConfig {
        looping: true,
        zone_controls_fade: true,
        position: Vec3::new(25.0, 0.0, 3.0),
        ..ProxyConfig::new("Creek")
    });
    let choir = engine.add_proxy(ProxyConfig {
        looping: true,
        fade_in_time: 2.0,
        ..ProxyConfig::new("Chapel Choir")
    });

    engine.add_zone(ZoneConfig {
        bounds: Some(ZoneBounds::new(Vec3::new(0.0, -5.0, -10.0), Vec3::new(20.0, 5.0, 10.0))),
        ..ZoneConfig::new("forest", vec![forest])
    });
    engine.add_zone(ZoneConfig {
        bounds: Some(ZoneBounds::new(Vec3::new(20.0, -5.0, -10.0), Vec3::new(30.0, 5.0, 10.0))),
        fade_in_duration: 0.5,
        ..ZoneConfig::new("creek", vec![creek])
    });
    let nave = engine.add_zone(ZoneConfig {
        bounds: Some(ZoneBounds::new(Vec3::new(35.0, -5.0, -5.0), Vec3::new(45.0, 5.0, 5.0))),
        ..ZoneConfig::new("nave", Vec::new())
    });
    let apse = engine.add_zone(ZoneConfig {
        bounds: Some(ZoneBounds::new(Vec3::new(45.0, -5.0, -5.0), Vec3::new(50.0, 5.0, 5.0))),
        ..ZoneConfig::new("apse", Vec::new())
    });
    engine.add_group(GroupConfig::new("chapel", vec![nave, apse], vec![choir]));

    let mut clock = FrameClock::new();
    let mut x = -10.0f32;
    let mut last_report = 0.0;
    while x < 60.0 {
        x += 4.0 * FRAME;
        avatar.move_to(Vec3::new(x, 0.0, 0.0));
        engine.tick(clock.advance(FRAME));

        if clock.now() - last_report >= 2.0 {
            last_report = clock.now();
            let voices = engine.voices();
            info!(
                t = clock.now(),
                x,
                one_shot = voices.pool(PoolKind::OneShot).in_use_count(),
                looping = voices.pool(PoolKind::Looping).in_use_count(),
                "status"
            );
            engine.log_current_zones();
        }
    }

    // let everything fade and drain
    for _ in 0..(3.0 / FRAME) as usize {
        engine.tick(clock.advance(FRAME));
    }
    let voices = engine.voices();
    info!(
        one_shot_free = voices.pool(PoolKind::OneShot).free_count(),
        looping_free = voices.pool(PoolKind::Looping).free_count(),
        "walk finished"
    );
}
