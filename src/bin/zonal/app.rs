//! Simulation thread and wiring between it and the terminal UI.
//!
//! The engine is built and ticked on its own thread at a fixed frame rate.
//! The UI talks to it over lock-free ring buffers only.

use std::{sync::mpsc, thread, time::Duration};

use color_eyre::eyre::{eyre, Result};
use glam::Vec3;
use rtrb::{Consumer, Producer, RingBuffer};
use zonal_audio::{
    engine::allocator::PoolKind,
    playback::EngineMessage,
    prelude::*,
};

use crate::{
    scene::{self, Scene, MAP_MAX_X, MAP_MIN_X},
    ui::{
        state::{ControlMessage, UiStateInit, UiStateUpdate, ZoneDynamicState, MAX_PROXIES, MAX_ZONES},
        UiApp,
    },
};

const FRAME: f32 = 1.0 / 60.0;
/// Avatar walking speed in metres per second
const WALK_SPEED: f32 = 6.0;

/// Start the simulation thread, run the UI until quit, then join.
pub fn run() -> Result<()> {
    let (control_tx, control_rx) = RingBuffer::<ControlMessage>::new(64);
    let (engine_tx, engine_rx) = RingBuffer::<EngineMessage>::new(64);
    let (state_tx, state_rx) = RingBuffer::<UiStateUpdate>::new(8);
    let (init_tx, init_rx) = mpsc::sync_channel::<UiStateInit>(1);

    let sim = thread::Builder::new()
        .name("zonal-sim".into())
        .spawn(move || {
            // engine voices are not Send, so the scene is built here
            let scene = scene::build();
            if init_tx.send(static_state(&scene)).is_err() {
                return;
            }
            Simulation::new(scene, control_rx, engine_rx, state_tx).run();
        })?;

    let init = init_rx
        .recv()
        .map_err(|_| eyre!("simulation thread exited before sending the scene"))?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(init, state_rx, control_tx, engine_tx).run(&mut terminal);
    ratatui::restore();

    sim.join().map_err(|_| eyre!("simulation thread panicked"))?;
    result
}

fn static_state(scene: &Scene) -> UiStateInit {
    let voices = scene.engine.voices();
    UiStateInit {
        map_min_x: MAP_MIN_X,
        map_max_x: MAP_MAX_X,
        zones: scene.zones.clone(),
        proxy_names: scene
            .engine
            .proxies()
            .iter()
            .map(|p| p.clip_key().to_owned())
            .collect(),
        one_shot_capacity: voices.pool(PoolKind::OneShot).capacity(),
        looping_capacity: voices.pool(PoolKind::Looping).capacity(),
    }
}

struct Simulation {
    scene: Scene,
    control_rx: Consumer<ControlMessage>,
    engine_rx: Consumer<EngineMessage>,
    state_tx: Producer<UiStateUpdate>,
    clock: FrameClock,
    x: f32,
    walking: i8,
    grounded: bool,
    paused: bool,
}

impl Simulation {
    fn new(
        scene: Scene,
        control_rx: Consumer<ControlMessage>,
        engine_rx: Consumer<EngineMessage>,
        state_tx: Producer<UiStateUpdate>,
    ) -> Self {
        Self {
            scene,
            control_rx,
            engine_rx,
            state_tx,
            clock: FrameClock::new(),
            x: MAP_MIN_X,
            walking: 0,
            grounded: true,
            paused: false,
        }
    }

    fn run(mut self) {
        loop {
            if !self.poll_controls() || self.control_rx.is_abandoned() {
                return;
            }
            self.scene.engine.process_messages(&mut self.engine_rx);

            if !self.paused {
                self.x = (self.x + self.walking as f32 * WALK_SPEED * FRAME).clamp(MAP_MIN_X, MAP_MAX_X);
                self.scene.avatar.move_to(Vec3::new(self.x, 0.0, 0.0));
                self.scene.engine.tick(self.clock.advance(FRAME));
            }

            // UI only needs the latest state; drop frames when it lags
            let update = self.sample();
            let _ = self.state_tx.push(update);
            thread::sleep(Duration::from_secs_f32(FRAME));
        }
    }

    /// Returns false once the UI asked to quit.
    fn poll_controls(&mut self) -> bool {
        while let Ok(msg) = self.control_rx.pop() {
            match msg {
                ControlMessage::Walk(dir) => self.walking = dir.signum(),
                ControlMessage::ToggleGrounded => {
                    self.grounded = !self.grounded;
                    self.scene.avatar.set_grounded(self.grounded);
                }
                ControlMessage::TogglePause => self.paused = !self.paused,
                ControlMessage::Reset => {
                    self.walking = 0;
                    self.x = MAP_MIN_X;
                }
                ControlMessage::Quit => return false,
            }
        }
        true
    }

    fn sample(&self) -> UiStateUpdate {
        let engine = &self.scene.engine;
        let voices = engine.voices();
        let position = Vec3::new(self.x, 0.0, 0.0);

        let mut update = UiStateUpdate {
            time: self.clock.now(),
            avatar_x: self.x,
            walking: self.walking,
            grounded: self.grounded,
            paused: self.paused,
            master_volume: engine.settings().master_volume,
            one_shot_in_use: voices.pool(PoolKind::OneShot).in_use_count(),
            looping_in_use: voices.pool(PoolKind::Looping).in_use_count(),
            scheduled_releases: voices.releases().len(),
            footsteps_played: self.scene.one_shot_probes.iter().map(|p| p.play_count()).sum(),
            group_inside: engine.groups().any(|(_, g)| g.is_player_in_group()),
            ..UiStateUpdate::new()
        };

        for (slot, (_, zone)) in update.zones.iter_mut().zip(engine.zones().take(MAX_ZONES)) {
            *slot = ZoneDynamicState {
                inside: zone.is_player_inside(),
                touching: zone.bounds().is_some_and(|b| b.contains(position)),
                queued: zone.driver().queued(),
                fade: zone.driver().states().first().copied(),
            };
            update.num_zones += 1;
        }

        for (level, proxy) in update.proxy_levels.iter_mut().zip(engine.proxies().iter().take(MAX_PROXIES)) {
            *level = proxy.level();
            update.num_proxies += 1;
        }

        update
    }
}
