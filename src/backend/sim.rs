//! In-memory backend.
//!
//! `SimVoice` records every call the engine makes so tests and the
//! walkthrough simulator can observe playback without an audio device.
//! State is shared through `Rc` because the engine is single-threaded; build
//! the voices on the thread that ticks the engine.

use std::{
    cell::{Cell, Ref, RefCell},
    rc::Rc,
};

use glam::Vec3;

use super::{ClipHandle, PositionProvider, SpatialParams, Voice};

/// Everything a [`SimVoice`] has been told.
#[derive(Debug, Clone, Default)]
pub struct SimVoiceState {
    pub clip: Option<ClipHandle>,
    pub volume: f32,
    pub looping: bool,
    pub spatial: SpatialParams,
    pub pitch: f32,
    pub pan: f32,
    pub position: Vec3,
    pub playing: bool,
    /// Delay passed to the last `play_delayed` call (None for immediate starts)
    pub start_delay: Option<f32>,
    pub priority: u16,
    pub doppler_level: f32,
    pub spatialize: bool,
    pub play_count: u32,
    pub stop_count: u32,
}

/// A voice that plays nothing but remembers everything.
#[derive(Debug, Default)]
pub struct SimVoice {
    state: Rc<RefCell<SimVoiceState>>,
}

impl SimVoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting this voice after it moved into a pool.
    pub fn probe(&self) -> SimProbe {
        SimProbe {
            state: Rc::clone(&self.state),
        }
    }

    /// Build `count` boxed voices plus their probes.
    pub fn bank(count: usize) -> (Vec<Box<dyn Voice>>, Vec<SimProbe>) {
        (0..count)
            .map(|_| {
                let voice = SimVoice::new();
                let probe = voice.probe();
                (Box::new(voice) as Box<dyn Voice>, probe)
            })
            .unzip()
    }
}

impl Voice for SimVoice {
    fn set_clip(&mut self, clip: Option<ClipHandle>) {
        self.state.borrow_mut().clip = clip;
    }

    fn clip(&self) -> Option<ClipHandle> {
        self.state.borrow().clip
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }

    fn set_loop(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }

    fn set_spatial(&mut self, params: SpatialParams) {
        self.state.borrow_mut().spatial = params;
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.state.borrow_mut().pitch = pitch;
    }

    fn set_pan(&mut self, pan: f32) {
        self.state.borrow_mut().pan = pan;
    }

    fn set_position(&mut self, position: Vec3) {
        self.state.borrow_mut().position = position;
    }

    fn play_immediate(&mut self) {
        let mut state = self.state.borrow_mut();
        state.playing = true;
        state.start_delay = None;
        state.play_count += 1;
    }

    fn play_delayed(&mut self, seconds: f32) {
        let mut state = self.state.borrow_mut();
        state.playing = true;
        state.start_delay = Some(seconds);
        state.play_count += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.playing = false;
        state.stop_count += 1;
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn set_priority(&mut self, priority: u16) {
        self.state.borrow_mut().priority = priority;
    }

    fn set_doppler_level(&mut self, level: f32) {
        self.state.borrow_mut().doppler_level = level;
    }

    fn set_spatialize(&mut self, enabled: bool) {
        self.state.borrow_mut().spatialize = enabled;
    }
}

/// Read-side handle onto a [`SimVoice`].
#[derive(Debug, Clone)]
pub struct SimProbe {
    state: Rc<RefCell<SimVoiceState>>,
}

impl SimProbe {
    pub fn state(&self) -> Ref<'_, SimVoiceState> {
        self.state.borrow()
    }

    pub fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn play_count(&self) -> u32 {
        self.state.borrow().play_count
    }

    pub fn clip(&self) -> Option<ClipHandle> {
        self.state.borrow().clip
    }

    /// Simulate the clip running out on its own.
    pub fn finish(&self) {
        self.state.borrow_mut().playing = false;
    }
}

/// A movable avatar position shared between the host and the engine.
#[derive(Debug, Clone)]
pub struct SimAvatar {
    position: Rc<Cell<Option<Vec3>>>,
    grounded: Rc<Cell<bool>>,
}

impl SimAvatar {
    pub fn at(position: Vec3) -> Self {
        Self {
            position: Rc::new(Cell::new(Some(position))),
            grounded: Rc::new(Cell::new(true)),
        }
    }

    /// An avatar that is not in the world.
    pub fn absent() -> Self {
        Self {
            position: Rc::new(Cell::new(None)),
            grounded: Rc::new(Cell::new(true)),
        }
    }

    pub fn move_to(&self, position: Vec3) {
        self.position.set(Some(position));
    }

    pub fn set_grounded(&self, grounded: bool) {
        self.grounded.set(grounded);
    }

    pub fn position(&self) -> Option<Vec3> {
        self.position.get()
    }
}

impl PositionProvider for SimAvatar {
    fn local_position(&self) -> Option<Vec3> {
        self.position.get()
    }

    fn is_grounded(&self) -> bool {
        self.grounded.get()
    }
}
