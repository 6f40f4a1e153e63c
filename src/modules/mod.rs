//! Optional emitters that ride on the engine's voice pools.
//!
//! Each module declares how many voices it needs so the host can size the
//! pools, then gets an update call every frame. Modules never touch voices
//! directly; they hand back [`OneShotRequest`]s that the engine plays.

use glam::Vec3;

use crate::{backend::PositionProvider, engine::clock::FrameContext};

pub mod footstep;

pub use footstep::{FootstepAudio, FootstepZone};

/// A fire-and-forget sound a module wants played this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OneShotRequest {
    pub clip_key: String,
    pub position: Vec3,
    pub volume: f32,
}

pub trait ModuleCapabilities {
    fn required_one_shot_voices(&self) -> usize {
        0
    }

    fn required_looping_voices(&self) -> usize {
        0
    }

    fn initialize(&mut self, position: &dyn PositionProvider);

    fn update(
        &mut self,
        frame: FrameContext,
        position: &dyn PositionProvider,
        requests: &mut Vec<OneShotRequest>,
    );

    fn name(&self) -> &'static str;
}

/// Every module the engine knows how to run.
#[derive(Debug, Clone)]
pub enum AudioModule {
    Footstep(FootstepAudio),
}

impl ModuleCapabilities for AudioModule {
    fn required_one_shot_voices(&self) -> usize {
        match self {
            AudioModule::Footstep(m) => m.required_one_shot_voices(),
        }
    }

    fn required_looping_voices(&self) -> usize {
        match self {
            AudioModule::Footstep(m) => m.required_looping_voices(),
        }
    }

    fn initialize(&mut self, position: &dyn PositionProvider) {
        match self {
            AudioModule::Footstep(m) => m.initialize(position),
        }
    }

    fn update(
        &mut self,
        frame: FrameContext,
        position: &dyn PositionProvider,
        requests: &mut Vec<OneShotRequest>,
    ) {
        match self {
            AudioModule::Footstep(m) => m.update(frame, position, requests),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AudioModule::Footstep(m) => m.name(),
        }
    }
}

impl From<FootstepAudio> for AudioModule {
    fn from(module: FootstepAudio) -> Self {
        AudioModule::Footstep(module)
    }
}
