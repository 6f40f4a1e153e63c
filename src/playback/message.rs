#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::{
    engine::registry::{ProxyId, ZoneId},
    zones::trigger::Occupant,
};

/// Work posted to the engine from other threads (physics callbacks, UI).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineMessage {
    ZoneEnter { zone: ZoneId, occupant: Occupant },
    ZoneExit { zone: ZoneId, occupant: Occupant },
    PlayProxy(ProxyId),
    StopProxy(ProxyId),
    SetMasterVolume(f32),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        self.pop_front()
    }
}
