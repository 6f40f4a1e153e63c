//! The four-state fade machine shared by trigger zones and zone groups.
//!
//! ```text
//!   Idle ──enter──▶ FadingIn ──settled──▶ Steady
//!    ▲                 │                    │
//!    │                exit                 exit
//!    │                 ▼                    │
//!    └──released── FadingOut ◀──────────────┘
//! ```
//!
//! An enter that lands on a proxy still fading out force-stops it and starts
//! over from FadingIn. A voice that disappears underneath FadingIn or Steady
//! drops the slot back to Idle.

use tracing::debug;

use crate::{
    engine::{
        allocator::VoiceAllocator,
        registry::{GroupId, ProxyId, ZoneId},
    },
    playback::proxy::{PlaybackCtx, PlaybackProxy},
    zones::debounce::{Debouncer, Transition},
};

/// Which zone or group a driver belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverRef {
    Zone(ZoneId),
    Group(GroupId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FadeState {
    #[default]
    Idle,
    FadingIn,
    Steady,
    FadingOut,
}

#[derive(Debug, Clone)]
pub struct ProxyDriver {
    owner: DriverRef,
    proxies: Vec<ProxyId>,
    states: Vec<FadeState>,
    pub play_on_enter: bool,
    pub stop_on_exit: bool,
    inside: bool,
    has_played: bool,
    debounce: Debouncer,
}

impl ProxyDriver {
    pub fn new(owner: DriverRef, proxies: Vec<ProxyId>, enter_delay: f32, exit_delay: f32) -> Self {
        let states = vec![FadeState::Idle; proxies.len()];
        Self {
            owner,
            proxies,
            states,
            play_on_enter: true,
            stop_on_exit: true,
            inside: false,
            has_played: false,
            debounce: Debouncer::new(enter_delay, exit_delay),
        }
    }

    pub fn raw_enter(&mut self) {
        self.debounce.raw_enter(self.inside);
    }

    pub fn raw_exit(&mut self) {
        self.debounce.raw_exit(self.inside);
    }

    /// Queue an enter without a boundary crossing.
    pub fn seed_enter(&mut self) {
        self.inside = false;
        self.debounce.queue(Transition::Enter);
    }

    /// Advance debounce, fire whatever came due, then reconcile fade states.
    pub fn tick(
        &mut self,
        proxies: &mut [PlaybackProxy],
        ctx: &mut PlaybackCtx<'_>,
        delta_time: f32,
    ) -> Option<Transition> {
        let fired = match self.debounce.advance(delta_time) {
            Some(Transition::Enter) => self.execute_enter(proxies, ctx).then_some(Transition::Enter),
            Some(Transition::Exit) => self.execute_exit(proxies).then_some(Transition::Exit),
            None => None,
        };
        self.reconcile(proxies, ctx.voices);
        fired
    }

    /// Commit an enter. Returns `false` if already inside.
    pub fn execute_enter(&mut self, proxies: &mut [PlaybackProxy], ctx: &mut PlaybackCtx<'_>) -> bool {
        if self.inside {
            return false;
        }
        self.inside = true;
        if !self.play_on_enter {
            return true;
        }

        for (id, state) in self.proxies.iter().zip(self.states.iter_mut()) {
            let Some(proxy) = proxies.get_mut(id.index()) else {
                continue;
            };
            match *state {
                FadeState::FadingOut => {
                    proxy.force_stop(ctx.voices);
                }
                FadeState::Idle => {
                    if !proxy.claim(self.owner) {
                        debug!(proxy = ?id, owner = ?proxy.claimed_by(), "proxy driven elsewhere, skipping");
                        continue;
                    }
                }
                FadeState::FadingIn | FadeState::Steady => continue,
            }

            if proxy.play(ctx) {
                *state = FadeState::FadingIn;
            } else {
                *state = FadeState::Idle;
                proxy.unclaim(self.owner);
            }
        }
        self.has_played = true;
        true
    }

    /// Commit an exit. Returns `false` if already outside.
    pub fn execute_exit(&mut self, proxies: &mut [PlaybackProxy]) -> bool {
        if !self.inside {
            return false;
        }
        self.inside = false;
        if !self.stop_on_exit {
            return true;
        }

        for (id, state) in self.proxies.iter().zip(self.states.iter_mut()) {
            if !matches!(state, FadeState::FadingIn | FadeState::Steady) {
                continue;
            }
            if let Some(proxy) = proxies.get_mut(id.index()) {
                proxy.stop();
                *state = FadeState::FadingOut;
            }
        }
        true
    }

    /// Move slots forward based on what the proxies are actually doing.
    pub fn reconcile(&mut self, proxies: &mut [PlaybackProxy], voices: &VoiceAllocator) {
        for (id, state) in self.proxies.iter().zip(self.states.iter_mut()) {
            let Some(proxy) = proxies.get_mut(id.index()) else {
                continue;
            };
            let active = proxy.has_active_voice(voices);
            let playing = proxy.is_playing(voices);

            let next = match *state {
                FadeState::FadingIn if active && playing && !proxy.is_fading_in(voices) => {
                    FadeState::Steady
                }
                FadeState::FadingIn | FadeState::Steady if !active || !playing => FadeState::Idle,
                FadeState::FadingOut if !active || (!playing && !proxy.is_fading_out(voices)) => {
                    FadeState::Idle
                }
                current => current,
            };

            if next != *state {
                debug!(proxy = ?id, from = ?*state, to = ?next, "fade state");
                if next == FadeState::Idle {
                    proxy.unclaim(self.owner);
                }
                *state = next;
            }
        }
    }

    /// Forget occupancy and any queued transition, fading out whatever this
    /// driver still has sounding. Slots go straight to Idle and their claims are
    /// dropped; the proxies finish the fade on their own.
    pub fn reset(&mut self, proxies: &mut [PlaybackProxy]) {
        self.debounce.clear();
        self.inside = false;
        for (id, state) in self.proxies.iter().zip(self.states.iter_mut()) {
            if *state == FadeState::Idle {
                continue;
            }
            if let Some(proxy) = proxies.get_mut(id.index()) {
                if *state != FadeState::FadingOut {
                    proxy.stop();
                }
                proxy.unclaim(self.owner);
            }
            *state = FadeState::Idle;
        }
    }

    /// Silence every proxy now and reset all slots to Idle.
    pub fn force_stop_all(&mut self, proxies: &mut [PlaybackProxy], voices: &mut VoiceAllocator) {
        for (id, state) in self.proxies.iter().zip(self.states.iter_mut()) {
            if let Some(proxy) = proxies.get_mut(id.index()) {
                proxy.force_stop(voices);
                proxy.unclaim(self.owner);
            }
            *state = FadeState::Idle;
        }
    }

    /// Manual play of every proxy, outside the fade-state machine.
    pub fn play_all(&self, proxies: &mut [PlaybackProxy], ctx: &mut PlaybackCtx<'_>) {
        for id in &self.proxies {
            if let Some(proxy) = proxies.get_mut(id.index()) {
                proxy.play(ctx);
            }
        }
    }

    pub fn stop_all(&self, proxies: &mut [PlaybackProxy]) {
        for id in &self.proxies {
            if let Some(proxy) = proxies.get_mut(id.index()) {
                proxy.stop();
            }
        }
    }

    pub fn set_fade_times(&self, proxies: &mut [PlaybackProxy], fade_in: f32, fade_out: f32) {
        for id in &self.proxies {
            if let Some(proxy) = proxies.get_mut(id.index()) {
                proxy.set_fade_times(fade_in, Some(fade_out));
            }
        }
    }

    pub fn owner(&self) -> DriverRef {
        self.owner
    }

    pub fn proxies(&self) -> &[ProxyId] {
        &self.proxies
    }

    pub fn states(&self) -> &[FadeState] {
        &self.states
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    pub fn has_played(&self) -> bool {
        self.has_played
    }

    pub fn queued(&self) -> Option<Transition> {
        self.debounce.queued()
    }
}
