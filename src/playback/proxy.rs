//! Playback proxy - one configured emitter borrowing a pooled voice.
//!
//! A proxy never owns a voice outright. `play` leases one from the allocator,
//! the fade envelope drives its volume every frame, and the lease is handed
//! back when a fade to silence completes, on `force_stop`, or by the
//! allocator's release sweep for one-shots whose clip has run out.

use glam::Vec3;
use tracing::{debug, warn};

use crate::{
    backend::{ClipHandle, ClipRepository, Voice},
    config::ProxyConfig,
    engine::allocator::{PoolKind, VoiceAllocator, VoiceLease},
    playback::fade::{FadeEnvelope, FadeStep},
    zones::driver::DriverRef,
};

/// Highest accepted base volume.
pub const MAX_BASE_VOLUME: f32 = 2.0;

/// Map a normalized 0..=1 pitch control to a playback-rate ratio.
///
/// 0.5 is unity; the range spans one octave either side, linear in log2.
#[inline]
pub fn pitch_ratio(normalized: f32) -> f32 {
    2.0_f32.powf((normalized.clamp(0.0, 1.0) - 0.5) * 2.0)
}

/// What a proxy needs from the engine to start playback.
pub struct PlaybackCtx<'a> {
    pub voices: &'a mut VoiceAllocator,
    pub clips: &'a dyn ClipRepository,
    pub master_volume: f32,
    pub now: f64,
}

pub struct PlaybackProxy {
    config: ProxyConfig,
    cached_clip: Option<ClipHandle>,
    lease: Option<VoiceLease>,
    envelope: FadeEnvelope,
    /// Envelope integration is running
    fading: bool,
    claimed_by: Option<DriverRef>,
}

impl PlaybackProxy {
    pub fn new(mut config: ProxyConfig, clips: &dyn ClipRepository) -> Self {
        config.volume = config.volume.clamp(0.0, MAX_BASE_VOLUME);
        let cached_clip = clips.resolve(&config.clip_key);
        let envelope = FadeEnvelope::new(config.fade_in_time).with_fade_out(config.fade_out_time);

        Self {
            config,
            cached_clip,
            lease: None,
            envelope,
            fading: false,
            claimed_by: None,
        }
    }

    /// Lease a voice, configure it and start fading in.
    ///
    /// Returns `false` (and plays nothing) when the clip key is unset or
    /// unknown, or the pool is exhausted. A proxy that is already holding a
    /// voice gives it back first.
    pub fn play(&mut self, ctx: &mut PlaybackCtx<'_>) -> bool {
        if self.config.clip_key.is_empty() {
            debug!("proxy has no clip key, not playing");
            return false;
        }

        let Some(clip) = self
            .cached_clip
            .or_else(|| ctx.clips.resolve(&self.config.clip_key))
        else {
            warn!(key = %self.config.clip_key, "audio clip not found");
            return false;
        };

        if self.lease.is_some() {
            self.force_stop(ctx.voices);
        }

        let kind = PoolKind::for_looping(self.config.looping);
        let Some(lease) = ctx.voices.lease(kind) else {
            warn!(pool = %kind, key = %self.config.clip_key, "no available voice");
            return false;
        };
        let Some(voice) = ctx.voices.voice_mut(lease) else {
            return false;
        };

        self.configure(voice, clip);
        if self.config.delay > 0.0 {
            voice.play_delayed(self.config.delay);
        } else {
            voice.play_immediate();
        }

        if !self.config.looping {
            let duration = ctx.clips.duration(clip) + self.config.delay.max(0.0);
            if let Err(err) =
                ctx.voices
                    .schedule_release(kind, lease.slot.index, duration, ctx.now)
            {
                warn!(slot = %lease.slot, %err, "could not schedule release");
            }
        }

        self.lease = Some(lease);
        self.envelope.start(self.max_volume(ctx.master_volume));
        self.fading = true;
        true
    }

    fn configure(&self, voice: &mut dyn Voice, clip: ClipHandle) {
        let config = &self.config;
        voice.set_clip(Some(clip));
        voice.set_loop(config.looping);
        voice.set_spatial(config.spatial);
        voice.set_priority(config.priority.min(256));
        voice.set_pitch(pitch_ratio(config.pitch));
        voice.set_doppler_level(config.doppler_level);
        voice.set_pan(config.pan.clamp(-1.0, 1.0));
        voice.set_position(config.position);
        voice.set_volume(0.0);
    }

    /// Fade to silence; the voice is released when the fade completes.
    pub fn stop(&mut self) {
        self.envelope.retarget(0.0);
    }

    /// Silence and release the voice now, whatever the fade is doing.
    pub fn force_stop(&mut self, voices: &mut VoiceAllocator) {
        self.envelope.reset();
        self.fading = false;
        if let Some(lease) = self.lease.take() {
            voices.release_lease(lease);
        }
    }

    /// Re-derive the fade target from the current base and master volume.
    ///
    /// Proxies that were told to stop stay stopped.
    pub fn update_volume(&mut self, voices: &VoiceAllocator, master_volume: f32) {
        if self.is_playing(voices) && !self.envelope.is_silenced() {
            self.envelope.retarget(self.max_volume(master_volume));
        }
    }

    /// One frame of fade integration and distance-based spatialization.
    ///
    /// Returns `true` if the voice went back to the pool this frame.
    pub fn integrate(
        &mut self,
        voices: &mut VoiceAllocator,
        master_volume: f32,
        delta_time: f32,
        listener: Option<Vec3>,
    ) -> bool {
        if !self.fading {
            return false;
        }

        let Some(lease) = self.lease.filter(|l| voices.is_current(*l)) else {
            // Reclaimed under us (clip ran out, or idle fallback)
            if let Some(lease) = self.lease.take() {
                debug!(slot = %lease.slot, "proxy voice was reclaimed by the pool");
            }
            self.envelope.reset();
            self.fading = false;
            return false;
        };

        let step = self
            .envelope
            .advance(self.max_volume(master_volume), delta_time);

        if let Some(voice) = voices.voice_mut(lease) {
            voice.set_volume(self.envelope.level());

            if self.config.use_spatialize_distance {
                if let Some(listener) = listener {
                    let distance = listener.distance(self.config.position);
                    voice.set_spatialize(distance > self.config.spatialize_distance);
                }
            }
        }

        if step == FadeStep::Silent {
            self.lease = None;
            self.fading = false;
            voices.release_lease(lease);
            return true;
        }
        false
    }

    pub fn max_volume(&self, master_volume: f32) -> f32 {
        self.config.volume * master_volume
    }

    pub fn has_active_voice(&self, voices: &VoiceAllocator) -> bool {
        self.lease.is_some_and(|l| voices.is_current(l))
    }

    pub fn is_playing(&self, voices: &VoiceAllocator) -> bool {
        self.lease
            .and_then(|l| voices.voice(l))
            .is_some_and(|v| v.is_playing())
    }

    pub fn is_fading_in(&self, voices: &VoiceAllocator) -> bool {
        self.has_active_voice(voices) && self.envelope.is_fading_in()
    }

    pub fn is_fading_out(&self, voices: &VoiceAllocator) -> bool {
        self.has_active_voice(voices) && self.envelope.is_fading_out()
    }

    /// Accept fade times from a driving zone/group when configured to.
    pub fn set_fade_times(&mut self, fade_in: f32, fade_out: Option<f32>) {
        if !self.config.zone_controls_fade {
            return;
        }
        self.config.fade_in_time = fade_in;
        self.config.fade_out_time = fade_out;
        self.envelope.set_fade_times(fade_in, fade_out);
    }

    pub fn base_volume(&self) -> f32 {
        self.config.volume
    }

    pub fn set_base_volume(&mut self, volume: f32) {
        self.config.volume = volume.clamp(0.0, MAX_BASE_VOLUME);
    }

    pub fn level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn target(&self) -> f32 {
        self.envelope.target()
    }

    pub fn lease(&self) -> Option<VoiceLease> {
        self.lease
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn clip_key(&self) -> &str {
        &self.config.clip_key
    }

    /// Take ownership of this proxy's fade state for `driver`.
    ///
    /// Fails if another driver already holds it.
    pub(crate) fn claim(&mut self, driver: DriverRef) -> bool {
        match self.claimed_by {
            Some(owner) if owner != driver => false,
            _ => {
                self.claimed_by = Some(driver);
                true
            }
        }
    }

    pub(crate) fn unclaim(&mut self, driver: DriverRef) {
        if self.claimed_by == Some(driver) {
            self.claimed_by = None;
        }
    }

    pub fn claimed_by(&self) -> Option<DriverRef> {
        self.claimed_by
    }
}
