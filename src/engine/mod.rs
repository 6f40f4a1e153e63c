//! The audio manager.
//!
//! [`AudioEngine`] owns the voice pools, the clip repository and every proxy,
//! zone and group, and advances them all from a single [`tick`] per frame:
//!
//! 1. position-driven zone occupancy
//! 2. modules (footsteps)
//! 3. zones: debounce, fire, reconcile
//! 4. groups: the same, on derived occupancy
//! 5. proxy fade integration and spatialize toggling
//! 6. deferred voice release sweep
//!
//! Nothing here blocks or locks. Events from other threads arrive through a
//! [`MessageReceiver`] drained by [`process_messages`] before the tick.
//!
//! [`tick`]: AudioEngine::tick
//! [`process_messages`]: AudioEngine::process_messages

pub mod allocator;
pub mod clock;
pub mod registry;
pub mod scheduler;

use glam::Vec3;
use tracing::{debug, info, warn};

use self::{
    allocator::{PoolKind, VoiceAllocator, VoiceSlot},
    clock::FrameContext,
    registry::{GroupId, ProxyId, Registry, ZoneId},
};
use crate::{
    backend::{ClipBank, ClipHandle, ClipRepository, NoPosition, PositionProvider, Voice},
    config::{EngineSettings, GroupConfig, ProxyConfig, VolumeGroupConfig, ZoneConfig},
    error::AudioError,
    modules::{AudioModule, ModuleCapabilities, OneShotRequest},
    playback::{
        message::{EngineMessage, MessageReceiver},
        proxy::{PlaybackCtx, PlaybackProxy},
        volume_group::VolumeGroup,
    },
    zones::{
        debounce::Transition,
        group::ZoneGroup,
        trigger::{Occupant, TriggerZone},
    },
};

/// One-shot voices reserved for the engine itself, before modules.
pub const BASE_ONE_SHOT_VOICES: usize = 10;
/// Looping voices reserved for the engine itself, before modules.
pub const BASE_LOOPING_VOICES: usize = 5;

/// Builder for [`AudioEngine`].
pub struct AudioEngineBuilder {
    one_shot: Vec<Box<dyn Voice>>,
    looping: Vec<Box<dyn Voice>>,
    clips: Box<dyn ClipRepository>,
    position: Box<dyn PositionProvider>,
    settings: EngineSettings,
    modules: Vec<AudioModule>,
}

impl AudioEngineBuilder {
    pub fn new() -> Self {
        Self {
            one_shot: Vec::new(),
            looping: Vec::new(),
            clips: Box::new(ClipBank::new()),
            position: Box::new(NoPosition),
            settings: EngineSettings::default(),
            modules: Vec::new(),
        }
    }

    pub fn one_shot_voices(mut self, voices: Vec<Box<dyn Voice>>) -> Self {
        self.one_shot = voices;
        self
    }

    pub fn looping_voices(mut self, voices: Vec<Box<dyn Voice>>) -> Self {
        self.looping = voices;
        self
    }

    pub fn clips(mut self, clips: impl ClipRepository + 'static) -> Self {
        self.clips = Box::new(clips);
        self
    }

    pub fn position(mut self, position: impl PositionProvider + 'static) -> Self {
        self.position = Box::new(position);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn master_volume(mut self, volume: f32) -> Self {
        self.settings.master_volume = volume.max(0.0);
        self
    }

    pub fn module(mut self, module: impl Into<AudioModule>) -> Self {
        self.modules.push(module.into());
        self
    }

    pub fn build(self) -> AudioEngine {
        let one_shot_needed = BASE_ONE_SHOT_VOICES + module_voices(&self.modules, PoolKind::OneShot);
        let looping_needed = BASE_LOOPING_VOICES + module_voices(&self.modules, PoolKind::Looping);

        if self.one_shot.is_empty() {
            warn!("one-shot pool is empty, one-shot playback disabled");
        } else if self.one_shot.len() < one_shot_needed {
            warn!(have = self.one_shot.len(), want = one_shot_needed, "one-shot pool undersized");
        }
        if self.looping.is_empty() {
            warn!("looping pool is empty, looping playback disabled");
        } else if self.looping.len() < looping_needed {
            warn!(have = self.looping.len(), want = looping_needed, "looping pool undersized");
        }

        let mut modules = self.modules;
        for module in &mut modules {
            module.initialize(self.position.as_ref());
            info!(module = module.name(), "audio module initialized");
        }

        AudioEngine {
            settings: self.settings,
            voices: VoiceAllocator::new(self.one_shot, self.looping),
            clips: self.clips,
            position: self.position,
            proxies: Vec::new(),
            zones: Registry::new(),
            groups: Registry::new(),
            volume_groups: Vec::new(),
            modules,
            local_zones: Vec::new(),
            crossings: Vec::new(),
            requests: Vec::new(),
            now: 0.0,
        }
    }
}

impl Default for AudioEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn module_voices(modules: &[AudioModule], kind: PoolKind) -> usize {
    modules
        .iter()
        .map(|m| match kind {
            PoolKind::OneShot => m.required_one_shot_voices(),
            PoolKind::Looping => m.required_looping_voices(),
        })
        .sum()
}

pub struct AudioEngine {
    settings: EngineSettings,
    voices: VoiceAllocator,
    clips: Box<dyn ClipRepository>,
    position: Box<dyn PositionProvider>,
    proxies: Vec<PlaybackProxy>,
    zones: Registry<TriggerZone>,
    groups: Registry<ZoneGroup>,
    volume_groups: Vec<VolumeGroup>,
    modules: Vec<AudioModule>,
    /// Registered zones the local avatar is currently inside
    local_zones: Vec<ZoneId>,
    // Per-frame scratch
    crossings: Vec<(ZoneId, Transition)>,
    requests: Vec<OneShotRequest>,
    now: f64,
}

impl AudioEngine {
    pub fn builder() -> AudioEngineBuilder {
        AudioEngineBuilder::new()
    }

    fn split(&mut self) -> (&mut [PlaybackProxy], PlaybackCtx<'_>) {
        let ctx = PlaybackCtx {
            voices: &mut self.voices,
            clips: &*self.clips,
            master_volume: self.settings.master_volume,
            now: self.now,
        };
        (&mut self.proxies, ctx)
    }

    // --- setup ---

    pub fn add_proxy(&mut self, config: ProxyConfig) -> ProxyId {
        let proxy = PlaybackProxy::new(config, &*self.clips);
        self.proxies.push(proxy);
        ProxyId(self.proxies.len() - 1)
    }

    fn known_proxies(&self, ids: Vec<ProxyId>, owner: &str) -> Vec<ProxyId> {
        ids.into_iter()
            .filter(|id| {
                let known = id.index() < self.proxies.len();
                if !known {
                    warn!(owner, proxy = ?id, "unknown proxy dropped");
                }
                known
            })
            .collect()
    }

    /// Add and register a zone, pushing its fade times into its proxies and
    /// seeding the initial enter when the avatar starts inside.
    pub fn add_zone(&mut self, mut config: ZoneConfig) -> ZoneId {
        config.proxies = self.known_proxies(std::mem::take(&mut config.proxies), &config.name);

        let id = ZoneId(self.zones.len());
        let mut zone = TriggerZone::new(id, config);
        if zone.initialize(&mut self.proxies, self.position.local_position()) {
            self.local_zones.push(id);
        }
        self.zones.insert(zone);
        id
    }

    /// Add and register a group; its children join it (and fall silent when
    /// the group plays for them).
    pub fn add_group(&mut self, mut config: GroupConfig) -> GroupId {
        config.proxies = self.known_proxies(std::mem::take(&mut config.proxies), &config.name);
        config.children.retain(|child| {
            let known = child.index() < self.zones.len();
            if !known {
                warn!(group = %config.name, zone = ?child, "unknown child zone dropped");
            }
            known
        });

        let id = GroupId(self.groups.len());
        let mut group = ZoneGroup::new(id, config);
        group.initialize(&mut self.proxies);

        if group.is_enabled() {
            for child in group.children() {
                if let Some(zone) = self.zones.get_mut(child.index()) {
                    if let Some(previous) = zone.group() {
                        warn!(zone = %zone.name(), ?previous, "zone moved to another group");
                    }
                    zone.join_group(id, group.treat_as_one_zone());
                }
            }
        }
        self.groups.insert(group);
        self.sync_group_occupancy(id);
        id
    }

    /// Replay the avatar's current zones into a group's child occupancy.
    fn sync_group_occupancy(&mut self, id: GroupId) {
        let Self {
            groups, local_zones, ..
        } = self;
        if let Some(group) = groups.get_mut(id.index()) {
            for &zone in local_zones.iter() {
                group.child_enter(zone);
            }
        }
    }

    pub fn add_volume_group(&mut self, config: VolumeGroupConfig) -> usize {
        let config = VolumeGroupConfig {
            proxies: self.known_proxies(config.proxies, "volume group"),
            ..config
        };
        let mut group = VolumeGroup::new(config, &self.proxies);
        let value = group.volume();
        group.set_volume(value, &mut self.proxies, &self.voices, self.settings.master_volume);
        self.volume_groups.push(group);
        self.volume_groups.len() - 1
    }

    // --- registration ---

    pub fn register_zone(&mut self, zone: ZoneId) -> bool {
        self.zones.register(zone.index())
    }

    /// Unregister a zone: it drops out of [`current_zones`](Self::current_zones),
    /// leaves its group and fades out anything it was playing.
    pub fn unregister_zone(&mut self, zone: ZoneId) -> bool {
        if !self.zones.unregister(zone.index()) {
            return false;
        }
        let was_local = self.local_zones.contains(&zone);
        self.local_zones.retain(|&z| z != zone);

        if let Some(trigger) = self.zones.get_mut(zone.index()) {
            trigger.deactivate(&mut self.proxies);
            let group = trigger.group().filter(|_| was_local);
            if let Some(group) = group.and_then(|g| self.groups.get_mut(g.index())) {
                group.child_exit(zone);
            }
        }
        debug!(?zone, "zone unregistered");
        true
    }

    /// Register a group, picking up whichever of its children the avatar is
    /// already standing in.
    pub fn register_group(&mut self, group: GroupId) -> bool {
        if !self.groups.register(group.index()) {
            return false;
        }
        self.sync_group_occupancy(group);
        true
    }

    /// Unregister a group and fade out its proxies.
    pub fn unregister_group(&mut self, group: GroupId) -> bool {
        if !self.groups.unregister(group.index()) {
            return false;
        }
        if let Some(g) = self.groups.get_mut(group.index()) {
            g.deactivate(&mut self.proxies);
        }
        debug!(?group, "group unregistered");
        true
    }

    // --- occupancy events ---

    /// Raw enter of `zone` by `occupant`. Returns whether the zone accepted it.
    pub fn on_zone_enter(&mut self, zone: ZoneId, occupant: Occupant) -> bool {
        self.zone_event(zone, occupant, Transition::Enter)
    }

    /// Raw exit of `zone` by `occupant`. Returns whether the zone accepted it.
    pub fn on_zone_exit(&mut self, zone: ZoneId, occupant: Occupant) -> bool {
        self.zone_event(zone, occupant, Transition::Exit)
    }

    fn zone_event(&mut self, id: ZoneId, occupant: Occupant, transition: Transition) -> bool {
        if !self.zones.is_registered(id.index()) {
            if self.zones.get(id.index()).is_none() {
                warn!(zone = ?id, "event for unknown zone");
            } else {
                debug!(zone = ?id, "event for unregistered zone ignored");
            }
            return false;
        }
        let Some(zone) = self.zones.get_mut(id.index()) else {
            return false;
        };

        let accepted = match transition {
            Transition::Enter => zone.on_enter(occupant),
            Transition::Exit => zone.on_exit(occupant),
        };
        if !accepted || !occupant.is_local() {
            return accepted;
        }

        let group = zone.group();
        match transition {
            Transition::Enter if !self.local_zones.contains(&id) => self.local_zones.push(id),
            Transition::Exit => self.local_zones.retain(|&z| z != id),
            _ => {}
        }

        if let Some(group) = group.filter(|g| self.groups.is_registered(g.index())) {
            if let Some(group) = self.groups.get_mut(group.index()) {
                match transition {
                    Transition::Enter => group.child_enter(id),
                    Transition::Exit => group.child_exit(id),
                }
            }
        }
        true
    }

    /// Apply every queued cross-thread message. Returns how many were handled.
    pub fn process_messages<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) -> usize {
        let mut handled = 0;
        while let Some(msg) = rx.pop() {
            match msg {
                EngineMessage::ZoneEnter { zone, occupant } => {
                    self.on_zone_enter(zone, occupant);
                }
                EngineMessage::ZoneExit { zone, occupant } => {
                    self.on_zone_exit(zone, occupant);
                }
                EngineMessage::PlayProxy(proxy) => {
                    self.play_proxy(proxy);
                }
                EngineMessage::StopProxy(proxy) => {
                    self.stop_proxy(proxy);
                }
                EngineMessage::SetMasterVolume(volume) => self.set_master_volume(volume),
            }
            handled += 1;
        }
        handled
    }

    // --- frame ---

    pub fn tick(&mut self, frame: FrameContext) {
        self.now = frame.now;
        let listener = self.position.local_position();

        let mut crossings = std::mem::take(&mut self.crossings);
        for (index, zone) in self.zones.iter_registered_mut() {
            if let Some(transition) = zone.track_position(listener) {
                crossings.push((ZoneId(index), transition));
            }
        }
        for (zone, transition) in crossings.drain(..) {
            self.zone_event(zone, Occupant::Local, transition);
        }
        self.crossings = crossings;

        let mut requests = std::mem::take(&mut self.requests);
        for module in &mut self.modules {
            module.update(frame, self.position.as_ref(), &mut requests);
        }
        for request in requests.drain(..) {
            self.play_one_shot(&request.clip_key, request.position, request.volume);
        }
        self.requests = requests;

        let Self {
            voices,
            clips,
            proxies,
            zones,
            groups,
            settings,
            ..
        } = self;
        let mut ctx = PlaybackCtx {
            voices,
            clips: &**clips,
            master_volume: settings.master_volume,
            now: frame.now,
        };
        for (_, zone) in zones.iter_registered_mut() {
            zone.tick(proxies, &mut ctx, frame.delta_time);
        }
        for (_, group) in groups.iter_registered_mut() {
            group.tick(proxies, &mut ctx, frame.delta_time);
        }

        let master = self.settings.master_volume;
        for proxy in &mut self.proxies {
            proxy.integrate(&mut self.voices, master, frame.delta_time, listener);
        }

        self.voices.sweep(frame.now);
    }

    // --- direct playback ---

    /// Fire-and-forget one-shot. Logs and returns `false` when nothing plays.
    pub fn play_one_shot(&mut self, key: &str, position: Vec3, volume: f32) -> bool {
        match self.try_play_one_shot(key, position, volume) {
            Ok(_) => true,
            Err(err) => {
                warn!(key, %err, "one-shot not played");
                false
            }
        }
    }

    /// Like [`play_one_shot`](Self::play_one_shot), reporting why nothing played.
    ///
    /// The voice is released `clip duration + fade_out_duration` seconds from now.
    pub fn try_play_one_shot(
        &mut self,
        key: &str,
        position: Vec3,
        volume: f32,
    ) -> Result<VoiceSlot, AudioError> {
        let (slot, clip) = self.start_voice(PoolKind::OneShot, key, position, volume)?;
        let delay = self.clips.duration(clip) + self.settings.fade_out_duration;
        if let Err(err) = self
            .voices
            .schedule_release(PoolKind::OneShot, slot.index, delay, self.now)
        {
            debug!(%slot, %err, "one-shot release not scheduled");
        }
        Ok(slot)
    }

    /// Start a looping clip outside any proxy. Stop it with [`stop_looping`](Self::stop_looping).
    pub fn play_looping(&mut self, key: &str, position: Vec3, volume: f32) -> bool {
        match self.start_voice(PoolKind::Looping, key, position, volume) {
            Ok(_) => true,
            Err(err) => {
                warn!(key, %err, "looping clip not played");
                false
            }
        }
    }

    /// Release the first looping voice playing `key`.
    pub fn stop_looping(&mut self, key: &str) -> bool {
        match self.clips.resolve(key) {
            Some(clip) => self.voices.release_looping_clip(clip),
            None => {
                warn!(key, "audio clip not found");
                false
            }
        }
    }

    fn start_voice(
        &mut self,
        kind: PoolKind,
        key: &str,
        position: Vec3,
        volume: f32,
    ) -> Result<(VoiceSlot, ClipHandle), AudioError> {
        let clip = self
            .clips
            .resolve(key)
            .ok_or_else(|| AudioError::MissingAsset(key.to_owned()))?;
        let lease = self.voices.lease(kind).ok_or(AudioError::NoFreeVoice(kind))?;
        let master = self.settings.master_volume;

        let voice = self
            .voices
            .voice_mut(lease)
            .ok_or(AudioError::NoFreeVoice(kind))?;
        voice.set_clip(Some(clip));
        voice.set_loop(kind == PoolKind::Looping);
        voice.set_volume(volume * master);
        voice.set_position(position);
        voice.play_immediate();
        Ok((lease.slot, clip))
    }

    // --- proxies ---

    pub fn play_proxy(&mut self, id: ProxyId) -> bool {
        let (proxies, mut ctx) = self.split();
        match proxies.get_mut(id.index()) {
            Some(proxy) => proxy.play(&mut ctx),
            None => {
                warn!(error = %AudioError::UnknownProxy(id), "play ignored");
                false
            }
        }
    }

    pub fn stop_proxy(&mut self, id: ProxyId) {
        match self.proxies.get_mut(id.index()) {
            Some(proxy) => proxy.stop(),
            None => warn!(error = %AudioError::UnknownProxy(id), "stop ignored"),
        }
    }

    pub fn force_stop_proxy(&mut self, id: ProxyId) {
        match self.proxies.get_mut(id.index()) {
            Some(proxy) => proxy.force_stop(&mut self.voices),
            None => warn!(error = %AudioError::UnknownProxy(id), "force stop ignored"),
        }
    }

    /// Change a proxy's base volume and re-target its fade.
    pub fn set_proxy_volume(&mut self, id: ProxyId, volume: f32) {
        let master = self.settings.master_volume;
        if let Some(proxy) = self.proxies.get_mut(id.index()) {
            proxy.set_base_volume(volume);
            proxy.update_volume(&self.voices, master);
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.settings.master_volume = volume.max(0.0);
        for proxy in &mut self.proxies {
            proxy.update_volume(&self.voices, self.settings.master_volume);
        }
    }

    pub fn set_group_volume(&mut self, group: usize, volume: f32) {
        let master = self.settings.master_volume;
        match self.volume_groups.get_mut(group) {
            Some(g) => g.set_volume(volume, &mut self.proxies, &self.voices, master),
            None => warn!(group, "unknown volume group"),
        }
    }

    pub fn play_volume_group(&mut self, group: usize) {
        let Self {
            voices,
            clips,
            proxies,
            volume_groups,
            settings,
            now,
            ..
        } = self;
        let Some(g) = volume_groups.get(group) else {
            warn!(group, "unknown volume group");
            return;
        };
        let mut ctx = PlaybackCtx {
            voices,
            clips: &**clips,
            master_volume: settings.master_volume,
            now: *now,
        };
        g.play_all(proxies, &mut ctx);
    }

    pub fn stop_volume_group(&mut self, group: usize) {
        match self.volume_groups.get(group) {
            Some(g) => g.stop_all(&mut self.proxies),
            None => warn!(group, "unknown volume group"),
        }
    }

    /// Re-read member base volumes, e.g. after [`set_proxy_volume`](Self::set_proxy_volume).
    pub fn refresh_volume_group(&mut self, group: usize) {
        match self.volume_groups.get_mut(group) {
            Some(g) => g.refresh_original_volumes(&self.proxies),
            None => warn!(group, "unknown volume group"),
        }
    }

    // --- zone / group manual control ---

    pub fn play_zone(&mut self, id: ZoneId) {
        let Self {
            voices,
            clips,
            proxies,
            zones,
            settings,
            now,
            ..
        } = self;
        let Some(zone) = zones.get(id.index()) else {
            warn!(error = %AudioError::UnknownZone(id), "play ignored");
            return;
        };
        let mut ctx = PlaybackCtx {
            voices,
            clips: &**clips,
            master_volume: settings.master_volume,
            now: *now,
        };
        zone.play_all(proxies, &mut ctx);
    }

    pub fn stop_zone(&mut self, id: ZoneId) {
        match self.zones.get(id.index()) {
            Some(zone) => zone.stop_all(&mut self.proxies),
            None => warn!(error = %AudioError::UnknownZone(id), "stop ignored"),
        }
    }

    pub fn force_stop_zone(&mut self, id: ZoneId) {
        let Self {
            voices,
            clips,
            proxies,
            zones,
            settings,
            now,
            ..
        } = self;
        let Some(zone) = zones.get_mut(id.index()) else {
            warn!(error = %AudioError::UnknownZone(id), "force stop ignored");
            return;
        };
        let mut ctx = PlaybackCtx {
            voices,
            clips: &**clips,
            master_volume: settings.master_volume,
            now: *now,
        };
        zone.force_stop_all(proxies, &mut ctx);
    }

    pub fn set_zone_fade_times(&mut self, id: ZoneId, fade_in: f32, fade_out: f32) {
        match self.zones.get_mut(id.index()) {
            Some(zone) => zone.set_fade_times(&mut self.proxies, fade_in, fade_out),
            None => warn!(error = %AudioError::UnknownZone(id), "fade times ignored"),
        }
    }

    pub fn play_group_audio(&mut self, id: GroupId) {
        let Self {
            voices,
            clips,
            proxies,
            groups,
            settings,
            now,
            ..
        } = self;
        let Some(group) = groups.get(id.index()) else {
            warn!(error = %AudioError::UnknownGroup(id), "play ignored");
            return;
        };
        let mut ctx = PlaybackCtx {
            voices,
            clips: &**clips,
            master_volume: settings.master_volume,
            now: *now,
        };
        group.play_group_audio(proxies, &mut ctx);
    }

    pub fn stop_group_audio(&mut self, id: GroupId) {
        match self.groups.get(id.index()) {
            Some(group) => group.stop_group_audio(&mut self.proxies),
            None => warn!(error = %AudioError::UnknownGroup(id), "stop ignored"),
        }
    }

    // --- queries ---

    pub fn required_one_shot_pool_size(&self) -> usize {
        BASE_ONE_SHOT_VOICES + module_voices(&self.modules, PoolKind::OneShot)
    }

    pub fn required_looping_pool_size(&self) -> usize {
        BASE_LOOPING_VOICES + module_voices(&self.modules, PoolKind::Looping)
    }

    /// Registered zones the local avatar is inside, in entry order.
    pub fn current_zones(&self) -> &[ZoneId] {
        &self.local_zones
    }

    pub fn log_current_zones(&self) {
        let names: Vec<&str> = self
            .local_zones
            .iter()
            .filter_map(|z| self.zones.get(z.index()))
            .map(|z| z.name())
            .collect();
        info!(count = names.len(), zones = ?names, "local player zones");
    }

    pub fn proxy(&self, id: ProxyId) -> Option<&PlaybackProxy> {
        self.proxies.get(id.index())
    }

    pub fn proxies(&self) -> &[PlaybackProxy] {
        &self.proxies
    }

    pub fn zone(&self, id: ZoneId) -> Option<&TriggerZone> {
        self.zones.get(id.index())
    }

    pub fn zones(&self) -> impl Iterator<Item = (ZoneId, &TriggerZone)> {
        self.zones.iter_registered().map(|(i, z)| (ZoneId(i), z))
    }

    pub fn group(&self, id: GroupId) -> Option<&ZoneGroup> {
        self.groups.get(id.index())
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &ZoneGroup)> {
        self.groups.iter_registered().map(|(i, g)| (GroupId(i), g))
    }

    pub fn volume_group(&self, index: usize) -> Option<&VolumeGroup> {
        self.volume_groups.get(index)
    }

    pub fn modules(&self) -> &[AudioModule] {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut [AudioModule] {
        &mut self.modules
    }

    pub fn voices(&self) -> &VoiceAllocator {
        &self.voices
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn now(&self) -> f64 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::sim::{SimAvatar, SimProbe, SimVoice},
        config::FootstepConfig,
        engine::clock::FrameClock,
        modules::FootstepAudio,
        zones::bounds::ZoneBounds,
    };

    const FRAME: f32 = 0.02;

    struct Rig {
        engine: AudioEngine,
        clock: FrameClock,
        one_shot: Vec<SimProbe>,
        looping: Vec<SimProbe>,
    }

    impl Rig {
        fn new(builder: AudioEngineBuilder) -> Self {
            let (one_shot_voices, one_shot) = SimVoice::bank(4);
            let (looping_voices, looping) = SimVoice::bank(2);
            let clips = ClipBank::new()
                .with_clip("ding", 1.0)
                .with_clip("rain", 10.0)
                .with_clip("Footstep 1", 0.3)
                .with_clip("Footstep 2", 0.3);
            let engine = builder
                .one_shot_voices(one_shot_voices)
                .looping_voices(looping_voices)
                .clips(clips)
                .build();
            Self {
                engine,
                clock: FrameClock::new(),
                one_shot,
                looping,
            }
        }

        fn run(&mut self, seconds: f32) {
            for _ in 0..(seconds / FRAME).round() as usize {
                let frame = self.clock.advance(FRAME);
                self.engine.tick(frame);
            }
        }
    }

    #[test]
    fn pool_sizes_include_modules() {
        let rig = Rig::new(AudioEngine::builder().module(FootstepAudio::new(FootstepConfig::default())));
        assert_eq!(rig.engine.required_one_shot_pool_size(), 14);
        assert_eq!(rig.engine.required_looping_pool_size(), 5);
    }

    #[test]
    fn one_shot_scales_by_master_and_releases_after_tail() {
        let mut rig = Rig::new(AudioEngine::builder().master_volume(0.5));
        assert!(rig.engine.play_one_shot("ding", Vec3::X, 0.8));
        assert_eq!(rig.one_shot[0].volume(), 0.4);
        assert_eq!(rig.one_shot[0].state().position, Vec3::X);

        // clip 1.0 s + 0.5 s tail
        rig.run(1.4);
        assert_eq!(rig.engine.voices().pool(PoolKind::OneShot).in_use_count(), 1);
        rig.run(0.2);
        assert_eq!(rig.engine.voices().pool(PoolKind::OneShot).in_use_count(), 0);
    }

    #[test]
    fn unknown_clip_reports_missing_asset() {
        let mut rig = Rig::new(AudioEngine::builder());
        assert_eq!(
            rig.engine.try_play_one_shot("nope", Vec3::ZERO, 1.0),
            Err(AudioError::MissingAsset("nope".into()))
        );
        assert!(!rig.engine.play_looping("nope", Vec3::ZERO, 1.0));
    }

    #[test]
    fn stop_looping_releases_matching_voice() {
        let mut rig = Rig::new(AudioEngine::builder());
        assert!(rig.engine.play_looping("rain", Vec3::ZERO, 1.0));
        assert!(rig.looping[0].state().looping);
        assert!(rig.engine.stop_looping("rain"));
        assert!(!rig.looping[0].is_playing());
        assert!(!rig.engine.stop_looping("rain"));
    }

    #[test]
    fn master_volume_retargets_playing_proxies() {
        let mut rig = Rig::new(AudioEngine::builder());
        let proxy = rig.engine.add_proxy(ProxyConfig {
            looping: true,
            ..ProxyConfig::new("rain")
        });
        rig.engine.play_proxy(proxy);
        rig.run(0.1);
        assert_eq!(rig.looping[0].volume(), 1.0);

        rig.engine.set_master_volume(0.25);
        rig.run(0.1);
        assert_eq!(rig.looping[0].volume(), 0.25);
    }

    #[test]
    fn registration_is_idempotent_and_gates_events() {
        let mut rig = Rig::new(AudioEngine::builder());
        let zone = rig.engine.add_zone(ZoneConfig::new("hall", Vec::new()));
        assert!(!rig.engine.register_zone(zone));
        assert!(rig.engine.unregister_zone(zone));
        assert!(!rig.engine.unregister_zone(zone));

        assert!(!rig.engine.on_zone_enter(zone, Occupant::Local));
        assert!(rig.engine.register_zone(zone));
        assert!(rig.engine.on_zone_enter(zone, Occupant::Local));
        assert!(!rig.engine.on_zone_enter(ZoneId(42), Occupant::Local));
    }

    #[test]
    fn tracks_zones_containing_the_local_player() {
        let mut rig = Rig::new(AudioEngine::builder());
        let a = rig.engine.add_zone(ZoneConfig::new("a", Vec::new()));
        let b = rig.engine.add_zone(ZoneConfig::new("b", Vec::new()));

        rig.engine.on_zone_enter(a, Occupant::Local);
        rig.engine.on_zone_enter(b, Occupant::Local);
        rig.engine.on_zone_enter(b, Occupant::Remote(3));
        assert_eq!(rig.engine.current_zones(), &[a, b]);

        rig.engine.on_zone_exit(a, Occupant::Local);
        assert_eq!(rig.engine.current_zones(), &[b]);
        rig.engine.log_current_zones();
    }

    #[test]
    fn avatar_position_drives_bounded_zones() {
        let avatar = SimAvatar::at(Vec3::new(50.0, 0.0, 0.0));
        let mut rig = Rig::new(AudioEngine::builder().position(avatar.clone()));
        let proxy = rig.engine.add_proxy(ProxyConfig {
            looping: true,
            ..ProxyConfig::new("rain")
        });
        let zone = rig.engine.add_zone(ZoneConfig {
            bounds: Some(ZoneBounds::from_center_size(Vec3::ZERO, Vec3::splat(10.0))),
            fade_in_duration: 0.0,
            ..ZoneConfig::new("porch", vec![proxy])
        });

        rig.run(0.5);
        assert!(!rig.engine.zone(zone).is_some_and(|z| z.is_player_inside()));

        avatar.move_to(Vec3::ZERO);
        rig.run(0.5);
        assert!(rig.engine.zone(zone).is_some_and(|z| z.is_player_inside()));
        assert!(rig.looping[0].is_playing());
    }

    #[test]
    fn messages_are_drained_in_order() {
        let mut rig = Rig::new(AudioEngine::builder());
        let proxy = rig.engine.add_proxy(ProxyConfig {
            looping: true,
            ..ProxyConfig::new("rain")
        });
        let mut queue = std::collections::VecDeque::from([
            EngineMessage::SetMasterVolume(0.5),
            EngineMessage::PlayProxy(proxy),
        ]);
        assert_eq!(rig.engine.process_messages(&mut queue), 2);
        assert_eq!(rig.engine.settings().master_volume, 0.5);
        assert!(rig.engine.proxy(proxy).is_some_and(|p| p.is_playing(rig.engine.voices())));
    }

    #[test]
    fn manual_zone_and_group_playback_use_their_own_proxies() {
        let mut rig = Rig::new(AudioEngine::builder());
        let looping = |key: &str| ProxyConfig {
            looping: true,
            ..ProxyConfig::new(key)
        };
        let zone_rain = rig.engine.add_proxy(looping("rain"));
        let group_rain = rig.engine.add_proxy(looping("rain"));
        let zone = rig.engine.add_zone(ZoneConfig::new("porch", vec![zone_rain]));
        let group = rig
            .engine
            .add_group(GroupConfig::new("house", vec![zone], vec![group_rain]));

        let playing = |rig: &Rig, id| rig.engine.proxy(id).is_some_and(|p| p.is_playing(rig.engine.voices()));

        rig.engine.play_zone(zone);
        rig.run(0.1);
        assert!(playing(&rig, zone_rain));
        assert!(!playing(&rig, group_rain));

        rig.engine.play_group_audio(group);
        rig.run(0.1);
        assert!(playing(&rig, group_rain));

        rig.engine.stop_zone(zone);
        rig.engine.stop_group_audio(group);
        rig.run(0.1);
        assert_eq!(rig.engine.voices().pool(PoolKind::Looping).in_use_count(), 0);
    }

    #[test]
    fn volume_group_plays_stops_and_rebases() {
        let mut rig = Rig::new(AudioEngine::builder());
        let loud = rig.engine.add_proxy(ProxyConfig {
            looping: true,
            ..ProxyConfig::new("rain")
        });
        let soft = rig.engine.add_proxy(ProxyConfig {
            looping: true,
            volume: 0.5,
            ..ProxyConfig::new("rain")
        });
        let group = rig.engine.add_volume_group(VolumeGroupConfig {
            proxies: vec![loud, soft],
            ..VolumeGroupConfig::default()
        });
        let base = |rig: &Rig, id| rig.engine.proxy(id).map_or(0.0, |p| p.base_volume());

        rig.engine.play_volume_group(group);
        rig.run(0.1);
        assert_eq!(rig.engine.voices().pool(PoolKind::Looping).in_use_count(), 2);

        rig.engine.set_group_volume(group, 0.5);
        assert_eq!(base(&rig, soft), 0.25);

        // a direct edit survives the next fader move once the group is refreshed
        rig.engine.set_proxy_volume(loud, 0.8);
        rig.engine.refresh_volume_group(group);
        rig.engine.set_group_volume(group, 1.0);
        assert!((base(&rig, loud) - 1.6).abs() < 1e-5);
        assert_eq!(base(&rig, soft), 0.5);

        rig.engine.stop_volume_group(group);
        rig.run(0.1);
        assert_eq!(rig.engine.voices().pool(PoolKind::Looping).in_use_count(), 0);

        // unknown index is logged, not fatal
        rig.engine.play_volume_group(9);
        rig.engine.stop_volume_group(9);
        rig.engine.refresh_volume_group(9);
    }
}
