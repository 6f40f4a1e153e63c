use tracing::warn;

use crate::{
    config::VolumeGroupConfig,
    engine::{allocator::VoiceAllocator, registry::ProxyId},
    playback::proxy::{PlaybackCtx, PlaybackProxy},
};

/// A shared volume fader over a set of proxies.
///
/// Each proxy's base volume becomes `original x group volume`, where the
/// original is snapshotted when the group is built.
#[derive(Debug, Clone)]
pub struct VolumeGroup {
    proxies: Vec<ProxyId>,
    originals: Vec<f32>,
    value: f32,
    min_value: f32,
    max_value: f32,
}

impl VolumeGroup {
    pub fn new(config: VolumeGroupConfig, proxies: &[PlaybackProxy]) -> Self {
        let (min_value, max_value) = if config.min_value <= config.max_value {
            (config.min_value, config.max_value)
        } else {
            warn!(
                min = config.min_value,
                max = config.max_value,
                "volume group range inverted, swapping"
            );
            (config.max_value, config.min_value)
        };

        let originals = config
            .proxies
            .iter()
            .map(|id| proxies.get(id.index()).map_or(1.0, |p| p.base_volume()))
            .collect();

        Self {
            proxies: config.proxies,
            originals,
            value: config.default_value.clamp(min_value, max_value),
            min_value,
            max_value,
        }
    }

    /// Clamp to the group's range and push into every proxy.
    pub fn set_volume(
        &mut self,
        value: f32,
        proxies: &mut [PlaybackProxy],
        voices: &VoiceAllocator,
        master_volume: f32,
    ) {
        self.value = value.clamp(self.min_value, self.max_value);
        for (id, original) in self.proxies.iter().zip(&self.originals) {
            if let Some(proxy) = proxies.get_mut(id.index()) {
                proxy.set_base_volume(original * self.value);
                proxy.update_volume(voices, master_volume);
            }
        }
    }

    /// Re-derive originals from the proxies' current base volume.
    pub fn refresh_original_volumes(&mut self, proxies: &[PlaybackProxy]) {
        for (id, original) in self.proxies.iter().zip(self.originals.iter_mut()) {
            let Some(proxy) = proxies.get(id.index()) else {
                continue;
            };
            *original = if self.value > 0.0 {
                proxy.base_volume() / self.value
            } else {
                proxy.base_volume()
            };
        }
    }

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

    pub fn volume(&self) -> f32 {
        self.value
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min_value, self.max_value)
    }

    pub fn proxies(&self) -> &[ProxyId] {
        &self.proxies
    }
}
