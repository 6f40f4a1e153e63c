//! Distance-triggered footsteps with surface-specific clip sets.

use glam::{Vec3, Vec3Swizzles};
use tracing::{debug, warn};

use super::{ModuleCapabilities, OneShotRequest};
use crate::{
    backend::PositionProvider,
    config::{FootstepConfig, FootstepZoneConfig},
    engine::clock::FrameContext,
};

/// Footsteps are placed this far below the tracked position.
const FOOT_OFFSET: f32 = 1.0;

/// A surface region that overrides the footstep clips while occupied.
#[derive(Debug, Clone)]
pub struct FootstepZone {
    config: FootstepZoneConfig,
    occupied: bool,
}

impl FootstepZone {
    pub fn new(config: FootstepZoneConfig) -> Self {
        Self {
            config,
            occupied: false,
        }
    }

    /// Occupancy for zones driven by host events rather than bounds.
    pub fn set_occupied(&mut self, occupied: bool) {
        self.occupied = occupied;
    }

    fn track(&mut self, position: Vec3) {
        if let Some(bounds) = self.config.bounds {
            self.occupied = bounds.contains(position);
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn priority(&self) -> i32 {
        self.config.priority
    }

    pub fn clips(&self) -> &[String] {
        &self.config.clips
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

#[derive(Debug, Clone)]
pub struct FootstepAudio {
    config: FootstepConfig,
    zones: Vec<FootstepZone>,
    enabled: bool,
    last_position: Vec3,
    travelled: f32,
    last_step: Option<f64>,
    cursor: usize,
    active_zone: Option<usize>,
}

impl FootstepAudio {
    pub fn new(mut config: FootstepConfig) -> Self {
        let zones = std::mem::take(&mut config.zones)
            .into_iter()
            .map(FootstepZone::new)
            .collect();
        Self {
            config,
            zones,
            enabled: false,
            last_position: Vec3::ZERO,
            travelled: 0.0,
            last_step: None,
            cursor: 0,
            active_zone: None,
        }
    }

    /// Highest-priority occupied zone; earlier zones win ties.
    fn select_zone(&self) -> Option<usize> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.is_occupied())
            .fold(None, |best: Option<(usize, i32)>, (i, z)| match best {
                Some((_, p)) if p >= z.priority() => best,
                _ => Some((i, z.priority())),
            })
            .map(|(i, _)| i)
    }

    fn update_active_zone(&mut self) {
        let selected = self.select_zone();
        if selected != self.active_zone {
            debug!(
                from = self.zone_name(self.active_zone),
                to = self.zone_name(selected),
                "footstep surface changed"
            );
            self.active_zone = selected;
            self.cursor = 0;
            self.travelled = 0.0;
        }
    }

    fn zone_name(&self, zone: Option<usize>) -> &str {
        zone.and_then(|i| self.zones.get(i))
            .map_or("default", |z| z.name())
    }

    fn current_clips(&self) -> &[String] {
        match self.active_zone.and_then(|i| self.zones.get(i)) {
            Some(zone) => zone.clips(),
            None => &self.config.clips,
        }
    }

    fn next_clip(&mut self) -> Option<String> {
        let clips = self.current_clips();
        let len = clips.len();
        if len == 0 {
            return None;
        }
        let clip = clips[self.cursor % len].clone();
        self.cursor = (self.cursor + 1) % len;
        Some(clip)
    }

    pub fn zones(&self) -> &[FootstepZone] {
        &self.zones
    }

    pub fn zones_mut(&mut self) -> &mut [FootstepZone] {
        &mut self.zones
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn travelled(&self) -> f32 {
        self.travelled
    }
}

impl ModuleCapabilities for FootstepAudio {
    fn required_one_shot_voices(&self) -> usize {
        4
    }

    fn initialize(&mut self, position: &dyn PositionProvider) {
        let Some(start) = position.local_position() else {
            warn!("footsteps need a local position, module disabled");
            self.enabled = false;
            return;
        };
        self.enabled = true;
        self.last_position = start;
        self.travelled = 0.0;
        self.last_step = None;
        self.cursor = 0;
        self.active_zone = None;
        debug!(
            step_distance = self.config.step_distance,
            volume = self.config.volume,
            "footsteps initialized"
        );
    }

    fn update(
        &mut self,
        frame: FrameContext,
        position: &dyn PositionProvider,
        requests: &mut Vec<OneShotRequest>,
    ) {
        if !self.enabled {
            return;
        }
        let Some(current) = position.local_position() else {
            return;
        };

        for zone in &mut self.zones {
            zone.track(current);
        }
        self.update_active_zone();

        if position.is_grounded() {
            self.travelled += (current.xz() - self.last_position.xz()).length();

            let rested = self
                .last_step
                .map_or(true, |t| frame.now - t >= f64::from(self.config.min_time_between_steps));
            if self.travelled >= self.config.step_distance && rested {
                match self.next_clip() {
                    Some(clip_key) => requests.push(OneShotRequest {
                        clip_key,
                        position: current - Vec3::Y * FOOT_OFFSET,
                        volume: self.config.volume,
                    }),
                    None => warn!("no footstep clips available"),
                }
                self.travelled = 0.0;
                self.last_step = Some(frame.now);
            }
        } else {
            self.travelled = 0.0;
        }
        self.last_position = current;
    }

    fn name(&self) -> &'static str {
        "footsteps"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::sim::SimAvatar, zones::bounds::ZoneBounds};

    fn walk(
        module: &mut FootstepAudio,
        avatar: &SimAvatar,
        to: Vec3,
        now: f64,
    ) -> Vec<OneShotRequest> {
        avatar.move_to(to);
        let mut out = Vec::new();
        module.update(FrameContext::new(now, 0.1), avatar, &mut out);
        out
    }

    #[test]
    fn steps_every_step_distance_and_cycles_clips() {
        let avatar = SimAvatar::at(Vec3::ZERO);
        let mut module = FootstepAudio::new(FootstepConfig::default());
        module.initialize(&avatar);

        assert!(walk(&mut module, &avatar, Vec3::new(1.0, 0.0, 0.0), 1.0).is_empty());
        let first = walk(&mut module, &avatar, Vec3::new(2.0, 5.0, 0.0), 2.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].clip_key, "Footstep 1");
        assert_eq!(first[0].position, Vec3::new(2.0, 4.0, 0.0));
        assert_eq!(first[0].volume, 0.8);

        let second = walk(&mut module, &avatar, Vec3::new(4.0, 5.0, 0.0), 3.0);
        assert_eq!(second[0].clip_key, "Footstep 2");
        let third = walk(&mut module, &avatar, Vec3::new(6.0, 5.0, 0.0), 4.0);
        assert_eq!(third[0].clip_key, "Footstep 1");
    }

    #[test]
    fn vertical_motion_does_not_count() {
        let avatar = SimAvatar::at(Vec3::ZERO);
        let mut module = FootstepAudio::new(FootstepConfig::default());
        module.initialize(&avatar);
        assert!(walk(&mut module, &avatar, Vec3::new(0.0, 10.0, 0.0), 1.0).is_empty());
        assert_eq!(module.travelled(), 0.0);
    }

    #[test]
    fn steps_are_rate_limited() {
        let avatar = SimAvatar::at(Vec3::ZERO);
        let mut module = FootstepAudio::new(FootstepConfig::default());
        module.initialize(&avatar);
        assert_eq!(walk(&mut module, &avatar, Vec3::new(3.0, 0.0, 0.0), 1.0).len(), 1);
        assert!(walk(&mut module, &avatar, Vec3::new(6.0, 0.0, 0.0), 1.1).is_empty());
        assert_eq!(walk(&mut module, &avatar, Vec3::new(6.5, 0.0, 0.0), 1.5).len(), 1);
    }

    #[test]
    fn airborne_resets_travel() {
        let avatar = SimAvatar::at(Vec3::ZERO);
        let mut module = FootstepAudio::new(FootstepConfig::default());
        module.initialize(&avatar);
        walk(&mut module, &avatar, Vec3::new(1.5, 0.0, 0.0), 1.0);
        avatar.set_grounded(false);
        walk(&mut module, &avatar, Vec3::new(3.0, 0.0, 0.0), 2.0);
        assert_eq!(module.travelled(), 0.0);
    }

    #[test]
    fn highest_priority_zone_picks_clips() {
        let gravel = FootstepZoneConfig {
            name: "gravel".into(),
            clips: vec!["Gravel".into()],
            priority: 1,
            bounds: Some(ZoneBounds::new(Vec3::splat(-100.0), Vec3::splat(100.0))),
        };
        let wood = FootstepZoneConfig {
            name: "wood".into(),
            clips: vec!["Wood".into()],
            priority: 5,
            bounds: Some(ZoneBounds::new(Vec3::new(2.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0))),
        };
        let config = FootstepConfig {
            zones: vec![gravel, wood],
            ..FootstepConfig::default()
        };
        let avatar = SimAvatar::at(Vec3::ZERO);
        let mut module = FootstepAudio::new(config);
        module.initialize(&avatar);

        let out = walk(&mut module, &avatar, Vec3::new(-2.5, 0.0, 0.0), 1.0);
        assert_eq!(out[0].clip_key, "Gravel");
        let out = walk(&mut module, &avatar, Vec3::new(3.0, 0.0, 0.0), 2.0);
        assert_eq!(out[0].clip_key, "Wood");

        // back on gravel the clip cursor starts over
        walk(&mut module, &avatar, Vec3::new(-3.0, 0.0, 0.0), 3.0);
        let out = walk(&mut module, &avatar, Vec3::new(-6.0, 0.0, 0.0), 4.0);
        assert_eq!(out[0].clip_key, "Gravel");
    }

    #[test]
    fn missing_position_disables_module() {
        let mut module = FootstepAudio::new(FootstepConfig::default());
        module.initialize(&SimAvatar::absent());
        assert!(!module.is_enabled());
        assert_eq!(module.required_one_shot_voices(), 4);
    }
}
