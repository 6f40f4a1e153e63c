use glam::Vec3;
use tracing::debug;

use crate::{
    config::ZoneConfig,
    engine::registry::{GroupId, ZoneId},
    playback::proxy::{PlaybackCtx, PlaybackProxy},
    zones::{
        bounds::ZoneBounds,
        debounce::Transition,
        driver::{DriverRef, ProxyDriver},
    },
};

/// Who crossed a zone boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Occupant {
    /// The avatar this engine instance plays audio for
    Local,
    /// Anyone else, identified by the host
    Remote(u32),
}

impl Occupant {
    pub fn is_local(self) -> bool {
        matches!(self, Occupant::Local)
    }
}

/// An occupancy volume driving a set of proxies.
#[derive(Debug, Clone)]
pub struct TriggerZone {
    name: String,
    driver: ProxyDriver,
    require_local_player: bool,
    one_time_play: bool,
    start_inside: bool,
    fade_in_duration: f32,
    fade_out_duration: f32,
    bounds: Option<ZoneBounds>,
    /// Last containment result for position-driven occupancy
    contains_local: bool,
    group: Option<GroupId>,
}

impl TriggerZone {
    pub fn new(id: ZoneId, config: ZoneConfig) -> Self {
        let mut driver = ProxyDriver::new(
            DriverRef::Zone(id),
            config.proxies,
            config.enter_delay,
            config.exit_delay,
        );
        driver.play_on_enter = config.play_on_enter;
        driver.stop_on_exit = config.stop_on_exit;

        Self {
            name: config.name,
            driver,
            require_local_player: config.require_local_player,
            one_time_play: config.one_time_play,
            start_inside: config.start_inside,
            fade_in_duration: config.fade_in_duration,
            fade_out_duration: config.fade_out_duration,
            bounds: config.bounds,
            contains_local: false,
            group: None,
        }
    }

    /// Push fade times into the proxies and seed the initial enter.
    ///
    /// `local_position` is `None` when there is no local avatar yet.
    /// Returns `true` when the zone starts occupied and an enter was queued.
    pub fn initialize(&mut self, proxies: &mut [PlaybackProxy], local_position: Option<Vec3>) -> bool {
        self.driver
            .set_fade_times(proxies, self.fade_in_duration, self.fade_out_duration);

        let seed = if self.start_inside {
            !self.require_local_player || local_position.is_some()
        } else if self.require_local_player {
            matches!((self.bounds, local_position), (Some(b), Some(p)) if b.contains(p))
        } else {
            false
        };

        if seed {
            debug!(zone = %self.name, "seeding initial enter");
            self.driver.seed_enter();
            // Position tracking must not re-report the same entry
            self.contains_local = local_position
                .zip(self.bounds)
                .is_some_and(|(p, b)| b.contains(p));
        }
        seed
    }

    fn accepts(&self, occupant: Occupant) -> bool {
        !self.require_local_player || occupant.is_local()
    }

    /// Raw enter. Returns `false` if the event was rejected by the zone's gates.
    pub fn on_enter(&mut self, occupant: Occupant) -> bool {
        if !self.accepts(occupant) || (self.one_time_play && self.driver.has_played()) {
            return false;
        }
        self.driver.raw_enter();
        true
    }

    /// Raw exit. Returns `false` if the event was rejected.
    pub fn on_exit(&mut self, occupant: Occupant) -> bool {
        if !self.accepts(occupant) {
            return false;
        }
        self.driver.raw_exit();
        true
    }

    /// Containment change of the local avatar, if this zone has bounds.
    pub(crate) fn track_position(&mut self, position: Option<Vec3>) -> Option<Transition> {
        let bounds = self.bounds?;
        let inside = position.is_some_and(|p| bounds.contains(p));
        if inside == self.contains_local {
            return None;
        }
        self.contains_local = inside;
        Some(if inside {
            Transition::Enter
        } else {
            Transition::Exit
        })
    }

    pub fn tick(
        &mut self,
        proxies: &mut [PlaybackProxy],
        ctx: &mut PlaybackCtx<'_>,
        delta_time: f32,
    ) -> Option<Transition> {
        let fired = self.driver.tick(proxies, ctx, delta_time);
        if let Some(transition) = fired {
            debug!(zone = %self.name, ?transition, "zone transition");
        }
        fired
    }

    /// Hand playback over to an owning group; the zone keeps tracking occupancy.
    pub(crate) fn join_group(&mut self, group: GroupId, silence: bool) {
        self.group = Some(group);
        if silence {
            self.driver.play_on_enter = false;
            self.driver.stop_on_exit = false;
        }
    }

    pub fn play_all(&self, proxies: &mut [PlaybackProxy], ctx: &mut PlaybackCtx<'_>) {
        self.driver.play_all(proxies, ctx);
    }

    pub fn stop_all(&self, proxies: &mut [PlaybackProxy]) {
        self.driver.stop_all(proxies);
    }

    pub fn force_stop_all(&mut self, proxies: &mut [PlaybackProxy], ctx: &mut PlaybackCtx<'_>) {
        self.driver.force_stop_all(proxies, ctx.voices);
    }

    /// Drop occupancy and fade out anything still sounding.
    pub fn deactivate(&mut self, proxies: &mut [PlaybackProxy]) {
        self.contains_local = false;
        self.driver.reset(proxies);
    }

    pub fn set_fade_times(&mut self, proxies: &mut [PlaybackProxy], fade_in: f32, fade_out: f32) {
        self.fade_in_duration = fade_in;
        self.fade_out_duration = fade_out;
        self.driver.set_fade_times(proxies, fade_in, fade_out);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver(&self) -> &ProxyDriver {
        &self.driver
    }

    pub fn is_player_inside(&self) -> bool {
        self.driver.is_inside()
    }

    pub fn has_played(&self) -> bool {
        self.driver.has_played()
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn is_group_member(&self) -> bool {
        self.group.is_some()
    }

    pub fn bounds(&self) -> Option<ZoneBounds> {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(config: ZoneConfig) -> TriggerZone {
        TriggerZone::new(ZoneId(0), config)
    }

    #[test]
    fn remote_players_rejected_when_local_required() {
        let mut z = zone(ZoneConfig::default());
        assert!(!z.on_enter(Occupant::Remote(4)));
        assert!(z.on_enter(Occupant::Local));

        let mut open = zone(ZoneConfig {
            require_local_player: false,
            ..ZoneConfig::default()
        });
        assert!(open.on_enter(Occupant::Remote(4)));
    }

    #[test]
    fn start_inside_seeds_enter() {
        let mut z = zone(ZoneConfig {
            start_inside: true,
            ..ZoneConfig::default()
        });
        assert!(z.initialize(&mut [], Some(Vec3::ZERO)));
        assert_eq!(z.driver().queued(), Some(Transition::Enter));

        let mut nobody = zone(ZoneConfig {
            start_inside: true,
            ..ZoneConfig::default()
        });
        assert!(!nobody.initialize(&mut [], None));
        assert_eq!(nobody.driver().queued(), None);
    }

    #[test]
    fn bounds_containing_spawn_seed_enter() {
        let bounds = ZoneBounds::from_center_size(Vec3::ZERO, Vec3::splat(4.0));
        let mut z = zone(ZoneConfig {
            bounds: Some(bounds),
            ..ZoneConfig::default()
        });
        assert!(z.initialize(&mut [], Some(Vec3::new(1.0, 0.0, 1.0))));
        assert_eq!(z.driver().queued(), Some(Transition::Enter));
        assert_eq!(z.track_position(Some(Vec3::new(1.0, 0.0, 1.0))), None);
    }

    #[test]
    fn position_tracking_reports_changes_only() {
        let bounds = ZoneBounds::from_center_size(Vec3::ZERO, Vec3::splat(2.0));
        let mut z = zone(ZoneConfig {
            bounds: Some(bounds),
            ..ZoneConfig::default()
        });
        assert_eq!(z.track_position(Some(Vec3::splat(5.0))), None);
        assert_eq!(z.track_position(Some(Vec3::ZERO)), Some(Transition::Enter));
        assert_eq!(z.track_position(Some(Vec3::ZERO)), None);
        assert_eq!(z.track_position(None), Some(Transition::Exit));
    }

    #[test]
    fn joining_a_group_can_silence_the_zone() {
        let mut z = zone(ZoneConfig::default());
        z.join_group(GroupId(1), true);
        assert!(z.is_group_member());
        assert!(!z.driver().play_on_enter);
        assert!(!z.driver().stop_on_exit);
    }
}
