use tracing::{info, warn};

use crate::{
    config::GroupConfig,
    engine::registry::{GroupId, ZoneId},
    playback::proxy::{PlaybackCtx, PlaybackProxy},
    zones::{
        debounce::Transition,
        driver::{DriverRef, ProxyDriver},
    },
};

/// How child occupancy combines into group occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupPolicy {
    /// Inside while any child is occupied
    #[default]
    Any,
    /// Inside only while every child is occupied
    All,
}

/// Several zones presenting one occupancy signal.
#[derive(Debug, Clone)]
pub struct ZoneGroup {
    name: String,
    driver: ProxyDriver,
    children: Vec<ZoneId>,
    occupied: Vec<bool>,
    active_count: usize,
    policy: GroupPolicy,
    treat_as_one_zone: bool,
    fade_in_duration: f32,
    fade_out_duration: f32,
    enabled: bool,
}

impl ZoneGroup {
    pub fn new(id: GroupId, config: GroupConfig) -> Self {
        let mut driver = ProxyDriver::new(
            DriverRef::Group(id),
            config.proxies,
            config.enter_delay,
            config.exit_delay,
        );
        driver.play_on_enter = config.play_on_enter;
        driver.stop_on_exit = config.stop_on_exit;

        let enabled = !config.children.is_empty();
        if !enabled {
            warn!(group = %config.name, "zone group has no child zones, disabled");
        }

        Self {
            name: config.name,
            driver,
            occupied: vec![false; config.children.len()],
            children: config.children,
            active_count: 0,
            policy: config.policy,
            treat_as_one_zone: config.treat_as_one_zone,
            fade_in_duration: config.fade_in_duration,
            fade_out_duration: config.fade_out_duration,
            enabled,
        }
    }

    pub fn initialize(&mut self, proxies: &mut [PlaybackProxy]) {
        self.driver
            .set_fade_times(proxies, self.fade_in_duration, self.fade_out_duration);
    }

    fn child_index(&self, zone: ZoneId) -> Option<usize> {
        self.children.iter().position(|&c| c == zone)
    }

    fn should_be_inside(&self) -> bool {
        match self.policy {
            GroupPolicy::Any => self.active_count > 0,
            GroupPolicy::All => self.active_count == self.children.len(),
        }
    }

    /// A child zone accepted a local enter.
    pub fn child_enter(&mut self, zone: ZoneId) {
        let Some(index) = self.child_index(zone) else {
            return;
        };
        if self.occupied[index] {
            return;
        }
        self.occupied[index] = true;
        self.active_count += 1;

        if self.treat_as_one_zone && self.should_be_inside() {
            self.driver.raw_enter();
        }
    }

    /// A child zone accepted a local exit.
    pub fn child_exit(&mut self, zone: ZoneId) {
        let Some(index) = self.child_index(zone) else {
            return;
        };
        if !self.occupied[index] {
            return;
        }
        self.occupied[index] = false;
        self.active_count -= 1;

        if self.treat_as_one_zone && !self.should_be_inside() {
            self.driver.raw_exit();
        }
    }

    pub fn tick(
        &mut self,
        proxies: &mut [PlaybackProxy],
        ctx: &mut PlaybackCtx<'_>,
        delta_time: f32,
    ) -> Option<Transition> {
        if !self.is_active() {
            return None;
        }
        let fired = self.driver.tick(proxies, ctx, delta_time);
        match fired {
            Some(Transition::Enter) => info!(group = %self.name, "entered group"),
            Some(Transition::Exit) => info!(group = %self.name, "exited group"),
            None => {}
        }
        fired
    }

    /// Manual play of the group's proxies.
    pub fn play_group_audio(&self, proxies: &mut [PlaybackProxy], ctx: &mut PlaybackCtx<'_>) {
        self.driver.play_all(proxies, ctx);
    }

    pub fn stop_group_audio(&self, proxies: &mut [PlaybackProxy]) {
        self.driver.stop_all(proxies);
    }

    /// Forget every child's occupancy and fade out the group's proxies.
    pub fn deactivate(&mut self, proxies: &mut [PlaybackProxy]) {
        self.occupied.fill(false);
        self.active_count = 0;
        self.driver.reset(proxies);
    }

    /// Enabled and driving its own proxies.
    pub fn is_active(&self) -> bool {
        self.enabled && self.treat_as_one_zone
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn treat_as_one_zone(&self) -> bool {
        self.treat_as_one_zone
    }

    pub fn is_player_in_group(&self) -> bool {
        self.driver.is_inside()
    }

    pub fn active_zone_count(&self) -> usize {
        self.active_count
    }

    pub fn has_played(&self) -> bool {
        self.driver.has_played()
    }

    pub fn children(&self) -> &[ZoneId] {
        &self.children
    }

    pub fn policy(&self) -> GroupPolicy {
        self.policy
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver(&self) -> &ProxyDriver {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(policy: GroupPolicy, children: usize) -> ZoneGroup {
        let config = GroupConfig {
            policy,
            ..GroupConfig::new("g", (0..children).map(ZoneId).collect(), Vec::new())
        };
        ZoneGroup::new(GroupId(0), config)
    }

    #[test]
    fn any_queues_on_first_child() {
        let mut g = group(GroupPolicy::Any, 2);
        g.child_enter(ZoneId(1));
        assert_eq!(g.active_zone_count(), 1);
        assert_eq!(g.driver().queued(), Some(Transition::Enter));
    }

    #[test]
    fn all_waits_for_every_child() {
        let mut g = group(GroupPolicy::All, 2);
        g.child_enter(ZoneId(0));
        assert_eq!(g.driver().queued(), None);
        g.child_enter(ZoneId(1));
        assert_eq!(g.driver().queued(), Some(Transition::Enter));
    }

    #[test]
    fn duplicate_and_foreign_child_events_ignored() {
        let mut g = group(GroupPolicy::Any, 2);
        g.child_enter(ZoneId(0));
        g.child_enter(ZoneId(0));
        g.child_enter(ZoneId(9));
        assert_eq!(g.active_zone_count(), 1);

        g.child_exit(ZoneId(1));
        assert_eq!(g.active_zone_count(), 1);
    }

    #[test]
    fn leaving_before_delay_cancels_group_enter() {
        let mut g = group(GroupPolicy::Any, 1);
        g.child_enter(ZoneId(0));
        g.child_exit(ZoneId(0));
        assert_eq!(g.driver().queued(), None);
    }

    #[test]
    fn childless_group_is_disabled() {
        let g = group(GroupPolicy::Any, 0);
        assert!(!g.is_enabled());
        assert!(!g.is_active());
    }

    #[test]
    fn deactivate_clears_occupancy() {
        let mut g = group(GroupPolicy::Any, 2);
        g.child_enter(ZoneId(0));
        g.child_enter(ZoneId(1));
        g.deactivate(&mut []);
        assert_eq!(g.active_zone_count(), 0);
        assert!(!g.is_player_in_group());
        assert_eq!(g.driver().queued(), None);

        // occupancy bits restart cleanly
        g.child_enter(ZoneId(0));
        assert_eq!(g.active_zone_count(), 1);
        assert_eq!(g.driver().queued(), Some(Transition::Enter));
    }
}
