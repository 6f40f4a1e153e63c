//! Shared state types between the UI thread and the simulation thread
//!
//! Static layout is sent once at startup. Per-frame updates are `Copy` and
//! allocation-free so the sim thread never blocks on the UI.

use zonal_audio::zones::{FadeState, Transition};

/// Upper bound on zones and proxies the UI tracks.
pub const MAX_ZONES: usize = 8;
pub const MAX_PROXIES: usize = 8;

/// Commands sent from the UI thread to the simulation thread
#[derive(Clone, Copy, Debug)]
pub enum ControlMessage {
    /// Set avatar walking direction (-1, 0 or 1)
    Walk(i8),
    /// Toggle the avatar between grounded and airborne
    ToggleGrounded,
    TogglePause,
    /// Teleport back to the start of the strip
    Reset,
    Quit,
}

/// Layout of a zone along the strip
#[derive(Clone, Debug)]
pub struct ZoneStaticInfo {
    pub name: String,
    pub min_x: f32,
    pub max_x: f32,
}

/// Static state sent once at initialization (can allocate)
#[derive(Clone, Debug)]
pub struct UiStateInit {
    pub map_min_x: f32,
    pub map_max_x: f32,
    pub zones: Vec<ZoneStaticInfo>,
    /// Clip key per proxy, in proxy id order
    pub proxy_names: Vec<String>,
    pub one_shot_capacity: usize,
    pub looping_capacity: usize,
}

/// Per-zone state sampled each frame
#[derive(Clone, Copy, Debug, Default)]
pub struct ZoneDynamicState {
    /// Debounced occupancy
    pub inside: bool,
    /// Raw occupancy before debounce
    pub touching: bool,
    pub queued: Option<Transition>,
    /// State of the zone's first proxy, if it has any
    pub fade: Option<FadeState>,
}

/// Dynamic state update sent from the sim thread (allocation-free, Copy)
#[derive(Clone, Copy, Debug)]
pub struct UiStateUpdate {
    pub time: f64,
    pub avatar_x: f32,
    pub walking: i8,
    pub grounded: bool,
    pub paused: bool,
    pub master_volume: f32,
    pub one_shot_in_use: usize,
    pub looping_in_use: usize,
    pub scheduled_releases: usize,
    pub footsteps_played: u32,
    pub zones: [ZoneDynamicState; MAX_ZONES],
    pub num_zones: u8,
    pub proxy_levels: [f32; MAX_PROXIES],
    pub num_proxies: u8,
    /// Whether the chapel group considers the avatar inside
    pub group_inside: bool,
}

impl UiStateUpdate {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            avatar_x: 0.0,
            walking: 0,
            grounded: true,
            paused: false,
            master_volume: 1.0,
            one_shot_in_use: 0,
            looping_in_use: 0,
            scheduled_releases: 0,
            footsteps_played: 0,
            zones: [ZoneDynamicState::default(); MAX_ZONES],
            num_zones: 0,
            proxy_levels: [0.0; MAX_PROXIES],
            num_proxies: 0,
            group_inside: false,
        }
    }
}

impl Default for UiStateUpdate {
    fn default() -> Self {
        Self::new()
    }
}
