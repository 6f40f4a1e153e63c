//! Occupancy-driven playback: trigger zones, zone groups and the fade-state
//! machinery they share.

pub mod bounds;
/// Enter/exit hysteresis timers
pub mod debounce;
/// Four-state proxy fade coordination
pub mod driver;
pub mod group;
pub mod trigger;

pub use bounds::ZoneBounds;
pub use debounce::{Debouncer, Transition};
pub use driver::{DriverRef, FadeState, ProxyDriver};
pub use group::{GroupPolicy, ZoneGroup};
pub use trigger::{Occupant, TriggerZone};
