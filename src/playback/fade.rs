/*
Fade Envelope
=============

Every playback proxy owns one of these. It moves the live volume of the
proxy's voice toward a target, one frame at a time, and reports when a fade
to silence has finished so the voice can go back to its pool.

Vocabulary
----------

  level       The live volume currently written to the voice.

  target      Where the level is heading: `base volume x master volume` while
              the proxy should be audible, 0.0 once it has been told to stop.

  max volume  `base volume x master volume`. Sets the fade *speed*, not just
              the destination, so a full fade always takes `fade_time`
              seconds no matter where it starts.

  fade time   Seconds for a full 0 -> max (or max -> 0) sweep.


The Shape: Rate-Based Move-Toward
---------------------------------

  Level
    max ┐        ___________
        │       ╱           ╲
        │      ╱             ╲
    0.0 └─────╱───────────────╲────→ Time
           play()          stop()
          |<- fade ->|    |<- fade ->|

    rate  = max_volume / fade_time           (volume units per second)
    step  = rate * delta_time                (this frame's budget)
    level = move_toward(level, target, step) (never overshoots)

A stop() issued halfway through a fade-in turns around from the current
level; there is no separate "reverse" stage. Degenerate fades (fade time or
max volume effectively zero) snap straight to the target.


Query Surface
-------------

There are no "fading in" / "fading out" flags. Direction is read off the
envelope itself:

    fading in   level < target
    fading out  level > target
    settled     level ≈ target

so the answer can never disagree with what the voice is actually doing.
*/

/// Below this a fade time or max volume counts as zero.
pub const INSTANT_FADE: f32 = 0.001;

/// Level/target comparisons within this distance count as equal.
const LEVEL_EPSILON: f32 = 1.0e-5;

/// What a single [`FadeEnvelope::advance`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeStep {
    /// Level moved toward the target and has not reached it yet
    Moving,
    /// Level sits on a non-zero target
    Holding,
    /// Level reached a zero target: the voice can be released
    Silent,
}

#[derive(Debug, Clone)]
pub struct FadeEnvelope {
    fade_in_time: f32,
    /// `None` shares `fade_in_time`
    fade_out_time: Option<f32>,
    level: f32,
    target: f32,
}

impl FadeEnvelope {
    pub fn new(fade_time: f32) -> Self {
        Self {
            fade_in_time: fade_time,
            fade_out_time: None,
            level: 0.0,
            target: 0.0,
        }
    }

    /// Separate fade-out duration (the split-duration variant).
    pub fn with_fade_out(mut self, fade_out_time: Option<f32>) -> Self {
        self.fade_out_time = fade_out_time;
        self
    }

    pub fn set_fade_times(&mut self, fade_in_time: f32, fade_out_time: Option<f32>) {
        self.fade_in_time = fade_in_time;
        self.fade_out_time = fade_out_time;
    }

    /// Restart from silence heading for `target`.
    pub fn start(&mut self, target: f32) {
        self.level = 0.0;
        self.target = target.max(0.0);
    }

    pub fn retarget(&mut self, target: f32) {
        self.target = target.max(0.0);
    }

    /// Drop to silence immediately.
    pub fn reset(&mut self) {
        self.level = 0.0;
        self.target = 0.0;
    }

    /// Advance by `delta_time` seconds, fading at `max_volume / fade_time`.
    pub fn advance(&mut self, max_volume: f32, delta_time: f32) -> FadeStep {
        let fade_time = if self.target < self.level {
            self.fade_out_time.unwrap_or(self.fade_in_time)
        } else {
            self.fade_in_time
        };

        if fade_time <= INSTANT_FADE || max_volume <= INSTANT_FADE {
            self.level = self.target;
        } else {
            let rate = max_volume / fade_time;
            self.level = move_toward(self.level, self.target, rate * delta_time.max(0.0));
        }

        if !approx_eq(self.level, self.target) {
            FadeStep::Moving
        } else if approx_eq(self.target, 0.0) {
            self.level = 0.0;
            FadeStep::Silent
        } else {
            FadeStep::Holding
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_fading_in(&self) -> bool {
        !approx_eq(self.level, self.target) && self.target > self.level
    }

    pub fn is_fading_out(&self) -> bool {
        !approx_eq(self.level, self.target) && self.target < self.level
    }

    /// Target is (effectively) zero.
    pub fn is_silenced(&self) -> bool {
        approx_eq(self.target, 0.0)
    }
}

#[inline]
fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

#[inline]
pub(crate) fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= LEVEL_EPSILON.max(f32::EPSILON * a.abs().max(b.abs()) * 8.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 100.0;

    fn run(env: &mut FadeEnvelope, max_volume: f32, seconds: f32) -> FadeStep {
        let frames = (seconds / FRAME).round() as usize;
        let mut step = FadeStep::Holding;
        for _ in 0..frames {
            step = env.advance(max_volume, FRAME);
        }
        step
    }

    #[test]
    fn full_fade_in_takes_fade_time() {
        let mut env = FadeEnvelope::new(2.0);
        env.start(0.8);

        run(&mut env, 0.8, 1.0);
        assert!((env.level() - 0.4).abs() < 1e-3, "half-way level was {}", env.level());
        assert!(env.is_fading_in());

        // a little past the end to absorb float drift
        let step = run(&mut env, 0.8, 1.1);
        assert!((env.level() - 0.8).abs() < 1e-3);
        assert_eq!(step, FadeStep::Holding);
        assert!(!env.is_fading_in());
    }

    #[test]
    fn fade_out_ends_silent() {
        let mut env = FadeEnvelope::new(0.5);
        env.start(1.0);
        run(&mut env, 1.0, 0.6);

        env.retarget(0.0);
        assert!(env.is_fading_out());
        let step = run(&mut env, 1.0, 0.6);
        assert_eq!(step, FadeStep::Silent);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn stop_mid_fade_turns_around_from_current_level() {
        let mut env = FadeEnvelope::new(1.0);
        env.start(1.0);
        run(&mut env, 1.0, 0.3);
        let peak = env.level();

        env.retarget(0.0);
        env.advance(1.0, FRAME);
        assert!(env.level() < peak);
        assert!(env.level() > 0.0);
    }

    #[test]
    fn zero_fade_time_snaps() {
        let mut env = FadeEnvelope::new(0.0);
        env.start(0.7);
        assert_eq!(env.advance(0.7, FRAME), FadeStep::Holding);
        assert_eq!(env.level(), 0.7);
    }

    #[test]
    fn zero_max_volume_snaps() {
        let mut env = FadeEnvelope::new(3.0);
        env.start(0.0);
        assert_eq!(env.advance(0.0, FRAME), FadeStep::Silent);
    }

    #[test]
    fn split_fade_out_uses_its_own_rate() {
        let mut env = FadeEnvelope::new(1.0).with_fade_out(Some(4.0));
        env.start(1.0);
        run(&mut env, 1.0, 1.1);
        assert!((env.level() - 1.0).abs() < 1e-3);

        env.retarget(0.0);
        run(&mut env, 1.0, 1.0);
        assert!((env.level() - 0.75).abs() < 1e-3);
    }
}
