/// Timing for one scheduler pass.
///
/// Passed into every tick instead of read from global state, so the whole
/// engine can be stepped deterministically from tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameContext {
    /// Seconds since the clock started
    pub now: f64,
    /// Seconds since the previous frame
    pub delta_time: f32,
}

impl FrameContext {
    pub fn new(now: f64, delta_time: f32) -> Self {
        Self {
            now,
            delta_time: delta_time.max(0.0),
        }
    }
}

/// Accumulates frame deltas into a monotonic time base.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    now: f64,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step the clock and return the context for the new frame.
    pub fn advance(&mut self, delta_time: f32) -> FrameContext {
        let delta_time = delta_time.max(0.0);
        self.now += f64::from(delta_time);
        self.frame += 1;
        FrameContext {
            now: self.now,
            delta_time,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_time() {
        let mut clock = FrameClock::new();
        clock.advance(0.5);
        let ctx = clock.advance(0.25);
        assert_eq!(ctx.now, 0.75);
        assert_eq!(ctx.delta_time, 0.25);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn negative_deltas_are_ignored() {
        let mut clock = FrameClock::new();
        let ctx = clock.advance(-1.0);
        assert_eq!(ctx.now, 0.0);
        assert_eq!(ctx.delta_time, 0.0);
    }
}
