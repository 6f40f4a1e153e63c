//! Enter/exit hysteresis.
//!
//! A raw occupancy change only becomes a [`Transition`] once it has persisted
//! for the configured delay. The opposite raw event cancels whatever is
//! queued, so brushing a boundary produces nothing at all.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transition {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    transition: Transition,
    elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    enter_delay: f32,
    exit_delay: f32,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(enter_delay: f32, exit_delay: f32) -> Self {
        Self {
            enter_delay: enter_delay.max(0.0),
            exit_delay: exit_delay.max(0.0),
            pending: None,
        }
    }

    /// Raw enter while the committed state is `inside`.
    ///
    /// Returns `true` if this cancelled a queued exit.
    pub fn raw_enter(&mut self, inside: bool) -> bool {
        let cancelled = self.cancel(Transition::Exit);
        if cancelled {
            debug!("queued exit cancelled by re-entry");
        }
        if !inside && self.pending.is_none() {
            self.queue(Transition::Enter);
        }
        cancelled
    }

    /// Raw exit while the committed state is `inside`.
    ///
    /// Returns `true` if this cancelled a queued enter.
    pub fn raw_exit(&mut self, inside: bool) -> bool {
        let cancelled = self.cancel(Transition::Enter);
        if cancelled {
            debug!("queued enter cancelled by early exit");
        }
        if inside && self.pending.is_none() {
            self.queue(Transition::Exit);
        }
        cancelled
    }

    /// Queue `transition` with a fresh timer, replacing anything queued.
    pub fn queue(&mut self, transition: Transition) {
        self.pending = Some(Pending {
            transition,
            elapsed: 0.0,
        });
    }

    fn cancel(&mut self, transition: Transition) -> bool {
        match self.pending {
            Some(p) if p.transition == transition => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Accumulate `delta_time`; yields the queued transition once its delay is met.
    pub fn advance(&mut self, delta_time: f32) -> Option<Transition> {
        let pending = self.pending.as_mut()?;
        pending.elapsed += delta_time.max(0.0);

        let delay = match pending.transition {
            Transition::Enter => self.enter_delay,
            Transition::Exit => self.exit_delay,
        };
        if pending.elapsed >= delay {
            let transition = pending.transition;
            self.pending = None;
            Some(transition)
        } else {
            None
        }
    }

    pub fn queued(&self) -> Option<Transition> {
        self.pending.map(|p| p.transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(d: &mut Debouncer, seconds: f32, dt: f32) -> Vec<Transition> {
        let frames = (seconds / dt).round() as usize;
        (0..frames).filter_map(|_| d.advance(dt)).collect()
    }

    #[test]
    fn enter_fires_after_delay() {
        let mut d = Debouncer::new(0.5, 0.5);
        d.raw_enter(false);
        assert!(run(&mut d, 0.4, 0.1).is_empty());
        assert_eq!(run(&mut d, 0.2, 0.1), vec![Transition::Enter]);
        assert_eq!(d.queued(), None);
    }

    #[test]
    fn exit_before_delay_cancels_enter() {
        let mut d = Debouncer::new(0.5, 0.5);
        d.raw_enter(false);
        run(&mut d, 0.25, 0.05);
        assert!(d.raw_exit(false));
        assert!(run(&mut d, 2.0, 0.05).is_empty());
    }

    #[test]
    fn reentry_cancels_queued_exit_while_inside() {
        let mut d = Debouncer::new(0.1, 0.3);
        d.raw_exit(true);
        assert_eq!(d.queued(), Some(Transition::Exit));
        assert!(d.raw_enter(true));
        assert_eq!(d.queued(), None);
    }

    #[test]
    fn repeated_enter_does_not_restart_timer() {
        let mut d = Debouncer::new(0.3, 0.3);
        d.raw_enter(false);
        run(&mut d, 0.2, 0.1);
        d.raw_enter(false);
        assert_eq!(run(&mut d, 0.2, 0.1), vec![Transition::Enter]);
    }

    #[test]
    fn enter_ignored_when_already_inside() {
        let mut d = Debouncer::new(0.1, 0.1);
        d.raw_enter(true);
        assert_eq!(d.queued(), None);
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut d = Debouncer::new(0.0, 0.0);
        d.raw_enter(false);
        assert_eq!(d.advance(0.0), Some(Transition::Enter));
    }
}
