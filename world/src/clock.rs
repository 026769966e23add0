//! Fixed-step simulation clock.

use std::time::Duration;

use tracing::debug;

/// Accumulates variable frame time into fixed simulation steps.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    fixed_step: Duration,
    max_steps_per_frame: u32,
    accumulator: Duration,
    now: Duration,
    ticks: u64,
}

impl SimulationClock {
    /// Creates a clock producing `fixed_step` ticks, at most
    /// `max_steps_per_frame` per frame.
    #[must_use]
    pub const fn new(fixed_step: Duration, max_steps_per_frame: u32) -> Self {
        Self {
            fixed_step,
            max_steps_per_frame,
            accumulator: Duration::ZERO,
            now: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Adds frame time and returns how many fixed steps are due.
    ///
    /// Backlog beyond the per-frame cap is discarded.
    pub fn accumulate(&mut self, frame_dt: Duration) -> u32 {
        if self.fixed_step.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(frame_dt);
        let mut steps = 0;
        while self.accumulator >= self.fixed_step && steps < self.max_steps_per_frame {
            self.accumulator -= self.fixed_step;
            steps += 1;
        }
        if self.accumulator >= self.fixed_step {
            debug!(
                dropped_ms = self.accumulator.as_millis() as u64,
                "frame backlog discarded"
            );
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    /// Records a tick, advancing simulated time by `dt` when `running`.
    pub fn tick(&mut self, dt: Duration, running: bool) {
        self.ticks = self.ticks.saturating_add(1);
        if running {
            self.now = self.now.saturating_add(dt);
        }
    }

    /// Length of a fixed step.
    #[must_use]
    pub const fn fixed_step(&self) -> Duration {
        self.fixed_step
    }

    /// Simulated time elapsed while running.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of ticks processed, including paused ones.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_steps_carry_over() {
        let mut clock = SimulationClock::new(Duration::from_millis(16), 8);
        assert_eq!(clock.accumulate(Duration::from_millis(10)), 0);
        assert_eq!(clock.accumulate(Duration::from_millis(10)), 1);
        assert_eq!(clock.accumulate(Duration::from_millis(12)), 1);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut clock = SimulationClock::new(Duration::from_millis(16), 8);
        assert_eq!(clock.accumulate(Duration::from_secs(2)), 8);
        assert_eq!(clock.accumulate(Duration::ZERO), 0, "backlog was discarded");
    }

    #[test]
    fn paused_ticks_do_not_advance_time() {
        let mut clock = SimulationClock::new(Duration::from_millis(16), 8);
        clock.tick(Duration::from_millis(16), true);
        clock.tick(Duration::from_millis(16), false);
        assert_eq!(clock.ticks(), 2);
        assert_eq!(clock.now(), Duration::from_millis(16));
    }

    #[test]
    fn zero_step_never_produces_ticks() {
        let mut clock = SimulationClock::new(Duration::ZERO, 8);
        assert_eq!(clock.accumulate(Duration::from_secs(1)), 0);
    }
}
