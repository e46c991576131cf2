//! Repeating countdown used for cooldowns and periodic decisions.

use serde::{Deserialize, Serialize};

/// A repeating timer of fixed `duration` seconds.
///
/// [`tick`](Timer::tick) first wraps any time already past the duration, then
/// adds `dt`, and reports whether the duration has been reached. Ticking once
/// per frame therefore fires on the frame the threshold is crossed and starts
/// the next period from the overshoot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    time: f64,
    duration: f64,
}

impl Timer {
    /// A timer that starts at zero elapsed time.
    pub fn new(duration: f64) -> Self {
        Self::with_phase(duration, 0.0)
    }

    /// A timer that starts with `initial` seconds already elapsed.
    pub fn with_phase(duration: f64, initial: f64) -> Self {
        Self {
            time: initial,
            duration,
        }
    }

    /// Advance by `dt`; `true` when the duration has elapsed.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.duration > 0.0 {
            self.time %= self.duration;
        }
        self.time += dt;
        self.time >= self.duration
    }

    /// Seconds elapsed in the current period.
    pub fn elapsed(&self) -> f64 {
        self.time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Fraction of the period elapsed, clamped to `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.time / self.duration).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_when_duration_reached() {
        let mut t = Timer::new(1.0);
        assert!(!t.tick(0.4));
        assert!(!t.tick(0.4));
        assert!(t.tick(0.4));
    }

    #[test]
    fn wraps_overshoot_into_next_period() {
        let mut t = Timer::new(1.0);
        assert!(t.tick(1.25));
        // 1.25 wraps to 0.25 before the next 0.5 is added.
        assert!(!t.tick(0.5));
        assert!((t.elapsed() - 0.75).abs() < 1e-12);
        assert!(t.tick(0.25));
    }

    #[test]
    fn initial_phase_shortens_first_period() {
        let mut t = Timer::with_phase(0.3, 0.2);
        assert!(t.tick(0.1));
    }

    #[test]
    fn progress_is_clamped() {
        let mut t = Timer::new(2.0);
        t.tick(1.0);
        assert!((t.progress() - 0.5).abs() < 1e-12);
        t.tick(5.0);
        assert_eq!(t.progress(), 1.0);
    }
}
