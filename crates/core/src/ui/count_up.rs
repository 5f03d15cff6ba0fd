//! Count-up animation for headline figures.

use std::time::{Duration, Instant};

/// Fraction of the element that must be on screen to start the animation.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Animates a displayed number from 0 to `end`, once.
#[derive(Debug, Clone)]
pub struct CountUp {
    end: u64,
    duration: Duration,
    started_at: Option<Instant>,
}

impl CountUp {
    pub fn new(end: u64, duration: Duration) -> Self {
        Self { end, duration, started_at: None }
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Feed an intersection update. Returns true only on the call that
    /// starts the animation; later visibility changes are ignored.
    pub fn on_visibility(&mut self, ratio: f64, now: Instant) -> bool {
        if self.started_at.is_some() || ratio < VISIBILITY_THRESHOLD {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Displayed value at `now`.
    pub fn value_at(&self, now: Instant) -> u64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        if self.duration.is_zero() {
            return self.end;
        }

        let t = now.saturating_duration_since(start).as_secs_f64() / self.duration.as_secs_f64();
        if t >= 1.0 {
            return self.end;
        }
        ((self.end as f64) * ease_out_cubic(t)).floor() as u64
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.started_at
            .is_some_and(|start| now.saturating_duration_since(start) >= self.duration)
    }
}
