//! Smooth, monotonic display progress derived from backend samples.
//!
//! The backend reports coarse, bursty percentages. The projector keeps a
//! display value that eases toward `min(last_sample + LOOKAHEAD, CEILING)`
//! one frame at a time and only ever moves forward. Reaching 100 is reserved
//! for [`ProgressProjector::force_complete`].

/// How far ahead of the last backend sample the display may run.
pub const LOOKAHEAD: f64 = 10.0;
/// Highest value the display reaches before completion is forced.
pub const CEILING: f64 = 95.0;
/// Fraction of the remaining distance covered per frame.
pub const EASING: f64 = 0.05;
/// Smallest per-frame step, so the tail of the curve still moves.
pub const MIN_STEP: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressProjector {
    value: f64,
    target: f64,
    basis: u8,
    completed: bool,
    last_tick_ms: Option<u64>,
}

impl ProgressProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// True while frames are still needed to reach the target.
    pub fn is_animating(&self) -> bool {
        !self.completed && self.value < self.target
    }

    /// Records a backend sample. Returns true when the target was raised.
    ///
    /// Samples at or below the current basis (including regressions) leave
    /// the target untouched.
    pub fn on_backend_sample(&mut self, percent: u8) -> bool {
        if self.completed || percent <= self.basis {
            return false;
        }
        self.basis = percent.min(100);
        let next_target = (f64::from(self.basis) + LOOKAHEAD).min(CEILING);
        if next_target > self.target {
            self.target = next_target;
            return true;
        }
        false
    }

    /// Advances one frame and returns the current display value.
    ///
    /// A second tick carrying the same `now_ms` as the previous one is a
    /// duplicate dispatch of the same frame and does not advance.
    pub fn tick(&mut self, now_ms: u64) -> f64 {
        if self.last_tick_ms == Some(now_ms) {
            return self.value;
        }
        self.last_tick_ms = Some(now_ms);
        if !self.is_animating() {
            return self.value;
        }
        let step = ((self.target - self.value) * EASING).max(MIN_STEP);
        self.value = (self.value + step).min(self.target);
        self.value
    }

    pub fn force_complete(&mut self) {
        self.completed = true;
        self.value = 100.0;
        self.target = 100.0;
    }

    /// Starts a fresh processing run from zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
