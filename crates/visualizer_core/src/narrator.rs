/// Ordered `(upper_bound_percent, message)` table. The last entry is the
/// catch-all.
pub const STAGES: &[(f64, &str)] = &[
    (15.0, "Analyzing your home's architecture..."),
    (30.0, "Detecting windows and entry points..."),
    (45.0, "Preparing image for visualization..."),
    (70.0, "Rendering security screens..."),
    (85.0, "Applying realistic shadows and lighting..."),
    (100.0, "Running final quality check..."),
];

/// Delay between fading the old message out and showing the new one.
pub const STAGE_FADE_MS: u64 = 200;

/// Message for a display value; bounds are inclusive.
pub fn stage_for(value: f64) -> &'static str {
    STAGES
        .iter()
        .find(|(bound, _)| value <= *bound)
        .or_else(|| STAGES.last())
        .map(|(_, message)| *message)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarratorAction {
    /// Nothing to do; the shown message (or the pending one) is current.
    Idle,
    /// Fade out now and swap after [`STAGE_FADE_MS`]. Any previously
    /// scheduled swap must be replaced.
    BeginFade,
}

/// Staged message swap: fade out, swap, fade in.
///
/// Bursts of samples that cross several stages before the fade delay
/// elapses collapse into a single swap to the latest stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNarrator {
    shown: &'static str,
    pending: Option<&'static str>,
}

impl Default for StageNarrator {
    fn default() -> Self {
        Self {
            shown: stage_for(0.0),
            pending: None,
        }
    }
}

impl StageNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &'static str {
        self.shown
    }

    pub fn is_fading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn observe(&mut self, value: f64) -> NarratorAction {
        let stage = stage_for(value);
        match self.pending {
            Some(pending) if pending == stage => NarratorAction::Idle,
            None if self.shown == stage => NarratorAction::Idle,
            _ => {
                self.pending = Some(stage);
                NarratorAction::BeginFade
            }
        }
    }

    /// Completes a fade. Returns true when the shown message changed.
    pub fn commit(&mut self) -> bool {
        match self.pending.take() {
            Some(next) if next != self.shown => {
                self.shown = next;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(stage_for(0.0), "Analyzing your home's architecture...");
        assert_eq!(stage_for(15.0), "Analyzing your home's architecture...");
        assert_eq!(stage_for(15.01), "Detecting windows and entry points...");
        assert_eq!(stage_for(45.0), "Preparing image for visualization...");
        assert_eq!(stage_for(46.0), "Rendering security screens...");
        assert_eq!(stage_for(85.0), "Applying realistic shadows and lighting...");
        assert_eq!(stage_for(100.0), "Running final quality check...");
    }

    #[test]
    fn out_of_range_falls_back_to_last_stage() {
        assert_eq!(stage_for(140.0), "Running final quality check...");
    }

    #[test]
    fn message_swaps_only_after_commit() {
        let mut narrator = StageNarrator::new();
        assert_eq!(narrator.observe(10.0), NarratorAction::Idle);

        assert_eq!(narrator.observe(20.0), NarratorAction::BeginFade);
        assert!(narrator.is_fading());
        assert_eq!(narrator.message(), "Analyzing your home's architecture...");

        assert!(narrator.commit());
        assert!(!narrator.is_fading());
        assert_eq!(narrator.message(), "Detecting windows and entry points...");
    }

    #[test]
    fn burst_collapses_into_latest_stage() {
        let mut narrator = StageNarrator::new();
        assert_eq!(narrator.observe(20.0), NarratorAction::BeginFade);
        assert_eq!(narrator.observe(21.0), NarratorAction::Idle);
        assert_eq!(narrator.observe(50.0), NarratorAction::BeginFade);
        assert!(narrator.commit());
        assert_eq!(narrator.message(), "Rendering security screens...");
        assert!(!narrator.commit());
    }

    #[test]
    fn pending_swap_back_to_shown_stage_commits_nothing() {
        let mut narrator = StageNarrator::new();
        narrator.observe(20.0);
        assert_eq!(narrator.observe(5.0), NarratorAction::BeginFade);
        assert!(!narrator.commit());
        assert_eq!(narrator.message(), "Analyzing your home's architecture...");
    }
}
