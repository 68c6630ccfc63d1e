use crate::{JobId, RunId};

/// Side effects requested by [`crate::update`]. Every timer has a matching
/// stop effect; executing a stop for a timer that is not running is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start (or restart) polling; results must be tagged with `run`.
    StartPolling { job_id: JobId, run: RunId },
    StopPolling,
    /// Start the per-frame tick if it is not already running.
    ArmFrames,
    StopFrames,
    /// Replace any pending stage swap with one firing after `delay_ms`.
    /// The swap reports back with `fade`.
    ScheduleStageSwap { delay_ms: u64, fade: u64 },
    CancelStageSwap,
    /// Call the regenerate boundary; report back with `run`.
    Regenerate { job_id: JobId, run: RunId },
    /// Fetch the audit report, generating it once if absent.
    LoadAudit { job_id: JobId, run: RunId },
}
