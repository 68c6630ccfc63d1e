use crate::{AuditReport, ClientError, JobId, RunId, VisualizationJob};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Begin tracking a job that was just created or looked up.
    Start { job_id: JobId },
    /// Scheduler delivered a backend sample for `run`.
    Sample { run: RunId, job: VisualizationJob },
    /// Scheduler delivered a classified fetch failure for `run`.
    PollFailed { run: RunId, error: ClientError },
    /// Per-frame animation tick.
    FrameTick { now_ms: u64 },
    /// The crossfade delay of swap `fade` elapsed.
    StageFadeElapsed { fade: u64 },
    /// User asked to retry a failed run or regenerate a completed one.
    RetryClicked,
    /// Backend accepted the regenerate call for `run`.
    RegenerateAccepted { run: RunId },
    /// Backend refused the regenerate call for `run`.
    RegenerateRejected { run: RunId, error: ClientError },
    /// Audit lookup finished; `None` when neither lookup nor generation
    /// produced a report.
    AuditLoaded {
        run: RunId,
        report: Option<AuditReport>,
    },
    /// The owning view went away.
    Dispose,
}
