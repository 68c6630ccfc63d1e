use crate::{AuditReport, FailureKind, JobId, JobResult, Phase};

/// Coarse status a view switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    Idle,
    Polling,
    Processing,
    Complete,
    Failed,
}

impl From<&Phase> for ViewStatus {
    fn from(phase: &Phase) -> Self {
        match phase {
            Phase::Idle => ViewStatus::Idle,
            Phase::Polling => ViewStatus::Polling,
            Phase::Processing => ViewStatus::Processing,
            Phase::Complete(_) => ViewStatus::Complete,
            Phase::Failed(_) => ViewStatus::Failed,
        }
    }
}

/// Affordance offered next to a terminal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Retry,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub kind: FailureKind,
    pub message: String,
    pub recovery: Recovery,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuditState {
    #[default]
    NotRequested,
    Loading,
    Ready(AuditReport),
    Unavailable,
}

/// Read-only state rendered by a job view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobView {
    pub job_id: Option<JobId>,
    pub status: ViewStatus,
    /// Animated progress in `0.0..=100.0`; never decreases within a run.
    pub display_progress: f64,
    pub stage_message: &'static str,
    /// True between a stage change and the delayed swap.
    pub stage_fading: bool,
    pub status_hint: Option<String>,
    pub source_image_ref: Option<String>,
    /// Non-fatal notice, e.g. sustained connection trouble.
    pub advisory: Option<String>,
    pub error: Option<ErrorView>,
    pub result: Option<JobResult>,
    pub audit: AuditState,
    pub can_retry: bool,
}

impl JobView {
    /// Whole-number percentage for labels.
    pub fn percent_label(&self) -> u8 {
        self.display_progress.round().clamp(0.0, 100.0) as u8
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, ViewStatus::Complete | ViewStatus::Failed)
    }
}
