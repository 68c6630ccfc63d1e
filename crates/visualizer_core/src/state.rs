use crate::narrator::NarratorAction;
use crate::view_model::{AuditState, ErrorView, JobView, Recovery, ViewStatus};
use crate::{
    Effect, JobId, JobResult, ProgressProjector, StageNarrator, VisualizationJob, STAGE_FADE_MS,
};

pub type RunId = u64;

/// Consecutive transient failures tolerated before the user is told.
pub const DEFAULT_TRANSIENT_THRESHOLD: u32 = 3;

pub const DEFAULT_FAILURE_MESSAGE: &str = "Processing failed";
pub const REGENERATE_FAILED_MESSAGE: &str = "Failed to start regeneration. Please try again.";
pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load visualization request details. Please try again later.";
pub const TRANSIENT_ADVISORY: &str = "Having trouble reaching the server. Still trying...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Backend reported `status = failed`.
    JobFailed,
    /// The job id is unknown or was deleted.
    NotFound,
    /// Any other classified failure.
    Unexpected,
    /// The regenerate call was refused.
    RegenerateRejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn is_retryable(&self) -> bool {
        self.kind != FailureKind::NotFound
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Waiting for the first sample of a run (or for regenerate to be
    /// accepted).
    Polling,
    Processing,
    Complete(JobResult),
    Failed(Failure),
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete(_) | Phase::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Polling => "polling",
            Phase::Processing => "processing",
            Phase::Complete(_) => "complete",
            Phase::Failed(_) => "failed",
        }
    }
}

/// Everything one job view needs. Owned by a single controller.
#[derive(Debug, Clone, PartialEq)]
pub struct JobState {
    job_id: Option<JobId>,
    phase: Phase,
    run: RunId,
    projector: ProgressProjector,
    narrator: StageNarrator,
    fade: u64,
    frames_armed: bool,
    status_hint: Option<String>,
    source_image_ref: Option<String>,
    transient_failures: u32,
    transient_threshold: u32,
    audit: AuditState,
    disposed: bool,
    dirty: bool,
}

impl Default for JobState {
    fn default() -> Self {
        Self::with_transient_threshold(DEFAULT_TRANSIENT_THRESHOLD)
    }
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transient_threshold(threshold: u32) -> Self {
        Self {
            job_id: None,
            phase: Phase::Idle,
            run: 0,
            projector: ProgressProjector::new(),
            narrator: StageNarrator::new(),
            fade: 0,
            frames_armed: false,
            status_hint: None,
            source_image_ref: None,
            transient_failures: 0,
            transient_threshold: threshold.max(1),
            audit: AuditState::NotRequested,
            disposed: false,
            dirty: false,
        }
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.job_id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn frames_armed(&self) -> bool {
        self.frames_armed
    }

    pub fn display_progress(&self) -> f64 {
        self.projector.value()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.phase {
            Phase::Failed(failure) => Some(failure.kind),
            _ => None,
        }
    }

    pub fn can_retry(&self) -> bool {
        if self.disposed {
            return false;
        }
        match &self.phase {
            Phase::Complete(_) => true,
            Phase::Failed(failure) => failure.is_retryable(),
            Phase::Idle | Phase::Polling | Phase::Processing => false,
        }
    }

    pub fn view(&self) -> JobView {
        let error = match &self.phase {
            Phase::Failed(failure) => Some(ErrorView {
                kind: failure.kind,
                message: failure.message.clone(),
                recovery: if failure.is_retryable() {
                    Recovery::Retry
                } else {
                    Recovery::Back
                },
            }),
            _ => None,
        };
        let result = match &self.phase {
            Phase::Complete(result) => Some(result.clone()),
            _ => None,
        };
        let advisory = (self.transient_failures >= self.transient_threshold
            && !self.phase.is_terminal())
        .then(|| TRANSIENT_ADVISORY.to_string());

        JobView {
            job_id: self.job_id,
            status: ViewStatus::from(&self.phase),
            display_progress: self.projector.value(),
            stage_message: self.narrator.message(),
            stage_fading: self.narrator.is_fading(),
            status_hint: self.status_hint.clone(),
            source_image_ref: self.source_image_ref.clone(),
            advisory,
            error,
            result,
            audit: self.audit.clone(),
            can_retry: self.can_retry(),
        }
    }

    /// Returns whether the view changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_current(&self, run: RunId) -> bool {
        !self.disposed && run == self.run
    }

    /// Moves to a fresh run: display and narration start over from zero.
    pub(crate) fn begin_run(&mut self, job_id: JobId) -> RunId {
        self.job_id = Some(job_id);
        self.run += 1;
        self.phase = Phase::Polling;
        self.projector.reset();
        self.narrator.reset();
        self.status_hint = None;
        self.transient_failures = 0;
        self.audit = AuditState::NotRequested;
        self.mark_dirty();
        self.run
    }

    /// Polls the same backend run again under a new run id. Display and
    /// narration carry on from where they stopped.
    pub(crate) fn resume_run(&mut self) -> RunId {
        self.run += 1;
        self.phase = Phase::Polling;
        self.transient_failures = 0;
        self.mark_dirty();
        self.run
    }

    /// Applies a non-terminal sample. Returns whether frames must be armed.
    pub(crate) fn apply_progress(&mut self, job: &VisualizationJob) -> bool {
        self.phase = Phase::Processing;
        self.transient_failures = 0;
        self.record_sample_details(job);
        self.projector.on_backend_sample(job.progress_percent);
        self.mark_dirty();
        self.projector.is_animating() && !self.frames_armed
    }

    pub(crate) fn record_sample_details(&mut self, job: &VisualizationJob) {
        let hint = job.status_message.trim();
        self.status_hint = (!hint.is_empty()).then(|| hint.to_string());
        if job.source_image_ref.is_some() {
            self.source_image_ref = job.source_image_ref.clone();
        }
    }

    pub(crate) fn complete(&mut self, job: &VisualizationJob) {
        self.record_sample_details(job);
        self.transient_failures = 0;
        self.projector.force_complete();
        self.phase = Phase::Complete(JobResult::from_job(job));
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, kind: FailureKind, message: impl Into<String>) {
        self.phase = Phase::Failed(Failure {
            kind,
            message: message.into(),
        });
        self.mark_dirty();
    }

    /// Counts a transient failure. Returns true the moment the advisory
    /// threshold is crossed.
    pub(crate) fn record_transient(&mut self) -> bool {
        self.transient_failures = self.transient_failures.saturating_add(1);
        let crossed = self.transient_failures == self.transient_threshold;
        if crossed {
            self.mark_dirty();
        }
        crossed
    }

    pub(crate) fn advance_frame(&mut self, now_ms: u64) -> f64 {
        let before = self.projector.value();
        let value = self.projector.tick(now_ms);
        if value != before {
            self.mark_dirty();
        }
        value
    }

    pub(crate) fn projector_animating(&self) -> bool {
        self.projector.is_animating()
    }

    pub(crate) fn set_frames_armed(&mut self, armed: bool) {
        self.frames_armed = armed;
    }

    /// Feeds the current display value to the narrator and returns the
    /// swap effect if a fade has to start.
    pub(crate) fn narrate(&mut self) -> Option<Effect> {
        match self.narrator.observe(self.projector.value()) {
            NarratorAction::Idle => None,
            NarratorAction::BeginFade => {
                self.fade += 1;
                self.mark_dirty();
                Some(Effect::ScheduleStageSwap {
                    delay_ms: STAGE_FADE_MS,
                    fade: self.fade,
                })
            }
        }
    }

    /// Whether `fade` names the most recently scheduled swap.
    pub(crate) fn is_current_fade(&self, fade: u64) -> bool {
        fade == self.fade
    }

    pub(crate) fn commit_stage(&mut self) {
        let was_fading = self.narrator.is_fading();
        self.narrator.commit();
        if was_fading {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_audit(&mut self, audit: AuditState) {
        self.audit = audit;
        self.mark_dirty();
    }

    pub(crate) fn dispose(&mut self) {
        self.disposed = true;
        self.frames_armed = false;
    }
}
