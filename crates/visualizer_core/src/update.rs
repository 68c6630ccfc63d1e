use visualizer_logging::{viz_debug, viz_error, viz_info, viz_warn};

use crate::view_model::AuditState;
use crate::{
    ClientError, Effect, FailureKind, JobState, JobStatus, Msg, Phase, RunId, VisualizationJob,
    DEFAULT_FAILURE_MESSAGE, LOAD_FAILED_MESSAGE, REGENERATE_FAILED_MESSAGE,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Once [`Msg::Dispose`] has been applied every later message is ignored, so
/// results that were in flight at disposal can never mutate the state.
pub fn update(mut state: JobState, msg: Msg) -> (JobState, Vec<Effect>) {
    if state.is_disposed() {
        viz_debug!("message after dispose ignored: {:?}", msg);
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Start { job_id } => {
            if !matches!(state.phase(), Phase::Idle) {
                return (state, Vec::new());
            }
            let run = state.begin_run(job_id);
            viz_info!(job = job_id; "tracking started (run {})", run);
            vec![Effect::StartPolling { job_id, run }]
        }
        Msg::Sample { run, job } => apply_sample(&mut state, run, &job),
        Msg::PollFailed { run, error } => apply_poll_failure(&mut state, run, error),
        Msg::FrameTick { now_ms } => apply_frame(&mut state, now_ms),
        Msg::StageFadeElapsed { fade } => {
            if state.is_current_fade(fade) {
                state.commit_stage();
            } else {
                viz_debug!("superseded stage swap {} ignored", fade);
            }
            Vec::new()
        }
        Msg::RetryClicked => begin_regeneration(&mut state),
        Msg::RegenerateAccepted { run } => match state.job_id() {
            Some(job_id) if state.is_current(run) && matches!(state.phase(), Phase::Polling) => {
                viz_info!(job = job_id; "regenerate accepted, polling run {}", run);
                vec![Effect::StartPolling { job_id, run }]
            }
            _ => Vec::new(),
        },
        Msg::RegenerateRejected { run, error } => {
            if !state.is_current(run) || !matches!(state.phase(), Phase::Polling) {
                return (state, Vec::new());
            }
            let job_id = state.job_id().unwrap_or_default();
            viz_warn!(job = job_id; "regenerate rejected: {}", error);
            match error {
                ClientError::NotFound => state.fail(FailureKind::NotFound, not_found_message(job_id)),
                ClientError::Transient(_) | ClientError::Unexpected(_) => {
                    state.fail(FailureKind::RegenerateRejected, REGENERATE_FAILED_MESSAGE)
                }
            }
            Vec::new()
        }
        Msg::AuditLoaded { run, report } => {
            if state.is_current(run) && matches!(state.phase(), Phase::Complete(_)) {
                state.set_audit(match report {
                    Some(report) => AuditState::Ready(report),
                    None => AuditState::Unavailable,
                });
            }
            Vec::new()
        }
        Msg::Dispose => {
            if let Some(job_id) = state.job_id() {
                viz_info!(job = job_id; "disposed in phase {}", state.phase().name());
            }
            state.dispose();
            vec![
                Effect::StopPolling,
                Effect::StopFrames,
                Effect::CancelStageSwap,
            ]
        }
    };

    (state, effects)
}

fn apply_sample(state: &mut JobState, run: RunId, job: &VisualizationJob) -> Vec<Effect> {
    if !state.is_current(run) || state.phase().is_terminal() {
        viz_debug!(job = job.id; "stale sample for run {} dropped", run);
        return Vec::new();
    }
    if state.job_id() != Some(job.id) {
        viz_warn!(job = job.id; "sample for a different job dropped");
        return Vec::new();
    }

    match job.status {
        JobStatus::Pending | JobStatus::Processing => {
            viz_debug!(job = job.id; "{} at {}%", job.status, job.progress_percent);
            if state.apply_progress(job) {
                state.set_frames_armed(true);
                vec![Effect::ArmFrames]
            } else {
                Vec::new()
            }
        }
        JobStatus::Complete => {
            viz_info!(job = job.id; "complete");
            state.complete(job);
            let mut effects = vec![Effect::StopPolling];
            effects.extend(stop_frames(state));
            effects.extend(state.narrate());
            state.set_audit(AuditState::Loading);
            effects.push(Effect::LoadAudit { job_id: job.id, run });
            effects
        }
        JobStatus::Failed => {
            let message = match job.status_message.trim() {
                "" => DEFAULT_FAILURE_MESSAGE.to_string(),
                hint => hint.to_string(),
            };
            viz_warn!(job = job.id; "failed: {}", message);
            state.record_sample_details(job);
            state.fail(FailureKind::JobFailed, message);
            settle_after_failure(state)
        }
    }
}

fn apply_poll_failure(state: &mut JobState, run: RunId, error: ClientError) -> Vec<Effect> {
    if !state.is_current(run) || state.phase().is_terminal() {
        return Vec::new();
    }
    let job_id = state.job_id().unwrap_or_default();
    match error {
        ClientError::NotFound => {
            viz_warn!(job = job_id; "not found, polling stops");
            state.fail(FailureKind::NotFound, not_found_message(job_id));
            settle_after_failure(state)
        }
        ClientError::Transient(detail) => {
            viz_warn!(job = job_id; "transient poll failure: {}", detail);
            if state.record_transient() {
                viz_warn!(job = job_id; "transient failures persist, surfacing advisory");
            }
            Vec::new()
        }
        ClientError::Unexpected(detail) => {
            viz_error!(job = job_id; "unexpected poll failure: {}", detail);
            state.fail(FailureKind::Unexpected, LOAD_FAILED_MESSAGE);
            settle_after_failure(state)
        }
    }
}

fn apply_frame(state: &mut JobState, now_ms: u64) -> Vec<Effect> {
    if !state.frames_armed() {
        return Vec::new();
    }
    state.advance_frame(now_ms);
    let mut effects: Vec<Effect> = state.narrate().into_iter().collect();
    if !state.projector_animating() {
        state.set_frames_armed(false);
        effects.push(Effect::StopFrames);
    }
    effects
}

fn begin_regeneration(state: &mut JobState) -> Vec<Effect> {
    let job_id = match state.job_id() {
        Some(job_id) if state.can_retry() => job_id,
        _ => {
            viz_debug!("retry ignored in phase {}", state.phase().name());
            return Vec::new();
        }
    };
    if state.failure_kind() == Some(FailureKind::Unexpected) {
        // The backend never reported this run terminal.
        let run = state.resume_run();
        viz_info!(job = job_id; "resuming polling (run {})", run);
        return vec![Effect::StartPolling { job_id, run }];
    }
    let run = state.begin_run(job_id);
    viz_info!(job = job_id; "regenerating (run {})", run);
    vec![
        Effect::StopPolling,
        Effect::CancelStageSwap,
        Effect::Regenerate { job_id, run },
    ]
}

fn stop_frames(state: &mut JobState) -> Option<Effect> {
    if state.frames_armed() {
        state.set_frames_armed(false);
        Some(Effect::StopFrames)
    } else {
        None
    }
}

fn settle_after_failure(state: &mut JobState) -> Vec<Effect> {
    state.commit_stage();
    let mut effects = vec![Effect::StopPolling];
    effects.extend(stop_frames(state));
    effects.push(Effect::CancelStageSwap);
    effects
}

fn not_found_message(job_id: crate::JobId) -> String {
    format!("Visualization request #{job_id} not found.")
}
