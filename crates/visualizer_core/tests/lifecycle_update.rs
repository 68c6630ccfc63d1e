use std::sync::Once;

use pretty_assertions::assert_eq;
use visualizer_core::{
    update, AuditReport, AuditState, ClientError, Effect, FailureKind, JobState, JobStatus, Msg,
    Recovery, ViewStatus, VisualizationJob, DEFAULT_FAILURE_MESSAGE, REGENERATE_FAILED_MESSAGE,
    STAGE_FADE_MS, TRANSIENT_ADVISORY,
};

const JOB: u64 = 42;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(visualizer_logging::initialize_for_tests);
}

fn started() -> JobState {
    let (state, effects) = update(JobState::new(), Msg::Start { job_id: JOB });
    assert_eq!(effects, vec![Effect::StartPolling { job_id: JOB, run: 1 }]);
    state
}

fn sample(state: JobState, status: JobStatus, percent: u8) -> (JobState, Vec<Effect>) {
    let run = state.run();
    update(
        state,
        Msg::Sample {
            run,
            job: VisualizationJob::sample(JOB, status, percent),
        },
    )
}

fn frames(mut state: JobState, from_ms: u64, count: u64) -> (JobState, Vec<f64>) {
    let mut values = Vec::new();
    for i in 0..count {
        let (next, _) = update(
            state,
            Msg::FrameTick {
                now_ms: from_ms + i * 16,
            },
        );
        values.push(next.display_progress());
        state = next;
    }
    (state, values)
}

#[test]
fn start_moves_idle_to_polling_once() {
    init_logging();
    let mut state = started();
    assert_eq!(state.view().status, ViewStatus::Polling);
    assert!(state.consume_dirty());

    let (state, effects) = update(state, Msg::Start { job_id: 7 });
    assert!(effects.is_empty());
    assert_eq!(state.job_id(), Some(JOB));
}

#[test]
fn first_progress_sample_arms_frames_once() {
    init_logging();
    let (state, effects) = sample(started(), JobStatus::Processing, 20);
    assert_eq!(effects, vec![Effect::ArmFrames]);
    assert_eq!(state.view().status, ViewStatus::Processing);

    let (state, effects) = sample(state, JobStatus::Processing, 30);
    assert!(effects.is_empty());
    assert!(state.frames_armed());
}

#[test]
fn pending_sample_at_zero_does_not_animate() {
    init_logging();
    let (state, effects) = sample(started(), JobStatus::Pending, 0);
    assert!(effects.is_empty());
    assert_eq!(state.view().status, ViewStatus::Processing);
    assert_eq!(state.display_progress(), 0.0);
}

#[test]
fn display_is_monotonic_across_rising_samples() {
    init_logging();
    let mut state = started();
    let mut all = Vec::new();
    for (i, percent) in [5u8, 5, 18, 40, 41, 77, 90].into_iter().enumerate() {
        let (next, _) = sample(state, JobStatus::Processing, percent);
        let (next, values) = frames(next, i as u64 * 10_000, 40);
        all.extend(values);
        state = next;
    }
    assert!(all.windows(2).all(|w| w[0] <= w[1]));
    assert!(state.display_progress() <= 95.0);
}

#[test]
fn display_never_exceeds_lookahead_before_completion() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 20);
    let (state, values) = frames(state, 0, 3_000);
    assert!(values.iter().all(|v| *v <= 30.0));
    assert_eq!(state.display_progress(), 30.0);
    assert!(!state.frames_armed());
}

#[test]
fn frames_stop_after_convergence() {
    init_logging();
    let (mut state, _) = sample(started(), JobStatus::Processing, 10);
    let mut stop_seen = 0;
    for i in 0..2_000u64 {
        let (next, effects) = update(state, Msg::FrameTick { now_ms: i });
        stop_seen += effects.iter().filter(|e| **e == Effect::StopFrames).count();
        state = next;
    }
    assert_eq!(stop_seen, 1);
    assert!(!state.frames_armed());
}

#[test]
fn regressing_sample_does_not_pull_display_back() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 60);
    let (state, _) = frames(state, 0, 100);
    let before = state.display_progress();
    let (state, effects) = sample(state, JobStatus::Processing, 10);
    assert!(effects.is_empty());
    let (state, _) = frames(state, 100_000, 5);
    assert!(state.display_progress() >= before);
}

#[test]
fn completion_snaps_to_hundred_within_one_message() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 40);
    let (state, _) = frames(state, 0, 3);
    let mut job = VisualizationJob::sample(JOB, JobStatus::Complete, 100);
    job.result_image_ref = Some("https://cdn.example.com/out.png".into());
    job.quality_score = Some(0.93);
    let run = state.run();

    let (state, effects) = update(state, Msg::Sample { run, job });

    assert_eq!(state.display_progress(), 100.0);
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling,
            Effect::StopFrames,
            Effect::ScheduleStageSwap {
                delay_ms: STAGE_FADE_MS,
                fade: 1,
            },
            Effect::LoadAudit { job_id: JOB, run },
        ]
    );
    let view = state.view();
    assert_eq!(view.status, ViewStatus::Complete);
    assert_eq!(view.percent_label(), 100);
    assert_eq!(view.audit, AuditState::Loading);
    let result = view.result.expect("result");
    assert_eq!(
        result.result_image_ref.as_deref(),
        Some("https://cdn.example.com/out.png")
    );
    assert_eq!(result.quality_percent(), 93);
    assert!(view.can_retry);
}

fn fades_scheduled(mut state: JobState, frames: u64) -> (JobState, Vec<u64>) {
    let mut fades = Vec::new();
    for i in 0..frames {
        let (next, effects) = update(state, Msg::FrameTick { now_ms: i });
        fades.extend(effects.iter().filter_map(|effect| match effect {
            Effect::ScheduleStageSwap { fade, .. } => Some(*fade),
            _ => None,
        }));
        state = next;
    }
    (state, fades)
}

#[test]
fn stage_message_swaps_after_fade() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 30);
    let (state, fades) = fades_scheduled(state, 400);
    let latest = *fades.last().expect("a stage swap was scheduled");
    let view = state.view();
    assert!(view.stage_fading);
    assert_eq!(view.stage_message, "Analyzing your home's architecture...");

    let (state, effects) = update(state, Msg::StageFadeElapsed { fade: latest });
    assert!(effects.is_empty());
    let view = state.view();
    assert!(!view.stage_fading);
    assert_eq!(view.stage_message, "Preparing image for visualization...");
}

#[test]
fn superseded_stage_swap_does_not_cut_the_new_fade_short() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 30);
    let (state, fades) = fades_scheduled(state, 400);
    assert_eq!(fades, vec![1, 2]);

    // The first swap fired after the second fade had already started.
    let (state, effects) = update(state, Msg::StageFadeElapsed { fade: 1 });
    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.stage_fading);
    assert_eq!(view.stage_message, "Analyzing your home's architecture...");

    let (state, _) = update(state, Msg::StageFadeElapsed { fade: 2 });
    let view = state.view();
    assert!(!view.stage_fading);
    assert_eq!(view.stage_message, "Preparing image for visualization...");
}

#[test]
fn failed_sample_uses_status_message_or_default() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 50);
    let run = state.run();
    let mut job = VisualizationJob::sample(JOB, JobStatus::Failed, 50);
    job.status_message = "Model quota exceeded".into();
    let (state, effects) = update(state, Msg::Sample { run, job });

    assert_eq!(
        effects,
        vec![
            Effect::StopPolling,
            Effect::StopFrames,
            Effect::CancelStageSwap
        ]
    );
    let error = state.view().error.expect("error");
    assert_eq!(error.kind, FailureKind::JobFailed);
    assert_eq!(error.message, "Model quota exceeded");
    assert_eq!(error.recovery, Recovery::Retry);

    let (state, _) = sample(started(), JobStatus::Failed, 0);
    assert_eq!(
        state.view().error.expect("error").message,
        DEFAULT_FAILURE_MESSAGE
    );
}

#[test]
fn not_found_is_a_dead_end() {
    init_logging();
    let state = started();
    let run = state.run();
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            run,
            error: ClientError::NotFound,
        },
    );
    assert_eq!(effects, vec![Effect::StopPolling, Effect::CancelStageSwap]);

    let view = state.view();
    assert_eq!(view.status, ViewStatus::Failed);
    let error = view.error.expect("error");
    assert_eq!(error.kind, FailureKind::NotFound);
    assert_eq!(error.recovery, Recovery::Back);
    assert_eq!(error.message, "Visualization request #42 not found.");
    assert!(!view.can_retry);

    let (_state, effects) = update(state, Msg::RetryClicked);
    assert!(effects.is_empty());
}

#[test]
fn transient_failures_surface_only_when_sustained() {
    init_logging();
    let mut state = started();
    let run = state.run();
    for _ in 0..2 {
        let (next, effects) = update(
            state,
            Msg::PollFailed {
                run,
                error: ClientError::Transient("connection reset".into()),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(next.view().advisory, None);
        state = next;
    }
    let (state, _) = update(
        state,
        Msg::PollFailed {
            run,
            error: ClientError::Transient("connection reset".into()),
        },
    );
    assert_eq!(state.view().advisory.as_deref(), Some(TRANSIENT_ADVISORY));
    assert_eq!(state.view().status, ViewStatus::Polling);

    let (state, _) = sample(state, JobStatus::Processing, 10);
    assert_eq!(state.view().advisory, None);
}

#[test]
fn unexpected_failure_is_shown_as_failed() {
    init_logging();
    let state = started();
    let run = state.run();
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            run,
            error: ClientError::Unexpected("500 Internal Server Error".into()),
        },
    );
    assert!(effects.contains(&Effect::StopPolling));
    let view = state.view();
    assert_eq!(view.status, ViewStatus::Failed);
    assert_eq!(view.error.expect("error").kind, FailureKind::Unexpected);
    assert!(view.can_retry);
}

#[test]
fn retry_after_unexpected_failure_resumes_polling_without_regenerating() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 30);
    let (state, _) = frames(state, 0, 100);
    let shown = state.display_progress();
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            run: 1,
            error: ClientError::Unexpected("http status 502 Bad Gateway".into()),
        },
    );
    assert!(effects.contains(&Effect::StopPolling));
    assert_eq!(state.view().status, ViewStatus::Failed);

    let (state, effects) = update(state, Msg::RetryClicked);
    assert_eq!(effects, vec![Effect::StartPolling { job_id: JOB, run: 2 }]);
    let view = state.view();
    assert_eq!(view.status, ViewStatus::Polling);
    assert_eq!(view.error, None);
    assert_eq!(view.display_progress, shown);

    let (state, effects) = sample(state, JobStatus::Processing, 60);
    assert_eq!(effects, vec![Effect::ArmFrames]);
    assert!(state.display_progress() >= shown);

    let (state, _) = sample(state, JobStatus::Complete, 100);
    assert_eq!(state.view().status, ViewStatus::Complete);
}

#[test]
fn nothing_is_consulted_after_a_terminal_state() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Complete, 100);
    let before = state.view();
    let (state, effects) = sample(state, JobStatus::Failed, 100);
    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
}

#[test]
fn retry_is_a_noop_while_polling() {
    init_logging();
    let state = started();
    let before = state.clone();
    let (state, effects) = update(state, Msg::RetryClicked);
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, _) = sample(state, JobStatus::Processing, 30);
    let (_state, effects) = update(state, Msg::RetryClicked);
    assert!(effects.is_empty());
}

#[test]
fn retry_regenerates_then_polls_a_fresh_run() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 80);
    let (state, _) = frames(state, 0, 200);
    let (state, _) = sample(state, JobStatus::Failed, 80);
    assert!(state.view().can_retry);

    let (state, effects) = update(state, Msg::RetryClicked);
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling,
            Effect::CancelStageSwap,
            Effect::Regenerate {
                job_id: JOB,
                run: 2
            },
        ]
    );
    let view = state.view();
    assert_eq!(view.status, ViewStatus::Polling);
    assert_eq!(view.display_progress, 0.0);
    assert_eq!(view.stage_message, "Analyzing your home's architecture...");
    assert_eq!(view.error, None);

    // A sample of the old run that was still in flight is dropped.
    let (state, effects) = update(
        state,
        Msg::Sample {
            run: 1,
            job: VisualizationJob::sample(JOB, JobStatus::Complete, 100),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().status, ViewStatus::Polling);

    let (state, effects) = update(state, Msg::RegenerateAccepted { run: 2 });
    assert_eq!(effects, vec![Effect::StartPolling { job_id: JOB, run: 2 }]);

    let (state, effects) = sample(state, JobStatus::Processing, 5);
    assert_eq!(effects, vec![Effect::ArmFrames]);
    assert_eq!(state.display_progress(), 0.0);
}

#[test]
fn rejected_regenerate_fails_with_retry() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Complete, 100);
    let (state, _) = update(state, Msg::RetryClicked);
    let run = state.run();
    let (state, effects) = update(
        state,
        Msg::RegenerateRejected {
            run,
            error: ClientError::Unexpected("409 Conflict".into()),
        },
    );
    assert!(effects.is_empty());
    let error = state.view().error.expect("error");
    assert_eq!(error.kind, FailureKind::RegenerateRejected);
    assert_eq!(error.message, REGENERATE_FAILED_MESSAGE);
    assert!(state.view().can_retry);
}

#[test]
fn audit_result_is_attached_to_completed_run() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Complete, 100);
    let run = state.run();
    let report = AuditReport {
        analysis_summary: "Two ground floor windows".into(),
        has_ground_level_access: true,
        ..AuditReport::default()
    };
    let (state, _) = update(
        state,
        Msg::AuditLoaded {
            run,
            report: Some(report.clone()),
        },
    );
    assert_eq!(state.view().audit, AuditState::Ready(report));

    let (state, _) = update(state, Msg::AuditLoaded { run, report: None });
    assert_eq!(state.view().audit, AuditState::Unavailable);
}

#[test]
fn dispose_cancels_every_timer_and_freezes_state() {
    init_logging();
    let (state, _) = sample(started(), JobStatus::Processing, 30);
    let run = state.run();
    let (mut state, effects) = update(state, Msg::Dispose);
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling,
            Effect::StopFrames,
            Effect::CancelStageSwap
        ]
    );
    state.consume_dirty();
    let frozen = state.view();

    // Results that were in flight at disposal resolve afterwards.
    for msg in [
        Msg::Sample {
            run,
            job: VisualizationJob::sample(JOB, JobStatus::Complete, 100),
        },
        Msg::PollFailed {
            run,
            error: ClientError::NotFound,
        },
        Msg::FrameTick { now_ms: 99 },
        Msg::StageFadeElapsed { fade: 1 },
        Msg::RetryClicked,
    ] {
        let (next, effects) = update(state, msg);
        assert!(effects.is_empty());
        state = next;
    }
    assert!(!state.consume_dirty());
    assert_eq!(state.view(), frozen);
}
