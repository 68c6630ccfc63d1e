use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use visualizer_core::{update, Effect, JobId, JobState, JobView, Msg, RunId};
use visualizer_logging::{viz_debug, viz_info, viz_trace};

use crate::audit;
use crate::client::JobApi;
use crate::config::TrackerSettings;
use crate::scheduler::{PollHandle, PollingScheduler};
use crate::timers::{spawn_delayed, spawn_frame_ticker, TimerHandle};

/// Drives one job's lifecycle: feeds messages through [`update`] and runs
/// the effects it returns.
pub struct JobTracker {
    api: Arc<dyn JobApi>,
    frame_interval: Duration,
    state: JobState,
    scheduler: PollingScheduler,
    poll: Option<PollHandle>,
    frames: Option<TimerHandle>,
    stage_swap: Option<TimerHandle>,
    calls: JoinSet<()>,
    msg_tx: mpsc::UnboundedSender<Msg>,
    view_tx: watch::Sender<JobView>,
    origin: Instant,
}

impl JobTracker {
    /// Spawns the tracker on the current tokio runtime and starts tracking
    /// `job_id` right away.
    pub fn spawn(api: Arc<dyn JobApi>, settings: &TrackerSettings, job_id: JobId) -> TrackerHandle {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let state = JobState::with_transient_threshold(settings.transient_error_threshold);
        let (view_tx, view_rx) = watch::channel(state.view());
        let tracker = JobTracker {
            scheduler: PollingScheduler::new(Arc::clone(&api), settings.poll_interval),
            api,
            frame_interval: settings.frame_interval,
            state,
            poll: None,
            frames: None,
            stage_swap: None,
            calls: JoinSet::new(),
            msg_tx: msg_tx.clone(),
            view_tx,
            origin: Instant::now(),
        };
        let task = tokio::spawn(tracker.run(job_id, msg_rx));
        TrackerHandle {
            msg_tx,
            view_rx,
            task: Some(task),
        }
    }

    async fn run(mut self, job_id: JobId, mut msg_rx: mpsc::UnboundedReceiver<Msg>) {
        viz_info!(job = job_id; "tracking started");
        self.dispatch(Msg::Start { job_id });
        while let Some(msg) = msg_rx.recv().await {
            self.dispatch(msg);
            if self.state.is_disposed() {
                break;
            }
            while self.calls.try_join_next().is_some() {}
        }
        self.teardown();
        viz_info!(job = job_id; "tracking stopped");
    }

    fn dispatch(&mut self, msg: Msg) {
        let previous = self.state.phase().name();
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;
        let current = self.state.phase().name();
        if previous != current {
            viz_info!(job = self.job_label(); "{} -> {}", previous, current);
        }
        for effect in effects {
            self.execute(effect);
        }
        if self.state.consume_dirty() {
            self.view_tx.send_replace(self.state.view());
        }
    }

    fn execute(&mut self, effect: Effect) {
        viz_trace!(job = self.job_label(); "effect {:?}", effect);
        match effect {
            Effect::StartPolling { job_id, run } => {
                if let Some(previous) = self.poll.take() {
                    previous.cancel();
                }
                self.poll = Some(self.start_polling(job_id, run));
            }
            Effect::StopPolling => {
                if let Some(poll) = self.poll.take() {
                    poll.cancel();
                }
            }
            Effect::ArmFrames => {
                if self.frames.is_none() {
                    self.frames = Some(spawn_frame_ticker(
                        self.frame_interval,
                        self.origin,
                        self.msg_tx.clone(),
                    ));
                }
            }
            Effect::StopFrames => {
                if let Some(frames) = self.frames.take() {
                    frames.cancel();
                }
            }
            Effect::ScheduleStageSwap { delay_ms, fade } => {
                if let Some(previous) = self.stage_swap.take() {
                    previous.cancel();
                }
                self.stage_swap = Some(spawn_delayed(
                    "stage swap",
                    Duration::from_millis(delay_ms),
                    Msg::StageFadeElapsed { fade },
                    self.msg_tx.clone(),
                ));
            }
            Effect::CancelStageSwap => {
                if let Some(swap) = self.stage_swap.take() {
                    swap.cancel();
                }
            }
            Effect::Regenerate { job_id, run } => self.spawn_regenerate(job_id, run),
            Effect::LoadAudit { job_id, run } => self.spawn_audit(job_id, run),
        }
    }

    fn start_polling(&self, job_id: JobId, run: RunId) -> PollHandle {
        let tx = self.msg_tx.clone();
        self.scheduler.start(job_id, move |outcome| {
            let msg = match outcome {
                Ok(job) => Msg::Sample { run, job },
                Err(error) => Msg::PollFailed { run, error },
            };
            let _ = tx.send(msg);
        })
    }

    fn spawn_regenerate(&mut self, job_id: JobId, run: RunId) {
        let api = Arc::clone(&self.api);
        let tx = self.msg_tx.clone();
        self.calls.spawn(async move {
            let msg = match api.regenerate(job_id).await {
                Ok(()) => Msg::RegenerateAccepted { run },
                Err(error) => Msg::RegenerateRejected { run, error },
            };
            let _ = tx.send(msg);
        });
    }

    fn spawn_audit(&mut self, job_id: JobId, run: RunId) {
        let api = Arc::clone(&self.api);
        let tx = self.msg_tx.clone();
        self.calls.spawn(async move {
            let report = audit::fetch_or_generate(api.as_ref(), job_id).await;
            let _ = tx.send(Msg::AuditLoaded { run, report });
        });
    }

    /// Cancels every timer source and outstanding call.
    fn teardown(&mut self) {
        if !self.state.is_disposed() {
            self.dispatch(Msg::Dispose);
        }
        for timer in [self.frames.take(), self.stage_swap.take()].into_iter().flatten() {
            timer.cancel();
        }
        if let Some(poll) = self.poll.take() {
            poll.cancel();
        }
        self.calls.abort_all();
        viz_debug!(job = self.job_label(); "timers released");
    }

    fn job_label(&self) -> String {
        self.state
            .job_id()
            .map_or_else(|| "-".to_string(), |id| id.to_string())
    }
}

/// Caller's side of a running [`JobTracker`]. Dropping it disposes the
/// tracker.
#[derive(Debug)]
pub struct TrackerHandle {
    msg_tx: mpsc::UnboundedSender<Msg>,
    view_rx: watch::Receiver<JobView>,
    task: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    /// Latest published view.
    pub fn view(&self) -> JobView {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobView> {
        self.view_rx.clone()
    }

    /// Waits for the next published view. `None` once the tracker is gone.
    pub async fn changed(&mut self) -> Option<JobView> {
        self.view_rx.changed().await.ok()?;
        Some(self.view_rx.borrow_and_update().clone())
    }

    /// Retries a failed run or regenerates a completed one. Ignored in any
    /// other state.
    pub fn retry(&self) {
        let _ = self.msg_tx.send(Msg::RetryClicked);
    }

    pub fn dispose(&self) {
        let _ = self.msg_tx.send(Msg::Dispose);
    }

    /// Disposes the tracker and waits for its task to release every timer.
    pub async fn shutdown(mut self) {
        self.dispose();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
