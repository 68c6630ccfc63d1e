use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio::runtime::Runtime;
use visualizer_core::wizard::SubmissionPayload;
use visualizer_core::{ClientError, JobId, JobView};
use visualizer_logging::{viz_debug, viz_info, viz_warn};

use crate::client::{JobApi, ReqwestJobClient};
use crate::config::TrackerSettings;
use crate::tracker::{JobTracker, TrackerHandle};

enum EngineCommand {
    Submit { payload: Box<SubmissionPayload> },
    Track { job_id: JobId },
    Regenerate { job_id: JobId },
    Retry { job_id: JobId },
    Dispose { job_id: JobId },
}

/// Reports from the background runtime to a synchronous front end.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted { job_id: JobId },
    SubmitFailed { error: ClientError },
    RegenerateFailed { job_id: JobId, error: ClientError },
    /// A tracked job published a new view.
    View { job_id: JobId, view: JobView },
    /// Ctrl-C was pressed.
    Interrupted,
}

/// Owns a tokio runtime on a background thread and exposes the trackers
/// through plain channels.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: TrackerSettings) -> io::Result<Self> {
        let api = ReqwestJobClient::new(&settings)
            .map_err(|err| io::Error::other(err.to_string()))?;
        Self::with_api(settings, Arc::new(api))
    }

    /// Same as [`EngineHandle::new`] with a caller-supplied backend.
    pub fn with_api(settings: TrackerSettings, api: Arc<dyn JobApi>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("visualizer-engine".to_string())
            .spawn(move || {
                let interrupt_tx = event_tx.clone();
                runtime.spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        let _ = interrupt_tx.send(EngineEvent::Interrupted);
                    }
                });

                let mut trackers: HashMap<JobId, TrackerHandle> = HashMap::new();
                while let Ok(command) = cmd_rx.recv() {
                    let _guard = runtime.enter();
                    handle_command(&runtime, &api, &settings, &mut trackers, command, &event_tx);
                }

                drop(trackers);
                runtime.shutdown_timeout(Duration::from_millis(500));
                viz_debug!("engine thread stopped");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, payload: SubmissionPayload) {
        self.send(EngineCommand::Submit {
            payload: Box::new(payload),
        });
    }

    pub fn track(&self, job_id: JobId) {
        self.send(EngineCommand::Track { job_id });
    }

    /// Calls the regenerate boundary, then tracks the job.
    pub fn regenerate(&self, job_id: JobId) {
        self.send(EngineCommand::Regenerate { job_id });
    }

    pub fn retry(&self, job_id: JobId) {
        self.send(EngineCommand::Retry { job_id });
    }

    pub fn dispose(&self, job_id: JobId) {
        self.send(EngineCommand::Dispose { job_id });
    }

    /// Blocks until the next event. `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            viz_warn!("engine thread is gone, command dropped");
        }
    }
}

/// Runs on the engine thread with `runtime` entered.
fn handle_command(
    runtime: &Runtime,
    api: &Arc<dyn JobApi>,
    settings: &TrackerSettings,
    trackers: &mut HashMap<JobId, TrackerHandle>,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit { payload } => {
            let api = Arc::clone(api);
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let event = match api.create_job(&payload).await {
                    Ok(job_id) => EngineEvent::Submitted { job_id },
                    Err(error) => EngineEvent::SubmitFailed { error },
                };
                let _ = event_tx.send(event);
            });
        }
        EngineCommand::Track { job_id } => {
            start_tracking(api, settings, trackers, job_id, event_tx);
        }
        EngineCommand::Regenerate { job_id } => {
            // The job must be back in processing before polling starts, so
            // the tracker is created once the call is answered.
            match runtime.block_on(api.regenerate(job_id)) {
                Ok(()) => start_tracking(api, settings, trackers, job_id, event_tx),
                Err(error) => {
                    let _ = event_tx.send(EngineEvent::RegenerateFailed { job_id, error });
                }
            }
        }
        EngineCommand::Retry { job_id } => match trackers.get(&job_id) {
            Some(tracker) => tracker.retry(),
            None => viz_warn!(job = job_id; "retry for a job that is not tracked"),
        },
        EngineCommand::Dispose { job_id } => {
            if trackers.remove(&job_id).is_some() {
                viz_info!(job = job_id; "tracker disposed");
            }
        }
    }
}

fn start_tracking(
    api: &Arc<dyn JobApi>,
    settings: &TrackerSettings,
    trackers: &mut HashMap<JobId, TrackerHandle>,
    job_id: JobId,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    // Replacing an existing tracker drops (and disposes) the old one.
    let tracker = JobTracker::spawn(Arc::clone(api), settings, job_id);
    let mut views = tracker.subscribe();
    let event_tx = event_tx.clone();
    tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            if event_tx.send(EngineEvent::View { job_id, view }).is_err() {
                break;
            }
        }
    });
    trackers.insert(job_id, tracker);
}
