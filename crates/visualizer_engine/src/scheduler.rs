use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use visualizer_core::{ClientError, JobId, VisualizationJob};
use visualizer_logging::{viz_debug, viz_trace};

use crate::client::JobApi;

pub type PollOutcome = Result<VisualizationJob, ClientError>;

/// Repeatedly fetches one job's status with at most one request in flight.
#[derive(Clone)]
pub struct PollingScheduler {
    api: Arc<dyn JobApi>,
    interval: Duration,
}

impl PollingScheduler {
    pub fn new(api: Arc<dyn JobApi>, interval: Duration) -> Self {
        Self { api, interval }
    }

    /// Starts polling `job_id` on the current tokio runtime. The first fetch
    /// is issued immediately. Polling stops by itself after a terminal
    /// sample or a `NotFound` error. `on_sample` must not call back into
    /// the returned handle.
    pub fn start<F>(&self, job_id: JobId, on_sample: F) -> PollHandle
    where
        F: Fn(PollOutcome) + Send + Sync + 'static,
    {
        let handle = PollHandle::new();
        let active = Arc::clone(&handle.active);
        let token = handle.token.clone();
        let api = Arc::clone(&self.api);
        let on_sample = Arc::new(on_sample);
        let interval = self.interval;

        viz_debug!(job = job_id; "polling every {:?}", interval);
        tokio::spawn(async move {
            let in_flight = Arc::new(AtomicBool::new(false));
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if in_flight.swap(true, Ordering::AcqRel) {
                    viz_debug!(job = job_id; "previous fetch still running, skipping tick");
                    continue;
                }
                tokio::spawn(fetch_once(
                    Arc::clone(&api),
                    job_id,
                    Arc::clone(&in_flight),
                    Arc::clone(&active),
                    token.clone(),
                    Arc::clone(&on_sample),
                ));
            }
            viz_trace!(job = job_id; "poll loop finished");
        });
        handle
    }
}

async fn fetch_once<F>(
    api: Arc<dyn JobApi>,
    job_id: JobId,
    in_flight: Arc<AtomicBool>,
    active: Arc<Mutex<bool>>,
    token: CancellationToken,
    on_sample: Arc<F>,
) where
    F: Fn(PollOutcome) + Send + Sync + 'static,
{
    let outcome = api.fetch_status(job_id).await;
    let stop = match &outcome {
        Ok(job) => job.status.is_terminal(),
        Err(err) => err.is_terminal(),
    };

    // Held across dispatch so `cancel` either precedes it or waits for it.
    {
        let mut active = active.lock().unwrap_or_else(PoisonError::into_inner);
        if *active {
            on_sample(outcome);
            if stop {
                viz_debug!(job = job_id; "terminal outcome, polling stops");
                *active = false;
                token.cancel();
            }
        } else {
            viz_trace!(job = job_id; "discarding result fetched after cancel");
        }
    }
    in_flight.store(false, Ordering::Release);
}

/// Stops a polling loop. Once `cancel` returns no further samples are
/// dispatched, even for a fetch already in flight.
#[derive(Debug)]
pub struct PollHandle {
    active: Arc<Mutex<bool>>,
    token: CancellationToken,
}

impl PollHandle {
    fn new() -> Self {
        Self {
            active: Arc::new(Mutex::new(true)),
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active = false;
        self.token.cancel();
    }

    /// False after `cancel` or once polling stopped on its own.
    pub fn is_active(&self) -> bool {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
