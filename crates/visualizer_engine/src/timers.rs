//! Cancelable timer sources owned by a tracker.
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use visualizer_core::Msg;
use visualizer_logging::viz_trace;

/// A running timer task. Cancelling is idempotent and also happens on drop.
#[derive(Debug)]
pub(crate) struct TimerHandle {
    name: &'static str,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub(crate) fn cancel(&self) {
        if !self.token.is_cancelled() {
            viz_trace!("cancelling {} timer", self.name);
            self.token.cancel();
        }
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sends `FrameTick` every `interval` until cancelled. `now_ms` counts from
/// `origin`.
pub(crate) fn spawn_frame_ticker(
    interval: Duration,
    origin: Instant,
    tx: UnboundedSender<Msg>,
) -> TimerHandle {
    let token = CancellationToken::new();
    let child = token.clone();
    viz_trace!("arming frame ticker every {:?}", interval);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = child.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let now_ms = u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX);
            if tx.send(Msg::FrameTick { now_ms }).is_err() {
                break;
            }
        }
    });
    TimerHandle {
        name: "frame",
        token,
        task,
    }
}

/// Sends `msg` once after `delay` unless cancelled first.
pub(crate) fn spawn_delayed(
    name: &'static str,
    delay: Duration,
    msg: Msg,
    tx: UnboundedSender<Msg>,
) -> TimerHandle {
    let token = CancellationToken::new();
    let child = token.clone();
    viz_trace!("arming {} timer for {:?}", name, delay);
    let task = tokio::spawn(async move {
        tokio::select! {
            _ = child.cancelled() => {}
            _ = tokio::time::sleep(delay) => {
                let _ = tx.send(msg);
            }
        }
    });
    TimerHandle { name, token, task }
}
