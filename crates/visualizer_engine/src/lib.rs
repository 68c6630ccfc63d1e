//! Visualizer engine: backend client, timers, and effect execution.
mod audit;
mod client;
mod config;
mod engine;
mod scheduler;
mod timers;
mod tracker;
mod wire;

pub use audit::fetch_or_generate;
pub use client::{JobApi, ReqwestJobClient};
pub use config::{TrackerSettings, DEFAULT_BASE_URL};
pub use engine::{EngineEvent, EngineHandle};
pub use scheduler::{PollHandle, PollOutcome, PollingScheduler};
pub use tracker::{JobTracker, TrackerHandle};
