//! Visualizer core: pure job-tracking and order-intake state machines.
mod effect;
mod job;
mod msg;
mod narrator;
mod projector;
mod state;
mod update;
mod view_model;
pub mod wizard;

pub use effect::Effect;
pub use job::{
    AuditReport, ClientError, JobId, JobResult, JobStatus, QualityBand, Risk, RiskLevel,
    VisualizationJob,
};
pub use msg::Msg;
pub use narrator::{stage_for, NarratorAction, StageNarrator, STAGES, STAGE_FADE_MS};
pub use projector::{ProgressProjector, CEILING, LOOKAHEAD};
pub use state::{
    Failure, FailureKind, JobState, Phase, RunId, DEFAULT_FAILURE_MESSAGE,
    DEFAULT_TRANSIENT_THRESHOLD, LOAD_FAILED_MESSAGE, REGENERATE_FAILED_MESSAGE,
    TRANSIENT_ADVISORY,
};
pub use update::update;
pub use view_model::{AuditState, ErrorView, JobView, Recovery, ViewStatus};
