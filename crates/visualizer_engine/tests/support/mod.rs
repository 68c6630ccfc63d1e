#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use visualizer_core::wizard::SubmissionPayload;
use visualizer_core::{AuditReport, ClientError, JobId, JobStatus, VisualizationJob};
use visualizer_engine::{JobApi, PollOutcome};

/// In-memory backend answering status requests from a script. The last
/// scripted outcome repeats once the script runs out.
pub struct ScriptedApi {
    statuses: Mutex<VecDeque<PollOutcome>>,
    regenerate: Mutex<Result<(), ClientError>>,
    audit: Mutex<Result<AuditReport, ClientError>>,
    generated: Mutex<Result<AuditReport, ClientError>>,
    pub status_calls: AtomicUsize,
    pub regenerate_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new(statuses: Vec<PollOutcome>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            regenerate: Mutex::new(Ok(())),
            audit: Mutex::new(Err(ClientError::NotFound)),
            generated: Mutex::new(Err(ClientError::NotFound)),
            status_calls: AtomicUsize::new(0),
            regenerate_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
        }
    }

    pub fn script(&self, statuses: Vec<PollOutcome>) {
        *self.statuses.lock().unwrap() = statuses.into();
    }

    pub fn set_regenerate(&self, result: Result<(), ClientError>) {
        *self.regenerate.lock().unwrap() = result;
    }

    pub fn set_audit(&self, result: Result<AuditReport, ClientError>) {
        *self.audit.lock().unwrap() = result;
    }

    pub fn set_generated(&self, result: Result<AuditReport, ClientError>) {
        *self.generated.lock().unwrap() = result;
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl JobApi for ScriptedApi {
    async fn fetch_status(&self, _job_id: JobId) -> Result<VisualizationJob, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ClientError::Transient("empty script".into())))
        }
    }

    async fn regenerate(&self, _job_id: JobId) -> Result<(), ClientError> {
        self.regenerate_calls.fetch_add(1, Ordering::SeqCst);
        self.regenerate.lock().unwrap().clone()
    }

    async fn create_job(&self, _payload: &SubmissionPayload) -> Result<JobId, ClientError> {
        Ok(1)
    }

    async fn get_audit_report(&self, _job_id: JobId) -> Result<AuditReport, ClientError> {
        self.audit.lock().unwrap().clone()
    }

    async fn generate_audit_report(&self, _job_id: JobId) -> Result<AuditReport, ClientError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.generated.lock().unwrap().clone()
    }
}

pub fn sample(id: JobId, status: JobStatus, percent: u8) -> PollOutcome {
    Ok(VisualizationJob::sample(id, status, percent))
}

pub fn failed(id: JobId, message: &str) -> PollOutcome {
    let mut job = VisualizationJob::sample(id, JobStatus::Failed, 0);
    job.status_message = message.to_string();
    Ok(job)
}

pub fn completed(id: JobId, quality: f64) -> PollOutcome {
    let mut job = VisualizationJob::sample(id, JobStatus::Complete, 100);
    job.result_image_ref = Some(format!("/media/results/{id}.png"));
    job.source_image_ref = Some(format!("/media/clean/{id}.jpg"));
    job.quality_score = Some(quality);
    job.quality_reason = Some("Screen edges align with frames".to_string());
    Ok(job)
}
