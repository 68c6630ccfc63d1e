use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use url::Url;
use visualizer_core::wizard::SubmissionPayload;
use visualizer_core::{AuditReport, ClientError, JobId, VisualizationJob};
use visualizer_logging::{viz_error, viz_info, viz_trace, viz_warn};

use crate::config::TrackerSettings;
use crate::wire;

/// Boundary to the visualization backend. Every failure is classified
/// before it leaves the implementation.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    async fn fetch_status(&self, job_id: JobId) -> Result<VisualizationJob, ClientError>;

    /// Asks the backend to re-run a terminal job.
    async fn regenerate(&self, job_id: JobId) -> Result<(), ClientError>;

    async fn create_job(&self, payload: &SubmissionPayload) -> Result<JobId, ClientError>;

    /// `NotFound` means no report exists yet.
    async fn get_audit_report(&self, job_id: JobId) -> Result<AuditReport, ClientError>;

    async fn generate_audit_report(&self, job_id: JobId) -> Result<AuditReport, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestJobClient {
    pub fn new(settings: &TrackerSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::Unexpected(err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Unexpected(format!("invalid endpoint {path}: {err}")))
    }

    fn job_endpoint(&self, job_id: JobId, suffix: &str) -> Result<Url, ClientError> {
        self.endpoint(&format!("api/visualizations/{job_id}/{suffix}"))
    }

    async fn send(
        &self,
        job_id: Option<JobId>,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|err| report(job_id, map_reqwest_error(err)))?;
        read_body(job_id, response).await
    }
}

async fn read_body(job_id: Option<JobId>, response: Response) -> Result<Vec<u8>, ClientError> {
    let status = response.status();
    if let Some(error) = classify_status(status) {
        return Err(report(job_id, error));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| report(job_id, map_reqwest_error(err)))?;
    Ok(bytes.to_vec())
}

/// `None` for success statuses.
pub(crate) fn classify_status(status: StatusCode) -> Option<ClientError> {
    if status.is_success() {
        None
    } else if status == StatusCode::NOT_FOUND {
        Some(ClientError::NotFound)
    } else {
        Some(ClientError::Unexpected(format!("http status {status}")))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() || err.is_connect() || err.is_body() || err.is_request() {
        return ClientError::Transient(err.to_string());
    }
    if err.is_decode() {
        return ClientError::Unexpected(format!("undecodable body: {err}"));
    }
    ClientError::Unexpected(err.to_string())
}

fn decode_failure(job_id: Option<JobId>, err: serde_json::Error) -> ClientError {
    report(job_id, ClientError::Unexpected(format!("undecodable body: {err}")))
}

fn report(job_id: Option<JobId>, error: ClientError) -> ClientError {
    let id = job_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match &error {
        ClientError::NotFound => viz_info!(job = id; "backend answered not found"),
        ClientError::Transient(detail) => viz_warn!(job = id; "transient failure: {}", detail),
        ClientError::Unexpected(detail) => viz_error!(job = id; "unexpected failure: {}", detail),
    }
    error
}

#[async_trait::async_trait]
impl JobApi for ReqwestJobClient {
    async fn fetch_status(&self, job_id: JobId) -> Result<VisualizationJob, ClientError> {
        let url = self.job_endpoint(job_id, "")?;
        viz_trace!(job = job_id; "GET {}", url);
        let body = self.send(Some(job_id), self.client.get(url)).await?;
        wire::decode_job(&body).map_err(|err| decode_failure(Some(job_id), err))
    }

    async fn regenerate(&self, job_id: JobId) -> Result<(), ClientError> {
        let url = self.job_endpoint(job_id, "regenerate/")?;
        viz_info!(job = job_id; "requesting regeneration");
        self.send(Some(job_id), self.client.post(url)).await?;
        Ok(())
    }

    async fn create_job(&self, payload: &SubmissionPayload) -> Result<JobId, ClientError> {
        let url = self.endpoint("api/visualizations/")?;
        let fields = payload
            .text_fields()
            .map_err(|err| ClientError::Unexpected(format!("payload encoding: {err}")))?;
        let image = Part::bytes(payload.image.bytes.clone())
            .file_name(payload.image.file_name.clone())
            .mime_str(&payload.image.content_type)
            .map_err(|err| ClientError::Unexpected(format!("image content type: {err}")))?;
        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .part("original_image", image);

        viz_info!(
            "submitting {} ({} bytes) for {:?}",
            payload.image.file_name,
            payload.image.bytes.len(),
            payload.categories
        );
        let body = self.send(None, self.client.post(url).multipart(form)).await?;
        let job_id = wire::decode_created(&body).map_err(|err| decode_failure(None, err))?;
        viz_info!(job = job_id; "job created");
        Ok(job_id)
    }

    async fn get_audit_report(&self, job_id: JobId) -> Result<AuditReport, ClientError> {
        let url = self.job_endpoint(job_id, "audit/")?;
        let body = self.send(Some(job_id), self.client.get(url)).await?;
        wire::decode_audit(&body).map_err(|err| decode_failure(Some(job_id), err))
    }

    async fn generate_audit_report(&self, job_id: JobId) -> Result<AuditReport, ClientError> {
        let url = self.job_endpoint(job_id, "audit/generate/")?;
        viz_info!(job = job_id; "generating audit report");
        let body = self.send(Some(job_id), self.client.post(url)).await?;
        wire::decode_audit(&body).map_err(|err| decode_failure(Some(job_id), err))
    }
}
