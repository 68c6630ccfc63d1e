use visualizer_core::{AuditReport, ClientError, JobId};
use visualizer_logging::{viz_info, viz_warn};

use crate::client::JobApi;

/// Looks the audit report up, generating it once when the backend has none.
/// `None` when neither call produced a report.
pub async fn fetch_or_generate(api: &dyn JobApi, job_id: JobId) -> Option<AuditReport> {
    match api.get_audit_report(job_id).await {
        Ok(report) => Some(report),
        Err(ClientError::NotFound) => {
            viz_info!(job = job_id; "no audit report yet, generating one");
            match api.generate_audit_report(job_id).await {
                Ok(report) => Some(report),
                Err(err) => {
                    viz_warn!(job = job_id; "audit generation failed: {}", err);
                    None
                }
            }
        }
        Err(err) => {
            viz_warn!(job = job_id; "audit lookup failed: {}", err);
            None
        }
    }
}
