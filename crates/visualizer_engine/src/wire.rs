//! JSON shapes exchanged with the visualization backend.
use serde::Deserialize;
use visualizer_core::{AuditReport, JobId, JobStatus, VisualizationJob};

#[derive(Debug, Deserialize)]
pub(crate) struct JobWire {
    id: JobId,
    status: JobStatus,
    #[serde(default)]
    progress_percentage: i64,
    #[serde(default)]
    status_message: Option<String>,
    #[serde(default)]
    original_image_url: Option<String>,
    #[serde(default)]
    clean_image_url: Option<String>,
    #[serde(default)]
    results: Vec<ResultWire>,
}

#[derive(Debug, Deserialize)]
struct ResultWire {
    #[serde(default)]
    generated_image_url: Option<String>,
    #[serde(default)]
    metadata: Option<ResultMetadataWire>,
}

#[derive(Debug, Deserialize)]
struct ResultMetadataWire {
    #[serde(default)]
    quality_score: Option<f64>,
    #[serde(default)]
    quality_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedWire {
    pub(crate) id: JobId,
}

impl From<JobWire> for VisualizationJob {
    fn from(wire: JobWire) -> Self {
        let first = wire.results.into_iter().next();
        let (result_image_ref, metadata) = match first {
            Some(result) => (result.generated_image_url, result.metadata),
            None => (None, None),
        };
        let (quality_score, quality_reason) = match metadata {
            Some(meta) => (meta.quality_score, meta.quality_reason),
            None => (None, None),
        };
        Self {
            id: wire.id,
            status: wire.status,
            progress_percent: wire.progress_percentage.clamp(0, 100) as u8,
            status_message: wire.status_message.unwrap_or_default(),
            source_image_ref: non_empty(wire.clean_image_url)
                .or_else(|| non_empty(wire.original_image_url)),
            result_image_ref: non_empty(result_image_ref),
            quality_score,
            quality_reason: non_empty(quality_reason),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

pub(crate) fn decode_job(body: &[u8]) -> Result<VisualizationJob, serde_json::Error> {
    serde_json::from_slice::<JobWire>(body).map(VisualizationJob::from)
}

pub(crate) fn decode_created(body: &[u8]) -> Result<JobId, serde_json::Error> {
    serde_json::from_slice::<CreatedWire>(body).map(|created| created.id)
}

pub(crate) fn decode_audit(body: &[u8]) -> Result<AuditReport, serde_json::Error> {
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn complete_job_prefers_clean_image_and_reads_first_result() {
        let body = br#"{
            "id": 12,
            "status": "complete",
            "progress_percentage": 100,
            "status_message": "Done",
            "original_image_url": "/media/original.jpg",
            "clean_image_url": "/media/clean.jpg",
            "created_at": "2025-01-01T00:00:00Z",
            "results": [
                {"generated_image_url": "/media/out.png",
                 "metadata": {"quality_score": 0.87, "quality_reason": "Crisp edges"}},
                {"generated_image_url": "/media/other.png"}
            ]
        }"#;
        let job = decode_job(body).unwrap();
        assert_eq!(job.id, 12);
        assert_eq!(job.status, JobStatus::Complete);
        assert_eq!(job.source_image_ref.as_deref(), Some("/media/clean.jpg"));
        assert_eq!(job.result_image_ref.as_deref(), Some("/media/out.png"));
        assert_eq!(job.quality_score, Some(0.87));
        assert_eq!(job.quality_reason.as_deref(), Some("Crisp edges"));
    }

    #[test]
    fn progress_is_clamped_and_null_message_is_empty() {
        let body = br#"{"id": 3, "status": "processing", "progress_percentage": 140,
                        "status_message": null, "original_image_url": "/o.jpg",
                        "clean_image_url": null, "results": []}"#;
        let job = decode_job(body).unwrap();
        assert_eq!(job.progress_percent, 100);
        assert_eq!(job.status_message, "");
        assert_eq!(job.source_image_ref.as_deref(), Some("/o.jpg"));
        assert_eq!(job.result_image_ref, None);

        let negative = decode_job(br#"{"id": 3, "status": "pending", "progress_percentage": -5}"#)
            .unwrap();
        assert_eq!(negative.progress_percent, 0);
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        assert!(decode_job(br#"{"id": 1, "status": "exploded"}"#).is_err());
        assert!(decode_job(b"<html>oops</html>").is_err());
    }

    #[test]
    fn created_response_yields_id() {
        assert_eq!(decode_created(br#"{"id": 77, "status": "pending"}"#).unwrap(), 77);
    }
}
