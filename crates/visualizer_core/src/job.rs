use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type JobId = u64;

/// Backend status of a visualization job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only mirror of one backend sample.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationJob {
    pub id: JobId,
    pub status: JobStatus,
    /// Clamped to `0..=100` by the decoder.
    pub progress_percent: u8,
    /// Advisory only; never drives a transition.
    pub status_message: String,
    pub source_image_ref: Option<String>,
    /// `None` until `status == Complete`.
    pub result_image_ref: Option<String>,
    pub quality_score: Option<f64>,
    pub quality_reason: Option<String>,
}

impl VisualizationJob {
    /// A bare sample, mostly useful for tests and fakes.
    pub fn sample(id: JobId, status: JobStatus, progress_percent: u8) -> Self {
        Self {
            id,
            status,
            progress_percent: progress_percent.min(100),
            status_message: String::new(),
            source_image_ref: None,
            result_image_ref: None,
            quality_score: None,
            quality_reason: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBand {
    High,
    Medium,
    Low,
}

impl QualityBand {
    pub fn from_percent(percent: u8) -> Self {
        if percent >= 90 {
            QualityBand::High
        } else if percent >= 70 {
            QualityBand::Medium
        } else {
            QualityBand::Low
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub result_image_ref: Option<String>,
    pub source_image_ref: Option<String>,
    /// Score in `0.0..=1.0` as reported by the backend; absent means 0.
    pub quality_score: Option<f64>,
    pub quality_reason: Option<String>,
}

impl JobResult {
    pub fn from_job(job: &VisualizationJob) -> Self {
        Self {
            result_image_ref: job.result_image_ref.clone(),
            source_image_ref: job.source_image_ref.clone(),
            quality_score: job.quality_score,
            quality_reason: job.quality_reason.clone(),
        }
    }

    pub fn quality_percent(&self) -> u8 {
        let score = self.quality_score.unwrap_or(0.0).clamp(0.0, 1.0);
        (score * 100.0).round() as u8
    }

    pub fn quality_band(&self) -> QualityBand {
        QualityBand::from_percent(self.quality_percent())
    }
}

/// Classified outcome of a failed boundary call.
///
/// The controller only ever sees these kinds, never transport details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("job not found")]
    NotFound,
    #[error("transient failure: {0}")]
    Transient(String),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::NotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Risk {
    pub level: RiskLevel,
    pub label: &'static str,
}

/// Security audit attached to a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(default)]
    pub analysis_summary: String,
    #[serde(default)]
    pub has_ground_level_access: bool,
    #[serde(default)]
    pub has_concealment: bool,
    #[serde(default)]
    pub has_glass_proximity: bool,
    #[serde(default)]
    pub has_hardware_weakness: bool,
}

impl AuditReport {
    /// Risks flagged by the audit, in report order.
    pub fn risks(&self) -> Vec<Risk> {
        let flags = [
            (
                self.has_ground_level_access,
                RiskLevel::High,
                "Ground Level Windows Detected",
            ),
            (
                self.has_concealment,
                RiskLevel::High,
                "Concealed Entry Points (Landscaping)",
            ),
            (
                self.has_glass_proximity,
                RiskLevel::Medium,
                "Glass near Door Locks",
            ),
            (
                self.has_hardware_weakness,
                RiskLevel::Critical,
                "Standard Fly Screens Detected (No Protection)",
            ),
        ];
        flags
            .into_iter()
            .filter(|(flagged, _, _)| *flagged)
            .map(|(_, level, label)| Risk { level, label })
            .collect()
    }
}
