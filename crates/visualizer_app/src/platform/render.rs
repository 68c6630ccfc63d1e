//! Terminal rendering of a tracked job's view.
use visualizer_core::{AuditState, JobView, QualityBand, Recovery, RiskLevel, ViewStatus};

const BAR_WIDTH: usize = 30;
/// Progress lines are printed at most once per this many percent.
const PERCENT_STEP: u8 = 5;

pub fn progress_bar(view: &JobView) -> String {
    let percent = view.percent_label();
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent
    )
}

pub fn status_name(status: ViewStatus) -> &'static str {
    match status {
        ViewStatus::Idle => "idle",
        ViewStatus::Polling => "pending",
        ViewStatus::Processing => "processing",
        ViewStatus::Complete => "complete",
        ViewStatus::Failed => "failed",
    }
}

/// True once nothing more will change without user action.
pub fn is_settled(view: &JobView) -> bool {
    match view.status {
        ViewStatus::Failed => true,
        ViewStatus::Complete => {
            !view.stage_fading
                && matches!(view.audit, AuditState::Ready(_) | AuditState::Unavailable)
        }
        ViewStatus::Idle | ViewStatus::Polling | ViewStatus::Processing => false,
    }
}

/// Summary printed once a view settles.
pub fn summary(view: &JobView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &view.error {
        lines.push(format!("Failed: {}", error.message));
        lines.push(
            match error.recovery {
                Recovery::Retry => "You can retry this visualization.",
                Recovery::Back => "This visualization cannot be retried.",
            }
            .to_string(),
        );
    }
    if let Some(result) = &view.result {
        if let Some(image) = &result.result_image_ref {
            lines.push(format!("Result: {image}"));
        }
        if let Some(source) = &result.source_image_ref {
            lines.push(format!("Original: {source}"));
        }
        let band = match result.quality_band() {
            QualityBand::High => "high",
            QualityBand::Medium => "medium",
            QualityBand::Low => "low",
        };
        lines.push(format!(
            "Quality: {}% ({band})",
            result.quality_percent()
        ));
        if let Some(reason) = &result.quality_reason {
            lines.push(format!("  {reason}"));
        }
    }
    match &view.audit {
        AuditState::Ready(report) => {
            if !report.analysis_summary.is_empty() {
                lines.push(format!("Audit: {}", report.analysis_summary));
            }
            for risk in report.risks() {
                let level = match risk.level {
                    RiskLevel::Medium => "MEDIUM",
                    RiskLevel::High => "HIGH",
                    RiskLevel::Critical => "CRITICAL",
                };
                lines.push(format!("  [{level}] {}", risk.label));
            }
        }
        AuditState::Unavailable => lines.push("Audit: not available".to_string()),
        AuditState::NotRequested | AuditState::Loading => {}
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
struct Printed {
    status: ViewStatus,
    bucket: u8,
    stage: &'static str,
    advisory: Option<String>,
}

/// Turns the stream of views into terminal lines, skipping frames that
/// would print the same thing again.
#[derive(Debug, Default)]
pub struct Renderer {
    last: Option<Printed>,
}

impl Renderer {
    pub fn update(&mut self, view: &JobView) -> Vec<String> {
        let printed = Printed {
            status: view.status,
            bucket: view.percent_label() / PERCENT_STEP,
            stage: view.stage_message,
            advisory: view.advisory.clone(),
        };
        if self.last.as_ref() == Some(&printed) {
            return Vec::new();
        }
        let advisory_changed = self
            .last
            .as_ref()
            .map_or(true, |last| last.advisory != printed.advisory);
        self.last = Some(printed);

        let mut lines = vec![format!("{} {}", progress_bar(view), view.stage_message)];
        if advisory_changed {
            if let Some(advisory) = &view.advisory {
                lines.push(format!("! {advisory}"));
            }
        }
        lines
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
