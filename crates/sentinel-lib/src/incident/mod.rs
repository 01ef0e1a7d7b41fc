//! Incident analysis pipeline
//!
//! A fixed four-stage workflow turns one alert into a root-cause summary
//! and remediation recommendations:
//!
//! enrich -> analyze_logs -> diagnose -> recommend
//!
//! Each run owns its working state exclusively, so alerts can be analyzed
//! concurrently with no coordination. Diagnosis is a capability trait:
//! deterministic rules by default, backend-assisted when configured, with
//! every backend failure degrading silently to the deterministic result.

mod backend;
mod diagnosis;
mod pipeline;

pub use backend::{BackendConfig, BackendEngine};
pub use diagnosis::{
    parse_recommendations, DiagnosisEngine, RuleBasedEngine, FALLBACK_RECOMMENDATIONS,
    FALLBACK_ROOT_CAUSE_SUMMARY, MAX_RECOMMENDATIONS,
};
pub use pipeline::{IncidentPipeline, LOG_LINES_FOR_ANALYSIS};

use serde::{Deserialize, Serialize};

use crate::alerts::{Alert, AlertSeverity, AlertType};
use crate::models::{LogReport, PodDetails};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Enrich,
    AnalyzeLogs,
    Diagnose,
    Recommend,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Enrich => write!(f, "enrich"),
            Stage::AnalyzeLogs => write!(f, "analyze_logs"),
            Stage::Diagnose => write!(f, "diagnose"),
            Stage::Recommend => write!(f, "recommend"),
        }
    }
}

/// A stage-level failure, folded into the summary's error field
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {message}")]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

impl StageError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Root-cause diagnosis with supporting evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCause {
    pub summary: String,
    pub evidence: Vec<String>,
}

/// Working record for one pipeline run
///
/// Stage outputs are populated incrementally; a field left `None` means
/// the stage did not run or failed.
#[derive(Debug)]
pub struct IncidentState {
    pub alert: Alert,
    pub include_recommendations: bool,
    pub pod_details: Option<PodDetails>,
    pub logs: Option<LogReport>,
    pub root_cause: Option<RootCause>,
    pub recommendations: Option<Vec<String>>,
    pub error: Option<String>,
}

impl IncidentState {
    pub fn new(alert: Alert, include_recommendations: bool) -> Self {
        Self {
            alert,
            include_recommendations,
            pod_details: None,
            logs: None,
            root_cause: None,
            recommendations: None,
            error: None,
        }
    }

    /// Collapse the state into the flat caller-facing summary
    pub fn into_summary(self) -> IncidentSummary {
        IncidentSummary {
            alert_id: self.alert.id,
            alert_type: self.alert.alert_type,
            severity: self.alert.severity,
            resource: self.alert.resource,
            message: self.alert.message,
            anomaly: self.logs.and_then(|l| l.anomaly_description),
            root_cause: self.root_cause,
            recommendations: self.recommendations.unwrap_or_default(),
            error: self.error,
        }
    }
}

/// Flat pipeline output: alert identity, anomaly description, root cause,
/// and recommendations
///
/// The shape is stable regardless of which stages succeeded; failures
/// appear in `error` next to whatever state was accumulated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentSummary {
    pub alert_id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub resource: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<RootCause>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
