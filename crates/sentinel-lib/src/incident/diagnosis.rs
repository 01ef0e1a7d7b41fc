//! Diagnosis capability
//!
//! The pipeline depends on [`DiagnosisEngine`] and selects an
//! implementation at construction time: [`RuleBasedEngine`] when no
//! backend is configured, [`super::BackendEngine`] otherwise.

use anyhow::Result;
use async_trait::async_trait;

use super::RootCause;
use crate::alerts::Alert;
use crate::models::{LogReport, PodDetails};

/// Fixed summary produced by the deterministic path
pub const FALLBACK_ROOT_CAUSE_SUMMARY: &str =
    "Likely resource saturation or error spike in service";

/// Fixed remediation steps produced by the deterministic path
pub const FALLBACK_RECOMMENDATIONS: [&str; 3] = [
    "Restart affected pod",
    "Check downstream dependencies",
    "Scale deployment if CPU is saturated",
];

/// Upper bound on recommendations regardless of engine
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Strategy for turning alert context into a diagnosis
#[async_trait]
pub trait DiagnosisEngine: Send + Sync {
    /// Produce a root-cause summary with an evidence list
    async fn diagnose(
        &self,
        alert: &Alert,
        pod: Option<&PodDetails>,
        logs: Option<&LogReport>,
    ) -> Result<RootCause>;

    /// Produce remediation steps for a diagnosed root cause
    async fn recommend(&self, root_cause: &RootCause) -> Result<Vec<String>>;
}

/// Deterministic diagnosis: a fixed template interpolating the alert
/// type, log error count, and pod status
///
/// Never fails, which makes it the universal fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedEngine;

impl RuleBasedEngine {
    pub fn root_cause(
        alert: &Alert,
        pod: Option<&PodDetails>,
        logs: Option<&LogReport>,
    ) -> RootCause {
        RootCause {
            summary: FALLBACK_ROOT_CAUSE_SUMMARY.to_string(),
            evidence: vec![
                format!("Alert type: {}", alert.alert_type),
                format!("Error count: {}", logs.map_or(0, |l| l.error_count)),
                format!(
                    "Pod status: {}",
                    pod.map_or_else(|| "unknown".to_string(), |p| p.status.to_string())
                ),
            ],
        }
    }

    pub fn recommendations() -> Vec<String> {
        FALLBACK_RECOMMENDATIONS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[async_trait]
impl DiagnosisEngine for RuleBasedEngine {
    async fn diagnose(
        &self,
        alert: &Alert,
        pod: Option<&PodDetails>,
        logs: Option<&LogReport>,
    ) -> Result<RootCause> {
        Ok(Self::root_cause(alert, pod, logs))
    }

    async fn recommend(&self, _root_cause: &RootCause) -> Result<Vec<String>> {
        Ok(Self::recommendations())
    }
}

/// Extract at most [`MAX_RECOMMENDATIONS`] steps from backend free text,
/// dropping empty lines and leading bullet markers
pub fn parse_recommendations(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|line| !line.is_empty())
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertSeverity, AlertType};
    use crate::models::PodStatus;

    fn alert() -> Alert {
        Alert::new(
            AlertType::CrashLoop,
            AlertSeverity::Critical,
            "pod-x",
            "CrashLoop detected on pod-x",
        )
    }

    #[test]
    fn test_rule_based_evidence_fields() {
        let rc = RuleBasedEngine::root_cause(&alert(), None, None);
        assert_eq!(rc.summary, FALLBACK_ROOT_CAUSE_SUMMARY);
        assert_eq!(
            rc.evidence,
            vec![
                "Alert type: CrashLoop".to_string(),
                "Error count: 0".to_string(),
                "Pod status: unknown".to_string(),
            ]
        );
    }

    #[test]
    fn test_rule_based_interpolates_context() {
        let pod = PodDetails {
            name: "pod-x".to_string(),
            namespace: "production".to_string(),
            status: PodStatus::CrashLoopBackOff,
            cpu_usage: 45.0,
            memory_usage: 60.0,
            restart_count: 3,
            containers: vec![],
            events: vec![],
        };
        let logs = crate::models::LogReport {
            pod: "pod-x".to_string(),
            total_lines: 120,
            error_count: 42,
            warning_count: 7,
            anomaly_detected: true,
            anomaly_description: Some("High error rate: 42/120 errors".to_string()),
            logs: vec![],
        };

        let rc = RuleBasedEngine::root_cause(&alert(), Some(&pod), Some(&logs));
        assert!(rc.evidence.contains(&"Error count: 42".to_string()));
        assert!(rc
            .evidence
            .contains(&"Pod status: CrashLoopBackOff".to_string()));
    }

    #[test]
    fn test_rule_based_is_deterministic() {
        let a = RuleBasedEngine::root_cause(&alert(), None, None);
        let b = RuleBasedEngine::root_cause(&alert(), None, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_recommendations_strips_bullets_and_caps() {
        let text = "- Restart the pod\n\n* Check the database\n• Scale out\n- One too many\n";
        let steps = parse_recommendations(text);
        assert_eq!(
            steps,
            vec![
                "Restart the pod".to_string(),
                "Check the database".to_string(),
                "Scale out".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_recommendations_empty_input() {
        assert!(parse_recommendations("").is_empty());
        assert!(parse_recommendations("\n \n").is_empty());
    }

    #[test]
    fn test_fallback_recommendation_count() {
        assert_eq!(RuleBasedEngine::recommendations().len(), MAX_RECOMMENDATIONS);
    }
}
