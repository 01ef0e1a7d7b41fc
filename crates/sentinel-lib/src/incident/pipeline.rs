//! Pipeline orchestration
//!
//! Stages run in a fixed order with no branching or retries. Enrichment
//! failure is terminal; diagnosis and recommendation absorb engine
//! failures by substituting the deterministic result. The entry point
//! always returns a summary, folding any stage failure into its `error`
//! field next to whatever state was accumulated.

use std::sync::Arc;

use tracing::{debug, warn};

use super::diagnosis::{DiagnosisEngine, RuleBasedEngine, MAX_RECOMMENDATIONS};
use super::{IncidentState, IncidentSummary, Stage, StageError};
use crate::alerts::Alert;
use crate::telemetry::TelemetryGenerator;

/// Log lines fetched for the analyze_logs stage
pub const LOG_LINES_FOR_ANALYSIS: usize = 120;

/// Four-stage incident analysis workflow
pub struct IncidentPipeline {
    telemetry: Arc<TelemetryGenerator>,
    engine: Arc<dyn DiagnosisEngine>,
}

impl IncidentPipeline {
    pub fn new(telemetry: Arc<TelemetryGenerator>, engine: Arc<dyn DiagnosisEngine>) -> Self {
        Self { telemetry, engine }
    }

    /// Run all stages for one alert and return the flat summary
    pub async fn analyze(&self, alert: Alert, include_recommendations: bool) -> IncidentSummary {
        let mut state = IncidentState::new(alert, include_recommendations);

        if let Err(err) = self.run_stages(&mut state).await {
            warn!(
                alert_id = %state.alert.id,
                stage = %err.stage,
                error = %err.message,
                "Incident analysis stopped at failed stage"
            );
            state.error = Some(err.to_string());
        }

        state.into_summary()
    }

    async fn run_stages(&self, state: &mut IncidentState) -> Result<(), StageError> {
        self.enrich(state)?;
        self.analyze_logs(state);
        self.diagnose(state).await;
        self.recommend(state).await;
        Ok(())
    }

    /// Fetch a point-in-time detail record for the alert's resource
    ///
    /// The only stage whose failure is terminal: an alert without a
    /// resource cannot be enriched or meaningfully diagnosed.
    fn enrich(&self, state: &mut IncidentState) -> Result<(), StageError> {
        if state.alert.resource.trim().is_empty() {
            return Err(StageError::new(
                Stage::Enrich,
                "alert carries no resource to enrich",
            ));
        }

        state.pod_details = Some(self.telemetry.pod_details(&state.alert.resource));
        debug!(alert_id = %state.alert.id, resource = %state.alert.resource, "Enriched alert");
        Ok(())
    }

    /// Fetch recent logs for the resource and summarize error activity
    fn analyze_logs(&self, state: &mut IncidentState) {
        state.logs = Some(self.telemetry.pod_logs(
            &state.alert.resource,
            LOG_LINES_FOR_ANALYSIS,
            None,
        ));
    }

    /// Produce the root cause, degrading to the deterministic engine on
    /// any backend failure
    async fn diagnose(&self, state: &mut IncidentState) {
        let result = self
            .engine
            .diagnose(&state.alert, state.pod_details.as_ref(), state.logs.as_ref())
            .await;

        state.root_cause = Some(match result {
            Ok(root_cause) => root_cause,
            Err(err) => {
                warn!(alert_id = %state.alert.id, error = %err, "Diagnosis backend failed, using deterministic fallback");
                RuleBasedEngine::root_cause(
                    &state.alert,
                    state.pod_details.as_ref(),
                    state.logs.as_ref(),
                )
            }
        });
    }

    /// Produce remediation steps, capped at [`MAX_RECOMMENDATIONS`]
    async fn recommend(&self, state: &mut IncidentState) {
        if !state.include_recommendations {
            state.recommendations = Some(Vec::new());
            return;
        }

        let root_cause = state
            .root_cause
            .clone()
            .unwrap_or_else(|| RuleBasedEngine::root_cause(&state.alert, None, None));

        let mut steps = match self.engine.recommend(&root_cause).await {
            Ok(steps) => steps,
            Err(err) => {
                warn!(alert_id = %state.alert.id, error = %err, "Recommendation backend failed, using deterministic fallback");
                RuleBasedEngine::recommendations()
            }
        };
        steps.truncate(MAX_RECOMMENDATIONS);
        state.recommendations = Some(steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertSeverity, AlertStore, AlertType};
    use crate::incident::{RootCause, FALLBACK_RECOMMENDATIONS, FALLBACK_ROOT_CAUSE_SUMMARY};
    use crate::models::{LogReport, PodDetails};
    use anyhow::Result;
    use async_trait::async_trait;

    fn pipeline_with(engine: Arc<dyn DiagnosisEngine>) -> IncidentPipeline {
        let store = Arc::new(AlertStore::new());
        let telemetry = Arc::new(TelemetryGenerator::with_seed(store, 31));
        IncidentPipeline::new(telemetry, engine)
    }

    fn crash_alert() -> Alert {
        Alert {
            id: "a1".to_string(),
            alert_type: AlertType::CrashLoop,
            severity: AlertSeverity::Critical,
            resource: "pod-x".to_string(),
            message: "CrashLoop detected on pod-x".to_string(),
            timestamp: chrono::Utc::now(),
            status: "firing".to_string(),
        }
    }

    /// Engine that always fails, standing in for an unreachable backend
    struct FailingEngine;

    #[async_trait]
    impl DiagnosisEngine for FailingEngine {
        async fn diagnose(
            &self,
            _alert: &Alert,
            _pod: Option<&PodDetails>,
            _logs: Option<&LogReport>,
        ) -> Result<RootCause> {
            anyhow::bail!("connection refused")
        }

        async fn recommend(&self, _root_cause: &RootCause) -> Result<Vec<String>> {
            anyhow::bail!("connection refused")
        }
    }

    /// Engine that returns more steps than the cap allows
    struct VerboseEngine;

    #[async_trait]
    impl DiagnosisEngine for VerboseEngine {
        async fn diagnose(
            &self,
            _alert: &Alert,
            _pod: Option<&PodDetails>,
            _logs: Option<&LogReport>,
        ) -> Result<RootCause> {
            Ok(RootCause {
                summary: "Database connection pool exhausted".to_string(),
                evidence: vec!["AI analysis based on alert and logs".to_string()],
            })
        }

        async fn recommend(&self, _root_cause: &RootCause) -> Result<Vec<String>> {
            Ok((1..=6).map(|i| format!("Step {i}")).collect())
        }
    }

    #[tokio::test]
    async fn test_end_to_end_fallback_scenario() {
        let pipeline = pipeline_with(Arc::new(RuleBasedEngine));
        let summary = pipeline.analyze(crash_alert(), true).await;

        assert_eq!(summary.alert_id, "a1");
        assert_eq!(summary.resource, "pod-x");
        assert!(summary.error.is_none());

        let root_cause = summary.root_cause.expect("root cause");
        assert_eq!(root_cause.summary, FALLBACK_ROOT_CAUSE_SUMMARY);
        assert_eq!(root_cause.evidence.len(), 3);

        assert_eq!(summary.recommendations.len(), 3);
        for (got, want) in summary.recommendations.iter().zip(FALLBACK_RECOMMENDATIONS) {
            assert_eq!(got, want);
        }
    }

    #[tokio::test]
    async fn test_fallback_runs_are_structurally_identical() {
        let pipeline = pipeline_with(Arc::new(RuleBasedEngine));
        let a = pipeline.analyze(crash_alert(), true).await;
        let b = pipeline.analyze(crash_alert(), true).await;

        let (rc_a, rc_b) = (a.root_cause.unwrap(), b.root_cause.unwrap());
        assert_eq!(rc_a.summary, rc_b.summary);
        assert_eq!(rc_a.evidence.len(), rc_b.evidence.len());
        // Evidence wording varies only in interpolated fields
        assert!(rc_a.evidence[0].starts_with("Alert type: "));
        assert!(rc_b.evidence[1].starts_with("Error count: "));
        assert_eq!(a.recommendations, b.recommendations);
    }

    #[tokio::test]
    async fn test_recommendations_skipped_when_not_requested() {
        let pipeline = pipeline_with(Arc::new(RuleBasedEngine));
        let summary = pipeline.analyze(crash_alert(), false).await;

        assert!(summary.recommendations.is_empty());
        assert!(summary.root_cause.is_some());
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_silently() {
        let pipeline = pipeline_with(Arc::new(FailingEngine));
        let summary = pipeline.analyze(crash_alert(), true).await;

        // Degradation is not an error: the caller sees the deterministic
        // result instead
        assert!(summary.error.is_none());
        assert_eq!(
            summary.root_cause.expect("root cause").summary,
            FALLBACK_ROOT_CAUSE_SUMMARY
        );
        assert_eq!(summary.recommendations.len(), 3);
    }

    #[tokio::test]
    async fn test_recommendation_cap_applies_to_backend_output() {
        let pipeline = pipeline_with(Arc::new(VerboseEngine));
        let summary = pipeline.analyze(crash_alert(), true).await;

        assert_eq!(summary.recommendations.len(), MAX_RECOMMENDATIONS);
        assert_eq!(summary.recommendations[0], "Step 1");
    }

    #[tokio::test]
    async fn test_resourceless_alert_fails_at_enrich() {
        let pipeline = pipeline_with(Arc::new(RuleBasedEngine));
        let mut alert = crash_alert();
        alert.resource = String::new();

        let summary = pipeline.analyze(alert, true).await;

        let error = summary.error.expect("error field");
        assert!(error.contains("enrich"));
        // Partial state: later stages never ran
        assert!(summary.root_cause.is_none());
        assert!(summary.recommendations.is_empty());
        assert_eq!(summary.alert_id, "a1");
    }

    #[tokio::test]
    async fn test_anomaly_carried_from_log_analysis() {
        let pipeline = pipeline_with(Arc::new(RuleBasedEngine));
        // The marker substring forces a noisy log batch, so the anomaly
        // flag trips deterministically
        let mut alert = crash_alert();
        alert.resource = "crash-pod".to_string();

        let summary = pipeline.analyze(alert, true).await;
        let anomaly = summary.anomaly.expect("anomaly description");
        assert!(anomaly.starts_with("High error rate:"));
    }
}
