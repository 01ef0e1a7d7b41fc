//! Alert-polling automation
//!
//! A long-lived loop that lists active alerts on an interval, runs the
//! incident pipeline on ids it has not seen, and fires the restart-pod
//! runbook for critical alerts. Handling is sequential within the loop;
//! the loop itself runs as its own task so it never blocks telemetry
//! generation elsewhere in the process.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::actions::RunbookExecutor;
use crate::alerts::{AlertSeverity, AlertStore};
use crate::incident::IncidentPipeline;
use crate::observability::PlatformMetrics;

/// Runbook fired for critical alerts
const AUTO_RUNBOOK_ID: &str = "restart-pod";

/// Configuration for the automation loop
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Interval between alert polls
    pub poll_interval: Duration,
    /// Whether critical alerts trigger the remediation runbook
    pub auto_runbook: bool,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            auto_runbook: true,
        }
    }
}

/// Polls the alert store and drives the pipeline for unseen alerts
pub struct AutomationLoop {
    alerts: Arc<AlertStore>,
    pipeline: Arc<IncidentPipeline>,
    executor: Arc<dyn RunbookExecutor>,
    metrics: PlatformMetrics,
    config: AutomationConfig,
    seen: HashSet<String>,
}

impl AutomationLoop {
    pub fn new(
        alerts: Arc<AlertStore>,
        pipeline: Arc<IncidentPipeline>,
        executor: Arc<dyn RunbookExecutor>,
        metrics: PlatformMetrics,
        config: AutomationConfig,
    ) -> Self {
        Self {
            alerts,
            pipeline,
            executor,
            metrics,
            config,
            seen: HashSet::new(),
        }
    }

    /// Run until the shutdown signal fires
    pub async fn run(mut self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            auto_runbook = self.config.auto_runbook,
            "Starting alert automation loop"
        );

        let mut ticker = interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let handled = self.poll_once().await;
                    if handled > 0 {
                        debug!(handled, "Automation cycle complete");
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutting down alert automation loop");
                    break;
                }
            }
        }
    }

    /// One poll cycle; returns how many new alerts were handled
    pub async fn poll_once(&mut self) -> usize {
        let summary = self.alerts.list(None);

        // Track at most one id per live alert: ids that expired out of
        // the store will not come back, so they can be forgotten
        let active_ids: HashSet<String> = summary.alerts.iter().map(|a| a.id.clone()).collect();
        self.seen.retain(|id| active_ids.contains(id));

        let mut handled = 0;
        for alert in summary.alerts {
            if !self.seen.insert(alert.id.clone()) {
                continue;
            }
            handled += 1;

            info!(
                alert_id = %alert.id,
                alert_type = %alert.alert_type,
                severity = %alert.severity,
                resource = %alert.resource,
                "Handling new alert"
            );

            let is_critical = alert.severity == AlertSeverity::Critical;
            let resource = alert.resource.clone();

            let analysis = self.pipeline.analyze(alert, true).await;
            self.metrics.inc_incidents_analyzed();

            match &analysis.root_cause {
                Some(root_cause) => {
                    info!(
                        alert_id = %analysis.alert_id,
                        root_cause = %root_cause.summary,
                        recommendations = analysis.recommendations.len(),
                        "Incident analyzed"
                    );
                }
                None => {
                    warn!(
                        alert_id = %analysis.alert_id,
                        error = analysis.error.as_deref().unwrap_or("unknown"),
                        "Incident analysis produced no root cause"
                    );
                }
            }

            if self.config.auto_runbook && is_critical {
                self.trigger_runbook(&analysis.alert_id, &resource).await;
            }
        }

        handled
    }

    async fn trigger_runbook(&self, alert_id: &str, resource: &str) {
        let parameters = json!({ "resource": resource });
        match self.executor.execute(AUTO_RUNBOOK_ID, parameters).await {
            Ok(record) => {
                self.metrics.inc_runbooks_executed();
                info!(
                    alert_id = %alert_id,
                    runbook_id = %record.runbook_id,
                    status = %record.status,
                    "Auto-runbook executed"
                );
            }
            Err(err) => {
                warn!(alert_id = %alert_id, error = %err, "Auto-runbook failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{RunbookExecution, SimulatedRunbookExecutor};
    use crate::alerts::{Alert, AlertType};
    use crate::incident::RuleBasedEngine;
    use crate::telemetry::TelemetryGenerator;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Executor that counts invocations
    #[derive(Default)]
    struct CountingExecutor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RunbookExecutor for CountingExecutor {
        async fn execute(
            &self,
            runbook_id: &str,
            parameters: serde_json::Value,
        ) -> Result<RunbookExecution> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SimulatedRunbookExecutor.execute(runbook_id, parameters).await
        }
    }

    fn components() -> (Arc<AlertStore>, Arc<IncidentPipeline>) {
        let alerts = Arc::new(AlertStore::new());
        let telemetry = Arc::new(TelemetryGenerator::with_seed(Arc::clone(&alerts), 51));
        let pipeline = Arc::new(IncidentPipeline::new(telemetry, Arc::new(RuleBasedEngine)));
        (alerts, pipeline)
    }

    fn automation(
        alerts: Arc<AlertStore>,
        pipeline: Arc<IncidentPipeline>,
        executor: Arc<dyn RunbookExecutor>,
        auto_runbook: bool,
    ) -> AutomationLoop {
        AutomationLoop::new(
            alerts,
            pipeline,
            executor,
            PlatformMetrics::new(),
            AutomationConfig {
                poll_interval: Duration::from_millis(10),
                auto_runbook,
            },
        )
    }

    #[tokio::test]
    async fn test_each_alert_handled_once() {
        let (alerts, pipeline) = components();
        let executor = Arc::new(CountingExecutor::default());
        let mut automation = automation(
            Arc::clone(&alerts),
            pipeline,
            Arc::clone(&executor) as Arc<dyn RunbookExecutor>,
            false,
        );

        alerts.record(Alert::new(
            AlertType::HighLatency,
            AlertSeverity::Warning,
            "/api/v1/orders",
            "HighLatency on /api/v1/orders: 1400ms p95",
        ));

        assert_eq!(automation.poll_once().await, 1);
        // The same alert is still active but already seen
        assert_eq!(automation.poll_once().await, 0);
    }

    #[tokio::test]
    async fn test_critical_alert_triggers_runbook() {
        let (alerts, pipeline) = components();
        let executor = Arc::new(CountingExecutor::default());
        let mut automation = automation(
            Arc::clone(&alerts),
            pipeline,
            Arc::clone(&executor) as Arc<dyn RunbookExecutor>,
            true,
        );

        alerts.record(Alert::new(
            AlertType::CrashLoop,
            AlertSeverity::Critical,
            "pod-x",
            "CrashLoop detected on pod-x",
        ));

        automation.poll_once().await;
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_warning_alert_does_not_trigger_runbook() {
        let (alerts, pipeline) = components();
        let executor = Arc::new(CountingExecutor::default());
        let mut automation = automation(
            Arc::clone(&alerts),
            pipeline,
            Arc::clone(&executor) as Arc<dyn RunbookExecutor>,
            true,
        );

        alerts.record(Alert::new(
            AlertType::HighErrorRate,
            AlertSeverity::Warning,
            "/api/v1/users",
            "Error rate 4.10%",
        ));

        automation.poll_once().await;
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_runbook_can_be_disabled() {
        let (alerts, pipeline) = components();
        let executor = Arc::new(CountingExecutor::default());
        let mut automation = automation(
            Arc::clone(&alerts),
            pipeline,
            Arc::clone(&executor) as Arc<dyn RunbookExecutor>,
            false,
        );

        alerts.record(Alert::new(
            AlertType::CrashLoop,
            AlertSeverity::Critical,
            "pod-x",
            "CrashLoop detected on pod-x",
        ));

        automation.poll_once().await;
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_seen_set_tracks_only_live_alerts() {
        let (_, pipeline) = components();
        let alerts = Arc::new(
            AlertStore::new().with_retention(Duration::from_millis(40)),
        );
        let executor: Arc<dyn RunbookExecutor> = Arc::new(SimulatedRunbookExecutor);
        let mut automation = automation(Arc::clone(&alerts), pipeline, executor, false);

        alerts.record(Alert::new(
            AlertType::HighLatency,
            AlertSeverity::Warning,
            "/api/v1/orders",
            "HighLatency on /api/v1/orders: 1400ms p95",
        ));

        assert_eq!(automation.poll_once().await, 1);
        assert_eq!(automation.seen.len(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;

        // Alert expired: the seen set is pruned with it
        assert_eq!(automation.poll_once().await, 0);
        assert!(automation.seen.is_empty());
    }
}
