//! Observability infrastructure for the platform sentinel
//!
//! Provides:
//! - Prometheus gauges re-derived from fresh telemetry snapshots
//! - The exporter refresh loop
//! - Structured JSON logging with tracing

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use prometheus::{
    register_gauge, register_gauge_vec, register_int_gauge, register_int_gauge_vec, Gauge,
    GaugeVec, IntGauge, IntGaugeVec,
};
use tokio::time::interval;
use tracing::{debug, info};

use crate::alerts::{AlertStore, AlertSummary};
use crate::models::{ClusterStatus, GatewayMetrics, PodStatus};
use crate::telemetry::TelemetryGenerator;

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PlatformMetricsInner> = OnceLock::new();

/// Inner structure holding the actual Prometheus collectors
struct PlatformMetricsInner {
    cluster_health_score: Gauge,
    running_pods: IntGauge,
    failed_pods: IntGauge,
    health_score_by_namespace: GaugeVec,
    running_pods_by_namespace: IntGaugeVec,
    failed_pods_by_namespace: IntGaugeVec,
    pod_info: IntGaugeVec,
    pod_cpu_usage_percent: GaugeVec,
    pod_memory_usage_percent: GaugeVec,
    pod_restart_count: IntGaugeVec,
    api_total_requests: IntGauge,
    api_error_rate: Gauge,
    api_p95_latency_ms: GaugeVec,
    alerts_total: IntGauge,
    alerts_critical: IntGauge,
    alerts_warning: IntGauge,
    incidents_analyzed: IntGauge,
    runbooks_executed: IntGauge,
}

impl PlatformMetricsInner {
    fn new() -> Self {
        Self {
            cluster_health_score: register_gauge!(
                "k8s_cluster_health_score",
                "K8s cluster health score"
            )
            .expect("Failed to register k8s_cluster_health_score"),

            running_pods: register_int_gauge!("k8s_running_pods", "Number of running pods")
                .expect("Failed to register k8s_running_pods"),

            failed_pods: register_int_gauge!("k8s_failed_pods", "Number of failed pods")
                .expect("Failed to register k8s_failed_pods"),

            health_score_by_namespace: register_gauge_vec!(
                "k8s_cluster_health_score_by_namespace",
                "K8s namespace health score (running_pods/total_pods * 100)",
                &["namespace"]
            )
            .expect("Failed to register k8s_cluster_health_score_by_namespace"),

            running_pods_by_namespace: register_int_gauge_vec!(
                "k8s_running_pods_by_namespace",
                "Number of running pods by namespace",
                &["namespace"]
            )
            .expect("Failed to register k8s_running_pods_by_namespace"),

            failed_pods_by_namespace: register_int_gauge_vec!(
                "k8s_failed_pods_by_namespace",
                "Number of failed pods (CrashLoopBackOff) by namespace",
                &["namespace"]
            )
            .expect("Failed to register k8s_failed_pods_by_namespace"),

            pod_info: register_int_gauge_vec!(
                "k8s_pod_info",
                "Pod info (value is always 1; labels carry namespace/pod/status)",
                &["namespace", "pod", "status"]
            )
            .expect("Failed to register k8s_pod_info"),

            pod_cpu_usage_percent: register_gauge_vec!(
                "k8s_pod_cpu_usage_percent",
                "Pod CPU usage percent",
                &["namespace", "pod"]
            )
            .expect("Failed to register k8s_pod_cpu_usage_percent"),

            pod_memory_usage_percent: register_gauge_vec!(
                "k8s_pod_memory_usage_percent",
                "Pod memory usage percent",
                &["namespace", "pod"]
            )
            .expect("Failed to register k8s_pod_memory_usage_percent"),

            pod_restart_count: register_int_gauge_vec!(
                "k8s_pod_restart_count",
                "Pod restart count",
                &["namespace", "pod"]
            )
            .expect("Failed to register k8s_pod_restart_count"),

            api_total_requests: register_int_gauge!("api_total_requests", "API total requests")
                .expect("Failed to register api_total_requests"),

            api_error_rate: register_gauge!("api_error_rate", "API error rate (%)")
                .expect("Failed to register api_error_rate"),

            api_p95_latency_ms: register_gauge_vec!(
                "api_p95_latency_ms",
                "API p95 latency (ms)",
                &["endpoint"]
            )
            .expect("Failed to register api_p95_latency_ms"),

            alerts_total: register_int_gauge!("alerts_total", "Total active alerts")
                .expect("Failed to register alerts_total"),

            alerts_critical: register_int_gauge!("alerts_critical", "Critical alerts")
                .expect("Failed to register alerts_critical"),

            alerts_warning: register_int_gauge!("alerts_warning", "Warning alerts")
                .expect("Failed to register alerts_warning"),

            incidents_analyzed: register_int_gauge!(
                "incidents_analyzed_total",
                "Total incidents run through the analysis pipeline"
            )
            .expect("Failed to register incidents_analyzed_total"),

            runbooks_executed: register_int_gauge!(
                "runbooks_executed_total",
                "Total runbooks executed by automation"
            )
            .expect("Failed to register runbooks_executed_total"),
        }
    }
}

/// Lightweight handle to the global metrics instance
///
/// Clones share the same underlying collectors.
#[derive(Clone)]
pub struct PlatformMetrics {
    _private: (),
}

impl Default for PlatformMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformMetrics {
    /// Create a metrics handle (initializes the global registry on first
    /// call)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PlatformMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PlatformMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Re-derive every exported gauge from fresh snapshots
    ///
    /// Labeled vecs are reset first so label combinations from a previous
    /// refresh never linger as stale series.
    pub fn update_from_snapshots(
        &self,
        cluster: &ClusterStatus,
        gateway: &GatewayMetrics,
        alerts: &AlertSummary,
    ) {
        let inner = self.inner();

        inner.health_score_by_namespace.reset();
        inner.running_pods_by_namespace.reset();
        inner.failed_pods_by_namespace.reset();
        inner.pod_info.reset();
        inner.pod_cpu_usage_percent.reset();
        inner.pod_memory_usage_percent.reset();
        inner.pod_restart_count.reset();
        inner.api_p95_latency_ms.reset();

        inner.cluster_health_score.set(cluster.cluster.health_score);
        inner.running_pods.set(cluster.cluster.running_pods as i64);
        inner.failed_pods.set(cluster.cluster.failed_pods as i64);

        let mut namespace_totals: HashMap<&str, (i64, i64, i64)> = HashMap::new();
        for pod in &cluster.pods {
            let entry = namespace_totals.entry(&pod.namespace).or_default();
            entry.0 += 1;
            match pod.status {
                PodStatus::Running => entry.1 += 1,
                PodStatus::CrashLoopBackOff => entry.2 += 1,
                PodStatus::Pending => {}
            }

            let status = pod.status.to_string();
            inner
                .pod_info
                .with_label_values(&[&pod.namespace, &pod.name, &status])
                .set(1);
            inner
                .pod_cpu_usage_percent
                .with_label_values(&[&pod.namespace, &pod.name])
                .set(pod.cpu_usage_percent);
            inner
                .pod_memory_usage_percent
                .with_label_values(&[&pod.namespace, &pod.name])
                .set(pod.memory_usage_percent);
            inner
                .pod_restart_count
                .with_label_values(&[&pod.namespace, &pod.name])
                .set(pod.restart_count as i64);
        }

        for (namespace, (total, running, failed)) in namespace_totals {
            let health = running as f64 / total.max(1) as f64 * 100.0;
            inner
                .health_score_by_namespace
                .with_label_values(&[namespace])
                .set(health);
            inner
                .running_pods_by_namespace
                .with_label_values(&[namespace])
                .set(running);
            inner
                .failed_pods_by_namespace
                .with_label_values(&[namespace])
                .set(failed);
        }

        inner
            .api_total_requests
            .set(gateway.summary.total_requests as i64);
        inner
            .api_error_rate
            .set(100.0 - gateway.summary.overall_success_rate);
        for endpoint in &gateway.endpoints {
            inner
                .api_p95_latency_ms
                .with_label_values(&[&endpoint.path])
                .set(endpoint.latency_p95_ms);
        }

        inner.alerts_total.set(alerts.total_alerts as i64);
        inner.alerts_critical.set(alerts.critical as i64);
        inner.alerts_warning.set(alerts.warning as i64);
    }

    /// Increment the analyzed-incidents counter
    pub fn inc_incidents_analyzed(&self) {
        self.inner().incidents_analyzed.inc();
    }

    /// Increment the executed-runbooks counter
    pub fn inc_runbooks_executed(&self) {
        self.inner().runbooks_executed.inc();
    }
}

/// Periodically refreshes the exported gauges from fresh generator calls
pub struct ExporterLoop {
    telemetry: Arc<TelemetryGenerator>,
    alerts: Arc<AlertStore>,
    metrics: PlatformMetrics,
    refresh_interval: Duration,
}

impl ExporterLoop {
    pub fn new(
        telemetry: Arc<TelemetryGenerator>,
        alerts: Arc<AlertStore>,
        metrics: PlatformMetrics,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            telemetry,
            alerts,
            metrics,
            refresh_interval,
        }
    }

    /// Run until the shutdown signal fires
    pub async fn run(self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            refresh_secs = self.refresh_interval.as_secs(),
            "Starting metrics exporter loop"
        );

        let mut ticker = interval(self.refresh_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_once();
                }
                _ = shutdown.recv() => {
                    info!("Shutting down metrics exporter loop");
                    break;
                }
            }
        }
    }

    /// One refresh cycle over all exported gauges
    pub fn refresh_once(&self) {
        let cluster = self.telemetry.cluster_status("all");
        let gateway = self.telemetry.gateway_metrics("5m");
        let alerts = self.alerts.list(None);

        self.metrics
            .update_from_snapshots(&cluster, &gateway, &alerts);
        debug!(
            health_score = cluster.cluster.health_score,
            active_alerts = alerts.total_alerts,
            "Exporter gauges refreshed"
        );
    }
}

/// Structured logger for process lifecycle events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log process startup
    pub fn log_startup(&self, version: &str) {
        info!(
            event = "sentinel_started",
            instance = %self.instance,
            version = %version,
            "Platform sentinel started"
        );
    }

    /// Log which diagnosis engine the pipeline was built with
    pub fn log_diagnosis_mode(&self, backend_assisted: bool) {
        if backend_assisted {
            info!(
                event = "diagnosis_mode",
                instance = %self.instance,
                mode = "backend",
                "Diagnosis backend configured, AI-assisted analysis enabled"
            );
        } else {
            info!(
                event = "diagnosis_mode",
                instance = %self.instance,
                mode = "deterministic",
                "No diagnosis backend configured, using deterministic analysis"
            );
        }
    }

    /// Log process shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "sentinel_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Platform sentinel shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // The Prometheus registry is process-global, so tests that write
    // gauges run serially.

    #[test]
    #[serial(metrics)]
    fn test_metrics_update_from_snapshots() {
        let alerts = Arc::new(AlertStore::new());
        let telemetry = TelemetryGenerator::with_seed(Arc::clone(&alerts), 61);
        let metrics = PlatformMetrics::new();

        let cluster = telemetry.cluster_status("all");
        let gateway = telemetry.gateway_metrics("5m");
        let summary = alerts.list(None);

        metrics.update_from_snapshots(&cluster, &gateway, &summary);

        let families = prometheus::gather();
        let names: Vec<&str> = families.iter().map(|f| f.get_name()).collect();
        assert!(names.contains(&"k8s_cluster_health_score"));
        assert!(names.contains(&"k8s_pod_cpu_usage_percent"));
        assert!(names.contains(&"api_p95_latency_ms"));
        assert!(names.contains(&"alerts_total"));
    }

    #[test]
    #[serial(metrics)]
    fn test_labeled_series_reset_between_refreshes() {
        let metrics = PlatformMetrics::new();
        let alerts = Arc::new(AlertStore::new());
        let telemetry = TelemetryGenerator::with_seed(Arc::clone(&alerts), 62);

        let cluster = telemetry.cluster_status("production");
        let gateway = telemetry.gateway_metrics("5m");
        metrics.update_from_snapshots(&cluster, &gateway, &alerts.list(None));

        // A refresh scoped to another namespace must not leave production
        // series behind
        let cluster = telemetry.cluster_status("staging");
        let gateway = telemetry.gateway_metrics("5m");
        metrics.update_from_snapshots(&cluster, &gateway, &alerts.list(None));

        let families = prometheus::gather();
        let pod_cpu = families
            .iter()
            .find(|f| f.get_name() == "k8s_pod_cpu_usage_percent")
            .expect("pod cpu family");
        for metric in pod_cpu.get_metric() {
            for label in metric.get_label() {
                if label.get_name() == "namespace" {
                    assert_eq!(label.get_value(), "staging");
                }
            }
        }
    }

    #[test]
    #[serial(metrics)]
    fn test_counters_increment() {
        let metrics = PlatformMetrics::new();
        metrics.inc_incidents_analyzed();
        metrics.inc_runbooks_executed();
        // Shared global state: other tests may also have incremented, so
        // only presence is asserted here
        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "incidents_analyzed_total"));
    }

    #[tokio::test]
    #[serial(metrics)]
    async fn test_exporter_refresh_once() {
        let alerts = Arc::new(AlertStore::new());
        let telemetry = Arc::new(TelemetryGenerator::with_seed(Arc::clone(&alerts), 63));
        let exporter = ExporterLoop::new(
            telemetry,
            alerts,
            PlatformMetrics::new(),
            Duration::from_secs(2),
        );

        exporter.refresh_once();

        let families = prometheus::gather();
        assert!(families.iter().any(|f| f.get_name() == "api_total_requests"));
    }
}
