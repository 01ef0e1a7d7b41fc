//! Synthetic telemetry generation
//!
//! Every query returns a freshly randomized snapshot drawn from fixed
//! distributions; nothing is persisted between calls. Generating cluster
//! or gateway metrics also evaluates the threshold rules and records new
//! alerts in the shared [`AlertStore`].

mod cluster;
mod gateway;
mod logs;

pub use cluster::threshold_alert_for_pod;
pub use gateway::threshold_alert_for_endpoint;
pub use logs::{build_log_report, RETURNED_LOG_LINES};

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::alerts::AlertStore;
use crate::models::{ClusterStatus, GatewayMetrics, LogReport, LogSeverity, PodDetails};

/// Synthetic source of cluster, gateway, log, and pod-detail snapshots
///
/// The generator is the sole producer of alerts: threshold rules run as a
/// side effect of cluster and gateway generation.
pub struct TelemetryGenerator {
    alerts: Arc<AlertStore>,
    rng: Mutex<StdRng>,
}

impl TelemetryGenerator {
    pub fn new(alerts: Arc<AlertStore>) -> Self {
        Self {
            alerts,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded variant for deterministic tests
    pub fn with_seed(alerts: Arc<AlertStore>, seed: u64) -> Self {
        Self {
            alerts,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generate a cluster snapshot, recording threshold alerts
    pub fn cluster_status(&self, namespace: &str) -> ClusterStatus {
        let mut rng = self.rng.lock().unwrap();
        cluster::generate(&mut rng, namespace, &self.alerts)
    }

    /// Generate gateway metrics for a time window, recording threshold
    /// alerts
    pub fn gateway_metrics(&self, time_window: &str) -> GatewayMetrics {
        let mut rng = self.rng.lock().unwrap();
        gateway::generate(&mut rng, time_window, &self.alerts)
    }

    /// Generate logs for a pod (or "all" for an aggregated stream)
    pub fn pod_logs(
        &self,
        pod_name: &str,
        lines: usize,
        severity: Option<LogSeverity>,
    ) -> LogReport {
        let mut rng = self.rng.lock().unwrap();
        logs::generate(&mut rng, pod_name, lines, severity)
    }

    /// Generate a point-in-time detail record for one pod
    pub fn pod_details(&self, pod_name: &str) -> PodDetails {
        let mut rng = self.rng.lock().unwrap();
        cluster::pod_details(&mut rng, pod_name)
    }
}

/// Round to two decimals, the precision snapshots carry on the wire
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
