//! Cluster snapshot generation and pod threshold rules

use rand::rngs::StdRng;
use rand::Rng;

use super::round2;
use crate::alerts::{Alert, AlertSeverity, AlertStore, AlertType};
use crate::models::{
    ClusterStatus, ClusterSummary, ContainerSpec, NodeSnapshot, PodDetails, PodEvent, PodSnapshot,
    PodStatus,
};

/// Simulated workload pods
pub(super) const POD_NAMES: [&str; 7] = [
    "api-gateway-7d9f8b-xyz12",
    "auth-service-5c8a4f-abc34",
    "payment-service-9b2e1d-def56",
    "notification-service-4a7c3e-ghi78",
    "user-service-6f1b9a-jkl90",
    "inventory-service-3d8e2c-mno12",
    "frontend-app-8c4f7b-pqr34",
];

/// Simulated namespaces, assigned round-robin when querying "all"
const NAMESPACES: [&str; 3] = ["production", "staging", "dev"];

/// CPU or memory usage above this fires HighResourceUsage
const RESOURCE_USAGE_THRESHOLD: f64 = 90.0;

fn pod_status(rng: &mut StdRng) -> PodStatus {
    // Weighted toward Running: 4 in 6 Running, 1 Pending, 1 CrashLoopBackOff
    match rng.gen_range(0..6) {
        0..=3 => PodStatus::Running,
        4 => PodStatus::Pending,
        _ => PodStatus::CrashLoopBackOff,
    }
}

fn cpu_usage(rng: &mut StdRng) -> f64 {
    let base: f64 = rng.gen_range(20.0..60.0);
    let spike = if rng.gen_bool(0.2) {
        rng.gen_range(0.0..40.0)
    } else {
        0.0
    };
    (base + spike).min(100.0)
}

fn memory_usage(rng: &mut StdRng) -> f64 {
    rng.gen_range(30.0..85.0)
}

/// Evaluate the pod threshold rules
///
/// CrashLoopBackOff fires a critical CrashLoop alert; cpu or memory above
/// 90% fires a warning HighResourceUsage alert.
pub fn threshold_alert_for_pod(pod: &PodSnapshot) -> Option<Alert> {
    let (alert_type, severity) = if pod.status == PodStatus::CrashLoopBackOff {
        (AlertType::CrashLoop, AlertSeverity::Critical)
    } else if pod.cpu_usage_percent > RESOURCE_USAGE_THRESHOLD
        || pod.memory_usage_percent > RESOURCE_USAGE_THRESHOLD
    {
        (AlertType::HighResourceUsage, AlertSeverity::Warning)
    } else {
        return None;
    };

    Some(Alert::new(
        alert_type,
        severity,
        &pod.name,
        format!("{alert_type} detected on {}", pod.name),
    ))
}

pub(super) fn generate(rng: &mut StdRng, namespace: &str, alerts: &AlertStore) -> ClusterStatus {
    let mut pods = Vec::with_capacity(POD_NAMES.len());
    let mut total_cpu = 0.0;
    let mut total_memory = 0.0;

    for (idx, name) in POD_NAMES.iter().enumerate() {
        let status = pod_status(rng);
        let cpu = cpu_usage(rng);
        let memory = memory_usage(rng);
        let restart_count = if status == PodStatus::CrashLoopBackOff {
            rng.gen_range(0..=3)
        } else {
            0
        };

        let pod_namespace = if namespace == "all" {
            NAMESPACES[idx % NAMESPACES.len()].to_string()
        } else {
            namespace.to_string()
        };

        let pod = PodSnapshot {
            name: name.to_string(),
            namespace: pod_namespace,
            status,
            cpu_usage_percent: round2(cpu),
            memory_usage_percent: round2(memory),
            restart_count,
            age: format!("{}d", rng.gen_range(1..=30)),
        };

        if status == PodStatus::Running {
            total_cpu += cpu;
            total_memory += memory;
        }

        if let Some(alert) = threshold_alert_for_pod(&pod) {
            alerts.record(alert);
        }

        pods.push(pod);
    }

    let running = pods
        .iter()
        .filter(|p| p.status == PodStatus::Running)
        .count();
    let pending = pods
        .iter()
        .filter(|p| p.status == PodStatus::Pending)
        .count();
    let failed = pods
        .iter()
        .filter(|p| p.status == PodStatus::CrashLoopBackOff)
        .count();

    let cluster = ClusterSummary {
        total_pods: pods.len(),
        running_pods: running,
        pending_pods: pending,
        failed_pods: failed,
        avg_cpu_usage: round2(total_cpu / running.max(1) as f64),
        avg_memory_usage: round2(total_memory / running.max(1) as f64),
        health_score: round2(running as f64 / pods.len() as f64 * 100.0),
    };

    ClusterStatus {
        cluster,
        nodes: generate_nodes(rng),
        pods,
        timestamp: chrono::Utc::now(),
    }
}

fn generate_nodes(rng: &mut StdRng) -> Vec<NodeSnapshot> {
    vec![
        NodeSnapshot {
            name: "node-1".to_string(),
            status: "Ready".to_string(),
            cpu_capacity: "8 cores".to_string(),
            memory_capacity: "32Gi".to_string(),
            cpu_usage: round2(rng.gen_range(40.0..70.0)),
            memory_usage: round2(rng.gen_range(50.0..80.0)),
        },
        NodeSnapshot {
            name: "node-2".to_string(),
            status: "Ready".to_string(),
            cpu_capacity: "8 cores".to_string(),
            memory_capacity: "32Gi".to_string(),
            cpu_usage: round2(rng.gen_range(30.0..60.0)),
            memory_usage: round2(rng.gen_range(45.0..75.0)),
        },
    ]
}

pub(super) fn pod_details(rng: &mut StdRng, pod_name: &str) -> PodDetails {
    PodDetails {
        name: pod_name.to_string(),
        namespace: "production".to_string(),
        status: pod_status(rng),
        cpu_usage: round2(cpu_usage(rng)),
        memory_usage: round2(memory_usage(rng)),
        restart_count: rng.gen_range(0..=5),
        containers: vec![ContainerSpec {
            name: "main".to_string(),
            image: "myapp:v1.2.3".to_string(),
            ready: true,
        }],
        events: vec![
            PodEvent {
                event_type: "Normal".to_string(),
                reason: "Started".to_string(),
                message: "Container started".to_string(),
            },
            PodEvent {
                event_type: "Normal".to_string(),
                reason: "Pulling".to_string(),
                message: "Pulling image".to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn running_pod(cpu: f64, memory: f64) -> PodSnapshot {
        PodSnapshot {
            name: "user-service-6f1b9a-jkl90".to_string(),
            namespace: "production".to_string(),
            status: PodStatus::Running,
            cpu_usage_percent: cpu,
            memory_usage_percent: memory,
            restart_count: 0,
            age: "3d".to_string(),
        }
    }

    #[test]
    fn test_crashloop_fires_critical_alert() {
        let pod = PodSnapshot {
            status: PodStatus::CrashLoopBackOff,
            ..running_pod(35.0, 50.0)
        };

        let alert = threshold_alert_for_pod(&pod).expect("alert");
        assert_eq!(alert.alert_type, AlertType::CrashLoop);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.resource, pod.name);
        assert!(alert.message.contains("CrashLoop"));
    }

    #[test]
    fn test_high_cpu_fires_warning() {
        let alert = threshold_alert_for_pod(&running_pod(95.0, 50.0)).expect("alert");
        assert_eq!(alert.alert_type, AlertType::HighResourceUsage);
        assert_eq!(alert.severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_high_memory_fires_warning() {
        let alert = threshold_alert_for_pod(&running_pod(35.0, 92.5)).expect("alert");
        assert_eq!(alert.alert_type, AlertType::HighResourceUsage);
    }

    #[test]
    fn test_healthy_pod_fires_nothing() {
        assert!(threshold_alert_for_pod(&running_pod(35.0, 50.0)).is_none());
    }

    #[test]
    fn test_cluster_snapshot_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let store = Arc::new(AlertStore::new());
        let status = generate(&mut rng, "all", &store);

        assert_eq!(status.pods.len(), POD_NAMES.len());
        assert_eq!(status.nodes.len(), 2);
        assert_eq!(
            status.cluster.total_pods,
            status.cluster.running_pods
                + status.cluster.pending_pods
                + status.cluster.failed_pods
        );
        assert!(status.cluster.health_score <= 100.0);

        // "all" spreads pods across the fixed namespaces
        assert!(status.pods.iter().any(|p| p.namespace == "production"));
        assert!(status.pods.iter().any(|p| p.namespace == "staging"));
    }

    #[test]
    fn test_namespace_filter_applied_verbatim() {
        let mut rng = StdRng::seed_from_u64(4);
        let store = Arc::new(AlertStore::new());
        let status = generate(&mut rng, "staging", &store);

        assert!(status.pods.iter().all(|p| p.namespace == "staging"));
    }

    #[test]
    fn test_restart_count_only_for_crashloop() {
        let mut rng = StdRng::seed_from_u64(5);
        let store = Arc::new(AlertStore::new());

        for _ in 0..20 {
            let status = generate(&mut rng, "all", &store);
            for pod in &status.pods {
                if pod.status != PodStatus::CrashLoopBackOff {
                    assert_eq!(pod.restart_count, 0);
                }
            }
        }
    }

    #[test]
    fn test_usage_within_declared_bounds() {
        let mut rng = StdRng::seed_from_u64(6);
        let store = Arc::new(AlertStore::new());

        for _ in 0..20 {
            let status = generate(&mut rng, "all", &store);
            for pod in &status.pods {
                assert!(pod.cpu_usage_percent >= 20.0 && pod.cpu_usage_percent <= 100.0);
                assert!(pod.memory_usage_percent >= 30.0 && pod.memory_usage_percent < 85.0);
            }
        }
    }
}
