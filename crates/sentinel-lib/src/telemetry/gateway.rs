//! API gateway metrics generation and endpoint threshold rules

use rand::rngs::StdRng;
use rand::Rng;

use super::round2;
use crate::alerts::{Alert, AlertSeverity, AlertStore, AlertType};
use crate::models::{EndpointSnapshot, GatewayMetrics, GatewaySummary, StatusCodeHistogram};

/// Simulated gateway routes
pub(super) const API_ENDPOINTS: [&str; 7] = [
    "/api/v1/users",
    "/api/v1/products",
    "/api/v1/orders",
    "/api/v1/auth/login",
    "/api/v1/payments",
    "/api/v1/inventory",
    "/api/v1/notifications",
];

/// p95 latency above this fires HighLatency
const P95_LATENCY_THRESHOLD_MS: f64 = 1000.0;

/// Error rate above this percentage fires HighErrorRate
const ERROR_RATE_THRESHOLD: f64 = 3.0;

/// Evaluate the endpoint threshold rules
///
/// HighLatency wins when both rules breach, matching how the thresholds
/// are checked in order.
pub fn threshold_alert_for_endpoint(endpoint: &EndpointSnapshot) -> Option<Alert> {
    if endpoint.latency_p95_ms > P95_LATENCY_THRESHOLD_MS {
        Some(Alert::new(
            AlertType::HighLatency,
            AlertSeverity::Warning,
            &endpoint.path,
            format!(
                "HighLatency on {}: {:.0}ms p95",
                endpoint.path, endpoint.latency_p95_ms
            ),
        ))
    } else if endpoint.error_rate > ERROR_RATE_THRESHOLD {
        Some(Alert::new(
            AlertType::HighErrorRate,
            AlertSeverity::Warning,
            &endpoint.path,
            format!("Error rate {:.2}%", endpoint.error_rate),
        ))
    } else {
        None
    }
}

pub(super) fn generate(rng: &mut StdRng, time_window: &str, alerts: &AlertStore) -> GatewayMetrics {
    let mut endpoints = Vec::with_capacity(API_ENDPOINTS.len());
    let mut total_requests = 0u64;
    let mut total_errors = 0u64;

    for path in API_ENDPOINTS {
        let requests = rng.gen_range(100..=5000u64);
        let error_rate = rng.gen_range(0.1..5.0);
        let errors = (requests as f64 * error_rate / 100.0) as u64;

        // Latency is bimodal: a ~15% chance of a bottlenecked endpoint
        // 4-10x slower at p50, with p95/p99 scaled proportionally
        let bottleneck = rng.gen_bool(0.15);
        let p50 = if bottleneck {
            rng.gen_range(800.0..2000.0)
        } else {
            rng.gen_range(50.0..200.0)
        };
        let p95 = p50 * rng.gen_range(2.0..4.0);
        let p99 = p95 * rng.gen_range(1.5..3.0);

        let endpoint = EndpointSnapshot {
            path: path.to_string(),
            requests,
            success_rate: round2(100.0 - error_rate),
            error_rate: round2(error_rate),
            latency_p50_ms: round2(p50),
            latency_p95_ms: round2(p95),
            latency_p99_ms: round2(p99),
            throughput_rps: round2(requests as f64 / 300.0),
            status_codes: status_codes(requests, errors),
        };

        if let Some(alert) = threshold_alert_for_endpoint(&endpoint) {
            alerts.record(alert);
        }

        total_requests += requests;
        total_errors += errors;
        endpoints.push(endpoint);
    }

    let avg_latency =
        endpoints.iter().map(|e| e.latency_p50_ms).sum::<f64>() / endpoints.len() as f64;

    GatewayMetrics {
        summary: GatewaySummary {
            total_requests,
            total_errors,
            overall_success_rate: round2(
                (total_requests - total_errors) as f64 / total_requests as f64 * 100.0,
            ),
            avg_latency_ms: round2(avg_latency),
            time_window: time_window.to_string(),
        },
        endpoints,
        timestamp: chrono::Utc::now(),
    }
}

/// Split errors 30/50/20 across 4xx/5xx/503; the histogram always sums to
/// the request count
fn status_codes(requests: u64, errors: u64) -> StatusCodeHistogram {
    let bad_request = errors * 30 / 100;
    let server_error = errors * 50 / 100;
    StatusCodeHistogram {
        ok: requests - errors,
        bad_request,
        server_error,
        unavailable: errors - bad_request - server_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn endpoint(path: &str, p95: f64, error_rate: f64) -> EndpointSnapshot {
        EndpointSnapshot {
            path: path.to_string(),
            requests: 1000,
            success_rate: 100.0 - error_rate,
            error_rate,
            latency_p50_ms: p95 / 3.0,
            latency_p95_ms: p95,
            latency_p99_ms: p95 * 2.0,
            throughput_rps: 3.33,
            status_codes: StatusCodeHistogram::default(),
        }
    }

    #[test]
    fn test_high_latency_alert() {
        let alert =
            threshold_alert_for_endpoint(&endpoint("/api/v1/payments", 1500.0, 0.5)).expect("alert");
        assert_eq!(alert.alert_type, AlertType::HighLatency);
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert_eq!(alert.resource, "/api/v1/payments");
        assert!(alert.message.contains("1500ms p95"));
    }

    #[test]
    fn test_high_error_rate_alert() {
        let alert =
            threshold_alert_for_endpoint(&endpoint("/api/v1/orders", 300.0, 4.2)).expect("alert");
        assert_eq!(alert.alert_type, AlertType::HighErrorRate);
        assert!(alert.message.contains("4.20%"));
    }

    #[test]
    fn test_latency_wins_over_error_rate() {
        let alert =
            threshold_alert_for_endpoint(&endpoint("/api/v1/users", 1200.0, 4.5)).expect("alert");
        assert_eq!(alert.alert_type, AlertType::HighLatency);
    }

    #[test]
    fn test_healthy_endpoint_fires_nothing() {
        assert!(threshold_alert_for_endpoint(&endpoint("/api/v1/users", 400.0, 1.0)).is_none());
    }

    #[test]
    fn test_status_codes_sum_to_requests() {
        let codes = status_codes(1000, 37);
        assert_eq!(
            codes.ok + codes.bad_request + codes.server_error + codes.unavailable,
            1000
        );
    }

    #[test]
    fn test_gateway_snapshot_shape() {
        let mut rng = StdRng::seed_from_u64(8);
        let store = Arc::new(AlertStore::new());
        let metrics = generate(&mut rng, "15m", &store);

        assert_eq!(metrics.endpoints.len(), API_ENDPOINTS.len());
        assert_eq!(metrics.summary.time_window, "15m");
        assert!(metrics.summary.total_requests >= metrics.summary.total_errors);

        for e in &metrics.endpoints {
            assert!(e.latency_p95_ms >= e.latency_p50_ms);
            assert!(e.latency_p99_ms >= e.latency_p95_ms);
            assert!(e.error_rate >= 0.1 && e.error_rate < 5.0);
        }
    }
}
