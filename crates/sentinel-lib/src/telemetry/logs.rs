//! Synthetic pod log generation with anomaly classification

use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;

use super::cluster::POD_NAMES;
use crate::models::{LogEntry, LogReport, LogSeverity};

/// Maximum number of entries returned in a report payload
pub const RETURNED_LOG_LINES: usize = 50;

/// An error-entry fraction above this of the requested line count flags
/// the batch as anomalous
const ANOMALY_ERROR_RATIO: f64 = 0.2;

/// Substring that marks a pod as known-bad for log generation
const PROBLEM_MARKER: &str = "crash";

const ERROR_MESSAGES: [&str; 5] = [
    "Connection refused to database",
    "OutOfMemoryError: Java heap space",
    "Timeout waiting for response",
    "Failed to authenticate request",
    "Null pointer exception in handler",
];

const BENIGN_MESSAGES: [&str; 5] = [
    "Request processed successfully",
    "Cache hit for user data",
    "Database query executed in 45ms",
    "Health check passed",
    "Metrics exported to Prometheus",
];

pub(super) fn generate(
    rng: &mut StdRng,
    pod_name: &str,
    lines: usize,
    severity: Option<LogSeverity>,
) -> LogReport {
    // A pod carrying the marker substring, or any pod 30% of the time,
    // produces an elevated error rate
    let problematic = pod_name.to_lowercase().contains(PROBLEM_MARKER) || rng.gen_bool(0.3);

    let now = Utc::now();
    let mut entries = Vec::with_capacity(lines);

    for i in 0..lines {
        let timestamp = now - chrono::Duration::seconds((lines - i) as i64);

        let (log_severity, message) = if problematic && rng.gen_bool(0.4) {
            (
                LogSeverity::Error,
                ERROR_MESSAGES[rng.gen_range(0..ERROR_MESSAGES.len())],
            )
        } else {
            let sev = match rng.gen_range(0..3) {
                0 => LogSeverity::Info,
                1 => LogSeverity::Warn,
                _ => LogSeverity::Error,
            };
            (sev, BENIGN_MESSAGES[rng.gen_range(0..BENIGN_MESSAGES.len())])
        };

        let pod = if pod_name == "all" {
            POD_NAMES[rng.gen_range(0..POD_NAMES.len())].to_string()
        } else {
            pod_name.to_string()
        };

        entries.push(LogEntry {
            timestamp,
            severity: log_severity,
            pod,
            message: message.to_string(),
        });
    }

    build_log_report(pod_name, lines, entries, severity)
}

/// Classify a generated batch and shape the report payload
///
/// Counts and the anomaly flag cover the whole batch; the severity filter
/// only selects which entries are returned, truncated to the most recent
/// [`RETURNED_LOG_LINES`].
pub fn build_log_report(
    pod_name: &str,
    requested_lines: usize,
    entries: Vec<LogEntry>,
    severity: Option<LogSeverity>,
) -> LogReport {
    let error_count = entries
        .iter()
        .filter(|e| e.severity == LogSeverity::Error)
        .count();
    let warning_count = entries
        .iter()
        .filter(|e| e.severity == LogSeverity::Warn)
        .count();

    let anomaly_detected = error_count as f64 > ANOMALY_ERROR_RATIO * requested_lines as f64;
    let anomaly_description = anomaly_detected
        .then(|| format!("High error rate: {error_count}/{requested_lines} errors"));

    let total_lines = entries.len();
    let mut logs: Vec<LogEntry> = entries
        .into_iter()
        .filter(|e| severity.map_or(true, |s| e.severity == s))
        .collect();
    if logs.len() > RETURNED_LOG_LINES {
        logs.drain(0..logs.len() - RETURNED_LOG_LINES);
    }

    LogReport {
        pod: pod_name.to_string(),
        total_lines,
        error_count,
        warning_count,
        anomaly_detected,
        anomaly_description,
        logs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn entry(severity: LogSeverity) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            severity,
            pod: "user-service-6f1b9a-jkl90".to_string(),
            message: "Request processed successfully".to_string(),
        }
    }

    fn batch(errors: usize, warns: usize, infos: usize) -> Vec<LogEntry> {
        let mut entries = Vec::new();
        entries.extend((0..errors).map(|_| entry(LogSeverity::Error)));
        entries.extend((0..warns).map(|_| entry(LogSeverity::Warn)));
        entries.extend((0..infos).map(|_| entry(LogSeverity::Info)));
        entries
    }

    #[test]
    fn test_anomaly_iff_errors_exceed_fifth_of_requested() {
        // 20 of 100 is not anomalous: the ratio must be exceeded
        let report = build_log_report("pod-x", 100, batch(20, 0, 80), None);
        assert!(!report.anomaly_detected);
        assert!(report.anomaly_description.is_none());

        let report = build_log_report("pod-x", 100, batch(21, 0, 79), None);
        assert!(report.anomaly_detected);
        assert_eq!(
            report.anomaly_description.as_deref(),
            Some("High error rate: 21/100 errors")
        );
    }

    #[test]
    fn test_counts_cover_full_batch_despite_filter() {
        let report = build_log_report(
            "pod-x",
            100,
            batch(30, 25, 45),
            Some(LogSeverity::Warn),
        );

        assert_eq!(report.error_count, 30);
        assert_eq!(report.warning_count, 25);
        assert_eq!(report.total_lines, 100);
        assert!(report.logs.iter().all(|e| e.severity == LogSeverity::Warn));
        assert_eq!(report.logs.len(), 25);
    }

    #[test]
    fn test_payload_truncated_to_most_recent_50() {
        let report = build_log_report("pod-x", 200, batch(0, 0, 200), None);
        assert_eq!(report.total_lines, 200);
        assert_eq!(report.logs.len(), RETURNED_LOG_LINES);
    }

    #[test]
    fn test_marker_pod_is_reliably_noisy() {
        let mut rng = StdRng::seed_from_u64(11);
        // The marker forces the problematic path regardless of the 30%
        // baseline roll, so error density stays high
        let report = generate(&mut rng, "crash-loop-pod", 200, None);
        assert!(report.error_count > 200 / 4);
    }

    #[test]
    fn test_aggregate_stream_mixes_pods() {
        let mut rng = StdRng::seed_from_u64(12);
        let report = generate(&mut rng, "all", 120, None);

        let mut pods: Vec<&str> = report.logs.iter().map(|e| e.pod.as_str()).collect();
        pods.sort_unstable();
        pods.dedup();
        assert!(pods.len() > 1);
    }

    #[test]
    fn test_generated_count_matches_requested() {
        let mut rng = StdRng::seed_from_u64(13);
        let report = generate(&mut rng, "user-service-6f1b9a-jkl90", 40, None);
        assert_eq!(report.total_lines, 40);
        assert_eq!(report.logs.len(), 40);
    }
}
