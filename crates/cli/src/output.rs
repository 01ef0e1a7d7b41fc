//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Color an alert or finding severity
pub fn color_severity(severity: &str) -> String {
    match severity.to_lowercase().as_str() {
        "critical" | "high" => severity.red().to_string(),
        "warning" | "medium" => severity.yellow().to_string(),
        "info" | "low" => severity.blue().to_string(),
        _ => severity.to_string(),
    }
}

/// Color a pod or execution status
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "running" | "completed" | "ready" | "healthy" => status.green().to_string(),
        "pending" | "degraded" | "firing" => status.yellow().to_string(),
        "crashloopbackoff" | "failed" | "unhealthy" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Format a latency value for display
pub fn format_latency(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{ms:.0}ms")
    }
}

/// Format a percentage for display
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Format an RFC3339-ish timestamp for display
pub fn format_timestamp(ts: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(250.0), "250ms");
        assert_eq!(format_latency(1500.0), "1.50s");
    }

    #[test]
    fn test_format_timestamp_falls_back_on_garbage() {
        assert_eq!(format_timestamp("not-a-time"), "not-a-time");
    }
}
