//! Platform Sentinel - simulated platform observability stack
//!
//! A long-lived server hosting the alert store and metrics history,
//! serving health/metrics/tool endpoints, refreshing the Prometheus
//! exporter, and polling alerts through the incident pipeline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sentinel_lib::{
    actions::{RunbookExecutor, SimulatedRunbookExecutor},
    alerts::AlertStore,
    automation::{AutomationConfig, AutomationLoop},
    health::{components, HealthRegistry},
    history::MetricsHistory,
    incident::{BackendEngine, DiagnosisEngine, IncidentPipeline, RuleBasedEngine},
    observability::{ExporterLoop, PlatformMetrics, StructuredLogger},
    telemetry::TelemetryGenerator,
    tools::ToolRegistry,
};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SENTINEL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs with env-filter, default info
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting platform-sentinel");

    let config = config::AgentConfig::load()?;
    info!(instance = %config.instance_name, api_port = config.api_port, "Sentinel configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::TELEMETRY).await;
    health_registry.register(components::ALERT_STORE).await;
    health_registry.register(components::PIPELINE).await;
    health_registry.register(components::EXECUTOR).await;

    let metrics = PlatformMetrics::new();
    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SENTINEL_VERSION);

    // Core components: one shared alert store fed by the generator
    let alerts = Arc::new(AlertStore::new());
    let telemetry = Arc::new(TelemetryGenerator::new(Arc::clone(&alerts)));
    let history = Arc::new(MetricsHistory::new());

    let backend = config.backend();
    logger.log_diagnosis_mode(backend.is_some());
    let engine: Arc<dyn DiagnosisEngine> = match backend {
        Some(backend_config) => Arc::new(BackendEngine::new(backend_config)?),
        None => Arc::new(RuleBasedEngine),
    };

    let pipeline = Arc::new(IncidentPipeline::new(Arc::clone(&telemetry), engine));
    let executor: Arc<dyn RunbookExecutor> = Arc::new(SimulatedRunbookExecutor);

    let tools = Arc::new(ToolRegistry::new(
        Arc::clone(&telemetry),
        Arc::clone(&alerts),
        Arc::clone(&pipeline),
        Arc::clone(&executor),
        Arc::clone(&history),
    ));

    let (shutdown_tx, _) = broadcast::channel(1);

    // Exporter: re-derive gauges from fresh snapshots on an interval
    let exporter = ExporterLoop::new(
        Arc::clone(&telemetry),
        Arc::clone(&alerts),
        metrics.clone(),
        Duration::from_secs(config.exporter_refresh_secs),
    );
    tokio::spawn(exporter.run(shutdown_tx.subscribe()));

    // Automation: poll alerts and run the pipeline on unseen ones
    let automation = AutomationLoop::new(
        Arc::clone(&alerts),
        Arc::clone(&pipeline),
        executor,
        metrics.clone(),
        AutomationConfig {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            auto_runbook: config.auto_runbook,
        },
    );
    tokio::spawn(automation.run(shutdown_tx.subscribe()));

    let app_state = Arc::new(api::AppState::new(health_registry.clone(), tools));
    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    let _ = shutdown_tx.send(());
    api_handle.abort();
    info!("Shutting down");

    Ok(())
}
