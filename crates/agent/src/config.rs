//! Sentinel configuration

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use sentinel_lib::incident::BackendConfig;

/// Agent configuration, read from SENTINEL_-prefixed environment
/// variables with per-field defaults
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Instance name used in structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// API server port for health/metrics/tool endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Alert poll interval for the automation loop, in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Exporter gauge refresh interval, in seconds
    #[serde(default = "default_exporter_refresh")]
    pub exporter_refresh_secs: u64,

    /// Whether critical alerts trigger the remediation runbook
    #[serde(default = "default_auto_runbook")]
    pub auto_runbook: bool,

    /// Diagnosis backend API key; unset selects the deterministic engine
    #[serde(default)]
    pub backend_api_key: Option<String>,

    /// Diagnosis backend base URL
    #[serde(default = "default_backend_api_url")]
    pub backend_api_url: String,

    /// Diagnosis backend model
    #[serde(default = "default_backend_model")]
    pub backend_model: String,

    /// Diagnosis backend request timeout, in seconds
    #[serde(default = "default_backend_timeout")]
    pub backend_timeout_secs: u64,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "platform-sentinel".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_poll_interval() -> u64 {
    5
}

fn default_exporter_refresh() -> u64 {
    2
}

fn default_auto_runbook() -> bool {
    true
}

fn default_backend_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_backend_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_backend_timeout() -> u64 {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            poll_interval_secs: default_poll_interval(),
            exporter_refresh_secs: default_exporter_refresh(),
            auto_runbook: default_auto_runbook(),
            backend_api_key: None,
            backend_api_url: default_backend_api_url(),
            backend_model: default_backend_model(),
            backend_timeout_secs: default_backend_timeout(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SENTINEL"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Backend connection settings, present only when an API key is set
    pub fn backend(&self) -> Option<BackendConfig> {
        self.backend_api_key.as_ref().map(|key| BackendConfig {
            api_url: self.backend_api_url.clone(),
            api_key: key.clone(),
            model: self.backend_model.clone(),
            timeout: Duration::from_secs(self.backend_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.exporter_refresh_secs, 2);
        assert!(config.auto_runbook);
        assert!(config.backend().is_none());
    }

    #[test]
    fn test_backend_config_requires_key() {
        let config = AgentConfig {
            backend_api_key: Some("sk-test".to_string()),
            backend_timeout_secs: 3,
            ..AgentConfig::default()
        };

        let backend = config.backend().expect("backend config");
        assert_eq!(backend.api_key, "sk-test");
        assert_eq!(backend.model, "gpt-4o-mini");
        assert_eq!(backend.timeout, Duration::from_secs(3));
    }
}
