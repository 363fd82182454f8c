//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

use crate::TelemetryError;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to log records
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `vs_02_spectrum_channel=debug`
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Prometheus metrics port
    pub metrics_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "v2x-spectrum-sim".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_port: 9100,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VS_SERVICE_NAME`: Service name (default: v2x-spectrum-sim)
    /// - `VS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `VS_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `VS_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `VS_METRICS_PORT`: Prometheus metrics port (default: 9100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: env::var("VS_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: env::var("VS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: env::var("VS_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: env::var("VS_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            metrics_port: env::var("VS_METRICS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.metrics_port),
        }
    }

    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.service_name.trim().is_empty() {
            return Err(TelemetryError::Config("service_name is empty".into()));
        }
        if self.metrics_port == 0 {
            return Err(TelemetryError::Config("metrics_port must be non-zero".into()));
        }
        Ok(())
    }
}
