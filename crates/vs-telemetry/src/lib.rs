//! # V2X Simulator Telemetry
//!
//! Structured logging and Prometheus metrics for simulation runs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vs_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//! // Logs and metrics are now being collected
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `VS_JSON_LOGS` | `false` | JSON formatted logs |
//! | `VS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `VS_SERVICE_NAME` | `v2x-spectrum-sim` | Service name in log records |
//! | `VS_METRICS_PORT` | `9100` | Port a scraper would expose metrics on |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, CONVERTERS_CREATED, DEVICES_REGISTERED,
    EVENTS_EXECUTED, ORTHOGONAL_GROUPS_SKIPPED, PATH_LOSS_DB, RECEPTIONS, RX_DROPPED_OUT_OF_RANGE,
    RX_SCHEDULED, SELF_OR_SAME_NODE_SKIPPED, TX_STARTED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that must be held for the lifetime of the run.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let logging = init_logging(config)?;

    Ok(TelemetryGuard {
        _logging: logging,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}

/// Create a span carrying the simulated time of the current event.
///
/// ```rust,ignore
/// let _span = sim_span!("start_tx", sim_time = %now, phy = %phy_id).entered();
/// ```
#[macro_export]
macro_rules! sim_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "v2x-spectrum-sim");
    }
}
