//! Prometheus metrics for the simulator.
//!
//! All metrics follow the naming convention: `vs_<component>_<metric>_<unit>`
//!
//! - **Counter**: transmissions, deliveries, drops, converters, coexistence interference
//! - **Gauge**: devices currently registered on channels
//! - **Histogram**: path loss distribution in dB

use lazy_static::lazy_static;
use prometheus::{
    linear_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CHANNEL METRICS
    // =========================================================================

    /// Transmissions handed to a channel
    pub static ref TX_STARTED: Counter = Counter::new(
        "vs_channel_transmissions_started_total",
        "Total number of transmissions started on spectrum channels"
    ).expect("metric creation failed");

    /// Deliveries scheduled on receivers
    pub static ref RX_SCHEDULED: Counter = Counter::new(
        "vs_channel_deliveries_scheduled_total",
        "Total number of receptions scheduled after propagation"
    ).expect("metric creation failed");

    /// Links whose path loss exceeded the channel maximum
    pub static ref RX_DROPPED_OUT_OF_RANGE: Counter = Counter::new(
        "vs_channel_deliveries_dropped_out_of_range_total",
        "Receptions dropped because path loss exceeded the configured maximum"
    ).expect("metric creation failed");

    /// Receiver groups skipped because the spectrum models do not overlap
    pub static ref ORTHOGONAL_GROUPS_SKIPPED: Counter = Counter::new(
        "vs_channel_orthogonal_groups_skipped_total",
        "Receiver groups skipped because their spectrum model is orthogonal to the transmitter's"
    ).expect("metric creation failed");

    /// Receivers skipped as the transmitter itself or a co-located device
    pub static ref SELF_OR_SAME_NODE_SKIPPED: Counter = Counter::new(
        "vs_channel_self_or_same_node_skipped_total",
        "Receivers skipped because they are the transmitter or on the transmitting node"
    ).expect("metric creation failed");

    /// Spectrum converters built
    pub static ref CONVERTERS_CREATED: Counter = Counter::new(
        "vs_channel_converters_created_total",
        "Total number of spectrum converters built"
    ).expect("metric creation failed");

    /// Devices registered as receivers
    pub static ref DEVICES_REGISTERED: Gauge = Gauge::new(
        "vs_channel_devices_registered",
        "Number of receivers currently registered"
    ).expect("metric creation failed");

    /// Path loss per evaluated link
    pub static ref PATH_LOSS_DB: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "vs_channel_path_loss_db",
            "Path loss of evaluated links in dB"
        ).buckets(linear_buckets(0.0, 10.0, 20).expect("static bucket layout"))
    ).expect("metric creation failed");

    /// Cross-technology interference events, by victim technology
    pub static ref COEXISTENCE_INTERFERENCE: CounterVec = CounterVec::new(
        Opts::new(
            "vs_channel_coexistence_interference_total",
            "Links on which one technology interfered with an overlapping one"
        ),
        &["victim"]
    ).expect("metric creation failed");

    // =========================================================================
    // RUNTIME METRICS
    // =========================================================================

    /// Events executed by the simulator
    pub static ref EVENTS_EXECUTED: Counter = Counter::new(
        "vs_scheduler_events_executed_total",
        "Total number of simulator events executed"
    ).expect("metric creation failed");

    /// Receptions completed by radios
    pub static ref RECEPTIONS: CounterVec = CounterVec::new(
        Opts::new("vs_runtime_receptions_total", "Receptions by technology"),
        &["technology"]
    ).expect("metric creation failed");
}

/// Handle to the registry the metrics were registered with
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless; already registered collectors
/// are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Channel
        Box::new(TX_STARTED.clone()),
        Box::new(RX_SCHEDULED.clone()),
        Box::new(RX_DROPPED_OUT_OF_RANGE.clone()),
        Box::new(ORTHOGONAL_GROUPS_SKIPPED.clone()),
        Box::new(SELF_OR_SAME_NODE_SKIPPED.clone()),
        Box::new(CONVERTERS_CREATED.clone()),
        Box::new(DEVICES_REGISTERED.clone()),
        Box::new(PATH_LOSS_DB.clone()),
        Box::new(COEXISTENCE_INTERFERENCE.clone()),
        // Runtime
        Box::new(EVENTS_EXECUTED.clone()),
        Box::new(RECEPTIONS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
