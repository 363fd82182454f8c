//! Trace sinks.

use parking_lot::Mutex;
use vs_telemetry::metrics;

use crate::domain::{GainTrace, PathLossTrace, TransmissionStats, TxSignalTrace};
use crate::ports::outbound::ChannelObserver;

/// Keeps every trace in memory, for tests and post-run reports.
#[derive(Debug, Default)]
pub struct ChannelTraceRecorder {
    tx_signals: Mutex<Vec<TxSignalTrace>>,
    gains: Mutex<Vec<GainTrace>>,
    path_losses: Mutex<Vec<PathLossTrace>>,
    completed: Mutex<Vec<TransmissionStats>>,
}

impl ChannelTraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tx_signals(&self) -> Vec<TxSignalTrace> {
        self.tx_signals.lock().clone()
    }

    pub fn gains(&self) -> Vec<GainTrace> {
        self.gains.lock().clone()
    }

    pub fn path_losses(&self) -> Vec<PathLossTrace> {
        self.path_losses.lock().clone()
    }

    pub fn transmissions(&self) -> Vec<TransmissionStats> {
        self.completed.lock().clone()
    }

    pub fn clear(&self) {
        self.tx_signals.lock().clear();
        self.gains.lock().clear();
        self.path_losses.lock().clear();
        self.completed.lock().clear();
    }
}

impl ChannelObserver for ChannelTraceRecorder {
    fn on_tx_signal(&self, trace: &TxSignalTrace) {
        self.tx_signals.lock().push(trace.clone());
    }

    fn on_gain(&self, trace: &GainTrace) {
        self.gains.lock().push(trace.clone());
    }

    fn on_path_loss(&self, trace: &PathLossTrace) {
        self.path_losses.lock().push(trace.clone());
    }

    fn on_tx_complete(&self, stats: &TransmissionStats) {
        self.completed.lock().push(stats.clone());
    }
}

/// Feeds the Prometheus channel metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl ChannelObserver for MetricsObserver {
    fn on_tx_signal(&self, _trace: &TxSignalTrace) {
        metrics::TX_STARTED.inc();
    }

    fn on_path_loss(&self, trace: &PathLossTrace) {
        if trace.path_loss_db.is_finite() {
            metrics::PATH_LOSS_DB.observe(trace.path_loss_db);
        }
    }

    fn on_tx_complete(&self, stats: &TransmissionStats) {
        metrics::RX_SCHEDULED.inc_by(stats.scheduled as f64);
        metrics::RX_DROPPED_OUT_OF_RANGE.inc_by(stats.dropped_out_of_range as f64);
        metrics::ORTHOGONAL_GROUPS_SKIPPED.inc_by(stats.skipped_orthogonal_groups as f64);
        metrics::SELF_OR_SAME_NODE_SKIPPED.inc_by(stats.skipped_self_or_same_node as f64);
    }

    fn on_converters_created(&self, count: usize) {
        metrics::CONVERTERS_CREATED.inc_by(count as f64);
    }

    fn on_device_count(&self, count: usize) {
        metrics::DEVICES_REGISTERED.set(count as f64);
    }
}
