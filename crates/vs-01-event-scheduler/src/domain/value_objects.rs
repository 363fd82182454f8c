//! Scheduler configuration and run results.

use serde::{Deserialize, Serialize};
use shared_types::SimTime;

/// Scheduler configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Events later than this are left in the queue. `None` runs until empty.
    pub stop_time: Option<SimTime>,
    /// Upper bound on executed events per run, guarding against runaway
    /// self-rescheduling tasks.
    pub max_events: Option<u64>,
}

/// Why a run returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The queue drained.
    QueueEmpty,
    /// `stop()` was called, either directly or by a `stop_at` event.
    Stopped,
    /// The next event lies beyond the configured or requested horizon.
    HorizonReached,
}

/// Outcome of `run` / `run_until`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Events executed during this call.
    pub executed: u64,
    /// Events still pending afterwards.
    pub pending: usize,
    pub final_time: SimTime,
    pub reason: StopReason,
}
