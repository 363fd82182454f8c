//! Scheduler errors.

use thiserror::Error;

use crate::domain::EventId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// `max_events` was reached before the queue drained.
    #[error("Event limit reached: {executed} events executed (max: {max})")]
    EventLimitReached { executed: u64, max: u64 },

    /// The event already ran, was cancelled, or never existed.
    #[error("Unknown event: {0}")]
    UnknownEvent(EventId),
}
