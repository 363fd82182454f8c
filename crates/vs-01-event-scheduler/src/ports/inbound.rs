//! Inbound port (API) of the event scheduler.

use shared_types::{NodeId, SimTime};

use crate::domain::{EventId, RunSummary};
use crate::errors::SchedulerError;

/// Primary scheduling API.
///
/// Delays are relative to `now()`. Tasks never run inline; a zero delay
/// runs after the currently executing task returns.
pub trait EventSchedulerApi: Send + Sync {
    /// Current simulated time.
    fn now(&self) -> SimTime;

    /// Context of the executing task, if it has one.
    fn current_context(&self) -> Option<NodeId>;

    /// Schedule a context-free task.
    fn schedule<F>(&self, delay: SimTime, task: F) -> EventId
    where
        F: FnOnce() + Send + 'static;

    /// Schedule a task executed under `context`.
    fn schedule_with_context<F>(&self, context: NodeId, delay: SimTime, task: F) -> EventId
    where
        F: FnOnce() + Send + 'static;

    /// Remove a pending task.
    fn cancel(&self, id: EventId) -> Result<(), SchedulerError>;

    /// Execute until the queue drains, `stop()` is called, or a limit is hit.
    fn run(&self) -> Result<RunSummary, SchedulerError>;
}
