//! Queue entries.

use shared_types::{NodeId, SimTime};
use std::cmp::Ordering;
use std::fmt;

/// Handle returned for every scheduled task; used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

/// Work executed when an event fires.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A task waiting in the queue.
pub struct ScheduledEvent {
    pub id: EventId,
    pub time: SimTime,
    pub context: Option<NodeId>,
    pub task: Task,
}

impl ScheduledEvent {
    /// Insertion sequence; ids are handed out monotonically.
    pub fn sequence(&self) -> u64 {
        self.id.0
    }
}

impl fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("id", &self.id)
            .field("time", &self.time)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.id == other.id
    }
}

impl Eq for ScheduledEvent {}

impl Ord for ScheduledEvent {
    /// Reversed so that `BinaryHeap` pops the earliest `(time, sequence)`.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence().cmp(&self.sequence()))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
