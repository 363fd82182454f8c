//! # Domain Layer for the Event Scheduler
//!
//! - **entities**: `EventId`, `ScheduledEvent` and its queue ordering
//! - **value_objects**: `SchedulerConfig`, `RunSummary`, `StopReason`

mod entities;
mod value_objects;

pub use entities::*;
pub use value_objects::*;
