//! # Simulator
//!
//! The discrete-event executor. Shareable across tasks via `Arc`; the queue
//! lives behind a `parking_lot::Mutex` that is released while a task runs,
//! so tasks can schedule further tasks.

use parking_lot::Mutex;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

use shared_types::{NodeId, SimTime};

use crate::domain::{EventId, RunSummary, ScheduledEvent, SchedulerConfig, StopReason, Task};
use crate::errors::SchedulerError;
use crate::ports::inbound::EventSchedulerApi;

struct SchedulerState {
    now: SimTime,
    queue: BinaryHeap<ScheduledEvent>,
    /// Ids still in `queue` that will execute.
    live: HashSet<EventId>,
    /// Ids still in `queue` that were cancelled; skipped when popped.
    cancelled: HashSet<EventId>,
    current_context: Option<NodeId>,
    next_id: u64,
    executed_total: u64,
}

impl SchedulerState {
    fn new() -> Self {
        Self {
            now: SimTime::ZERO,
            queue: BinaryHeap::new(),
            live: HashSet::new(),
            cancelled: HashSet::new(),
            current_context: None,
            next_id: 1,
            executed_total: 0,
        }
    }

    fn push(&mut self, context: Option<NodeId>, delay: SimTime, task: Task) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        let time = self.now + delay;
        self.live.insert(id);
        self.queue.push(ScheduledEvent {
            id,
            time,
            context,
            task,
        });
        id
    }

    /// Next event that was not cancelled.
    fn pop_live(&mut self) -> Option<ScheduledEvent> {
        while let Some(event) = self.queue.pop() {
            if self.cancelled.remove(&event.id) {
                continue;
            }
            return Some(event);
        }
        None
    }
}

/// Discrete-event simulator.
pub struct Simulator {
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
    stop_requested: Arc<AtomicBool>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Simulator {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SchedulerState::new()),
            stop_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn now(&self) -> SimTime {
        self.state.lock().now
    }

    pub fn current_context(&self) -> Option<NodeId> {
        self.state.lock().current_context
    }

    /// Schedule a context-free task `delay` after now.
    pub fn schedule<F>(&self, delay: SimTime, task: F) -> EventId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.state.lock().push(None, delay, Box::new(task));
        trace!(%id, %delay, "scheduled");
        id
    }

    /// Schedule a task that executes with `context` as the current context.
    pub fn schedule_with_context<F>(&self, context: NodeId, delay: SimTime, task: F) -> EventId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.state.lock().push(Some(context), delay, Box::new(task));
        trace!(%id, %delay, %context, "scheduled with context");
        id
    }

    /// Run `task` once the current task has returned.
    pub fn schedule_now<F>(&self, task: F) -> EventId
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule(SimTime::ZERO, task)
    }

    pub fn cancel(&self, id: EventId) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        if !state.live.remove(&id) {
            return Err(SchedulerError::UnknownEvent(id));
        }
        state.cancelled.insert(id);
        debug!(%id, "event cancelled");
        Ok(())
    }

    /// Ask the running loop to return after the current task.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Stop the run once simulated time reaches `now + delay`.
    pub fn stop_at(&self, delay: SimTime) -> EventId {
        let flag = Arc::clone(&self.stop_requested);
        self.schedule(delay, move || flag.store(true, Ordering::SeqCst))
    }

    pub fn pending_events(&self) -> usize {
        self.state.lock().live.len()
    }

    /// Events executed since creation, across all runs.
    pub fn executed_events(&self) -> u64 {
        self.state.lock().executed_total
    }

    pub fn is_finished(&self) -> bool {
        self.pending_events() == 0
    }

    /// Execute events until the queue drains, `stop()` is called, or the
    /// configured `stop_time` / `max_events` is reached.
    pub fn run(&self) -> Result<RunSummary, SchedulerError> {
        self.run_loop(None)
    }

    /// Execute every event at or before `until`, then advance the clock to
    /// `until` (unless stopped earlier).
    pub fn run_until(&self, until: SimTime) -> Result<RunSummary, SchedulerError> {
        self.run_loop(Some(until))
    }

    fn horizon(&self, requested: Option<SimTime>) -> Option<SimTime> {
        match (self.config.stop_time, requested) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn run_loop(&self, requested: Option<SimTime>) -> Result<RunSummary, SchedulerError> {
        self.stop_requested.store(false, Ordering::SeqCst);
        let horizon = self.horizon(requested);
        let mut executed: u64 = 0;
        info!(now = %self.now(), pending = self.pending_events(), "simulation run starting");

        let reason = loop {
            if self.stop_requested.load(Ordering::SeqCst) {
                break StopReason::Stopped;
            }

            let event = {
                let mut state = self.state.lock();
                let Some(event) = state.pop_live() else {
                    break StopReason::QueueEmpty;
                };
                if horizon.is_some_and(|h| event.time > h) {
                    state.queue.push(event);
                    break StopReason::HorizonReached;
                }
                if let Some(max) = self.config.max_events {
                    if executed >= max {
                        state.queue.push(event);
                        return Err(SchedulerError::EventLimitReached { executed, max });
                    }
                }
                state.live.remove(&event.id);
                state.now = event.time;
                state.current_context = event.context;
                event
            };

            debug!(id = %event.id, time = %event.time, context = ?event.context, "executing event");
            (event.task)();

            let mut state = self.state.lock();
            state.current_context = None;
            state.executed_total += 1;
            executed += 1;
        };

        let mut state = self.state.lock();
        if requested.is_some() && reason != StopReason::Stopped {
            if let Some(h) = horizon {
                state.now = state.now.max(h);
            }
        }
        let summary = RunSummary {
            executed,
            pending: state.live.len(),
            final_time: state.now,
            reason,
        };
        drop(state);
        info!(
            executed = summary.executed,
            pending = summary.pending,
            final_time = %summary.final_time,
            reason = ?summary.reason,
            "simulation run finished"
        );
        Ok(summary)
    }
}

impl EventSchedulerApi for Simulator {
    fn now(&self) -> SimTime {
        Simulator::now(self)
    }

    fn current_context(&self) -> Option<NodeId> {
        Simulator::current_context(self)
    }

    fn schedule<F>(&self, delay: SimTime, task: F) -> EventId
    where
        F: FnOnce() + Send + 'static,
    {
        Simulator::schedule(self, delay, task)
    }

    fn schedule_with_context<F>(&self, context: NodeId, delay: SimTime, task: F) -> EventId
    where
        F: FnOnce() + Send + 'static,
    {
        Simulator::schedule_with_context(self, context, delay, task)
    }

    fn cancel(&self, id: EventId) -> Result<(), SchedulerError> {
        Simulator::cancel(self, id)
    }

    fn run(&self) -> Result<RunSummary, SchedulerError> {
        Simulator::run(self)
    }
}
