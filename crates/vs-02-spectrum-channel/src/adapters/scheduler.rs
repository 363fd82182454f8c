//! Scheduler port adapters.

use parking_lot::Mutex;
use shared_types::{NodeId, PhyId, SimTime};
use std::sync::Arc;
use tracing::trace;
use vs_01_event_scheduler::Simulator;

use crate::ports::outbound::{RxDelivery, Scheduler};

/// Bridges deliveries into the discrete-event [`Simulator`].
#[derive(Clone)]
pub struct SimulatorScheduler {
    simulator: Arc<Simulator>,
}

impl SimulatorScheduler {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn simulator(&self) -> &Arc<Simulator> {
        &self.simulator
    }
}

impl Scheduler for SimulatorScheduler {
    fn now(&self) -> SimTime {
        self.simulator.now()
    }

    fn schedule(&self, delay: SimTime, delivery: RxDelivery) {
        let id = self.simulator.schedule(delay, move || delivery.deliver());
        trace!(%id, %delay, "rx delivery scheduled");
    }

    fn schedule_with_context(&self, context: NodeId, delay: SimTime, delivery: RxDelivery) {
        let id = self
            .simulator
            .schedule_with_context(context, delay, move || delivery.deliver());
        trace!(%id, %delay, %context, "rx delivery scheduled");
    }
}

/// A delivery captured by [`RecordingScheduler`].
#[derive(Debug)]
pub struct RecordedDelivery {
    /// Absolute delivery time.
    pub at: SimTime,
    pub context: Option<NodeId>,
    pub delivery: RxDelivery,
}

impl RecordedDelivery {
    pub fn receiver(&self) -> PhyId {
        self.delivery.receiver.id()
    }
}

/// Deterministic fake that records deliveries instead of running them.
#[derive(Default)]
pub struct RecordingScheduler {
    now: Mutex<SimTime>,
    recorded: Mutex<Vec<RecordedDelivery>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_now(&self, now: SimTime) {
        *self.now.lock() = now;
    }

    pub fn len(&self) -> usize {
        self.recorded.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.lock().is_empty()
    }

    /// Remove and return everything recorded so far, in scheduling order.
    pub fn take(&self) -> Vec<RecordedDelivery> {
        std::mem::take(&mut *self.recorded.lock())
    }

    /// Run every recorded delivery in `(time, scheduling order)` order.
    ///
    /// Returns the number delivered.
    pub fn deliver_all(&self) -> usize {
        let mut pending = self.take();
        // Stable sort keeps scheduling order among equal times.
        pending.sort_by_key(|d| d.at);
        let count = pending.len();
        for d in pending {
            self.set_now(d.at);
            d.delivery.deliver();
        }
        count
    }

    fn record(&self, context: Option<NodeId>, delay: SimTime, delivery: RxDelivery) {
        let at = *self.now.lock() + delay;
        self.recorded.lock().push(RecordedDelivery {
            at,
            context,
            delivery,
        });
    }
}

impl Scheduler for RecordingScheduler {
    fn now(&self) -> SimTime {
        *self.now.lock()
    }

    fn schedule(&self, delay: SimTime, delivery: RxDelivery) {
        self.record(None, delay, delivery);
    }

    fn schedule_with_context(&self, context: NodeId, delay: SimTime, delivery: RxDelivery) {
        self.record(Some(context), delay, delivery);
    }
}
