//! # Event Scheduler (vs-01)
//!
//! Single-threaded discrete-event core. Every piece of simulated behavior
//! (a transmission, a delivery, a mobility update) is a task queued at an
//! absolute simulated time and executed in time order.
//!
//! ## Ordering
//!
//! ```text
//! schedule(delay, task) ──→ [(time, seq) min-heap] ──run()──→ task()
//!                                    │
//!                        ties broken by insertion order
//! ```
//!
//! A task may carry a node context. While it executes, that context is the
//! simulator's current context; tasks sharing a context therefore run in the
//! order they were scheduled.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use shared_types::SimTime;
//! use vs_01_event_scheduler::Simulator;
//!
//! let sim = Arc::new(Simulator::default());
//! let hits = Arc::new(AtomicU32::new(0));
//! let h = hits.clone();
//! sim.schedule(SimTime::from_millis(5), move || {
//!     h.fetch_add(1, Ordering::SeqCst);
//! });
//! let summary = sim.run().unwrap();
//! assert_eq!(summary.executed, 1);
//! assert_eq!(sim.now(), SimTime::from_millis(5));
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use domain::*;
pub use errors::SchedulerError;
pub use ports::inbound::EventSchedulerApi;
pub use service::Simulator;
