//! # Domain Layer for the Spectrum Channel
//!
//! - **spectrum**: band layouts (`SpectrumModel`) and PSDs over them (`SpectrumValue`)
//! - **converter**: sparse band-overlap matrices between two layouts
//! - **registry**: Tx/Rx model bookkeeping and the converter cache
//! - **signal**: the transient signal description carried by each delivery
//! - **pipeline**: per-link antenna gain, path loss, spectral loss and delay
//! - **coexistence**: technology channels and cross-technology interference power
//! - **value_objects**: configuration, link budgets, statistics and traces
//!
//! The registry and the pipeline are synchronous and free of scheduling;
//! the service wires them to the scheduler port.

mod coexistence;
mod converter;
mod pipeline;
mod registry;
mod signal;
mod spectrum;
mod value_objects;

pub use coexistence::*;
pub use converter::*;
pub use pipeline::*;
pub use registry::*;
pub use signal::*;
pub use spectrum::*;
pub use value_objects::*;
