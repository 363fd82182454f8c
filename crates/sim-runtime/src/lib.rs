//! # Simulation Runtime Library
//!
//! Scenario loading and wiring for the `sim-runtime` binary, exposed as a
//! library so integration tests can drive full runs.
//!
//! - `config/` - scenario description (JSON, serde defaults)
//! - `wiring/` - scenario sections to channel models and antennas
//! - `radio/` - the vehicle radio endpoint
//! - `runtime/` - simulator + channel assembly, traffic, run loop
//! - `report/` - end-of-run summary

pub mod config;
pub mod errors;
pub mod radio;
pub mod report;
pub mod runtime;
pub mod wiring;

pub use config::ScenarioConfig;
pub use errors::ScenarioError;
pub use radio::{ReceptionStats, VehicleRadio};
pub use report::{RadioReport, SimulationReport};
pub use runtime::{SimRuntime, V2xChannel};
