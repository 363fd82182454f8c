//! # Shared Types Crate
//!
//! Value types used across the simulation workspace.
//!
//! ## Contents
//!
//! - **time**: `SimTime`, the simulated clock unit (nanoseconds)
//! - **entities**: `NodeId`, `PhyId`, `DeviceInfo`
//! - **geometry**: `Vector3` positions and `Angles` between two points
//! - **units**: dB / linear / dBm conversions and physical constants
//!
//! ## Design Principles
//!
//! - **Plain values**: everything here is `Copy` or cheaply cloneable
//! - **No simulation state**: no clocks, registries or I/O live in this crate

pub mod entities;
pub mod errors;
pub mod geometry;
pub mod time;
pub mod units;

pub use entities::*;
pub use errors::*;
pub use geometry::*;
pub use time::SimTime;
pub use units::*;
