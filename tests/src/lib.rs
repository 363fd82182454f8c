//! # V2X Spectrum Simulation Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Simulator-backed channel harness, timed endpoints
//! └── integration/
//!     ├── channel_properties.rs  # Converter, skip, device count and range properties
//!     ├── scenarios.rs           # End-to-end deliveries through the simulator
//!     └── runtime.rs             # Full scenario runs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vs-tests
//! cargo test -p vs-tests integration::scenarios
//!
//! # Benchmarks
//! cargo bench -p vs-tests
//! ```

pub mod fixtures;
pub mod integration;
