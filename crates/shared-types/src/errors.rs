//! # Error Types
//!
//! Errors raised when building shared values from untrusted input
//! (scenario files, CLI arguments).

use thiserror::Error;

/// Errors constructing a simulated time value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeError {
    /// Simulated time never runs backwards.
    #[error("Negative time: {0} s")]
    Negative(f64),

    /// NaN or infinite input.
    #[error("Time is not finite: {0}")]
    NotFinite(f64),

    /// Value does not fit the nanosecond counter.
    #[error("Time overflow: {0} s exceeds the simulated clock range")]
    Overflow(f64),
}
