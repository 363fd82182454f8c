//! Cross-crate integration tests.

pub mod channel_properties;
pub mod runtime;
pub mod scenarios;
