//! Ports for the spectrum channel.
//!
//! - **inbound**: the channel API offered to PHY layers
//! - **outbound**: radio endpoints, pluggable physical models, the
//!   scheduler and trace sinks

pub mod inbound;
pub mod outbound;
