//! Ports for the event scheduler.

pub mod inbound;
