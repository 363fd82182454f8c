//! # Multi-Model Spectrum Channel (vs-02)
//!
//! Broadcast medium for V2X radios. Each receiver listens on its own
//! spectrum model (band layout); transmissions are converted between
//! overlapping layouts, attenuated per link and delivered after the
//! propagation delay.
//!
//! ## Architecture Role
//!
//! ```text
//! [PHY A] ──start_tx──→ [Spectrum Channel (2)] ──schedule──→ [Event Scheduler (1)]
//!                              │                                     │
//!                              │ convert + gain/loss/delay           ↓ at now + delay
//!                              ↓                              [PHY B].start_rx
//!                       [Trace observers]
//! ```
//!
//! ## Guarantees
//!
//! - A transmitter never receives its own signal, nor do other endpoints
//!   on its node.
//! - Receivers on a layout orthogonal to the transmitted one are skipped
//!   without any per-endpoint work.
//! - Every delivery goes through the scheduler, even with zero delay.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use domain::*;
pub use errors::ChannelError;
pub use ports::inbound::SpectrumChannelApi;
pub use ports::outbound::{
    AntennaHandle, AntennaModel, ChannelObserver, DeliveredLink, MobilityId, MobilityModel,
    PhasedArrayModel, PhasedArraySpectrumPropagationLossModel, PropagationDelayModel,
    PropagationLossModel, RxDelivery, Scheduler, SpectrumPhy, SpectrumPropagationLossModel,
};
pub use service::MultiModelSpectrumChannel;
