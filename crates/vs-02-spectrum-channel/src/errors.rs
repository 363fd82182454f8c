//! Channel errors.
//!
//! Every variant is a configuration error: the simulation is set up in a
//! way the channel cannot honor. Expected radio conditions (orthogonal
//! models, out-of-range links, self reception) are not errors.

use shared_types::PhyId;
use thiserror::Error;

use crate::domain::SpectrumModelId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    /// A receiver must expose its spectrum model before it can be added.
    #[error("{0} has no receive spectrum model")]
    MissingRxSpectrumModel(PhyId),

    #[error("Device index {index} out of range ({count} devices registered)")]
    DeviceIndexOutOfRange { index: usize, count: usize },

    /// Phased-array spectral loss needs a phased array at both ends.
    #[error("Phased-array spectral loss requires phased-array antennas on {tx} and {rx}")]
    PhasedArrayRequired { tx: PhyId, rx: PhyId },

    #[error("Band count mismatch: model has {expected} bands, got {actual} values")]
    BandCountMismatch { expected: usize, actual: usize },

    /// Arithmetic between values defined over different spectrum models.
    #[error("Spectrum model mismatch: {left} vs {right}")]
    ModelMismatch {
        left: SpectrumModelId,
        right: SpectrumModelId,
    },

    #[error("Invalid spectrum model: {0}")]
    InvalidSpectrumModel(String),

    /// Strict mode: the receiver changed its model after registration.
    #[error("{phy} was registered on {registered} but now listens on {current:?}")]
    StaleRxModel {
        phy: PhyId,
        registered: SpectrumModelId,
        current: Option<SpectrumModelId>,
    },

    #[error("Unknown technology: {0}")]
    UnknownTechnology(String),
}
