//! Configuration, per-link results, per-transmission statistics and traces.

use serde::{Deserialize, Serialize};
use shared_types::{PhyId, SimTime};

use super::spectrum::{SpectrumModelId, SpectrumValue};

/// Channel configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Links with a path loss strictly above this are dropped.
    pub max_loss_db: f64,
    /// Fail a transmission that reaches a receiver whose spectrum model
    /// changed since it was registered, instead of logging and delivering.
    /// Nothing is scheduled for a rejected transmission.
    pub strict_rx_model: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_loss_db: 1e9,
            strict_rx_model: false,
        }
    }
}

impl ChannelConfig {
    pub fn with_max_loss_db(max_loss_db: f64) -> Self {
        Self {
            max_loss_db,
            ..Self::default()
        }
    }
}

/// Gains of one tx/rx link, all in dB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkBudget {
    pub tx_antenna_gain_db: f64,
    pub rx_antenna_gain_db: f64,
    pub propagation_gain_db: f64,
    /// `-(tx_antenna_gain_db + rx_antenna_gain_db + propagation_gain_db)`
    pub path_loss_db: f64,
}

impl LinkBudget {
    pub fn new(tx_antenna_gain_db: f64, rx_antenna_gain_db: f64, propagation_gain_db: f64) -> Self {
        Self {
            tx_antenna_gain_db,
            rx_antenna_gain_db,
            propagation_gain_db,
            path_loss_db: -(tx_antenna_gain_db + rx_antenna_gain_db + propagation_gain_db),
        }
    }

    /// Linear factor applied to the PSD.
    pub fn linear_gain(&self) -> f64 {
        shared_types::units::db_to_linear(-self.path_loss_db)
    }
}

/// Result of running the propagation pipeline on one link.
#[derive(Clone, Debug)]
pub enum PropagationOutcome {
    /// Schedule a reception. `budget` is `None` when either end lacks a
    /// mobility model, in which case the PSD is passed through unchanged.
    Deliver {
        psd: SpectrumValue,
        delay: SimTime,
        budget: Option<LinkBudget>,
    },
    /// Path loss exceeded the configured maximum.
    OutOfRange(LinkBudget),
}

/// What one `start_tx` did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionStats {
    pub tx_phy: Option<PhyId>,
    pub scheduled: usize,
    pub dropped_out_of_range: usize,
    pub skipped_orthogonal_groups: usize,
    pub skipped_self_or_same_node: usize,
}

impl TransmissionStats {
    pub fn for_phy(tx_phy: PhyId) -> Self {
        Self {
            tx_phy: Some(tx_phy),
            ..Default::default()
        }
    }
}

/// Reported once per `start_tx`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxSignalTrace {
    pub at: SimTime,
    pub tx_phy: PhyId,
    pub model: SpectrumModelId,
    pub duration: SimTime,
    /// Integral of the transmitted PSD, W.
    pub total_power_w: f64,
}

/// Reported for every evaluated link, including dropped ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GainTrace {
    pub tx_phy: PhyId,
    pub rx_phy: PhyId,
    pub budget: LinkBudget,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathLossTrace {
    pub tx_phy: PhyId,
    pub rx_phy: PhyId,
    pub path_loss_db: f64,
}
