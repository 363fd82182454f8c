//! Frequency-flat propagation loss models.

use serde::{Deserialize, Serialize};
use shared_types::units::SPEED_OF_LIGHT;
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::warn;

use crate::ports::outbound::{MobilityModel, PropagationLossModel};

/// Received power reported by [`RangePropagationLoss`] beyond its range.
pub const OUT_OF_RANGE_DBM: f64 = -1000.0;

/// Free-space loss: `L = (4π d / λ)² · systemLoss`, floored at `min_loss_db`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriisPropagationLoss {
    pub frequency_hz: f64,
    /// Dimensionless system loss factor (≥ 1).
    pub system_loss: f64,
    pub min_loss_db: f64,
}

impl Default for FriisPropagationLoss {
    fn default() -> Self {
        Self {
            frequency_hz: 5.15e9,
            system_loss: 1.0,
            min_loss_db: 0.0,
        }
    }
}

impl FriisPropagationLoss {
    pub fn new(frequency_hz: f64) -> Self {
        Self {
            frequency_hz,
            ..Default::default()
        }
    }

    fn wavelength(&self) -> f64 {
        SPEED_OF_LIGHT / self.frequency_hz
    }

    pub fn loss_db(&self, distance: f64) -> f64 {
        if distance <= 0.0 {
            return self.min_loss_db;
        }
        let lambda = self.wavelength();
        if distance < 3.0 * lambda {
            warn!(distance, lambda, "Friis loss used in the near field");
        }
        let numerator = lambda * lambda;
        let denominator = 16.0 * PI * PI * distance * distance * self.system_loss;
        (-10.0 * (numerator / denominator).log10()).max(self.min_loss_db)
    }
}

impl PropagationLossModel for FriisPropagationLoss {
    fn calc_rx_power(&self, tx_power_dbm: f64, a: &dyn MobilityModel, b: &dyn MobilityModel) -> f64 {
        tx_power_dbm - self.loss_db(a.distance_from(b))
    }
}

/// `L(d) = L0 + 10 n log10(d / d0)` for `d > d0`, `L0` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogDistancePropagationLoss {
    pub exponent: f64,
    pub reference_distance: f64,
    pub reference_loss_db: f64,
}

impl Default for LogDistancePropagationLoss {
    fn default() -> Self {
        Self {
            exponent: 3.0,
            reference_distance: 1.0,
            reference_loss_db: 46.6777,
        }
    }
}

impl LogDistancePropagationLoss {
    pub fn loss_db(&self, distance: f64) -> f64 {
        if distance <= self.reference_distance {
            return self.reference_loss_db;
        }
        self.reference_loss_db + 10.0 * self.exponent * (distance / self.reference_distance).log10()
    }
}

impl PropagationLossModel for LogDistancePropagationLoss {
    fn calc_rx_power(&self, tx_power_dbm: f64, a: &dyn MobilityModel, b: &dyn MobilityModel) -> f64 {
        tx_power_dbm - self.loss_db(a.distance_from(b))
    }
}

/// Lossless up to `max_range` meters, [`OUT_OF_RANGE_DBM`] beyond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangePropagationLoss {
    pub max_range: f64,
}

impl Default for RangePropagationLoss {
    fn default() -> Self {
        Self { max_range: 250.0 }
    }
}

impl PropagationLossModel for RangePropagationLoss {
    fn calc_rx_power(&self, tx_power_dbm: f64, a: &dyn MobilityModel, b: &dyn MobilityModel) -> f64 {
        if a.distance_from(b) <= self.max_range {
            tx_power_dbm
        } else {
            OUT_OF_RANGE_DBM
        }
    }
}

/// Every link receives `rss_dbm`, whatever was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedRssLoss {
    pub rss_dbm: f64,
}

impl Default for FixedRssLoss {
    fn default() -> Self {
        Self { rss_dbm: -150.0 }
    }
}

impl PropagationLossModel for FixedRssLoss {
    fn calc_rx_power(&self, _tx: f64, _a: &dyn MobilityModel, _b: &dyn MobilityModel) -> f64 {
        self.rss_dbm
    }
}

/// Applies each model to the output of the previous one.
#[derive(Default, Clone)]
pub struct ChainedPropagationLoss {
    models: Vec<Arc<dyn PropagationLossModel>>,
}

impl ChainedPropagationLoss {
    pub fn new(models: Vec<Arc<dyn PropagationLossModel>>) -> Self {
        Self { models }
    }

    pub fn then(mut self, model: Arc<dyn PropagationLossModel>) -> Self {
        self.models.push(model);
        self
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl PropagationLossModel for ChainedPropagationLoss {
    fn calc_rx_power(&self, tx_power_dbm: f64, a: &dyn MobilityModel, b: &dyn MobilityModel) -> f64 {
        self.models
            .iter()
            .fold(tx_power_dbm, |power, m| m.calc_rx_power(power, a, b))
    }
}
