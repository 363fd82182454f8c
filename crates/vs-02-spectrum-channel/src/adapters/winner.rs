//! WINNER II B1 (urban micro-cell) outdoor loss for sidelink links.
//!
//! Loss in dB is the larger of the free-space term and the B1 LOS/NLOS
//! term, never negative:
//!
//! ```text
//! fs    = 20 log10(d) + 46.6 + 20 log10(fc / 5)
//! P_LOS = min(18 / d, 1) (1 - e^(-d/36)) + e^(-d/36)
//! LOS   d <= d1 : 22.7 log10(d) + 27 + 20 log10(fc)
//!       d >  d1 : 40 log10(d) + 7.56 - 17.3 log10(h'bs) - 17.3 log10(h'ms) + 2.7 log10(fc)
//! NLOS          : (44.9 - 6.55 log10(hbs)) log10(d) + 5.83 log10(hbs) + A + B log10(fc) - 5
//! ```
//!
//! with `fc` in GHz, `d1 = 4 h'bs h'ms f / c`, `h'bs = hbs - 1`,
//! `h'ms = hms - 0.7`. The NLOS constants `(A, B)` are `(16.33, 26.16)` for
//! 0.758–0.798 GHz and `(14.78, 34.97)` for 1.92–2.17 GHz; outside those
//! bands NLOS links fall back to free space. The B1 term only applies from
//! 3 m on.
//!
//! Whether a link is LOS is drawn once per pair of mobility models and kept
//! for the pair in either order.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use crate::ports::outbound::{MobilityId, MobilityModel, PropagationLossModel};

const C: f64 = 3e8;
const LOS_OFFSET_DB: f64 = 0.0;
const NLOS_OFFSET_DB: f64 = -5.0;
const MIN_B1_DISTANCE: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinnerB1Config {
    pub frequency_hz: f64,
    /// Seed of the LOS/NLOS draws.
    pub seed: u64,
}

impl Default for WinnerB1Config {
    fn default() -> Self {
        Self {
            frequency_hz: 763e6,
            seed: 1,
        }
    }
}

/// Line-of-sight state of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCondition {
    Los,
    Nlos,
}

pub struct WinnerB1OutdoorLoss {
    frequency_hz: f64,
    rng: Mutex<StdRng>,
    draws: Mutex<HashMap<(MobilityId, MobilityId), f64>>,
}

impl Default for WinnerB1OutdoorLoss {
    fn default() -> Self {
        Self::new(&WinnerB1Config::default())
    }
}

impl WinnerB1OutdoorLoss {
    pub fn new(config: &WinnerB1Config) -> Self {
        Self {
            frequency_hz: config.frequency_hz,
            rng: Mutex::new(StdRng::seed_from_u64(config.seed)),
            draws: Mutex::new(HashMap::new()),
        }
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn los_probability(distance: f64) -> f64 {
        let decay = (-distance / 36.0).exp();
        (18.0 / distance).min(1.0) * (1.0 - decay) + decay
    }

    /// Uniform draw in [0, 1) for the pair, stable across calls and order.
    fn pair_draw(&self, a: MobilityId, b: MobilityId) -> f64 {
        let mut draws = self.draws.lock();
        if let Some(r) = draws.get(&(a, b)).or_else(|| draws.get(&(b, a))) {
            return *r;
        }
        let r = self.rng.lock().gen::<f64>();
        draws.insert((b, a), r);
        r
    }

    pub fn link_condition(&self, a: &dyn MobilityModel, b: &dyn MobilityModel) -> LinkCondition {
        let r = self.pair_draw(a.id(), b.id());
        if r <= Self::los_probability(a.distance_from(b)) {
            LinkCondition::Los
        } else {
            LinkCondition::Nlos
        }
    }

    /// Loss in dB from `a` (mobile) to `b` (base/peer).
    pub fn loss_db(&self, a: &dyn MobilityModel, b: &dyn MobilityModel) -> f64 {
        let fc = self.frequency_hz / 1e9;
        let dist = a.distance_from(b);
        let free_space = 20.0 * dist.log10() + 46.6 + 20.0 * (fc / 5.0).log10();

        let condition = self.link_condition(a, b);
        let hms = a.position().z;
        let hbs = b.position().z;
        let hbs1 = hbs - 1.0;
        let hms1 = hms - 0.7;
        let d1 = 4.0 * hbs1 * hms1 * self.frequency_hz / C;

        let mut pl_b1 = 0.0;
        if dist >= MIN_B1_DISTANCE {
            pl_b1 = match condition {
                LinkCondition::Los if dist <= d1 => {
                    22.7 * dist.log10() + 27.0 + 20.0 * fc.log10() + LOS_OFFSET_DB
                }
                LinkCondition::Los => {
                    40.0 * dist.log10() + 7.56 - 17.3 * hbs1.log10() - 17.3 * hms1.log10()
                        + 2.7 * fc.log10()
                        + LOS_OFFSET_DB
                }
                LinkCondition::Nlos => nlos_loss(dist, hbs, fc).unwrap_or(0.0),
            };
        }

        let loss = free_space.max(pl_b1).max(0.0);
        trace!(dist, ?condition, free_space, pl_b1, loss, "winner b1 loss");
        loss
    }
}

fn nlos_loss(dist: f64, hbs: f64, fc: f64) -> Option<f64> {
    let (a, b) = if (0.758..=0.798).contains(&fc) {
        (16.33, 26.16)
    } else if (1.92..=2.17).contains(&fc) {
        (14.78, 34.97)
    } else {
        return None;
    };
    Some(
        (44.9 - 6.55 * hbs.log10()) * dist.log10()
            + 5.83 * hbs.log10()
            + a
            + b * fc.log10()
            + NLOS_OFFSET_DB,
    )
}

impl PropagationLossModel for WinnerB1OutdoorLoss {
    fn calc_rx_power(&self, tx_power_dbm: f64, a: &dyn MobilityModel, b: &dyn MobilityModel) -> f64 {
        tx_power_dbm - self.loss_db(a, b)
    }
}
