//! Cross-technology coexistence: which part of a transmission lands inside
//! another technology's channel.

use serde::{Deserialize, Serialize};
use shared_types::units::watts_to_dbm;
use shared_types::SimTime;

use super::spectrum::{SpectrumModel, SpectrumValue};

/// The channel a radio technology occupies, in Hz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyBand {
    pub name: String,
    pub center_hz: f64,
    pub bandwidth_hz: f64,
}

impl TechnologyBand {
    pub fn new(name: impl Into<String>, center_hz: f64, bandwidth_hz: f64) -> Self {
        Self {
            name: name.into(),
            center_hz,
            bandwidth_hz,
        }
    }

    /// The span from the lowest to the highest band edge of `model`.
    pub fn from_model(name: impl Into<String>, model: &SpectrumModel) -> Self {
        let (lo, hi) = model
            .bands()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
                (lo.min(b.fl), hi.max(b.fh))
            });
        Self::new(name, (lo + hi) / 2.0, hi - lo)
    }

    pub fn start_hz(&self) -> f64 {
        self.center_hz - self.bandwidth_hz / 2.0
    }

    pub fn end_hz(&self) -> f64 {
        self.center_hz + self.bandwidth_hz / 2.0
    }

    /// Closed-interval test: channels that share an edge count as overlapping.
    pub fn overlaps(&self, other: &TechnologyBand) -> bool {
        self.start_hz() <= other.end_hz() && self.end_hz() >= other.start_hz()
    }

    pub fn contains(&self, frequency_hz: f64) -> bool {
        (self.start_hz()..=self.end_hz()).contains(&frequency_hz)
    }

    /// Power in W carried by the bins of `psd` centered inside this channel.
    pub fn in_band_power_w(&self, psd: &SpectrumValue) -> f64 {
        psd.model()
            .bands()
            .iter()
            .zip(psd.values())
            .filter(|(band, v)| **v > 0.0 && self.contains(band.fc))
            .map(|(band, v)| v * band.width())
            .sum()
    }
}

/// Interference accumulated by one victim radio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InterferenceStats {
    pub events: u64,
    pub total_power_w: f64,
    pub peak_power_w: f64,
    /// Power times signal duration, J.
    pub energy_j: f64,
}

impl InterferenceStats {
    pub fn record(&mut self, power_w: f64, duration: SimTime) {
        self.events += 1;
        self.total_power_w += power_w;
        self.peak_power_w = self.peak_power_w.max(power_w);
        self.energy_j += power_w * duration.as_secs_f64();
    }

    pub fn mean_power_dbm(&self) -> Option<f64> {
        (self.events > 0 && self.total_power_w > 0.0)
            .then(|| watts_to_dbm(self.total_power_w / self.events as f64))
    }

    pub fn peak_power_dbm(&self) -> Option<f64> {
        (self.peak_power_w > 0.0).then(|| watts_to_dbm(self.peak_power_w))
    }
}
