//! Frequency-bin layouts and power spectral densities over them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::MulAssign;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::errors::ChannelError;

static NEXT_MODEL_ID: AtomicU32 = AtomicU32::new(1);

/// Unique id of a spectrum model. Equal ids mean identical layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpectrumModelId(pub u32);

impl SpectrumModelId {
    fn allocate() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SpectrumModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model-{}", self.0)
    }
}

/// One frequency bin, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandInfo {
    pub fl: f64,
    pub fc: f64,
    pub fh: f64,
}

impl BandInfo {
    pub fn new(fl: f64, fh: f64) -> Self {
        Self {
            fl,
            fc: (fl + fh) / 2.0,
            fh,
        }
    }

    /// Finite edges with `fl < fh`.
    pub fn is_valid(&self) -> bool {
        self.fl.is_finite() && self.fh.is_finite() && self.fl < self.fh
    }

    pub fn width(&self) -> f64 {
        self.fh - self.fl
    }

    /// Overlap width with `other`, zero when disjoint.
    pub fn overlap(&self, other: &BandInfo) -> f64 {
        (self.fh.min(other.fh) - self.fl.max(other.fl)).max(0.0)
    }

    /// Strict overlap test; bands that only touch do not overlap.
    pub fn overlaps(&self, other: &BandInfo) -> bool {
        self.fl.max(other.fl) < self.fh.min(other.fh)
    }
}

/// An immutable set of frequency bins with a unique id.
///
/// Two models built from the same bands still get distinct ids and are
/// related through a converter like any other pair.
#[derive(Debug, PartialEq)]
pub struct SpectrumModel {
    id: SpectrumModelId,
    bands: Vec<BandInfo>,
}

impl SpectrumModel {
    pub fn from_bands(bands: Vec<BandInfo>) -> Result<Self, ChannelError> {
        if bands.is_empty() {
            return Err(ChannelError::InvalidSpectrumModel("no bands".into()));
        }
        if let Some(b) = bands.iter().find(|b| !b.is_valid()) {
            return Err(ChannelError::InvalidSpectrumModel(format!(
                "band [{}, {}] Hz is empty or not finite",
                b.fl, b.fh
            )));
        }
        Ok(Self {
            id: SpectrumModelId::allocate(),
            bands,
        })
    }

    /// Bands of `width` Hz centered on each of `centers`.
    pub fn from_center_frequencies(centers: &[f64], width: f64) -> Result<Self, ChannelError> {
        let half = width / 2.0;
        Self::from_bands(
            centers
                .iter()
                .map(|&fc| BandInfo {
                    fl: fc - half,
                    fc,
                    fh: fc + half,
                })
                .collect(),
        )
    }

    /// `count` contiguous bands of `width` Hz starting at `start` Hz.
    pub fn uniform(start: f64, width: f64, count: usize) -> Result<Self, ChannelError> {
        Self::from_bands(
            (0..count)
                .map(|i| {
                    let fl = start + width * i as f64;
                    BandInfo::new(fl, fl + width)
                })
                .collect(),
        )
    }

    pub fn id(&self) -> SpectrumModelId {
        self.id
    }

    pub fn bands(&self) -> &[BandInfo] {
        &self.bands
    }

    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    /// True iff no band of `self` overlaps any band of `other`.
    pub fn is_orthogonal(&self, other: &SpectrumModel) -> bool {
        !self
            .bands
            .iter()
            .any(|a| other.bands.iter().any(|b| a.overlaps(b)))
    }
}

/// Power spectral density (W/Hz per bin) over one spectrum model.
#[derive(Debug, Clone)]
pub struct SpectrumValue {
    model: Arc<SpectrumModel>,
    values: Vec<f64>,
}

impl SpectrumValue {
    pub fn zeros(model: Arc<SpectrumModel>) -> Self {
        Self::flat(model, 0.0)
    }

    pub fn flat(model: Arc<SpectrumModel>, value: f64) -> Self {
        let values = vec![value; model.num_bands()];
        Self { model, values }
    }

    pub fn from_values(model: Arc<SpectrumModel>, values: Vec<f64>) -> Result<Self, ChannelError> {
        if values.len() != model.num_bands() {
            return Err(ChannelError::BandCountMismatch {
                expected: model.num_bands(),
                actual: values.len(),
            });
        }
        Ok(Self { model, values })
    }

    /// Flat PSD carrying `tx_power_dbm` spread evenly over the whole model.
    pub fn from_tx_power_dbm(model: Arc<SpectrumModel>, tx_power_dbm: f64) -> Self {
        let total_width: f64 = model.bands().iter().map(BandInfo::width).sum();
        let watts = shared_types::units::dbm_to_watts(tx_power_dbm);
        Self::flat(model, watts / total_width)
    }

    pub fn model(&self) -> &Arc<SpectrumModel> {
        &self.model
    }

    pub fn model_id(&self) -> SpectrumModelId {
        self.model.id()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn scale(mut self, factor: f64) -> Self {
        self *= factor;
        self
    }

    pub fn add_assign(&mut self, other: &SpectrumValue) -> Result<(), ChannelError> {
        self.check_same_model(other)?;
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a += b;
        }
        Ok(())
    }

    /// Total power in W: Σ psd · bandwidth.
    pub fn integral(&self) -> f64 {
        self.values
            .iter()
            .zip(self.model.bands())
            .map(|(v, b)| v * b.width())
            .sum()
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    fn check_same_model(&self, other: &SpectrumValue) -> Result<(), ChannelError> {
        if self.model_id() != other.model_id() {
            return Err(ChannelError::ModelMismatch {
                left: self.model_id(),
                right: other.model_id(),
            });
        }
        Ok(())
    }
}

impl MulAssign<f64> for SpectrumValue {
    fn mul_assign(&mut self, rhs: f64) {
        for v in &mut self.values {
            *v *= rhs;
        }
    }
}
