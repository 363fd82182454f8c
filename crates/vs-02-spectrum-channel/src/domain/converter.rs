//! Spectrum conversion between two band layouts.
//!
//! Destination bin `i` receives `Σ_j psd[j] · c(j, i)` where `c` is the share
//! of destination bin `i` covered by source bin `j`:
//!
//! ```text
//! c(from, to) = min(1, max(0, min(fh) - max(fl)) / (to.fh - to.fl))
//! ```
//!
//! Most pairs of bins do not overlap, so the matrix is stored in CSR form
//! with one row per destination bin.

use std::sync::Arc;

use super::spectrum::{BandInfo, SpectrumModel, SpectrumModelId, SpectrumValue};
use crate::errors::ChannelError;

#[derive(Debug)]
pub struct SpectrumConverter {
    from: Arc<SpectrumModel>,
    to: Arc<SpectrumModel>,
    /// Non-zero coefficients, row by row.
    values: Vec<f64>,
    /// Source bin index of each coefficient.
    col_index: Vec<usize>,
    /// `row_ptr[i]..row_ptr[i + 1]` spans row `i`; length `to.num_bands() + 1`.
    row_ptr: Vec<usize>,
}

fn coefficient(from: &BandInfo, to: &BandInfo) -> f64 {
    (from.overlap(to) / to.width()).min(1.0)
}

impl SpectrumConverter {
    pub fn new(from: Arc<SpectrumModel>, to: Arc<SpectrumModel>) -> Self {
        let mut values = Vec::new();
        let mut col_index = Vec::new();
        let mut row_ptr = Vec::with_capacity(to.num_bands() + 1);
        row_ptr.push(0);

        for to_band in to.bands() {
            for (j, from_band) in from.bands().iter().enumerate() {
                let c = coefficient(from_band, to_band);
                if c > 0.0 {
                    values.push(c);
                    col_index.push(j);
                }
            }
            row_ptr.push(values.len());
        }

        Self {
            from,
            to,
            values,
            col_index,
            row_ptr,
        }
    }

    pub fn from_id(&self) -> SpectrumModelId {
        self.from.id()
    }

    pub fn to_id(&self) -> SpectrumModelId {
        self.to.id()
    }

    pub fn to_model(&self) -> &Arc<SpectrumModel> {
        &self.to
    }

    pub fn nonzero_count(&self) -> usize {
        self.values.len()
    }

    /// Coefficient mapping source bin `from_bin` into destination bin `to_bin`.
    pub fn coefficient(&self, from_bin: usize, to_bin: usize) -> f64 {
        let Some(range) = self.row_range(to_bin) else {
            return 0.0;
        };
        self.col_index[range.clone()]
            .iter()
            .position(|&c| c == from_bin)
            .map(|k| self.values[range.start + k])
            .unwrap_or(0.0)
    }

    /// Re-express `psd` over the destination model.
    pub fn convert(&self, psd: &SpectrumValue) -> Result<SpectrumValue, ChannelError> {
        if psd.model_id() != self.from_id() {
            return Err(ChannelError::ModelMismatch {
                left: psd.model_id(),
                right: self.from_id(),
            });
        }
        let src = psd.values();
        let out = (0..self.to.num_bands())
            .map(|i| {
                self.row_range(i)
                    .map(|r| {
                        r.map(|k| src[self.col_index[k]] * self.values[k])
                            .sum::<f64>()
                    })
                    .unwrap_or(0.0)
            })
            .collect();
        SpectrumValue::from_values(Arc::clone(&self.to), out)
    }

    fn row_range(&self, row: usize) -> Option<std::ops::Range<usize>> {
        let start = *self.row_ptr.get(row)?;
        let end = *self.row_ptr.get(row + 1)?;
        Some(start..end)
    }
}
