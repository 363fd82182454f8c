//! Uniform linear phased array and array-gain spectral loss.

use num_complex::Complex64;
use parking_lot::RwLock;
use shared_types::{Angles, Vector3};
use std::f64::consts::PI;
use std::sync::Arc;

use crate::domain::{SignalParameters, SpectrumValue};
use crate::ports::outbound::{
    AntennaModel, MobilityModel, PhasedArrayModel, PhasedArraySpectrumPropagationLossModel,
};

/// Elements along the y axis, `spacing` wavelengths apart.
///
/// Weights start steered at boresight (azimuth 0, horizontal).
pub struct UniformLinearArray {
    num_elements: usize,
    spacing: f64,
    element: Option<Arc<dyn AntennaModel>>,
    weights: RwLock<Vec<Complex64>>,
}

impl UniformLinearArray {
    pub fn new(num_elements: usize, spacing: f64) -> Self {
        let array = Self {
            num_elements,
            spacing,
            element: None,
            weights: RwLock::new(Vec::new()),
        };
        array.set_beam_direction(Angles::new(0.0, PI / 2.0));
        array
    }

    /// Half-wavelength spacing.
    pub fn with_elements(num_elements: usize) -> Self {
        Self::new(num_elements, 0.5)
    }

    pub fn with_element_pattern(mut self, element: Arc<dyn AntennaModel>) -> Self {
        self.element = Some(element);
        self
    }

    /// Conjugate-steering weights toward `angles`, normalized to unit power.
    pub fn set_beam_direction(&self, angles: Angles) {
        let norm = (self.num_elements.max(1) as f64).sqrt();
        let weights = self
            .steering_vector(angles)
            .into_iter()
            .map(|s| s.conj() / norm)
            .collect();
        *self.weights.write() = weights;
    }

    pub fn set_beamforming_vector(&self, weights: Vec<Complex64>) {
        *self.weights.write() = weights;
    }
}

impl PhasedArrayModel for UniformLinearArray {
    fn num_elements(&self) -> usize {
        self.num_elements
    }

    fn element_location(&self, index: usize) -> Vector3 {
        Vector3::new(0.0, self.spacing * index as f64, 0.0)
    }

    fn beamforming_vector(&self) -> Vec<Complex64> {
        self.weights.read().clone()
    }

    fn element_gain_db(&self, angles: Angles) -> f64 {
        self.element.as_ref().map(|e| e.gain_db(angles)).unwrap_or(0.0)
    }
}

/// Scales the PSD by the power gain of both arrays toward each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeamformingSpectrumPropagationLoss;

impl PhasedArraySpectrumPropagationLossModel for BeamformingSpectrumPropagationLoss {
    fn calc_rx_psd(
        &self,
        params: &SignalParameters,
        a: &dyn MobilityModel,
        b: &dyn MobilityModel,
        tx_array: &dyn PhasedArrayModel,
        rx_array: &dyn PhasedArrayModel,
    ) -> SpectrumValue {
        let (pa, pb) = (a.position(), b.position());
        let tx_gain = tx_array.array_gain(Angles::between(&pb, &pa));
        let rx_gain = rx_array.array_gain(Angles::between(&pa, &pb));
        params.psd.clone().scale(tx_gain * rx_gain)
    }
}
