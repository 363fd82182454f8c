//! Frequency-selective spectral loss models.

use shared_types::units::{db_to_linear, SPEED_OF_LIGHT};
use std::f64::consts::PI;

use crate::domain::{SignalParameters, SpectrumValue};
use crate::ports::outbound::{MobilityModel, SpectrumPropagationLossModel};

/// Free-space loss evaluated at each band's center frequency.
///
/// The per-band linear loss `(4π d fc / c)²` is floored at 1 so that very
/// short links never amplify.
#[derive(Debug, Clone, Copy, Default)]
pub struct FriisSpectrumPropagationLoss;

impl FriisSpectrumPropagationLoss {
    pub fn band_loss(frequency_hz: f64, distance: f64) -> f64 {
        if distance <= 0.0 {
            return 1.0;
        }
        let sqrt_loss = 4.0 * PI * frequency_hz * distance / SPEED_OF_LIGHT;
        (sqrt_loss * sqrt_loss).max(1.0)
    }
}

impl SpectrumPropagationLossModel for FriisSpectrumPropagationLoss {
    fn calc_rx_psd(
        &self,
        params: &SignalParameters,
        a: &dyn MobilityModel,
        b: &dyn MobilityModel,
    ) -> SpectrumValue {
        let distance = a.distance_from(b);
        let mut psd = params.psd.clone();
        let bands = psd.model().clone();
        for (v, band) in psd.values_mut().iter_mut().zip(bands.bands()) {
            *v /= Self::band_loss(band.fc, distance);
        }
        psd
    }
}

/// The same attenuation on every band.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSpectrumPropagationLoss {
    loss_db: f64,
    loss_linear: f64,
}

impl ConstantSpectrumPropagationLoss {
    pub fn new(loss_db: f64) -> Self {
        Self {
            loss_db,
            loss_linear: db_to_linear(loss_db),
        }
    }

    pub fn loss_db(&self) -> f64 {
        self.loss_db
    }
}

impl Default for ConstantSpectrumPropagationLoss {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SpectrumPropagationLossModel for ConstantSpectrumPropagationLoss {
    fn calc_rx_psd(
        &self,
        params: &SignalParameters,
        _a: &dyn MobilityModel,
        _b: &dyn MobilityModel,
    ) -> SpectrumValue {
        params.psd.clone().scale(1.0 / self.loss_linear)
    }
}
