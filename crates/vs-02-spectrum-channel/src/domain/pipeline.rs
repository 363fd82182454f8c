//! Per-link propagation: antenna gains, path loss, spectral loss and delay.
//!
//! ```text
//! txGain   = txAntenna.gain_db(angles rx as seen from tx)      (0 without antenna)
//! rxGain   = rxAntenna.gain_db(angles tx as seen from rx)      (0 without pattern antenna)
//! propGain = loss.calc_rx_power(0 dBm, txMob, rxMob)           (0 without loss model)
//! pathLoss = -(txGain + rxGain + propGain)
//! ```
//!
//! All of it is skipped when either end has no mobility model: the PSD is
//! delivered unchanged with zero delay.

use shared_types::{Angles, SimTime};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use super::signal::SignalParameters;
use super::value_objects::{LinkBudget, PropagationOutcome};
use crate::errors::ChannelError;
use crate::ports::outbound::{
    PhasedArraySpectrumPropagationLossModel, PropagationDelayModel, PropagationLossModel,
    SpectrumPhy, SpectrumPropagationLossModel,
};

/// At most one spectral loss model is active.
#[derive(Clone, Default)]
pub enum SpectralLoss {
    #[default]
    None,
    FrequencySelective(Arc<dyn SpectrumPropagationLossModel>),
    /// Requires phased-array antennas at both ends.
    PhasedArray(Arc<dyn PhasedArraySpectrumPropagationLossModel>),
}

impl fmt::Debug for SpectralLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "SpectralLoss::None",
            Self::FrequencySelective(_) => "SpectralLoss::FrequencySelective",
            Self::PhasedArray(_) => "SpectralLoss::PhasedArray",
        })
    }
}

/// The pluggable physical models of a channel.
#[derive(Clone, Default)]
pub struct ChannelModels {
    pub propagation_loss: Option<Arc<dyn PropagationLossModel>>,
    pub propagation_delay: Option<Arc<dyn PropagationDelayModel>>,
    pub spectral_loss: SpectralLoss,
}

impl ChannelModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_propagation_loss(mut self, model: Arc<dyn PropagationLossModel>) -> Self {
        self.propagation_loss = Some(model);
        self
    }

    pub fn with_propagation_delay(mut self, model: Arc<dyn PropagationDelayModel>) -> Self {
        self.propagation_delay = Some(model);
        self
    }

    pub fn with_spectral_loss(mut self, loss: SpectralLoss) -> Self {
        self.spectral_loss = loss;
        self
    }
}

impl fmt::Debug for ChannelModels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelModels")
            .field("propagation_loss", &self.propagation_loss.is_some())
            .field("propagation_delay", &self.propagation_delay.is_some())
            .field("spectral_loss", &self.spectral_loss)
            .finish()
    }
}

/// Stateless evaluation of one tx/rx link.
pub struct PropagationPipeline<'a> {
    models: &'a ChannelModels,
    max_loss_db: f64,
}

impl<'a> PropagationPipeline<'a> {
    pub fn new(models: &'a ChannelModels, max_loss_db: f64) -> Self {
        Self {
            models,
            max_loss_db,
        }
    }

    /// `params.psd` must already be expressed over the receiver's model.
    pub fn evaluate(
        &self,
        params: &SignalParameters,
        rx_phy: &dyn SpectrumPhy,
    ) -> Result<PropagationOutcome, ChannelError> {
        let (Some(tx_mob), Some(rx_mob)) = (params.tx_phy.mobility(), rx_phy.mobility()) else {
            return Ok(PropagationOutcome::Deliver {
                psd: params.psd.clone(),
                delay: SimTime::ZERO,
                budget: None,
            });
        };
        let tx_pos = tx_mob.position();
        let rx_pos = rx_mob.position();

        let tx_gain = params
            .tx_antenna
            .as_ref()
            .map(|a| a.gain_db(Angles::between(&rx_pos, &tx_pos)))
            .unwrap_or(0.0);
        let rx_gain = rx_phy
            .antenna()
            .and_then(|h| h.as_pattern().cloned())
            .map(|a| a.gain_db(Angles::between(&tx_pos, &rx_pos)))
            .unwrap_or(0.0);
        let prop_gain = self
            .models
            .propagation_loss
            .as_ref()
            .map(|m| m.calc_rx_power(0.0, tx_mob.as_ref(), rx_mob.as_ref()))
            .unwrap_or(0.0);

        let budget = LinkBudget::new(tx_gain, rx_gain, prop_gain);
        trace!(
            tx = %params.tx_phy.id(),
            rx = %rx_phy.id(),
            tx_gain,
            rx_gain,
            prop_gain,
            path_loss_db = budget.path_loss_db,
            "link budget"
        );
        if budget.path_loss_db > self.max_loss_db {
            return Ok(PropagationOutcome::OutOfRange(budget));
        }

        let mut psd = params.psd.clone();
        psd *= budget.linear_gain();

        match &self.models.spectral_loss {
            SpectralLoss::None => {}
            SpectralLoss::FrequencySelective(model) => {
                let scaled = params.copy_with_psd(psd);
                psd = model.calc_rx_psd(&scaled, tx_mob.as_ref(), rx_mob.as_ref());
            }
            SpectralLoss::PhasedArray(model) => {
                let tx_array = params.tx_phy.antenna().and_then(|h| h.as_phased_array().cloned());
                let rx_array = rx_phy.antenna().and_then(|h| h.as_phased_array().cloned());
                let (Some(tx_array), Some(rx_array)) = (tx_array, rx_array) else {
                    return Err(ChannelError::PhasedArrayRequired {
                        tx: params.tx_phy.id(),
                        rx: rx_phy.id(),
                    });
                };
                let scaled = params.copy_with_psd(psd);
                psd = model.calc_rx_psd(
                    &scaled,
                    tx_mob.as_ref(),
                    rx_mob.as_ref(),
                    tx_array.as_ref(),
                    rx_array.as_ref(),
                );
            }
        }

        let delay = self
            .models
            .propagation_delay
            .as_ref()
            .map(|m| m.delay(tx_mob.as_ref(), rx_mob.as_ref()))
            .unwrap_or(SimTime::ZERO);

        Ok(PropagationOutcome::Deliver {
            psd,
            delay,
            budget: Some(budget),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        ConstantSpectrumPropagationLoss, FixedRssLoss, ParabolicAntenna, UniformLinearArray,
    };
    use crate::domain::{SpectrumModel, SpectrumValue};
    use crate::ports::outbound::AntennaHandle;
    use crate::testing::{TestPhy, TestPhyBuilder};
    use shared_types::Vector3;

    fn model() -> Arc<SpectrumModel> {
        Arc::new(SpectrumModel::uniform(5.9e9, 10e6, 2).unwrap())
    }

    fn at(builder: TestPhyBuilder, x: f64, y: f64) -> Arc<TestPhy> {
        builder.rx_model(&model()).position(Vector3::new(x, y, 0.0)).build()
    }

    fn params(tx: &Arc<TestPhy>) -> SignalParameters {
        SignalParameters::new(tx.as_phy(), SpectrumValue::flat(model(), 1.0), SimTime::ZERO)
    }

    fn budget(outcome: PropagationOutcome) -> LinkBudget {
        match outcome {
            PropagationOutcome::Deliver { budget, .. } => budget.unwrap(),
            PropagationOutcome::OutOfRange(budget) => budget,
        }
    }

    #[test]
    fn test_no_mobility_passes_psd_through() {
        let models = ChannelModels::new().with_propagation_loss(Arc::new(FixedRssLoss::default()));
        let tx = TestPhy::builder().rx_model(&model()).build();
        let rx = at(TestPhy::builder(), 10.0, 0.0);

        let outcome = PropagationPipeline::new(&models, 0.0)
            .evaluate(&params(&tx), rx.as_ref())
            .unwrap();
        let PropagationOutcome::Deliver { psd, delay, budget } = outcome else {
            panic!("expected delivery");
        };
        assert_eq!(psd.values(), &[1.0, 1.0]);
        assert_eq!(delay, SimTime::ZERO);
        assert!(budget.is_none());
    }

    #[test]
    fn test_antenna_gains_enter_the_budget() {
        let models = ChannelModels::new();
        let tx = at(TestPhy::builder(), 0.0, 0.0);
        // Receiver looks along +x, the transmitter sits 90° off its boresight.
        let rx = at(
            TestPhy::builder().antenna(AntennaHandle::Pattern(Arc::new(ParabolicAntenna::new(
                60.0, 0.0, 20.0,
            )))),
            0.0,
            10.0,
        );
        let tx_params = params(&tx).with_tx_antenna(Arc::new(ParabolicAntenna::new(60.0, 90.0, 20.0)));

        let b = budget(
            PropagationPipeline::new(&models, 1e9)
                .evaluate(&tx_params, rx.as_ref())
                .unwrap(),
        );
        assert!(b.tx_antenna_gain_db.abs() < 1e-9);
        assert!((b.rx_antenna_gain_db + 20.0).abs() < 1e-9);
        assert!((b.path_loss_db - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_phased_array_is_not_a_pattern() {
        let models = ChannelModels::new();
        let tx = at(TestPhy::builder(), 0.0, 0.0);
        let rx = at(
            TestPhy::builder().antenna(AntennaHandle::PhasedArray(Arc::new(
                UniformLinearArray::with_elements(4),
            ))),
            10.0,
            0.0,
        );
        let b = budget(
            PropagationPipeline::new(&models, 1e9)
                .evaluate(&params(&tx), rx.as_ref())
                .unwrap(),
        );
        assert_eq!(b.rx_antenna_gain_db, 0.0);
    }

    #[test]
    fn test_frequency_selective_loss_applied_after_gain() {
        let models = ChannelModels::new()
            .with_propagation_loss(Arc::new(FixedRssLoss { rss_dbm: -10.0 }))
            .with_spectral_loss(SpectralLoss::FrequencySelective(Arc::new(
                ConstantSpectrumPropagationLoss::new(10.0),
            )));
        let tx = at(TestPhy::builder(), 0.0, 0.0);
        let rx = at(TestPhy::builder(), 10.0, 0.0);

        let outcome = PropagationPipeline::new(&models, 1e9)
            .evaluate(&params(&tx), rx.as_ref())
            .unwrap();
        let PropagationOutcome::Deliver { psd, .. } = outcome else {
            panic!("expected delivery");
        };
        for v in psd.values() {
            assert!((v - 0.01).abs() < 1e-12);
        }
    }

    #[test]
    fn test_loss_above_threshold_is_out_of_range() {
        let models = ChannelModels::new().with_propagation_loss(Arc::new(FixedRssLoss { rss_dbm: -50.0 }));
        let tx = at(TestPhy::builder(), 0.0, 0.0);
        let rx = at(TestPhy::builder(), 10.0, 0.0);

        let outcome = PropagationPipeline::new(&models, 49.9)
            .evaluate(&params(&tx), rx.as_ref())
            .unwrap();
        assert!(matches!(outcome, PropagationOutcome::OutOfRange(b) if b.path_loss_db == 50.0));
    }
}
