//! Turns scenario sections into channel building blocks.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use vs_02_spectrum_channel::adapters::{
    BeamformingSpectrumPropagationLoss, ChainedPropagationLoss, ConstantSpectrumPropagationLoss,
    ConstantSpeedDelay, FriisSpectrumPropagationLoss, IsotropicAntenna, ParabolicAntenna,
    Parabolic3dAntenna, UniformLinearArray, WinnerB1OutdoorLoss,
};
use vs_02_spectrum_channel::{
    AntennaHandle, ChannelModels, PropagationLossModel, SpectralLoss, SpectrumModel,
};

use crate::config::{
    AntennaConfig, BandLayout, LossModelConfig, PropagationConfig, SpectralLossConfig,
    TechnologyConfig,
};
use crate::errors::ScenarioError;

/// One spectrum model per technology, keyed by name.
pub fn build_spectrum_models(
    technologies: &[TechnologyConfig],
) -> Result<HashMap<String, Arc<SpectrumModel>>, ScenarioError> {
    technologies
        .iter()
        .map(|tech| {
            let model = match &tech.layout {
                BandLayout::Uniform {
                    start_hz,
                    band_width_hz,
                    num_bands,
                } => SpectrumModel::uniform(*start_hz, *band_width_hz, *num_bands)?,
                BandLayout::Centers {
                    center_frequencies_hz,
                    band_width_hz,
                } => SpectrumModel::from_center_frequencies(center_frequencies_hz, *band_width_hz)?,
            };
            debug!(technology = %tech.name, model = %model.id(), bands = model.num_bands(), "spectrum model built");
            Ok((tech.name.clone(), Arc::new(model)))
        })
        .collect()
}

pub fn build_antenna(config: &AntennaConfig) -> AntennaHandle {
    match config {
        AntennaConfig::Isotropic => AntennaHandle::Pattern(Arc::new(IsotropicAntenna)),
        AntennaConfig::Parabolic {
            beamwidth_deg,
            orientation_deg,
            max_attenuation_db,
        } => AntennaHandle::Pattern(Arc::new(ParabolicAntenna::new(
            *beamwidth_deg,
            *orientation_deg,
            *max_attenuation_db,
        ))),
        AntennaConfig::Parabolic3d(cfg) => {
            AntennaHandle::Pattern(Arc::new(Parabolic3dAntenna::new(cfg)))
        }
        AntennaConfig::UniformLinearArray {
            num_elements,
            spacing,
        } => AntennaHandle::PhasedArray(Arc::new(UniformLinearArray::new(*num_elements, *spacing))),
    }
}

/// `None` for [`LossModelConfig::None`] and for an empty chain.
pub fn build_loss_model(config: &LossModelConfig) -> Option<Arc<dyn PropagationLossModel>> {
    let model: Arc<dyn PropagationLossModel> = match config {
        LossModelConfig::None => return None,
        LossModelConfig::Friis(m) => Arc::new(m.clone()),
        LossModelConfig::LogDistance(m) => Arc::new(m.clone()),
        LossModelConfig::Range(m) => Arc::new(m.clone()),
        LossModelConfig::FixedRss(m) => Arc::new(m.clone()),
        LossModelConfig::WinnerB1(cfg) => Arc::new(WinnerB1OutdoorLoss::new(cfg)),
        LossModelConfig::Chain { models } => {
            let chain = ChainedPropagationLoss::new(models.iter().filter_map(build_loss_model).collect());
            if chain.is_empty() {
                return None;
            }
            Arc::new(chain)
        }
    };
    Some(model)
}

pub fn build_channel_models(config: &PropagationConfig) -> ChannelModels {
    let mut models = ChannelModels::new();
    if let Some(loss) = build_loss_model(&config.loss) {
        models = models.with_propagation_loss(loss);
    }
    if config.delay {
        models = models.with_propagation_delay(Arc::new(ConstantSpeedDelay::default()));
    }
    let spectral = match &config.spectral {
        SpectralLossConfig::None => SpectralLoss::None,
        SpectralLossConfig::Friis => {
            SpectralLoss::FrequencySelective(Arc::new(FriisSpectrumPropagationLoss))
        }
        SpectralLossConfig::Constant { loss_db } => SpectralLoss::FrequencySelective(Arc::new(
            ConstantSpectrumPropagationLoss::new(*loss_db),
        )),
        SpectralLossConfig::Beamforming => {
            SpectralLoss::PhasedArray(Arc::new(BeamformingSpectrumPropagationLoss))
        }
    };
    models.with_spectral_loss(spectral)
}
