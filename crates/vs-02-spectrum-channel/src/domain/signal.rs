//! The signal description that travels with each delivery.

use shared_types::SimTime;
use std::fmt;
use std::sync::Arc;

use super::spectrum::SpectrumValue;
use crate::ports::outbound::{AntennaModel, SpectrumPhy};

/// A transmission as seen by one receiver.
///
/// The channel copies the parameters for every receiver, replacing the PSD
/// with the converted and attenuated one.
#[derive(Clone)]
pub struct SignalParameters {
    pub tx_phy: Arc<dyn SpectrumPhy>,
    pub psd: SpectrumValue,
    pub duration: SimTime,
    /// Pattern antenna used for the transmit gain, if any.
    pub tx_antenna: Option<Arc<dyn AntennaModel>>,
}

impl SignalParameters {
    pub fn new(tx_phy: Arc<dyn SpectrumPhy>, psd: SpectrumValue, duration: SimTime) -> Self {
        Self {
            tx_phy,
            psd,
            duration,
            tx_antenna: None,
        }
    }

    pub fn with_tx_antenna(mut self, antenna: Arc<dyn AntennaModel>) -> Self {
        self.tx_antenna = Some(antenna);
        self
    }

    pub fn copy_with_psd(&self, psd: SpectrumValue) -> Self {
        Self {
            tx_phy: Arc::clone(&self.tx_phy),
            psd,
            duration: self.duration,
            tx_antenna: self.tx_antenna.clone(),
        }
    }
}

impl fmt::Debug for SignalParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalParameters")
            .field("tx_phy", &self.tx_phy.id())
            .field("model", &self.psd.model_id())
            .field("duration", &self.duration)
            .field("tx_antenna", &self.tx_antenna.is_some())
            .finish()
    }
}
