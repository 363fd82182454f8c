//! Inbound port (API) of the spectrum channel.

use shared_types::{DeviceInfo, PhyId};
use std::sync::Arc;

use crate::domain::{SignalParameters, TransmissionStats};
use crate::errors::ChannelError;
use crate::ports::outbound::SpectrumPhy;

/// Primary API offered to PHY layers.
pub trait SpectrumChannelApi: Send + Sync {
    /// Register `phy` as a receiver on its current spectrum model.
    ///
    /// Re-adding an endpoint moves it; it is never listed twice. An endpoint
    /// whose spectrum model changes must be re-added by its owner.
    fn add_rx(&self, phy: Arc<dyn SpectrumPhy>) -> Result<(), ChannelError>;

    /// Unregister a receiver. Returns false if it was not registered.
    fn remove_rx(&self, phy: PhyId) -> bool;

    /// Propagate a transmission to every other registered receiver.
    ///
    /// Receptions are scheduled, never delivered inline.
    fn start_tx(&self, params: SignalParameters) -> Result<TransmissionStats, ChannelError>;

    /// Hand a signal to a receiver immediately.
    fn start_rx(&self, phy: &Arc<dyn SpectrumPhy>, params: SignalParameters);

    /// Number of registered receivers.
    fn n_devices(&self) -> usize;

    /// Device of the `index`-th receiver in registration-group order.
    fn get_device(&self, index: usize) -> Result<Option<DeviceInfo>, ChannelError>;
}
