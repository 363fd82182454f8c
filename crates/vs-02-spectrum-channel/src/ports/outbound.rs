//! Outbound ports (SPI) for the spectrum channel.

use num_complex::Complex64;
use shared_types::{Angles, DeviceInfo, NodeId, PhyId, SimTime, Vector3};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::domain::{
    GainTrace, PathLossTrace, SignalParameters, SpectrumModel, SpectrumValue, TransmissionStats,
    TxSignalTrace,
};

/// A radio endpoint attached to a channel.
///
/// The channel only holds `Arc` handles; endpoints are compared by `id()`.
pub trait SpectrumPhy: Send + Sync {
    fn id(&self) -> PhyId;

    /// Owning device, if the endpoint is installed on one.
    fn device(&self) -> Option<DeviceInfo>;

    fn mobility(&self) -> Option<Arc<dyn MobilityModel>>;

    /// Layout the endpoint receives on. Required to register as a receiver.
    fn rx_spectrum_model(&self) -> Option<Arc<SpectrumModel>>;

    fn antenna(&self) -> Option<AntennaHandle>;

    /// Begin receiving a signal.
    fn start_rx(&self, params: SignalParameters);
}

/// Unique id of a mobility model instance; keys per-pair state in loss models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MobilityId(pub u64);

/// Source of an endpoint's position.
pub trait MobilityModel: Send + Sync {
    fn id(&self) -> MobilityId;

    /// Position in meters.
    fn position(&self) -> Vector3;

    fn distance_from(&self, other: &dyn MobilityModel) -> f64 {
        self.position().distance_to(&other.position())
    }
}

/// Radiation pattern of a single antenna.
pub trait AntennaModel: Send + Sync {
    /// Gain in dBi toward `angles`.
    fn gain_db(&self, angles: Angles) -> f64;
}

/// Antenna array with electronically steerable weights.
///
/// Element locations are expressed in wavelengths.
pub trait PhasedArrayModel: Send + Sync {
    fn num_elements(&self) -> usize;

    fn element_location(&self, index: usize) -> Vector3;

    /// Current beamforming weights, one per element.
    fn beamforming_vector(&self) -> Vec<Complex64>;

    /// Gain of a single element toward `angles`, dBi.
    fn element_gain_db(&self, _angles: Angles) -> f64 {
        0.0
    }

    /// Phase response of every element to a plane wave from `angles`.
    fn steering_vector(&self, angles: Angles) -> Vec<Complex64> {
        let (sin_t, cos_t) = angles.inclination.sin_cos();
        let (sin_p, cos_p) = angles.azimuth.sin_cos();
        (0..self.num_elements())
            .map(|i| {
                let loc = self.element_location(i);
                let phase =
                    2.0 * PI * (loc.x * sin_t * cos_p + loc.y * sin_t * sin_p + loc.z * cos_t);
                Complex64::from_polar(1.0, phase)
            })
            .collect()
    }

    /// Linear power gain toward `angles` with the current weights.
    fn array_gain(&self, angles: Angles) -> f64 {
        let af: Complex64 = self
            .beamforming_vector()
            .iter()
            .zip(self.steering_vector(angles))
            .map(|(w, s)| w * s)
            .sum();
        af.norm_sqr() * shared_types::units::db_to_linear(self.element_gain_db(angles))
    }
}

/// The antenna an endpoint exposes.
#[derive(Clone)]
pub enum AntennaHandle {
    Pattern(Arc<dyn AntennaModel>),
    PhasedArray(Arc<dyn PhasedArrayModel>),
}

impl AntennaHandle {
    pub fn as_pattern(&self) -> Option<&Arc<dyn AntennaModel>> {
        match self {
            Self::Pattern(a) => Some(a),
            Self::PhasedArray(_) => None,
        }
    }

    pub fn as_phased_array(&self) -> Option<&Arc<dyn PhasedArrayModel>> {
        match self {
            Self::PhasedArray(a) => Some(a),
            Self::Pattern(_) => None,
        }
    }
}

impl fmt::Debug for AntennaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(_) => f.write_str("AntennaHandle::Pattern"),
            Self::PhasedArray(a) => write!(f, "AntennaHandle::PhasedArray({} elements)", a.num_elements()),
        }
    }
}

/// Frequency-flat propagation loss.
pub trait PropagationLossModel: Send + Sync {
    /// Received power in dBm for `tx_power_dbm` sent from `a` to `b`.
    fn calc_rx_power(&self, tx_power_dbm: f64, a: &dyn MobilityModel, b: &dyn MobilityModel)
        -> f64;
}

pub trait PropagationDelayModel: Send + Sync {
    fn delay(&self, a: &dyn MobilityModel, b: &dyn MobilityModel) -> SimTime;
}

/// Frequency-selective loss applied to the whole PSD.
pub trait SpectrumPropagationLossModel: Send + Sync {
    fn calc_rx_psd(
        &self,
        params: &SignalParameters,
        a: &dyn MobilityModel,
        b: &dyn MobilityModel,
    ) -> SpectrumValue;
}

/// Spectral loss that depends on the antenna arrays at both ends.
pub trait PhasedArraySpectrumPropagationLossModel: Send + Sync {
    fn calc_rx_psd(
        &self,
        params: &SignalParameters,
        a: &dyn MobilityModel,
        b: &dyn MobilityModel,
        tx_array: &dyn PhasedArrayModel,
        rx_array: &dyn PhasedArrayModel,
    ) -> SpectrumValue;
}

/// A pending reception: `receiver.start_rx(params)` once it fires.
pub struct RxDelivery {
    pub receiver: Arc<dyn SpectrumPhy>,
    pub params: SignalParameters,
}

impl RxDelivery {
    pub fn deliver(self) {
        self.receiver.start_rx(self.params);
    }
}

impl fmt::Debug for RxDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RxDelivery")
            .field("receiver", &self.receiver.id())
            .field("params", &self.params)
            .finish()
    }
}

/// Discrete-event scheduler used to deliver receptions in the future.
pub trait Scheduler: Send + Sync {
    fn now(&self) -> SimTime;

    /// Deliver `delay` after now without a node context.
    fn schedule(&self, delay: SimTime, delivery: RxDelivery);

    /// Deliver `delay` after now under the receiving node's context.
    fn schedule_with_context(&self, context: NodeId, delay: SimTime, delivery: RxDelivery);
}

/// A link that passed the range check and had its reception scheduled.
pub struct DeliveredLink<'a> {
    /// Transmission start.
    pub at: SimTime,
    pub tx: &'a dyn SpectrumPhy,
    pub rx: &'a dyn SpectrumPhy,
    /// The transmitted PSD, over the transmitter's own model.
    pub tx_psd: &'a SpectrumValue,
    pub duration: SimTime,
    pub delay: SimTime,
}

/// Trace sink. All methods default to no-ops.
pub trait ChannelObserver: Send + Sync {
    fn on_tx_signal(&self, _trace: &TxSignalTrace) {}

    fn on_gain(&self, _trace: &GainTrace) {}

    fn on_path_loss(&self, _trace: &PathLossTrace) {}

    /// Called for every scheduled reception, before it is handed to the scheduler.
    fn on_link_delivered(&self, _link: &DeliveredLink<'_>) {}

    /// Called once per completed `start_tx`.
    fn on_tx_complete(&self, _stats: &TransmissionStats) {}

    fn on_converters_created(&self, _count: usize) {}

    fn on_device_count(&self, _count: usize) {}
}
