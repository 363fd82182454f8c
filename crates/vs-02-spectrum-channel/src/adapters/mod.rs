//! # Adapters
//!
//! Concrete implementations of the outbound ports.
//!
//! | Port | Adapters |
//! |------|----------|
//! | `MobilityModel` | `ConstantPositionMobility` |
//! | `AntennaModel` | `IsotropicAntenna`, `ParabolicAntenna`, `Parabolic3dAntenna` |
//! | `PhasedArrayModel` | `UniformLinearArray` |
//! | `PropagationLossModel` | `FriisPropagationLoss`, `LogDistancePropagationLoss`, `RangePropagationLoss`, `FixedRssLoss`, `WinnerB1OutdoorLoss`, `ChainedPropagationLoss` |
//! | `PropagationDelayModel` | `ConstantSpeedDelay` |
//! | `SpectrumPropagationLossModel` | `FriisSpectrumPropagationLoss`, `ConstantSpectrumPropagationLoss` |
//! | `PhasedArraySpectrumPropagationLossModel` | `BeamformingSpectrumPropagationLoss` |
//! | `Scheduler` | `SimulatorScheduler`, `RecordingScheduler` |
//! | `ChannelObserver` | `ChannelTraceRecorder`, `MetricsObserver`, `CoexistenceInterferenceTracker` |

mod antenna;
mod coexistence;
mod delay;
mod mobility;
mod observers;
mod phased_array;
mod propagation_loss;
mod scheduler;
mod spectral_loss;
mod winner;

pub use antenna::*;
pub use coexistence::*;
pub use delay::*;
pub use mobility::*;
pub use observers::*;
pub use phased_array::*;
pub use propagation_loss::*;
pub use scheduler::*;
pub use spectral_loss::*;
pub use winner::*;
