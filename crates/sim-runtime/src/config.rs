//! # Scenario Configuration
//!
//! A scenario is a JSON document describing the radio technologies (band
//! layouts), the vehicles and their radios, the propagation models and the
//! broadcast traffic. Every section has defaults; `ScenarioConfig::default()`
//! is the built-in mixed-technology highway scenario.
//!
//! ```json
//! {
//!   "name": "two-cars",
//!   "duration_ms": 500,
//!   "technologies": [
//!     { "name": "its-g5", "layout": { "type": "uniform", "start_hz": 5.855e9, "band_width_hz": 1e7, "num_bands": 7 } }
//!   ],
//!   "vehicles": [
//!     { "node_id": 1, "position": { "x": 0, "y": 0, "z": 1.5 }, "radios": [ { "technology": "its-g5" } ] },
//!     { "node_id": 2, "position": { "x": 40, "y": 0, "z": 1.5 }, "radios": [ { "technology": "its-g5" } ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use shared_types::{NodeId, SimTime, Vector3};
use std::collections::HashSet;
use std::path::Path;
use vs_01_event_scheduler::SchedulerConfig;
use vs_02_spectrum_channel::adapters::{
    CoexistenceConfig, FixedRssLoss, FriisPropagationLoss, LogDistancePropagationLoss, Parabolic3dConfig,
    RangePropagationLoss, WinnerB1Config,
};
use vs_02_spectrum_channel::ChannelConfig;

use crate::errors::ScenarioError;

/// Complete scenario description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    /// Simulated run length.
    pub duration_ms: u64,
    pub channel: ChannelConfig,
    pub scheduler: SchedulerConfig,
    pub propagation: PropagationConfig,
    pub traffic: TrafficConfig,
    pub coexistence: CoexistenceSettings,
    pub technologies: Vec<TechnologyConfig>,
    pub vehicles: Vec<VehicleConfig>,
}

/// Cross-technology interference accounting between radios whose
/// technologies occupy overlapping channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoexistenceSettings {
    pub enabled: bool,
    #[serde(flatten)]
    pub tracker: CoexistenceConfig,
}

impl Default for CoexistenceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            tracker: CoexistenceConfig::default(),
        }
    }
}

/// A named band layout radios can listen on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyConfig {
    pub name: String,
    pub layout: BandLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BandLayout {
    /// Contiguous equal-width bands.
    Uniform {
        start_hz: f64,
        band_width_hz: f64,
        num_bands: usize,
    },
    /// Equal-width bands around arbitrary centers.
    Centers {
        center_frequencies_hz: Vec<f64>,
        band_width_hz: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub node_id: NodeId,
    pub position: Vector3,
    /// Meters per second; applied by the position feed.
    #[serde(default)]
    pub velocity: Vector3,
    pub radios: Vec<RadioConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioConfig {
    pub technology: String,
    #[serde(default)]
    pub antenna: AntennaConfig,
    /// Overrides `traffic.tx_power_dbm`.
    #[serde(default)]
    pub tx_power_dbm: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AntennaConfig {
    #[default]
    Isotropic,
    Parabolic {
        beamwidth_deg: f64,
        orientation_deg: f64,
        max_attenuation_db: f64,
    },
    Parabolic3d(Parabolic3dConfig),
    UniformLinearArray {
        num_elements: usize,
        /// In wavelengths.
        spacing: f64,
    },
}

impl AntennaConfig {
    pub fn is_phased_array(&self) -> bool {
        matches!(self, Self::UniformLinearArray { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    pub loss: LossModelConfig,
    /// Speed-of-light propagation delay.
    pub delay: bool,
    pub spectral: SpectralLossConfig,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            loss: LossModelConfig::LogDistance(LogDistancePropagationLoss::default()),
            delay: true,
            spectral: SpectralLossConfig::None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum LossModelConfig {
    #[default]
    None,
    Friis(FriisPropagationLoss),
    LogDistance(LogDistancePropagationLoss),
    Range(RangePropagationLoss),
    FixedRss(FixedRssLoss),
    WinnerB1(WinnerB1Config),
    /// Applied in order, each on the output of the previous one.
    Chain { models: Vec<LossModelConfig> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum SpectralLossConfig {
    #[default]
    None,
    Friis,
    Constant { loss_db: f64 },
    /// Needs a `uniform_linear_array` antenna on every radio.
    Beamforming,
}

/// Periodic broadcast traffic, one stream per radio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub period_ms: u64,
    pub packets_per_radio: u32,
    pub tx_power_dbm: f64,
    pub packet_duration_us: u64,
    /// First packet of each radio starts uniformly in `[0, start_jitter_us]`.
    pub start_jitter_us: u64,
    pub seed: u64,
    /// Position feed interval; vehicles with zero velocity are not updated.
    pub position_update_ms: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            period_ms: 100,
            packets_per_radio: 10,
            tx_power_dbm: 23.0,
            packet_duration_us: 400,
            start_jitter_us: 5_000,
            seed: 7,
            position_update_ms: 100,
        }
    }
}

impl TrafficConfig {
    pub fn period(&self) -> SimTime {
        SimTime::from_millis(self.period_ms)
    }

    pub fn packet_duration(&self) -> SimTime {
        SimTime::from_micros(self.packet_duration_us)
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::highway()
    }
}

impl ScenarioConfig {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn duration(&self) -> SimTime {
        SimTime::from_millis(self.duration_ms)
    }

    pub fn technology(&self, name: &str) -> Option<&TechnologyConfig> {
        self.technologies.iter().find(|t| t.name == name)
    }

    pub fn radio_count(&self) -> usize {
        self.vehicles.iter().map(|v| v.radios.len()).sum()
    }

    /// Check cross references and ranges.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.duration_ms == 0 {
            return Err(ScenarioError::Invalid("duration_ms must be > 0".into()));
        }
        if self.traffic.period_ms == 0 {
            return Err(ScenarioError::Invalid("traffic.period_ms must be > 0".into()));
        }
        if !self.traffic.tx_power_dbm.is_finite() {
            return Err(ScenarioError::Invalid("traffic.tx_power_dbm must be finite".into()));
        }
        if self.coexistence.tracker.sensitivity_dbm.is_nan() {
            return Err(ScenarioError::Invalid("coexistence.sensitivity_dbm is NaN".into()));
        }

        let mut names = HashSet::new();
        for tech in &self.technologies {
            if !names.insert(tech.name.as_str()) {
                return Err(ScenarioError::Invalid(format!(
                    "technology '{}' is declared twice",
                    tech.name
                )));
            }
        }

        let mut nodes = HashSet::new();
        for vehicle in &self.vehicles {
            if !nodes.insert(vehicle.node_id) {
                return Err(ScenarioError::DuplicateNode(vehicle.node_id));
            }
            for (device, radio) in vehicle.radios.iter().enumerate() {
                if self.technology(&radio.technology).is_none() {
                    return Err(ScenarioError::UnknownTechnology {
                        node: vehicle.node_id,
                        device,
                        technology: radio.technology.clone(),
                    });
                }
                if self.propagation.spectral == SpectralLossConfig::Beamforming
                    && !radio.antenna.is_phased_array()
                {
                    return Err(ScenarioError::Invalid(format!(
                        "beamforming spectral loss needs a phased array on radio {device} of {}",
                        vehicle.node_id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Six vehicles on a straight road with three technologies: ITS-G5 and
    /// NR-V2X share the upper 5.9 GHz band, LTE sits at 2.6 GHz. Vehicle 1
    /// carries both 5.9 GHz radios.
    pub fn highway() -> Self {
        let radio = |technology: &str| RadioConfig {
            technology: technology.to_string(),
            antenna: AntennaConfig::Isotropic,
            tx_power_dbm: None,
        };
        let vehicle = |id: u32, x: f64, speed: f64, radios: Vec<RadioConfig>| VehicleConfig {
            node_id: NodeId(id),
            position: Vector3::new(x, 0.0, 1.5),
            velocity: Vector3::new(speed, 0.0, 0.0),
            radios,
        };

        Self {
            name: "highway".to_string(),
            duration_ms: 1_100,
            channel: ChannelConfig::with_max_loss_db(110.0),
            scheduler: SchedulerConfig::default(),
            propagation: PropagationConfig::default(),
            traffic: TrafficConfig::default(),
            coexistence: CoexistenceSettings::default(),
            technologies: vec![
                TechnologyConfig {
                    name: "its-g5".to_string(),
                    layout: BandLayout::Uniform {
                        start_hz: 5.855e9,
                        band_width_hz: 10e6,
                        num_bands: 7,
                    },
                },
                TechnologyConfig {
                    name: "nr-v2x".to_string(),
                    layout: BandLayout::Uniform {
                        start_hz: 5.905e9,
                        band_width_hz: 180e3,
                        num_bands: 106,
                    },
                },
                TechnologyConfig {
                    name: "lte-uu".to_string(),
                    layout: BandLayout::Uniform {
                        start_hz: 2.62e9,
                        band_width_hz: 180e3,
                        num_bands: 50,
                    },
                },
            ],
            vehicles: vec![
                vehicle(1, 0.0, 25.0, vec![radio("its-g5"), radio("nr-v2x")]),
                vehicle(2, 50.0, 25.0, vec![radio("its-g5")]),
                vehicle(3, 100.0, 30.0, vec![radio("nr-v2x")]),
                vehicle(4, 150.0, 20.0, vec![radio("its-g5")]),
                vehicle(5, 60.0, 0.0, vec![radio("lte-uu")]),
                vehicle(6, 120.0, 0.0, vec![radio("lte-uu")]),
            ],
        }
    }
}
