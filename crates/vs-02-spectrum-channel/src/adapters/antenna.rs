//! Antenna radiation patterns.

use serde::{Deserialize, Serialize};
use shared_types::units::{degrees_to_radians, wrap_to_pi};
use shared_types::Angles;
use std::f64::consts::PI;
use tracing::trace;

use crate::ports::outbound::AntennaModel;

/// 0 dBi in every direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsotropicAntenna;

impl AntennaModel for IsotropicAntenna {
    fn gain_db(&self, _angles: Angles) -> f64 {
        0.0
    }
}

/// Azimuth-only parabolic pattern: `-min(12 (φ/θ3dB)², maxAtt)`.
#[derive(Debug, Clone)]
pub struct ParabolicAntenna {
    beamwidth_rad: f64,
    orientation_rad: f64,
    max_attenuation_db: f64,
}

impl Default for ParabolicAntenna {
    fn default() -> Self {
        Self::new(60.0, 0.0, 20.0)
    }
}

impl ParabolicAntenna {
    /// Angles in degrees.
    pub fn new(beamwidth_deg: f64, orientation_deg: f64, max_attenuation_db: f64) -> Self {
        Self {
            beamwidth_rad: degrees_to_radians(beamwidth_deg),
            orientation_rad: degrees_to_radians(orientation_deg),
            max_attenuation_db,
        }
    }
}

impl AntennaModel for ParabolicAntenna {
    fn gain_db(&self, angles: Angles) -> f64 {
        let phi = wrap_to_pi(angles.azimuth - self.orientation_rad);
        -(12.0 * (phi / self.beamwidth_rad).powi(2)).min(self.max_attenuation_db)
    }
}

/// Settings of a [`Parabolic3dAntenna`], angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parabolic3dConfig {
    pub horizontal_beamwidth_deg: f64,
    pub orientation_deg: f64,
    pub max_horizontal_attenuation_db: f64,
    pub vertical_beamwidth_deg: f64,
    pub electrical_tilt_deg: f64,
    pub mechanical_tilt_deg: f64,
    pub max_vertical_attenuation_db: f64,
}

impl Default for Parabolic3dConfig {
    fn default() -> Self {
        Self {
            horizontal_beamwidth_deg: 70.0,
            orientation_deg: 0.0,
            max_horizontal_attenuation_db: 25.0,
            vertical_beamwidth_deg: 10.0,
            electrical_tilt_deg: 0.0,
            mechanical_tilt_deg: 0.0,
            max_vertical_attenuation_db: 20.0,
        }
    }
}

/// Sector antenna with separate horizontal and vertical parabolic patterns.
///
/// The combined attenuation is capped by the horizontal maximum.
#[derive(Debug, Clone)]
pub struct Parabolic3dAntenna {
    h_beamwidth: f64,
    orientation: f64,
    max_h_attenuation_db: f64,
    v_beamwidth: f64,
    tilt: f64,
    max_v_attenuation_db: f64,
}

impl Default for Parabolic3dAntenna {
    fn default() -> Self {
        Self::new(&Parabolic3dConfig::default())
    }
}

impl Parabolic3dAntenna {
    pub fn new(config: &Parabolic3dConfig) -> Self {
        Self {
            h_beamwidth: degrees_to_radians(config.horizontal_beamwidth_deg),
            orientation: degrees_to_radians(config.orientation_deg),
            max_h_attenuation_db: config.max_horizontal_attenuation_db,
            v_beamwidth: degrees_to_radians(config.vertical_beamwidth_deg),
            tilt: degrees_to_radians(config.electrical_tilt_deg + config.mechanical_tilt_deg),
            max_v_attenuation_db: config.max_vertical_attenuation_db,
        }
    }

    pub fn horizontal_gain_db(&self, angles: Angles) -> f64 {
        let phi = wrap_to_pi(angles.azimuth - self.orientation);
        -(12.0 * (phi / self.h_beamwidth).powi(2)).min(self.max_h_attenuation_db)
    }

    pub fn vertical_gain_db(&self, angles: Angles) -> f64 {
        // Elevation relative to the tilted boresight, within [-π, π].
        let theta = (angles.inclination - PI / 2.0 - self.tilt).clamp(-PI, PI);
        -(12.0 * (theta / self.v_beamwidth).powi(2)).min(self.max_v_attenuation_db)
    }
}

impl AntennaModel for Parabolic3dAntenna {
    fn gain_db(&self, angles: Angles) -> f64 {
        let h = self.horizontal_gain_db(angles);
        let v = self.vertical_gain_db(angles);
        let gain = -(-(h + v)).min(self.max_h_attenuation_db);
        trace!(h, v, gain, "parabolic 3d gain");
        gain
    }
}
