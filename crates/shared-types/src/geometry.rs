//! # Geometry
//!
//! Cartesian positions (meters) and the spherical angles of one point seen
//! from another. Azimuth is measured in the x-y plane from the x axis;
//! inclination is measured from the z axis (π/2 is the horizontal plane).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::ops::Sub;

/// A position or displacement in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance_to(&self, other: &Vector3) -> f64 {
        (*self - *other).length()
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Direction of a target as seen from an origin, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angles {
    /// In (-π, π].
    pub azimuth: f64,
    /// In [0, π].
    pub inclination: f64,
}

impl Angles {
    pub fn new(azimuth: f64, inclination: f64) -> Self {
        Self {
            azimuth: crate::units::wrap_to_pi(azimuth),
            inclination: inclination.clamp(0.0, PI),
        }
    }

    /// Angles of the vector pointing from `origin` to `target`.
    ///
    /// A zero-length vector has no defined direction; it maps to azimuth 0 in
    /// the horizontal plane.
    pub fn between(target: &Vector3, origin: &Vector3) -> Self {
        let v = *target - *origin;
        let r = v.length();
        if r == 0.0 {
            return Self::new(0.0, PI / 2.0);
        }
        Self::new(v.y.atan2(v.x), (v.z / r).clamp(-1.0, 1.0).acos())
    }
}

impl fmt::Display for Angles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(azimuth={:.2}°, inclination={:.2}°)",
            crate::units::radians_to_degrees(self.azimuth),
            crate::units::radians_to_degrees(self.inclination)
        )
    }
}
