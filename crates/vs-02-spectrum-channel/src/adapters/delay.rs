//! Propagation delay.

use shared_types::units::SPEED_OF_LIGHT;
use shared_types::SimTime;

use crate::ports::outbound::{MobilityModel, PropagationDelayModel};

/// `distance / speed`, rounded to the nearest nanosecond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSpeedDelay {
    speed: f64,
}

impl Default for ConstantSpeedDelay {
    fn default() -> Self {
        Self {
            speed: SPEED_OF_LIGHT,
        }
    }
}

impl ConstantSpeedDelay {
    /// `speed` in m/s.
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl PropagationDelayModel for ConstantSpeedDelay {
    fn delay(&self, a: &dyn MobilityModel, b: &dyn MobilityModel) -> SimTime {
        let seconds = a.distance_from(b) / self.speed;
        // Float-to-int `as` saturates and maps NaN to zero.
        SimTime::from_nanos((seconds * 1e9).round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ConstantPositionMobility;
    use shared_types::Vector3;

    #[test]
    fn test_speed_of_light_delay() {
        let a = ConstantPositionMobility::new(Vector3::default());
        let b = ConstantPositionMobility::new(Vector3::new(299.792458, 0.0, 0.0));
        assert_eq!(ConstantSpeedDelay::default().delay(&a, &b), SimTime::from_nanos(1_000));
    }

    #[test]
    fn test_colocated_is_zero() {
        let a = ConstantPositionMobility::new(Vector3::new(1.0, 2.0, 3.0));
        let b = ConstantPositionMobility::new(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(ConstantSpeedDelay::new(340.0).delay(&a, &b), SimTime::ZERO);
    }
}
