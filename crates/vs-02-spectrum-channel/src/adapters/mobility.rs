//! Static positions, updatable from an external position feed.

use parking_lot::RwLock;
use shared_types::Vector3;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::outbound::{MobilityId, MobilityModel};

static NEXT_MOBILITY_ID: AtomicU64 = AtomicU64::new(1);

/// A node that stays where it was last put.
#[derive(Debug)]
pub struct ConstantPositionMobility {
    id: MobilityId,
    position: RwLock<Vector3>,
}

impl ConstantPositionMobility {
    pub fn new(position: Vector3) -> Self {
        Self {
            id: MobilityId(NEXT_MOBILITY_ID.fetch_add(1, Ordering::Relaxed)),
            position: RwLock::new(position),
        }
    }

    pub fn set_position(&self, position: Vector3) {
        *self.position.write() = position;
    }
}

impl MobilityModel for ConstantPositionMobility {
    fn id(&self) -> MobilityId {
        self.id
    }

    fn position(&self) -> Vector3 {
        *self.position.read()
    }
}
