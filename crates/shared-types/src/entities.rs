//! # Core Identities
//!
//! Identifiers for the simulated actors.
//!
//! - **NodeId**: a simulated node (vehicle, RSU, base station). Events
//!   scheduled "with context" carry the target node's id.
//! - **PhyId**: one radio endpoint (PHY). Two endpoints are the same endpoint
//!   iff their `PhyId`s are equal; the channel never compares pointers.
//! - **DeviceInfo**: the net device owning a PHY, attached to a node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a simulated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

static NEXT_PHY_ID: AtomicU64 = AtomicU64::new(1);

/// Stable handle of a radio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhyId(pub u64);

impl PhyId {
    /// Allocate a fresh, process-wide unique id.
    pub fn allocate() -> Self {
        Self(NEXT_PHY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PhyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phy-{}", self.0)
    }
}

/// The net device a PHY belongs to.
///
/// A device is always attached to a node; a PHY without a device (e.g. a
/// standalone spectrum analyzer) has no `DeviceInfo` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Node the device is installed on.
    pub node_id: NodeId,
    /// Index of the device on its node.
    pub device_index: u32,
}

impl DeviceInfo {
    pub const fn new(node_id: NodeId, device_index: u32) -> Self {
        Self {
            node_id,
            device_index,
        }
    }

    /// True if both devices are installed on the same node.
    pub fn same_node(&self, other: &DeviceInfo) -> bool {
        self.node_id == other.node_id
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/dev-{}", self.node_id, self.device_index)
    }
}
