//! Scriptable radio endpoint for tests and benches.
//!
//! Built for this crate's own tests and, with the `testing` feature, for
//! downstream test suites.
//!
//! ```
//! # #[cfg(feature = "testing")] {
//! use shared_types::{NodeId, Vector3};
//! use vs_02_spectrum_channel::testing::TestPhy;
//! use vs_02_spectrum_channel::SpectrumModel;
//! use std::sync::Arc;
//!
//! let model = Arc::new(SpectrumModel::uniform(5.9e9, 10e6, 1).unwrap());
//! let phy = TestPhy::builder()
//!     .rx_model(&model)
//!     .device(NodeId(1), 0)
//!     .position(Vector3::new(0.0, 0.0, 1.5))
//!     .build();
//! assert!(phy.received().is_empty());
//! # }
//! ```

use parking_lot::{Mutex, RwLock};
use shared_types::{DeviceInfo, NodeId, PhyId, Vector3};
use std::sync::Arc;

use crate::adapters::ConstantPositionMobility;
use crate::domain::{SignalParameters, SpectrumModel};
use crate::ports::outbound::{AntennaHandle, MobilityModel, SpectrumPhy};

/// Endpoint that records every signal it is asked to receive.
pub struct TestPhy {
    id: PhyId,
    device: Option<DeviceInfo>,
    mobility: Option<Arc<dyn MobilityModel>>,
    rx_model: RwLock<Option<Arc<SpectrumModel>>>,
    antenna: Option<AntennaHandle>,
    received: Mutex<Vec<SignalParameters>>,
}

impl TestPhy {
    pub fn builder() -> TestPhyBuilder {
        TestPhyBuilder::default()
    }

    /// Change the receive layout without touching any channel registration.
    pub fn set_rx_model(&self, model: Option<Arc<SpectrumModel>>) {
        *self.rx_model.write() = model;
    }

    pub fn received(&self) -> Vec<SignalParameters> {
        self.received.lock().clone()
    }

    pub fn received_count(&self) -> usize {
        self.received.lock().len()
    }

    /// The handle the channel expects.
    pub fn as_phy(self: &Arc<Self>) -> Arc<dyn SpectrumPhy> {
        Arc::clone(self) as Arc<dyn SpectrumPhy>
    }
}

impl SpectrumPhy for TestPhy {
    fn id(&self) -> PhyId {
        self.id
    }

    fn device(&self) -> Option<DeviceInfo> {
        self.device
    }

    fn mobility(&self) -> Option<Arc<dyn MobilityModel>> {
        self.mobility.clone()
    }

    fn rx_spectrum_model(&self) -> Option<Arc<SpectrumModel>> {
        self.rx_model.read().clone()
    }

    fn antenna(&self) -> Option<AntennaHandle> {
        self.antenna.clone()
    }

    fn start_rx(&self, params: SignalParameters) {
        self.received.lock().push(params);
    }
}

#[derive(Default)]
pub struct TestPhyBuilder {
    device: Option<DeviceInfo>,
    mobility: Option<Arc<dyn MobilityModel>>,
    rx_model: Option<Arc<SpectrumModel>>,
    antenna: Option<AntennaHandle>,
}

impl TestPhyBuilder {
    pub fn rx_model(mut self, model: &Arc<SpectrumModel>) -> Self {
        self.rx_model = Some(Arc::clone(model));
        self
    }

    pub fn device(mut self, node: NodeId, index: u32) -> Self {
        self.device = Some(DeviceInfo::new(node, index));
        self
    }

    /// Static position; shorthand for a [`ConstantPositionMobility`].
    pub fn position(mut self, position: Vector3) -> Self {
        self.mobility = Some(Arc::new(ConstantPositionMobility::new(position)));
        self
    }

    pub fn mobility(mut self, mobility: Arc<dyn MobilityModel>) -> Self {
        self.mobility = Some(mobility);
        self
    }

    pub fn antenna(mut self, antenna: AntennaHandle) -> Self {
        self.antenna = Some(antenna);
        self
    }

    pub fn build(self) -> Arc<TestPhy> {
        Arc::new(TestPhy {
            id: PhyId::allocate(),
            device: self.device,
            mobility: self.mobility,
            rx_model: RwLock::new(self.rx_model),
            antenna: self.antenna,
            received: Mutex::new(Vec::new()),
        })
    }
}
