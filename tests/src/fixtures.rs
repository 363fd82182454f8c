//! Shared test fixtures.

use parking_lot::Mutex;
use shared_types::{DeviceInfo, NodeId, PhyId, SimTime, Vector3};
use std::sync::Arc;
use vs_01_event_scheduler::{SchedulerConfig, Simulator};
use vs_02_spectrum_channel::adapters::{ConstantPositionMobility, SimulatorScheduler};
use vs_02_spectrum_channel::{
    AntennaHandle, ChannelConfig, ChannelModels, MobilityModel, MultiModelSpectrumChannel,
    SignalParameters, SpectrumModel, SpectrumPhy, SpectrumValue,
};

pub type SimChannel = MultiModelSpectrumChannel<SimulatorScheduler>;

/// A reception as observed inside the simulator.
#[derive(Debug, Clone)]
pub struct Reception {
    pub at: SimTime,
    pub context: Option<NodeId>,
    pub from: PhyId,
    pub psd: SpectrumValue,
}

/// Endpoint that records when, and in which context, it received.
pub struct TimedPhy {
    id: PhyId,
    simulator: Arc<Simulator>,
    device: Option<DeviceInfo>,
    mobility: Option<Arc<dyn MobilityModel>>,
    model: Arc<SpectrumModel>,
    log: Mutex<Vec<Reception>>,
    /// Shared across endpoints to observe global delivery order.
    order: Arc<Mutex<Vec<PhyId>>>,
}

impl TimedPhy {
    pub fn receptions(&self) -> Vec<Reception> {
        self.log.lock().clone()
    }

    pub fn as_phy(self: &Arc<Self>) -> Arc<dyn SpectrumPhy> {
        Arc::clone(self) as Arc<dyn SpectrumPhy>
    }

    /// Flat PSD over the endpoint's own model.
    pub fn signal(self: &Arc<Self>, value: f64) -> SignalParameters {
        SignalParameters::new(
            self.as_phy(),
            SpectrumValue::flat(Arc::clone(&self.model), value),
            SimTime::from_micros(100),
        )
    }
}

impl SpectrumPhy for TimedPhy {
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
        Some(Arc::clone(&self.model))
    }

    fn antenna(&self) -> Option<AntennaHandle> {
        None
    }

    fn start_rx(&self, params: SignalParameters) {
        self.log.lock().push(Reception {
            at: self.simulator.now(),
            context: self.simulator.current_context(),
            from: params.tx_phy.id(),
            psd: params.psd,
        });
        self.order.lock().push(self.id);
    }
}

/// A simulator with a channel attached to it.
pub struct SimHarness {
    pub simulator: Arc<Simulator>,
    pub channel: Arc<SimChannel>,
    pub order: Arc<Mutex<Vec<PhyId>>>,
}

impl SimHarness {
    pub fn new(config: ChannelConfig, models: ChannelModels) -> Self {
        let simulator = Arc::new(Simulator::new(SchedulerConfig::default()));
        let channel = Arc::new(MultiModelSpectrumChannel::new(
            config,
            models,
            Arc::new(SimulatorScheduler::new(Arc::clone(&simulator))),
        ));
        Self {
            simulator,
            channel,
            order: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn lossless() -> Self {
        Self::new(ChannelConfig::default(), ChannelModels::new())
    }

    /// Endpoint on `model`, optionally on `node` and at `position`.
    pub fn phy(
        &self,
        model: &Arc<SpectrumModel>,
        node: Option<(u32, u32)>,
        position: Option<Vector3>,
    ) -> Arc<TimedPhy> {
        Arc::new(TimedPhy {
            id: PhyId::allocate(),
            simulator: Arc::clone(&self.simulator),
            device: node.map(|(n, d)| DeviceInfo::new(NodeId(n), d)),
            mobility: position
                .map(|p| Arc::new(ConstantPositionMobility::new(p)) as Arc<dyn MobilityModel>),
            model: Arc::clone(model),
            log: Mutex::new(Vec::new()),
            order: Arc::clone(&self.order),
        })
    }

    /// Global delivery order observed so far.
    pub fn delivery_order(&self) -> Vec<PhyId> {
        self.order.lock().clone()
    }
}

pub fn uniform(start: f64, width: f64, count: usize) -> Arc<SpectrumModel> {
    Arc::new(
        SpectrumModel::uniform(start, width, count)
            .unwrap_or_else(|e| panic!("invalid test layout: {e}")),
    )
}
