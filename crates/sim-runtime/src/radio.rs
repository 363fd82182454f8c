//! The radio endpoint installed on each simulated vehicle.

use parking_lot::Mutex;
use serde::Serialize;
use shared_types::units::watts_to_dbm;
use shared_types::{DeviceInfo, PhyId, SimTime, Vector3};
use std::sync::Arc;
use tracing::trace;
use vs_02_spectrum_channel::adapters::ConstantPositionMobility;
use vs_02_spectrum_channel::{
    AntennaHandle, MobilityModel, SignalParameters, SpectrumModel, SpectrumPhy,
    SpectrumValue,
};
use vs_telemetry::metrics;

/// What a radio has received so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReceptionStats {
    pub receptions: u64,
    /// Sum of the received PSD integrals.
    pub total_power_w: f64,
    pub strongest_power_w: f64,
    pub last_sender: Option<PhyId>,
}

impl ReceptionStats {
    pub fn mean_power_dbm(&self) -> Option<f64> {
        (self.receptions > 0 && self.total_power_w > 0.0)
            .then(|| watts_to_dbm(self.total_power_w / self.receptions as f64))
    }

    pub fn strongest_dbm(&self) -> Option<f64> {
        (self.strongest_power_w > 0.0).then(|| watts_to_dbm(self.strongest_power_w))
    }
}

pub struct VehicleRadio {
    id: PhyId,
    device: DeviceInfo,
    technology: String,
    model: Arc<SpectrumModel>,
    mobility: Arc<ConstantPositionMobility>,
    velocity: Vector3,
    antenna: AntennaHandle,
    tx_power_dbm: f64,
    stats: Mutex<ReceptionStats>,
}

impl VehicleRadio {
    pub fn new(
        device: DeviceInfo,
        technology: impl Into<String>,
        model: Arc<SpectrumModel>,
        position: Vector3,
        velocity: Vector3,
        antenna: AntennaHandle,
        tx_power_dbm: f64,
    ) -> Self {
        Self {
            id: PhyId::allocate(),
            device,
            technology: technology.into(),
            model,
            mobility: Arc::new(ConstantPositionMobility::new(position)),
            velocity,
            antenna,
            tx_power_dbm,
            stats: Mutex::new(ReceptionStats::default()),
        }
    }

    pub fn technology(&self) -> &str {
        &self.technology
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.device
    }

    pub fn position(&self) -> Vector3 {
        self.mobility.position()
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vector3::default()
    }

    /// Move along the configured velocity for `elapsed`.
    pub fn advance(&self, elapsed: SimTime) {
        let dt = elapsed.as_secs_f64();
        let p = self.mobility.position();
        let v = self.velocity;
        self.mobility
            .set_position(Vector3::new(p.x + v.x * dt, p.y + v.y * dt, p.z + v.z * dt));
    }

    /// The signal of one broadcast, spread evenly over the radio's bands.
    pub fn broadcast_signal(self: &Arc<Self>, duration: SimTime) -> SignalParameters {
        let psd = SpectrumValue::from_tx_power_dbm(Arc::clone(&self.model), self.tx_power_dbm);
        let params = SignalParameters::new(Arc::clone(self) as Arc<dyn SpectrumPhy>, psd, duration);
        match self.antenna.as_pattern() {
            Some(pattern) => params.with_tx_antenna(Arc::clone(pattern)),
            None => params,
        }
    }

    pub fn stats(&self) -> ReceptionStats {
        self.stats.lock().clone()
    }
}

impl SpectrumPhy for VehicleRadio {
    fn id(&self) -> PhyId {
        self.id
    }

    fn device(&self) -> Option<DeviceInfo> {
        Some(self.device)
    }

    fn mobility(&self) -> Option<Arc<dyn MobilityModel>> {
        Some(Arc::clone(&self.mobility) as Arc<dyn MobilityModel>)
    }

    fn rx_spectrum_model(&self) -> Option<Arc<SpectrumModel>> {
        Some(Arc::clone(&self.model))
    }

    fn antenna(&self) -> Option<AntennaHandle> {
        Some(self.antenna.clone())
    }

    fn start_rx(&self, params: SignalParameters) {
        let power_w = params.psd.integral();
        {
            let mut stats = self.stats.lock();
            stats.receptions += 1;
            stats.total_power_w += power_w;
            stats.strongest_power_w = stats.strongest_power_w.max(power_w);
            stats.last_sender = Some(params.tx_phy.id());
        }
        metrics::RECEPTIONS
            .with_label_values(&[self.technology.as_str()])
            .inc();
        trace!(rx = %self.id, tx = %params.tx_phy.id(), power_w, "reception started");
    }
}
