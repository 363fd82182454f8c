//! Cross-technology interference accounting.
//!
//! ITS-G5, LTE-V2X and NR-V2X radios can share a channel while describing
//! their signals over unrelated band layouts. For every delivered link
//! between radios of two different technologies whose channels overlap,
//! the tracker integrates the transmitted PSD over the bins centered inside
//! the victim's channel, runs that power through the propagation loss
//! model and records the result against the victim if it reaches the
//! sensitivity threshold.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use shared_types::units::{dbm_to_watts, watts_to_dbm};
use shared_types::PhyId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};
use vs_telemetry::metrics;

use crate::domain::{InterferenceStats, SpectrumValue, TechnologyBand};
use crate::errors::ChannelError;
use crate::ports::outbound::{ChannelObserver, DeliveredLink, MobilityModel, PropagationLossModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoexistenceConfig {
    /// Interference below this power at the victim is ignored, dBm.
    pub sensitivity_dbm: f64,
}

impl Default for CoexistenceConfig {
    fn default() -> Self {
        Self {
            sensitivity_dbm: -101.0,
        }
    }
}

pub struct CoexistenceInterferenceTracker {
    sensitivity_dbm: f64,
    propagation_loss: Option<Arc<dyn PropagationLossModel>>,
    technologies: HashMap<String, TechnologyBand>,
    radios: RwLock<HashMap<PhyId, String>>,
    interference: Mutex<HashMap<PhyId, InterferenceStats>>,
}

impl CoexistenceInterferenceTracker {
    pub fn new(
        config: &CoexistenceConfig,
        propagation_loss: Option<Arc<dyn PropagationLossModel>>,
    ) -> Self {
        Self {
            sensitivity_dbm: config.sensitivity_dbm,
            propagation_loss,
            technologies: HashMap::new(),
            radios: RwLock::new(HashMap::new()),
            interference: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_technology(mut self, band: TechnologyBand) -> Self {
        self.technologies.insert(band.name.clone(), band);
        self
    }

    pub fn technology(&self, name: &str) -> Option<&TechnologyBand> {
        self.technologies.get(name)
    }

    /// Declare which technology `phy` runs.
    pub fn register(&self, phy: PhyId, technology: &str) -> Result<(), ChannelError> {
        if !self.technologies.contains_key(technology) {
            return Err(ChannelError::UnknownTechnology(technology.to_string()));
        }
        self.radios.write().insert(phy, technology.to_string());
        Ok(())
    }

    pub fn technology_of(&self, phy: PhyId) -> Option<String> {
        self.radios.read().get(&phy).cloned()
    }

    /// Everything `phy` has suffered so far; zero if nothing.
    pub fn interference(&self, phy: PhyId) -> InterferenceStats {
        self.interference
            .lock()
            .get(&phy)
            .copied()
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<PhyId, InterferenceStats> {
        self.interference
            .lock()
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect()
    }

    pub fn clear(&self) {
        self.interference.lock().clear();
    }

    /// Interference power in dBm that `psd`, sent by `aggressor`, puts into
    /// `victim`'s channel at the victim's position.
    ///
    /// `None` when the channels do not overlap, no transmitted bin falls
    /// inside the victim channel, or the result is below the sensitivity.
    pub fn interference_dbm(
        &self,
        psd: &SpectrumValue,
        aggressor: &TechnologyBand,
        victim: &TechnologyBand,
        tx_mobility: Option<&dyn MobilityModel>,
        rx_mobility: Option<&dyn MobilityModel>,
    ) -> Option<f64> {
        if !aggressor.overlaps(victim) {
            return None;
        }
        let power_w = victim.in_band_power_w(psd);
        if power_w <= 0.0 {
            return None;
        }
        let tx_dbm = watts_to_dbm(power_w);
        let rx_dbm = match (&self.propagation_loss, tx_mobility, rx_mobility) {
            (Some(loss), Some(a), Some(b)) => loss.calc_rx_power(tx_dbm, a, b),
            _ => tx_dbm,
        };
        trace!(
            aggressor = %aggressor.name,
            victim = %victim.name,
            tx_dbm,
            rx_dbm,
            "coexistence link"
        );
        (rx_dbm >= self.sensitivity_dbm).then_some(rx_dbm)
    }
}

impl ChannelObserver for CoexistenceInterferenceTracker {
    fn on_link_delivered(&self, link: &DeliveredLink<'_>) {
        let (tx_tech, rx_tech) = {
            let radios = self.radios.read();
            match (radios.get(&link.tx.id()), radios.get(&link.rx.id())) {
                (Some(t), Some(r)) if t != r => (t.clone(), r.clone()),
                _ => return,
            }
        };
        let (Some(aggressor), Some(victim)) =
            (self.technologies.get(&tx_tech), self.technologies.get(&rx_tech))
        else {
            return;
        };

        let tx_mob = link.tx.mobility();
        let rx_mob = link.rx.mobility();
        let Some(rx_dbm) = self.interference_dbm(
            link.tx_psd,
            aggressor,
            victim,
            tx_mob.as_deref(),
            rx_mob.as_deref(),
        ) else {
            return;
        };

        self.interference
            .lock()
            .entry(link.rx.id())
            .or_default()
            .record(dbm_to_watts(rx_dbm), link.duration);
        metrics::COEXISTENCE_INTERFERENCE
            .with_label_values(&[victim.name.as_str()])
            .inc();
        debug!(
            tx = %link.tx.id(),
            rx = %link.rx.id(),
            aggressor = %aggressor.name,
            victim = %victim.name,
            rx_dbm,
            "cross-technology interference"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedRssLoss, LogDistancePropagationLoss, RecordingScheduler};
    use crate::domain::{ChannelConfig, ChannelModels, SignalParameters, SpectrumModel};
    use crate::ports::inbound::SpectrumChannelApi;
    use crate::ports::outbound::SpectrumPhy;
    use crate::service::MultiModelSpectrumChannel;
    use crate::testing::TestPhy;
    use shared_types::{NodeId, SimTime, Vector3};

    // ITS-G5 on one 10 MHz bin, NR-V2X on ten 2 MHz bins straddling its upper edge.
    fn g5_model() -> Arc<SpectrumModel> {
        Arc::new(SpectrumModel::uniform(5.895e9, 10e6, 1).unwrap())
    }

    fn nr_model() -> Arc<SpectrumModel> {
        Arc::new(SpectrumModel::uniform(5.9005e9, 2e6, 10).unwrap())
    }

    fn tracker(
        loss: Option<Arc<dyn PropagationLossModel>>,
        g5: &SpectrumModel,
        nr: &SpectrumModel,
    ) -> CoexistenceInterferenceTracker {
        CoexistenceInterferenceTracker::new(&CoexistenceConfig::default(), loss)
            .with_technology(TechnologyBand::from_model("its-g5", g5))
            .with_technology(TechnologyBand::from_model("nr-v2x", nr))
    }

    #[test]
    fn test_register_unknown_technology() {
        let (g5, nr) = (g5_model(), nr_model());
        let t = tracker(None, &g5, &nr);
        let phy = PhyId::allocate();
        assert_eq!(
            t.register(phy, "lte"),
            Err(ChannelError::UnknownTechnology("lte".into()))
        );
        t.register(phy, "nr-v2x").unwrap();
        assert_eq!(t.technology_of(phy).as_deref(), Some("nr-v2x"));
    }

    #[test]
    fn test_only_bins_inside_victim_channel_count() {
        let (g5, nr) = (g5_model(), nr_model());
        let t = tracker(None, &g5, &nr);
        // NR bins centered at 5.9015, 5.9035 GHz fall in 5.895..5.905 GHz.
        let psd = SpectrumValue::flat(Arc::clone(&nr), 1e-9);
        let dbm = t
            .interference_dbm(
                &psd,
                t.technology("nr-v2x").unwrap(),
                t.technology("its-g5").unwrap(),
                None,
                None,
            )
            .unwrap();
        assert!((dbm - watts_to_dbm(2.0 * 2e6 * 1e-9)).abs() < 1e-9);
    }

    #[test]
    fn test_propagation_loss_and_sensitivity() {
        let (g5, nr) = (g5_model(), nr_model());
        let a = crate::adapters::ConstantPositionMobility::new(Vector3::new(0.0, 0.0, 0.0));
        let b = crate::adapters::ConstantPositionMobility::new(Vector3::new(10.0, 0.0, 0.0));
        let psd = SpectrumValue::flat(Arc::clone(&nr), 1e-9);

        let lossy = tracker(Some(Arc::new(LogDistancePropagationLoss::default())), &g5, &nr);
        let (aggr, victim) = (
            lossy.technology("nr-v2x").unwrap(),
            lossy.technology("its-g5").unwrap(),
        );
        let dbm = lossy
            .interference_dbm(&psd, aggr, victim, Some(&a), Some(&b))
            .unwrap();
        let expected = watts_to_dbm(4e-3) - (46.6777 + 30.0);
        assert!((dbm - expected).abs() < 1e-9);

        let buried = tracker(Some(Arc::new(FixedRssLoss { rss_dbm: -120.0 })), &g5, &nr);
        assert_eq!(
            buried.interference_dbm(&psd, aggr, victim, Some(&a), Some(&b)),
            None
        );
    }

    #[test]
    fn test_disjoint_channels_never_interfere() {
        let g5 = g5_model();
        let lte = Arc::new(SpectrumModel::uniform(2.62e9, 180e3, 50).unwrap());
        let t = CoexistenceInterferenceTracker::new(&CoexistenceConfig::default(), None)
            .with_technology(TechnologyBand::from_model("its-g5", &g5))
            .with_technology(TechnologyBand::from_model("lte", &lte));
        let psd = SpectrumValue::flat(Arc::clone(&lte), 1.0);
        assert_eq!(
            t.interference_dbm(
                &psd,
                t.technology("lte").unwrap(),
                t.technology("its-g5").unwrap(),
                None,
                None
            ),
            None
        );
    }

    #[test]
    fn test_driven_by_channel_links() {
        let (g5, nr) = (g5_model(), nr_model());
        let t = Arc::new(tracker(None, &g5, &nr));
        let ch = MultiModelSpectrumChannel::new(
            ChannelConfig::default(),
            ChannelModels::new(),
            Arc::new(RecordingScheduler::new()),
        );
        ch.add_observer(t.clone());

        let nr_tx = TestPhy::builder().rx_model(&nr).device(NodeId(1), 0).build();
        let g5_rx = TestPhy::builder().rx_model(&g5).device(NodeId(2), 0).build();
        let nr_rx = TestPhy::builder().rx_model(&nr).device(NodeId(3), 0).build();
        for phy in [&nr_tx, &g5_rx, &nr_rx] {
            ch.add_rx(phy.as_phy()).unwrap();
        }
        t.register(nr_tx.id(), "nr-v2x").unwrap();
        t.register(g5_rx.id(), "its-g5").unwrap();
        t.register(nr_rx.id(), "nr-v2x").unwrap();

        let psd = SpectrumValue::flat(Arc::clone(&nr), 1e-9);
        let stats = ch
            .start_tx(SignalParameters::new(nr_tx.as_phy(), psd, SimTime::from_millis(1)))
            .unwrap();
        assert_eq!(stats.scheduled, 2);

        let hit = t.interference(g5_rx.id());
        assert_eq!(hit.events, 1);
        assert!((hit.total_power_w - 4e-3).abs() < 1e-12);
        assert!((hit.energy_j - 4e-6).abs() < 1e-15);
        // Same technology is ordinary reception, not coexistence interference.
        assert_eq!(t.interference(nr_rx.id()).events, 0);
        assert_eq!(t.snapshot().len(), 1);
    }
}
