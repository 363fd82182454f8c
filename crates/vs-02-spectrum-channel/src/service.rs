//! # Multi-Model Spectrum Channel
//!
//! The broadcast medium shared by radios that may describe their signals
//! over different spectrum models.
//!
//! ## Transmission
//!
//! ```text
//! start_tx(params)
//!   └─ resolve Tx model entry (lazily building converters)
//!        └─ for each Rx model group (ascending model id)
//!             ├─ same model      → PSD as is
//!             ├─ converter       → converted PSD
//!             └─ no converter    → orthogonal, skip group
//!                  └─ for each receiver in the group
//!                       ├─ skip self / same node
//!                       ├─ propagation pipeline (gain, loss, delay)
//!                       ├─ observers see the delivered link
//!                       └─ schedule start_rx at now + delay
//! ```
//!
//! Deliveries are always scheduled through the [`Scheduler`] port; nothing
//! is delivered inline.

use parking_lot::RwLock;
use shared_types::{DeviceInfo, PhyId, SimTime};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::domain::{
    ChannelConfig, ChannelModels, GainTrace, ModelRegistry, PathLossTrace, PropagationOutcome,
    PropagationPipeline, SignalParameters, SpectrumModel, SpectrumModelId, SpectrumValue,
    TransmissionStats, TxModelEntry, TxSignalTrace,
};
use crate::errors::ChannelError;
use crate::ports::inbound::SpectrumChannelApi;
use crate::ports::outbound::{ChannelObserver, DeliveredLink, RxDelivery, Scheduler, SpectrumPhy};

/// One Rx model group as seen by a single transmission.
struct GroupWork {
    model: SpectrumModelId,
    psd: SpectrumValue,
    phys: Vec<Arc<dyn SpectrumPhy>>,
}

/// Spectrum channel supporting any mix of spectrum models.
///
/// ## Thread Safety
///
/// Shareable via `Arc`. The registry sits behind a `RwLock` that is never
/// held while calling into endpoints, models or the scheduler.
pub struct MultiModelSpectrumChannel<S: Scheduler> {
    config: ChannelConfig,
    models: ChannelModels,
    registry: RwLock<ModelRegistry>,
    scheduler: Arc<S>,
    observers: RwLock<Vec<Arc<dyn ChannelObserver>>>,
}

impl<S: Scheduler> MultiModelSpectrumChannel<S> {
    pub fn new(config: ChannelConfig, models: ChannelModels, scheduler: Arc<S>) -> Self {
        info!(max_loss_db = config.max_loss_db, models = ?models, "spectrum channel created");
        Self {
            config,
            models,
            registry: RwLock::new(ModelRegistry::new()),
            scheduler,
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn models(&self) -> &ChannelModels {
        &self.models
    }

    pub fn scheduler(&self) -> &Arc<S> {
        &self.scheduler
    }

    pub fn add_observer(&self, observer: Arc<dyn ChannelObserver>) {
        self.observers.write().push(observer);
    }

    /// Tx entry for `model`, created and linked to every Rx model if new.
    pub fn find_or_add_tx_model(&self, model: &Arc<SpectrumModel>) -> TxModelEntry {
        let (entry, created) = {
            let mut registry = self.registry.write();
            let (entry, created) = registry.find_or_add_tx(model);
            (entry.clone(), created)
        };
        if created > 0 {
            self.notify(|o| o.on_converters_created(created));
        }
        entry
    }

    pub fn has_converter(&self, tx: SpectrumModelId, rx: SpectrumModelId) -> bool {
        self.registry.read().converter(tx, rx).is_some()
    }

    pub fn converter_count(&self) -> usize {
        self.registry.read().converter_count()
    }

    pub fn tx_model_count(&self) -> usize {
        self.registry.read().tx_model_count()
    }

    pub fn rx_model_count(&self) -> usize {
        self.registry.read().rx_model_count()
    }

    /// Receiver handle at `index`, in the same order as `get_device`.
    pub fn get_phy(&self, index: usize) -> Result<Arc<dyn SpectrumPhy>, ChannelError> {
        let registry = self.registry.read();
        registry
            .device_at(index)
            .cloned()
            .ok_or(ChannelError::DeviceIndexOutOfRange {
                index,
                count: registry.device_count(),
            })
    }

    /// Drop every registration and converter.
    pub fn dispose(&self) {
        self.registry.write().clear();
        self.notify(|o| o.on_device_count(0));
        info!("spectrum channel disposed");
    }

    fn notify(&self, f: impl Fn(&dyn ChannelObserver)) {
        for o in self.observers.read().iter() {
            f(o.as_ref());
        }
    }

    /// Snapshot the work of one transmission under a single registry lock.
    ///
    /// Also returns the number of converters built for a new Tx model.
    fn plan(
        &self,
        params: &SignalParameters,
        stats: &mut TransmissionStats,
    ) -> Result<(Vec<GroupWork>, usize), ChannelError> {
        let tx_model = Arc::clone(params.psd.model());
        let mut registry = self.registry.write();
        let (_, created) = registry.find_or_add_tx(&tx_model);

        let mut work = Vec::new();
        for group in registry.rx_groups() {
            let rx_id = group.model().id();
            let psd = if rx_id == tx_model.id() {
                params.psd.clone()
            } else if let Some(conv) = registry.converter(tx_model.id(), rx_id) {
                conv.convert(&params.psd)?
            } else {
                trace!(tx_model = %tx_model.id(), rx_model = %rx_id, "orthogonal group skipped");
                stats.skipped_orthogonal_groups += 1;
                continue;
            };
            work.push(GroupWork {
                model: rx_id,
                psd,
                phys: group.phys().to_vec(),
            });
        }
        Ok((work, created))
    }

    fn is_self_or_same_node(tx: &dyn SpectrumPhy, rx: &dyn SpectrumPhy) -> bool {
        if tx.id() == rx.id() {
            return true;
        }
        match (tx.device(), rx.device()) {
            (Some(a), Some(b)) => a.same_node(&b),
            _ => false,
        }
    }

    /// Fails on the first receiver of `work` that now listens on a model
    /// other than the one it was registered under.
    fn check_rx_models(tx: &dyn SpectrumPhy, work: &[GroupWork]) -> Result<(), ChannelError> {
        for group in work {
            for rx in &group.phys {
                if Self::is_self_or_same_node(tx, rx.as_ref()) {
                    continue;
                }
                let current = rx.rx_spectrum_model().map(|m| m.id());
                if current != Some(group.model) {
                    return Err(ChannelError::StaleRxModel {
                        phy: rx.id(),
                        registered: group.model,
                        current,
                    });
                }
            }
        }
        Ok(())
    }

    fn schedule_delivery(
        &self,
        receiver: Arc<dyn SpectrumPhy>,
        delay: SimTime,
        params: SignalParameters,
    ) {
        let context = receiver.device().map(|d| d.node_id);
        let delivery = RxDelivery { receiver, params };
        match context {
            Some(node) => self.scheduler.schedule_with_context(node, delay, delivery),
            None => self.scheduler.schedule(delay, delivery),
        }
    }
}

impl<S: Scheduler> SpectrumChannelApi for MultiModelSpectrumChannel<S> {
    fn add_rx(&self, phy: Arc<dyn SpectrumPhy>) -> Result<(), ChannelError> {
        let id = phy.id();
        let (registration, count) = {
            let mut registry = self.registry.write();
            let registration = registry.add_rx(phy)?;
            (registration, registry.device_count())
        };
        debug!(
            phy = %id,
            model = %registration.model,
            replaced = registration.replaced,
            converters_created = registration.converters_created,
            devices = count,
            "receiver added"
        );
        if registration.converters_created > 0 {
            self.notify(|o| o.on_converters_created(registration.converters_created));
        }
        self.notify(|o| o.on_device_count(count));
        Ok(())
    }

    fn remove_rx(&self, phy: PhyId) -> bool {
        let (removed, count) = {
            let mut registry = self.registry.write();
            let removed = registry.remove_rx(phy);
            (removed, registry.device_count())
        };
        if removed {
            debug!(phy = %phy, devices = count, "receiver removed");
            self.notify(|o| o.on_device_count(count));
        }
        removed
    }

    fn start_tx(&self, params: SignalParameters) -> Result<TransmissionStats, ChannelError> {
        let tx_phy = Arc::clone(&params.tx_phy);
        let mut stats = TransmissionStats::for_phy(tx_phy.id());

        let tx_trace = TxSignalTrace {
            at: self.scheduler.now(),
            tx_phy: tx_phy.id(),
            model: params.psd.model_id(),
            duration: params.duration,
            total_power_w: params.psd.integral(),
        };
        self.notify(|o| o.on_tx_signal(&tx_trace));

        let (work, created) = self.plan(&params, &mut stats)?;
        if created > 0 {
            self.notify(|o| o.on_converters_created(created));
        }
        if self.config.strict_rx_model {
            Self::check_rx_models(tx_phy.as_ref(), &work)?;
        }
        let pipeline = PropagationPipeline::new(&self.models, self.config.max_loss_db);

        for group in work {
            for rx in group.phys {
                if Self::is_self_or_same_node(tx_phy.as_ref(), rx.as_ref()) {
                    stats.skipped_self_or_same_node += 1;
                    continue;
                }

                let current = rx.rx_spectrum_model().map(|m| m.id());
                if current != Some(group.model) {
                    warn!(
                        phy = %rx.id(),
                        registered = %group.model,
                        current = ?current,
                        "receiver spectrum model changed without re-registration"
                    );
                }

                let link = params.copy_with_psd(group.psd.clone());
                let outcome = pipeline.evaluate(&link, rx.as_ref())?;

                let budget = match &outcome {
                    PropagationOutcome::Deliver { budget, .. } => *budget,
                    PropagationOutcome::OutOfRange(budget) => Some(*budget),
                };
                if let Some(budget) = budget {
                    let path_loss = PathLossTrace {
                        tx_phy: tx_phy.id(),
                        rx_phy: rx.id(),
                        path_loss_db: budget.path_loss_db,
                    };
                    let gain = GainTrace {
                        tx_phy: tx_phy.id(),
                        rx_phy: rx.id(),
                        budget,
                    };
                    self.notify(|o| {
                        o.on_path_loss(&path_loss);
                        o.on_gain(&gain);
                    });
                }

                match outcome {
                    PropagationOutcome::OutOfRange(budget) => {
                        trace!(rx = %rx.id(), path_loss_db = budget.path_loss_db, "out of range");
                        stats.dropped_out_of_range += 1;
                    }
                    PropagationOutcome::Deliver { psd, delay, .. } => {
                        let delivered = DeliveredLink {
                            at: tx_trace.at,
                            tx: tx_phy.as_ref(),
                            rx: rx.as_ref(),
                            tx_psd: &params.psd,
                            duration: params.duration,
                            delay,
                        };
                        self.notify(|o| o.on_link_delivered(&delivered));
                        let rx_params = link.copy_with_psd(psd);
                        self.schedule_delivery(rx, delay, rx_params);
                        stats.scheduled += 1;
                    }
                }
            }
        }

        debug!(
            tx = %tx_phy.id(),
            scheduled = stats.scheduled,
            out_of_range = stats.dropped_out_of_range,
            orthogonal = stats.skipped_orthogonal_groups,
            "transmission propagated"
        );
        self.notify(|o| o.on_tx_complete(&stats));
        Ok(stats)
    }

    fn start_rx(&self, phy: &Arc<dyn SpectrumPhy>, params: SignalParameters) {
        phy.start_rx(params);
    }

    fn n_devices(&self) -> usize {
        self.registry.read().device_count()
    }

    fn get_device(&self, index: usize) -> Result<Option<DeviceInfo>, ChannelError> {
        self.get_phy(index).map(|p| p.device())
    }
}
