//! Tx/Rx spectrum model bookkeeping.
//!
//! Every model a transmitter used gets a `TxModelEntry` holding a converter
//! to each known Rx model it overlaps. Every model a receiver listens on
//! gets an `RxModelEntry` listing its receivers. Both maps are ordered by
//! model id so that iteration, and thus delivery scheduling, is
//! deterministic.
//!
//! A converter exists for `(tx, rx)` iff the ids differ and the layouts
//! are not orthogonal, regardless of which side was seen first.

use shared_types::PhyId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

use super::converter::SpectrumConverter;
use super::spectrum::{SpectrumModel, SpectrumModelId};
use crate::errors::ChannelError;
use crate::ports::outbound::SpectrumPhy;

fn needs_converter(from: &SpectrumModel, to: &SpectrumModel) -> bool {
    from.id() != to.id() && !from.is_orthogonal(to)
}

#[derive(Clone, Debug)]
pub struct TxModelEntry {
    model: Arc<SpectrumModel>,
    converters: BTreeMap<SpectrumModelId, Arc<SpectrumConverter>>,
}

impl TxModelEntry {
    fn new(model: Arc<SpectrumModel>) -> Self {
        Self {
            model,
            converters: BTreeMap::new(),
        }
    }

    pub fn model(&self) -> &Arc<SpectrumModel> {
        &self.model
    }

    pub fn converter(&self, rx: SpectrumModelId) -> Option<&Arc<SpectrumConverter>> {
        self.converters.get(&rx)
    }

    pub fn converter_targets(&self) -> impl Iterator<Item = SpectrumModelId> + '_ {
        self.converters.keys().copied()
    }

    /// Returns true if a converter was built.
    fn link(&mut self, rx_model: &Arc<SpectrumModel>) -> bool {
        if !needs_converter(&self.model, rx_model) || self.converters.contains_key(&rx_model.id()) {
            return false;
        }
        trace!(from = %self.model.id(), to = %rx_model.id(), "building spectrum converter");
        self.converters.insert(
            rx_model.id(),
            Arc::new(SpectrumConverter::new(
                Arc::clone(&self.model),
                Arc::clone(rx_model),
            )),
        );
        true
    }
}

#[derive(Clone)]
pub struct RxModelEntry {
    model: Arc<SpectrumModel>,
    phys: Vec<Arc<dyn SpectrumPhy>>,
}

impl RxModelEntry {
    pub fn model(&self) -> &Arc<SpectrumModel> {
        &self.model
    }

    pub fn phys(&self) -> &[Arc<dyn SpectrumPhy>] {
        &self.phys
    }

    fn position(&self, id: PhyId) -> Option<usize> {
        self.phys.iter().position(|p| p.id() == id)
    }
}

impl std::fmt::Debug for RxModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<PhyId> = self.phys.iter().map(|p| p.id()).collect();
        f.debug_struct("RxModelEntry")
            .field("model", &self.model.id())
            .field("phys", &ids)
            .finish()
    }
}

/// Result of `add_rx`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RxRegistration {
    pub model: SpectrumModelId,
    /// The endpoint was registered before and has been moved.
    pub replaced: bool,
    /// The Rx model was new to the registry.
    pub new_model: bool,
    pub converters_created: usize,
}

#[derive(Debug, Default)]
pub struct ModelRegistry {
    tx: BTreeMap<SpectrumModelId, TxModelEntry>,
    rx: BTreeMap<SpectrumModelId, RxModelEntry>,
    device_count: usize,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `phy` on its current Rx model, moving it if it was already
    /// registered under any model.
    pub fn add_rx(&mut self, phy: Arc<dyn SpectrumPhy>) -> Result<RxRegistration, ChannelError> {
        let model = phy
            .rx_spectrum_model()
            .ok_or(ChannelError::MissingRxSpectrumModel(phy.id()))?;
        let replaced = self.remove_rx(phy.id());

        let mut converters_created = 0;
        let new_model = !self.rx.contains_key(&model.id());
        if new_model {
            for tx in self.tx.values_mut() {
                if tx.link(&model) {
                    converters_created += 1;
                }
            }
            debug!(model = %model.id(), bands = model.num_bands(), converters_created, "new rx spectrum model");
        }

        self.rx
            .entry(model.id())
            .or_insert_with(|| RxModelEntry {
                model: Arc::clone(&model),
                phys: Vec::new(),
            })
            .phys
            .push(phy);
        self.device_count += 1;

        Ok(RxRegistration {
            model: model.id(),
            replaced,
            new_model,
            converters_created,
        })
    }

    /// Remove `id` from the first group that lists it.
    pub fn remove_rx(&mut self, id: PhyId) -> bool {
        for entry in self.rx.values_mut() {
            if let Some(pos) = entry.position(id) {
                entry.phys.remove(pos);
                self.device_count -= 1;
                return true;
            }
        }
        false
    }

    /// Existing entry for `model`, or a new one linked to every known Rx
    /// model. The second value is the number of converters built.
    pub fn find_or_add_tx(&mut self, model: &Arc<SpectrumModel>) -> (&TxModelEntry, usize) {
        let rx = &self.rx;
        let mut created = 0;
        let entry = self.tx.entry(model.id()).or_insert_with(|| {
            let mut entry = TxModelEntry::new(Arc::clone(model));
            for rx_entry in rx.values() {
                if entry.link(&rx_entry.model) {
                    created += 1;
                }
            }
            debug!(model = %model.id(), bands = model.num_bands(), converters_created = created, "new tx spectrum model");
            entry
        });
        (&*entry, created)
    }

    pub fn tx_entry(&self, model: SpectrumModelId) -> Option<&TxModelEntry> {
        self.tx.get(&model)
    }

    pub fn converter(
        &self,
        tx: SpectrumModelId,
        rx: SpectrumModelId,
    ) -> Option<&Arc<SpectrumConverter>> {
        self.tx.get(&tx)?.converter(rx)
    }

    pub fn rx_groups(&self) -> impl Iterator<Item = &RxModelEntry> {
        self.rx.values()
    }

    pub fn device_count(&self) -> usize {
        self.device_count
    }

    /// `index`-th receiver across all groups, in model-id order. O(n).
    pub fn device_at(&self, index: usize) -> Option<&Arc<dyn SpectrumPhy>> {
        self.rx.values().flat_map(|e| e.phys.iter()).nth(index)
    }

    pub fn converter_pairs(&self) -> Vec<(SpectrumModelId, SpectrumModelId)> {
        self.tx
            .iter()
            .flat_map(|(tx, e)| e.converter_targets().map(move |rx| (*tx, rx)))
            .collect()
    }

    pub fn converter_count(&self) -> usize {
        self.tx.values().map(|e| e.converters.len()).sum()
    }

    pub fn tx_model_count(&self) -> usize {
        self.tx.len()
    }

    pub fn rx_model_count(&self) -> usize {
        self.rx.len()
    }

    pub fn clear(&mut self) {
        self.tx.clear();
        self.rx.clear();
        self.device_count = 0;
    }
}
