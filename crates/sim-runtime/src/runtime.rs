//! # Simulation Runtime
//!
//! ## Startup Sequence
//!
//! 1. Validate the scenario
//! 2. Build one spectrum model per technology
//! 3. Create the simulator and the channel with the configured models
//! 4. Register one `VehicleRadio` per configured radio, and its technology
//!    with the coexistence tracker
//! 5. Schedule broadcast streams and position feeds
//! 6. Run to the scenario horizon and collect the report
//!
//! A channel configuration error raised inside an event stops the
//! simulator; `run` then returns it.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{DeviceInfo, SimTime};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use vs_01_event_scheduler::{SchedulerConfig, Simulator, StopReason};
use vs_02_spectrum_channel::adapters::{
    ChannelTraceRecorder, CoexistenceInterferenceTracker, MetricsObserver, SimulatorScheduler,
};
use vs_02_spectrum_channel::{
    ChannelError, MultiModelSpectrumChannel, SpectrumChannelApi, SpectrumPhy, TechnologyBand,
};
use vs_telemetry::metrics;

use crate::config::ScenarioConfig;
use crate::errors::ScenarioError;
use crate::radio::VehicleRadio;
use crate::report::{RadioReport, SimulationReport};
use crate::wiring::{build_antenna, build_channel_models, build_loss_model, build_spectrum_models};

/// The channel as wired to the discrete-event simulator.
pub type V2xChannel = MultiModelSpectrumChannel<SimulatorScheduler>;

type Failure = Arc<Mutex<Option<ChannelError>>>;

/// Periodic broadcasts of one radio.
struct BroadcastStream {
    simulator: Arc<Simulator>,
    channel: Arc<V2xChannel>,
    radio: Arc<VehicleRadio>,
    period: SimTime,
    duration: SimTime,
    remaining: AtomicU32,
    failure: Failure,
}

impl BroadcastStream {
    fn fire(self: Arc<Self>) {
        if let Err(err) = self.channel.start_tx(self.radio.broadcast_signal(self.duration)) {
            error!(radio = %self.radio.id(), error = %err, "transmission failed, stopping");
            self.failure.lock().get_or_insert(err);
            self.simulator.stop();
            return;
        }
        if self.remaining.fetch_sub(1, Ordering::Relaxed) > 1 {
            let node = self.radio.device_info().node_id;
            let period = self.period;
            let next = Arc::clone(&self);
            self.simulator
                .schedule_with_context(node, period, move || next.fire());
        }
    }
}

/// Moves a vehicle's radios along their velocity until the horizon.
struct PositionFeed {
    simulator: Arc<Simulator>,
    radios: Vec<Arc<VehicleRadio>>,
    interval: SimTime,
    horizon: SimTime,
}

impl PositionFeed {
    fn fire(self: Arc<Self>) {
        for radio in &self.radios {
            radio.advance(self.interval);
        }
        if self.simulator.now() + self.interval <= self.horizon {
            let node = self.radios[0].device_info().node_id;
            let interval = self.interval;
            let next = Arc::clone(&self);
            self.simulator
                .schedule_with_context(node, interval, move || next.fire());
        }
    }
}

pub struct SimRuntime {
    config: ScenarioConfig,
    simulator: Arc<Simulator>,
    channel: Arc<V2xChannel>,
    recorder: Arc<ChannelTraceRecorder>,
    coexistence: Option<Arc<CoexistenceInterferenceTracker>>,
    radios: Vec<Arc<VehicleRadio>>,
    failure: Failure,
}

impl SimRuntime {
    pub fn new(config: ScenarioConfig) -> Result<Self, ScenarioError> {
        config.validate()?;
        info!(
            scenario = %config.name,
            vehicles = config.vehicles.len(),
            radios = config.radio_count(),
            "building simulation"
        );

        let spectrum_models = build_spectrum_models(&config.technologies)?;
        let simulator = Arc::new(Simulator::new(SchedulerConfig {
            stop_time: config.scheduler.stop_time.or(Some(config.duration())),
            max_events: config.scheduler.max_events,
        }));
        let channel = Arc::new(MultiModelSpectrumChannel::new(
            config.channel.clone(),
            build_channel_models(&config.propagation),
            Arc::new(SimulatorScheduler::new(Arc::clone(&simulator))),
        ));
        let recorder = Arc::new(ChannelTraceRecorder::new());
        channel.add_observer(recorder.clone());
        channel.add_observer(Arc::new(MetricsObserver));

        let coexistence = config.coexistence.enabled.then(|| {
            let tracker = spectrum_models.iter().fold(
                CoexistenceInterferenceTracker::new(
                    &config.coexistence.tracker,
                    build_loss_model(&config.propagation.loss),
                ),
                |tracker, (name, model)| {
                    tracker.with_technology(TechnologyBand::from_model(name.as_str(), model))
                },
            );
            Arc::new(tracker)
        });
        if let Some(tracker) = &coexistence {
            channel.add_observer(tracker.clone());
        }

        let mut radios = Vec::with_capacity(config.radio_count());
        for vehicle in &config.vehicles {
            for (index, radio) in vehicle.radios.iter().enumerate() {
                let model = spectrum_models.get(&radio.technology).ok_or_else(|| {
                    ScenarioError::UnknownTechnology {
                        node: vehicle.node_id,
                        device: index,
                        technology: radio.technology.clone(),
                    }
                })?;
                let device_index = u32::try_from(index)
                    .map_err(|_| ScenarioError::Invalid("too many radios on one vehicle".into()))?;
                let radio = Arc::new(VehicleRadio::new(
                    DeviceInfo::new(vehicle.node_id, device_index),
                    radio.technology.clone(),
                    Arc::clone(model),
                    vehicle.position,
                    vehicle.velocity,
                    build_antenna(&radio.antenna),
                    radio.tx_power_dbm.unwrap_or(config.traffic.tx_power_dbm),
                ));
                channel.add_rx(radio.clone())?;
                if let Some(tracker) = &coexistence {
                    tracker.register(radio.id(), radio.technology())?;
                }
                radios.push(radio);
            }
        }
        info!(
            devices = channel.n_devices(),
            rx_models = channel.rx_model_count(),
            "radios registered"
        );

        Ok(Self {
            config,
            simulator,
            channel,
            recorder,
            coexistence,
            radios,
            failure: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn simulator(&self) -> &Arc<Simulator> {
        &self.simulator
    }

    pub fn channel(&self) -> &Arc<V2xChannel> {
        &self.channel
    }

    pub fn radios(&self) -> &[Arc<VehicleRadio>] {
        &self.radios
    }

    pub fn coexistence(&self) -> Option<&Arc<CoexistenceInterferenceTracker>> {
        self.coexistence.as_ref()
    }

    fn schedule_traffic(&self) {
        let traffic = &self.config.traffic;
        if traffic.packets_per_radio == 0 {
            warn!("traffic.packets_per_radio is 0, nothing will be sent");
            return;
        }
        let mut rng = StdRng::seed_from_u64(traffic.seed);
        for radio in &self.radios {
            let offset = SimTime::from_micros(rng.gen_range(0..=traffic.start_jitter_us));
            let stream = Arc::new(BroadcastStream {
                simulator: Arc::clone(&self.simulator),
                channel: Arc::clone(&self.channel),
                radio: Arc::clone(radio),
                period: traffic.period(),
                duration: traffic.packet_duration(),
                remaining: AtomicU32::new(traffic.packets_per_radio),
                failure: Arc::clone(&self.failure),
            });
            self.simulator.schedule_with_context(
                radio.device_info().node_id,
                offset,
                move || stream.fire(),
            );
        }
    }

    fn schedule_position_feeds(&self) {
        let interval = SimTime::from_millis(self.config.traffic.position_update_ms);
        if interval.is_zero() {
            return;
        }
        for vehicle in self.config.vehicles.iter().filter(|v| !v.radios.is_empty()) {
            let radios: Vec<_> = self
                .radios
                .iter()
                .filter(|r| r.device_info().node_id == vehicle.node_id && r.is_moving())
                .cloned()
                .collect();
            if radios.is_empty() {
                continue;
            }
            let feed = Arc::new(PositionFeed {
                simulator: Arc::clone(&self.simulator),
                radios,
                interval,
                horizon: self.config.duration(),
            });
            self.simulator
                .schedule_with_context(vehicle.node_id, interval, move || feed.fire());
        }
    }

    /// Schedule the scenario's traffic and run it to completion.
    pub fn run(&self) -> Result<SimulationReport, ScenarioError> {
        self.schedule_traffic();
        self.schedule_position_feeds();

        let summary = self.simulator.run()?;
        metrics::EVENTS_EXECUTED.inc_by(summary.executed as f64);
        if let Some(err) = self.failure.lock().take() {
            return Err(err.into());
        }
        if summary.reason == StopReason::Stopped {
            warn!("simulation stopped early");
        }
        info!(
            executed = summary.executed,
            pending = summary.pending,
            final_time = %summary.final_time,
            "simulation finished"
        );
        Ok(self.report(summary.executed, summary.final_time))
    }

    fn report(&self, events_executed: u64, final_time: SimTime) -> SimulationReport {
        let transmissions = self.recorder.transmissions();
        let total = |f: fn(&vs_02_spectrum_channel::TransmissionStats) -> usize| {
            transmissions.iter().map(f).sum::<usize>()
        };
        SimulationReport {
            scenario: self.config.name.clone(),
            final_time,
            events_executed,
            transmissions: transmissions.len(),
            deliveries_scheduled: total(|s| s.scheduled),
            dropped_out_of_range: total(|s| s.dropped_out_of_range),
            orthogonal_groups_skipped: total(|s| s.skipped_orthogonal_groups),
            self_or_same_node_skipped: total(|s| s.skipped_self_or_same_node),
            converters: self.channel.converter_count(),
            radios: self
                .radios
                .iter()
                .map(|radio| {
                    let stats = radio.stats();
                    let device = radio.device_info();
                    let interference = self
                        .coexistence
                        .as_ref()
                        .map(|t| t.interference(radio.id()))
                        .unwrap_or_default();
                    RadioReport {
                        node_id: device.node_id,
                        device_index: device.device_index,
                        technology: radio.technology().to_string(),
                        receptions: stats.receptions,
                        mean_rx_power_dbm: stats.mean_power_dbm(),
                        strongest_rx_power_dbm: stats.strongest_dbm(),
                        interference_events: interference.events,
                        mean_interference_dbm: interference.mean_power_dbm(),
                    }
                })
                .collect(),
        }
    }
}
