//! # Channel Properties
//!
//! Property tests of the channel contract, driven through the public API
//! with the recording scheduler.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use shared_types::{NodeId, Vector3};
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use vs_02_spectrum_channel::adapters::{FixedRssLoss, RecordingScheduler};
    use vs_02_spectrum_channel::testing::TestPhy;
    use vs_02_spectrum_channel::{
        ChannelConfig, ChannelError, ChannelModels, MultiModelSpectrumChannel, SignalParameters,
        SpectrumChannelApi, SpectrumModel, SpectrumPhy, SpectrumValue,
    };
    use shared_types::SimTime;

    type Channel = MultiModelSpectrumChannel<RecordingScheduler>;

    fn channel(config: ChannelConfig, models: ChannelModels) -> Channel {
        MultiModelSpectrumChannel::new(config, models, Arc::new(RecordingScheduler::new()))
    }

    fn signal(tx: &Arc<TestPhy>, psd: SpectrumValue) -> SignalParameters {
        SignalParameters::new(tx.as_phy(), psd, SimTime::from_micros(50))
    }

    fn layout() -> impl Strategy<Value = Arc<SpectrumModel>> {
        (0.0f64..100.0, 0.5f64..10.0, 1usize..8).prop_map(|(start, width, count)| {
            Arc::new(SpectrumModel::uniform(start, width, count).unwrap())
        })
    }

    fn bands_overlap(a: &SpectrumModel, b: &SpectrumModel) -> bool {
        a.bands()
            .iter()
            .any(|x| b.bands().iter().any(|y| x.fl.max(y.fl) < x.fh.min(y.fh)))
    }

    proptest! {
        #[test]
        fn prop_converters_exist_both_ways_iff_overlap(a in layout(), b in layout(), rx_first in any::<bool>()) {
            let ch = channel(ChannelConfig::default(), ChannelModels::new());
            let on_a = TestPhy::builder().rx_model(&a).build();
            let on_b = TestPhy::builder().rx_model(&b).build();

            if rx_first {
                ch.add_rx(on_a.as_phy()).unwrap();
                ch.add_rx(on_b.as_phy()).unwrap();
                ch.find_or_add_tx_model(&a);
                ch.find_or_add_tx_model(&b);
            } else {
                ch.find_or_add_tx_model(&a);
                ch.find_or_add_tx_model(&b);
                ch.add_rx(on_b.as_phy()).unwrap();
                ch.add_rx(on_a.as_phy()).unwrap();
            }

            let overlap = bands_overlap(&a, &b);
            prop_assert_eq!(ch.has_converter(a.id(), b.id()), overlap);
            prop_assert_eq!(ch.has_converter(b.id(), a.id()), overlap);
            prop_assert!(!ch.has_converter(a.id(), a.id()));
            prop_assert_eq!(ch.converter_count(), if overlap { 2 } else { 0 });
        }

        #[test]
        fn prop_identical_model_delivers_psd_unchanged(values in prop::collection::vec(0.0f64..1e-3, 1..16)) {
            let model = Arc::new(SpectrumModel::uniform(5.9e9, 1e6, values.len()).unwrap());
            let ch = channel(ChannelConfig::default(), ChannelModels::new());
            let tx = TestPhy::builder().rx_model(&model).build();
            let rx = TestPhy::builder().rx_model(&model).build();
            ch.add_rx(rx.as_phy()).unwrap();

            let psd = SpectrumValue::from_values(Arc::clone(&model), values.clone()).unwrap();
            ch.start_tx(signal(&tx, psd)).unwrap();

            prop_assert_eq!(ch.converter_count(), 0);
            let recorded = ch.scheduler().take();
            prop_assert_eq!(recorded.len(), 1);
            prop_assert_eq!(recorded[0].delivery.params.psd.values(), values.as_slice());
        }

        #[test]
        fn prop_repeated_conversion_is_stable(values in prop::collection::vec(0.0f64..1e-3, 1..16)) {
            let tx_model = Arc::new(SpectrumModel::uniform(0.0, 1.0, values.len()).unwrap());
            let rx_model = Arc::new(SpectrumModel::uniform(0.5, 1.0, values.len()).unwrap());
            let ch = channel(ChannelConfig::default(), ChannelModels::new());
            let tx = TestPhy::builder().rx_model(&tx_model).build();
            let rx = TestPhy::builder().rx_model(&rx_model).build();
            ch.add_rx(rx.as_phy()).unwrap();
            let psd = SpectrumValue::from_values(Arc::clone(&tx_model), values).unwrap();

            ch.start_tx(signal(&tx, psd.clone())).unwrap();
            let converters = ch.converter_count();
            ch.start_tx(signal(&tx, psd)).unwrap();
            prop_assert_eq!(ch.converter_count(), converters);

            let recorded = ch.scheduler().take();
            prop_assert_eq!(recorded.len(), 2);
            prop_assert_eq!(recorded[0].delivery.params.psd.model_id(), rx_model.id());
            prop_assert_eq!(
                recorded[0].delivery.params.psd.values(),
                recorded[1].delivery.params.psd.values()
            );
        }

        #[test]
        fn prop_orthogonal_group_skipped_whole(receivers in 1usize..10) {
            let low = Arc::new(SpectrumModel::uniform(1e9, 1e6, 4).unwrap());
            let high = Arc::new(SpectrumModel::uniform(3e9, 1e6, 4).unwrap());
            let ch = channel(ChannelConfig::default(), ChannelModels::new());
            for _ in 0..receivers {
                ch.add_rx(TestPhy::builder().rx_model(&high).build().as_phy()).unwrap();
            }
            let tx = TestPhy::builder().rx_model(&low).build();

            let stats = ch.start_tx(signal(&tx, SpectrumValue::flat(Arc::clone(&low), 1.0))).unwrap();
            prop_assert_eq!(stats.skipped_orthogonal_groups, 1);
            prop_assert_eq!(stats.skipped_self_or_same_node, 0);
            prop_assert_eq!(stats.scheduled, 0);
            prop_assert!(ch.scheduler().is_empty());
        }

        #[test]
        fn prop_never_delivered_to_self_or_co_located(nodes in prop::collection::vec(prop::option::of(0u32..4), 1..12)) {
            let model = Arc::new(SpectrumModel::uniform(5.9e9, 10e6, 1).unwrap());
            let ch = channel(ChannelConfig::default(), ChannelModels::new());
            let phys: Vec<_> = nodes
                .iter()
                .enumerate()
                .map(|(i, node)| {
                    let builder = TestPhy::builder().rx_model(&model);
                    match node {
                        Some(n) => builder.device(NodeId(*n), i as u32).build(),
                        None => builder.build(),
                    }
                })
                .collect();
            for phy in &phys {
                ch.add_rx(phy.as_phy()).unwrap();
            }

            let tx = &phys[0];
            let stats = ch.start_tx(signal(tx, SpectrumValue::flat(Arc::clone(&model), 1.0))).unwrap();

            let expected: BTreeSet<_> = phys[1..]
                .iter()
                .zip(&nodes[1..])
                .filter(|(_, node)| match (nodes[0], node) {
                    (Some(a), Some(b)) => a != *b,
                    _ => true,
                })
                .map(|(p, _)| p.id())
                .collect();
            let delivered: BTreeSet<_> = ch.scheduler().take().iter().map(|d| d.receiver()).collect();
            prop_assert_eq!(stats.scheduled, expected.len());
            prop_assert_eq!(stats.skipped_self_or_same_node, phys.len() - expected.len());
            prop_assert_eq!(delivered, expected);
        }

        #[test]
        fn prop_device_count_tracks_registrations(ops in prop::collection::vec((0usize..6, any::<bool>(), 0usize..3), 0..40)) {
            let models: Vec<_> = (0..3)
                .map(|i| Arc::new(SpectrumModel::uniform(1e9 * (i + 1) as f64, 1e6, 2).unwrap()))
                .collect();
            let ch = channel(ChannelConfig::default(), ChannelModels::new());
            let phys: Vec<_> = (0..6).map(|_| TestPhy::builder().rx_model(&models[0]).build()).collect();
            let mut registered = BTreeSet::new();

            for (index, add, model) in ops {
                let phy = &phys[index];
                if add {
                    phy.set_rx_model(Some(Arc::clone(&models[model])));
                    ch.add_rx(phy.as_phy()).unwrap();
                    registered.insert(phy.id());
                } else {
                    prop_assert_eq!(ch.remove_rx(phy.id()), registered.remove(&phy.id()));
                }
                prop_assert_eq!(ch.n_devices(), registered.len());
            }

            let listed: BTreeSet<_> = (0..ch.n_devices()).map(|i| ch.get_phy(i).unwrap().id()).collect();
            prop_assert_eq!(&listed, &registered);
            prop_assert_eq!(
                ch.get_device(registered.len()),
                Err(ChannelError::DeviceIndexOutOfRange { index: registered.len(), count: registered.len() })
            );
        }

        #[test]
        fn prop_range_drop_is_strict(rss_dbm in -150.0f64..-1.0, margin in 0.001f64..20.0) {
            let model = Arc::new(SpectrumModel::uniform(5.9e9, 10e6, 1).unwrap());
            let models = ChannelModels::new().with_propagation_loss(Arc::new(FixedRssLoss { rss_dbm }));
            let path_loss = -rss_dbm;

            for (max_loss_db, expected) in [(path_loss, 1), (path_loss + margin, 1), (path_loss - margin, 0)] {
                let ch = channel(ChannelConfig::with_max_loss_db(max_loss_db), models.clone());
                let tx = TestPhy::builder().rx_model(&model).position(Vector3::default()).build();
                let rx = TestPhy::builder().rx_model(&model).position(Vector3::new(10.0, 0.0, 0.0)).build();
                ch.add_rx(rx.as_phy()).unwrap();

                let stats = ch.start_tx(signal(&tx, SpectrumValue::flat(Arc::clone(&model), 1.0))).unwrap();
                prop_assert_eq!(stats.scheduled, expected);
                prop_assert_eq!(stats.dropped_out_of_range, 1 - expected);
                prop_assert_eq!(ch.scheduler().len(), expected);
            }
        }
    }

    #[test]
    fn test_moved_endpoint_is_listed_once() {
        let a = Arc::new(SpectrumModel::uniform(1e9, 1e6, 2).unwrap());
        let b = Arc::new(SpectrumModel::uniform(2e9, 1e6, 2).unwrap());
        let ch = channel(ChannelConfig::default(), ChannelModels::new());
        let phy = TestPhy::builder().rx_model(&a).build();

        ch.add_rx(phy.as_phy()).unwrap();
        phy.set_rx_model(Some(Arc::clone(&b)));
        ch.add_rx(phy.as_phy()).unwrap();

        assert_eq!(ch.n_devices(), 1);
        assert_eq!(ch.rx_model_count(), 2);
        assert_eq!(ch.get_phy(0).unwrap().id(), phy.id());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let ch = channel(ChannelConfig::default(), ChannelModels::new());
        let phy = TestPhy::builder().build();
        assert!(!ch.remove_rx(phy.id()));
        assert_eq!(ch.n_devices(), 0);
    }
}
