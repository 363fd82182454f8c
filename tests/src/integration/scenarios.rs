//! # End-to-End Delivery Scenarios
//!
//! Transmissions started inside simulator events, delivered by the
//! simulator at `now + delay`.

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use shared_types::{NodeId, SimTime, Vector3};
    use std::sync::Arc;
    use vs_01_event_scheduler::StopReason;
    use vs_02_spectrum_channel::adapters::{ConstantSpeedDelay, FixedRssLoss};
    use vs_02_spectrum_channel::{
        ChannelConfig, ChannelModels, SpectrumChannelApi, SpectrumConverter, SpectrumPhy, SpectrumValue,
    };

    use crate::fixtures::{uniform, SimHarness};

    #[test]
    fn test_converted_psd_delivered_at_zero_delay() {
        let h = SimHarness::lossless();
        let m1 = uniform(0.0, 2.0, 2);
        let m2 = uniform(1.0, 1.0, 2);
        let rx = h.phy(&m1, Some((1, 0)), None);
        let tx = h.phy(&m2, Some((2, 0)), None);
        h.channel.add_rx(rx.as_phy()).unwrap();

        let received_inline = Arc::new(Mutex::new(None));
        {
            let channel = Arc::clone(&h.channel);
            let tx = Arc::clone(&tx);
            let rx = Arc::clone(&rx);
            let received_inline = Arc::clone(&received_inline);
            h.simulator.schedule(SimTime::from_millis(1), move || {
                channel.start_tx(tx.signal(1.0)).unwrap();
                *received_inline.lock() = Some(rx.receptions().len());
            });
        }
        let summary = h.simulator.run().unwrap();
        assert_eq!(summary.reason, StopReason::QueueEmpty);

        // Delivery is a separate event, even with zero delay.
        assert_eq!(*received_inline.lock(), Some(0));

        let receptions = rx.receptions();
        assert_eq!(receptions.len(), 1);
        assert_eq!(receptions[0].at, SimTime::from_millis(1));
        assert_eq!(receptions[0].context, Some(NodeId(1)));
        assert_eq!(receptions[0].from, tx.id());

        let expected = SpectrumConverter::new(Arc::clone(&m2), Arc::clone(&m1))
            .convert(&SpectrumValue::flat(Arc::clone(&m2), 1.0))
            .unwrap();
        assert_eq!(receptions[0].psd.model_id(), m1.id());
        assert_eq!(receptions[0].psd.values(), expected.values());
        assert_eq!(receptions[0].psd.values(), &[0.5, 0.5]);
    }

    #[test]
    fn test_orthogonal_models_schedule_nothing() {
        let h = SimHarness::lossless();
        let low = uniform(1e9, 1e6, 10);
        let high = uniform(2e9, 1e6, 10);
        let rx = h.phy(&high, Some((1, 0)), None);
        let tx = h.phy(&low, Some((2, 0)), None);
        h.channel.add_rx(rx.as_phy()).unwrap();

        let stats = h.channel.start_tx(tx.signal(1.0)).unwrap();
        assert_eq!(stats.skipped_orthogonal_groups, 1);
        assert_eq!(h.simulator.pending_events(), 0);

        h.simulator.run().unwrap();
        assert!(rx.receptions().is_empty());
    }

    #[test]
    fn test_same_node_schedules_nothing() {
        let h = SimHarness::lossless();
        let m = uniform(5.9e9, 10e6, 1);
        let tx = h.phy(&m, Some((7, 0)), None);
        let sibling = h.phy(&m, Some((7, 1)), None);
        h.channel.add_rx(tx.as_phy()).unwrap();
        h.channel.add_rx(sibling.as_phy()).unwrap();

        let stats = h.channel.start_tx(tx.signal(1.0)).unwrap();
        assert_eq!(stats.skipped_self_or_same_node, 2);
        assert_eq!(h.simulator.pending_events(), 0);

        h.simulator.run().unwrap();
        assert!(tx.receptions().is_empty());
        assert!(sibling.receptions().is_empty());
    }

    #[test]
    fn test_deliveries_ordered_by_propagation_delay() {
        let models = ChannelModels::new()
            .with_propagation_delay(Arc::new(ConstantSpeedDelay::new(1_000.0)));
        let h = SimHarness::new(ChannelConfig::default(), models);
        let m = uniform(5.9e9, 10e6, 1);

        let tx = h.phy(&m, Some((1, 0)), Some(Vector3::default()));
        let far = h.phy(&m, Some((2, 0)), Some(Vector3::new(300.0, 0.0, 0.0)));
        let near = h.phy(&m, None, Some(Vector3::new(100.0, 0.0, 0.0)));
        let mid = h.phy(&m, Some((3, 0)), Some(Vector3::new(0.0, 200.0, 0.0)));
        for phy in [&far, &near, &mid] {
            h.channel.add_rx(phy.as_phy()).unwrap();
        }

        h.channel.start_tx(tx.signal(1.0)).unwrap();
        h.simulator.run().unwrap();

        assert_eq!(h.delivery_order(), vec![near.id(), mid.id(), far.id()]);
        assert_eq!(near.receptions()[0].at, SimTime::from_millis(100));
        assert_eq!(near.receptions()[0].context, None);
        assert_eq!(mid.receptions()[0].at, SimTime::from_millis(200));
        assert_eq!(far.receptions()[0].at, SimTime::from_millis(300));
        assert_eq!(far.receptions()[0].context, Some(NodeId(2)));
    }

    #[test]
    fn test_equal_delays_keep_registration_order() {
        let h = SimHarness::lossless();
        let m = uniform(5.9e9, 10e6, 1);
        let tx = h.phy(&m, Some((1, 0)), None);
        let receivers: Vec<_> = (2..6).map(|n| h.phy(&m, Some((n, 0)), None)).collect();
        for phy in &receivers {
            h.channel.add_rx(phy.as_phy()).unwrap();
        }

        h.channel.start_tx(tx.signal(1.0)).unwrap();
        h.channel.start_tx(tx.signal(2.0)).unwrap();
        h.simulator.run().unwrap();

        let ids: Vec<_> = receivers.iter().map(|r| r.id()).collect();
        let expected: Vec<_> = ids.iter().chain(ids.iter()).copied().collect();
        assert_eq!(h.delivery_order(), expected);
        for r in &receivers {
            let values: Vec<f64> = r.receptions().iter().map(|x| x.psd.values()[0]).collect();
            assert_eq!(values, vec![1.0, 2.0]);
        }
    }

    #[test]
    fn test_attenuated_psd_and_delay_through_simulator() {
        let models = ChannelModels::new()
            .with_propagation_loss(Arc::new(FixedRssLoss { rss_dbm: -30.0 }))
            .with_propagation_delay(Arc::new(ConstantSpeedDelay::default()));
        let h = SimHarness::new(ChannelConfig::with_max_loss_db(100.0), models);
        let m = uniform(5.9e9, 10e6, 2);
        let tx = h.phy(&m, Some((1, 0)), Some(Vector3::default()));
        let rx = h.phy(&m, Some((2, 0)), Some(Vector3::new(299.792_458, 0.0, 0.0)));
        h.channel.add_rx(rx.as_phy()).unwrap();

        h.channel.start_tx(tx.signal(1.0)).unwrap();
        h.simulator.run().unwrap();

        let r = &rx.receptions()[0];
        assert_eq!(r.at, SimTime::from_micros(1));
        for v in r.psd.values() {
            assert!((v - 1e-3).abs() < 1e-15);
        }
    }
}
