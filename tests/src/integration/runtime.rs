//! # Full Scenario Runs
//!
//! Loads scenarios the way the `sim-runtime` binary does and checks the
//! run report.

#[cfg(test)]
mod tests {
    use sim_runtime::config::{AntennaConfig, SpectralLossConfig};
    use sim_runtime::{ScenarioConfig, ScenarioError, SimRuntime};
    use std::path::PathBuf;

    fn bundled(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../crates/sim-runtime/scenarios")
            .join(name)
    }

    #[test]
    fn test_bundled_scenario_runs() {
        let config = ScenarioConfig::from_file(bundled("urban_intersection.json")).unwrap();
        let radios = config.radio_count();
        let packets = config.traffic.packets_per_radio as usize;

        let runtime = SimRuntime::new(config).unwrap();
        let report = runtime.run().unwrap();

        assert_eq!(report.transmissions, radios * packets);
        assert_eq!(report.radios.len(), radios);
        // Every evaluated link is either delivered or dropped.
        let links = report.deliveries_scheduled + report.dropped_out_of_range;
        assert!(links > 0);
        assert_eq!(report.total_receptions() as usize, report.deliveries_scheduled);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ScenarioConfig::from_file(bundled("does_not_exist.json")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
    }

    #[test]
    fn test_beamforming_scenario_with_arrays() {
        let mut config = ScenarioConfig::default();
        config.propagation.spectral = SpectralLossConfig::Beamforming;
        for vehicle in &mut config.vehicles {
            for radio in &mut vehicle.radios {
                radio.antenna = AntennaConfig::UniformLinearArray {
                    num_elements: 4,
                    spacing: 0.5,
                };
            }
        }
        let report = SimRuntime::new(config).unwrap().run().unwrap();
        assert_eq!(report.transmissions, 70);
    }

    #[test]
    fn test_same_seed_same_report() {
        let first = SimRuntime::new(ScenarioConfig::default()).unwrap().run().unwrap();
        let second = SimRuntime::new(ScenarioConfig::default()).unwrap().run().unwrap();
        assert_eq!(first.events_executed, second.events_executed);
        assert_eq!(first.deliveries_scheduled, second.deliveries_scheduled);
        let rx = |r: &sim_runtime::SimulationReport| -> Vec<u64> {
            r.radios.iter().map(|x| x.receptions).collect()
        };
        assert_eq!(rx(&first), rx(&second));
    }

    // One 10 MHz ITS-G5 channel at 5.9 GHz, a 50-RB C-V2X carrier starting
    // at its center, and an LTE carrier far away. No path loss, so the
    // recorded interference is the in-band share of the 23 dBm broadcast.
    const MIXED_V2X: &str = r#"{
        "name": "mixed-v2x",
        "duration_ms": 1000,
        "propagation": { "loss": { "model": "none" }, "delay": false },
        "traffic": { "packets_per_radio": 5, "start_jitter_us": 0, "tx_power_dbm": 23 },
        "technologies": [
            { "name": "its-g5", "layout": { "type": "uniform", "start_hz": 5.895e9, "band_width_hz": 1e7, "num_bands": 1 } },
            { "name": "c-v2x", "layout": { "type": "uniform", "start_hz": 5.9e9, "band_width_hz": 1.8e5, "num_bands": 50 } },
            { "name": "lte", "layout": { "type": "uniform", "start_hz": 2.62e9, "band_width_hz": 1.8e5, "num_bands": 50 } }
        ],
        "vehicles": [
            { "node_id": 1, "position": { "x": 0, "y": 0, "z": 1.5 }, "radios": [ { "technology": "its-g5" } ] },
            { "node_id": 2, "position": { "x": 30, "y": 0, "z": 1.5 }, "radios": [ { "technology": "c-v2x" } ] },
            { "node_id": 3, "position": { "x": 60, "y": 0, "z": 1.5 }, "radios": [ { "technology": "its-g5" } ] },
            { "node_id": 4, "position": { "x": 90, "y": 0, "z": 1.5 }, "radios": [ { "technology": "lte" } ] }
        ]
    }"#;

    #[test]
    fn test_mixed_its_g5_and_cv2x_interference() {
        let config = ScenarioConfig::from_json(MIXED_V2X).unwrap();
        let runtime = SimRuntime::new(config).unwrap();
        let report = runtime.run().unwrap();
        let radio = |node: u32| {
            report
                .radios
                .iter()
                .find(|r| r.node_id.0 == node)
                .unwrap()
        };

        // 28 of the 50 C-V2X resource blocks are centered inside the G5 channel.
        let g5_expected = 23.0 + 10.0 * (28.0 / 50.0f64).log10();
        for node in [1, 3] {
            let g5 = radio(node);
            assert_eq!(g5.interference_events, 5, "{g5:?}");
            let mean = g5.mean_interference_dbm.unwrap();
            assert!((mean - g5_expected).abs() < 1e-6, "mean = {mean}");
        }

        // Both G5 vehicles hit the C-V2X radio with their whole channel.
        let cv2x = radio(2);
        assert_eq!(cv2x.interference_events, 10);
        assert!((cv2x.mean_interference_dbm.unwrap() - 23.0).abs() < 1e-6);

        let lte = radio(4);
        assert_eq!(lte.interference_events, 0);
        assert_eq!(lte.receptions, 0);

        // Reception itself does not tell the two apart: G5 plus converted C-V2X.
        assert_eq!(radio(1).receptions, 5 + 5);
        let tracker = runtime.coexistence().unwrap();
        assert_eq!(tracker.snapshot().len(), 3);
    }
}
