//! # Spectrum Channel Benchmarks
//!
//! | Path | Scaling |
//! |------|---------|
//! | `start_tx` | O(receivers) after the first call per Tx model |
//! | `convert` | O(non-zero coefficients) |
//! | `get_device` | O(devices), linear scan |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::{NodeId, SimTime, Vector3};
use std::sync::Arc;
use vs_02_spectrum_channel::adapters::{
    ConstantSpeedDelay, LogDistancePropagationLoss, RecordingScheduler,
};
use vs_02_spectrum_channel::testing::TestPhy;
use vs_02_spectrum_channel::{
    ChannelConfig, ChannelModels, MultiModelSpectrumChannel, SignalParameters, SpectrumChannelApi,
    SpectrumConverter, SpectrumModel, SpectrumValue,
};

fn models() -> Vec<Arc<SpectrumModel>> {
    vec![
        Arc::new(SpectrumModel::uniform(5.855e9, 10e6, 7).unwrap()),
        Arc::new(SpectrumModel::uniform(5.905e9, 180e3, 106).unwrap()),
        Arc::new(SpectrumModel::uniform(2.62e9, 180e3, 50).unwrap()),
    ]
}

fn bench_start_tx(c: &mut Criterion) {
    let mut group = c.benchmark_group("vs-02-start-tx");
    let layouts = models();

    for receivers in [10usize, 100, 1_000] {
        let channel = MultiModelSpectrumChannel::new(
            ChannelConfig::with_max_loss_db(120.0),
            ChannelModels::new()
                .with_propagation_loss(Arc::new(LogDistancePropagationLoss::default()))
                .with_propagation_delay(Arc::new(ConstantSpeedDelay::default())),
            Arc::new(RecordingScheduler::new()),
        );
        for i in 0..receivers {
            let phy = TestPhy::builder()
                .rx_model(&layouts[i % layouts.len()])
                .device(NodeId(i as u32), 0)
                .position(Vector3::new(i as f64 * 5.0, 0.0, 1.5))
                .build();
            channel.add_rx(phy.as_phy()).unwrap();
        }
        let tx = TestPhy::builder()
            .rx_model(&layouts[0])
            .device(NodeId(u32::MAX), 0)
            .position(Vector3::default())
            .build();
        let psd = SpectrumValue::from_tx_power_dbm(Arc::clone(&layouts[0]), 23.0);

        group.throughput(Throughput::Elements(receivers as u64));
        group.bench_with_input(BenchmarkId::from_parameter(receivers), &receivers, |b, _| {
            b.iter(|| {
                let params = SignalParameters::new(tx.as_phy(), psd.clone(), SimTime::from_micros(400));
                let stats = channel.start_tx(params).unwrap();
                channel.scheduler().take();
                black_box(stats)
            })
        });
    }
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let layouts = models();
    let converter = SpectrumConverter::new(Arc::clone(&layouts[1]), Arc::clone(&layouts[0]));
    let psd = SpectrumValue::flat(Arc::clone(&layouts[1]), 1e-12);

    c.bench_function("vs-02-convert-nr-to-g5", |b| {
        b.iter(|| black_box(converter.convert(black_box(&psd)).unwrap()))
    });
}

fn bench_get_device(c: &mut Criterion) {
    let layouts = models();
    let channel = MultiModelSpectrumChannel::new(
        ChannelConfig::default(),
        ChannelModels::new(),
        Arc::new(RecordingScheduler::new()),
    );
    for i in 0..1_000usize {
        let phy = TestPhy::builder()
            .rx_model(&layouts[i % layouts.len()])
            .device(NodeId(i as u32), 0)
            .build();
        channel.add_rx(phy.as_phy()).unwrap();
    }

    c.bench_function("vs-02-get-device-last-of-1000", |b| {
        b.iter(|| black_box(channel.get_device(black_box(999)).unwrap()))
    });
}

criterion_group!(benches, bench_start_tx, bench_convert, bench_get_device);
criterion_main!(benches);
