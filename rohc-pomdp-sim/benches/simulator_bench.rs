use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rohc_pomdp::{Action, AlphaVector, AlphaVectorPolicy, PomdpModel, ScenarioConfig};
use rohc_pomdp_sim::{PomdpCompressor, SimConfig, Simulator, TimerCompressor};

fn reference_config(seed: u64, num_packets: usize) -> SimConfig {
    SimConfig::new(
        seed,
        num_packets,
        ScenarioConfig::default()
            .to_parameters()
            .expect("reference scenario is valid"),
    )
}

fn benchmark_timer_session(c: &mut Criterion) {
    c.bench_function("timer_session_100_packets", |b| {
        b.iter(|| {
            let mut simulator =
                Simulator::new(reference_config(black_box(42), 100), TimerCompressor::new(3, 16, 2));
            black_box(simulator.run().expect("Simulation should succeed"));
        });
    });
}

fn benchmark_timer_throughput(c: &mut Criterion) {
    c.bench_function("timer_session_10000_packets", |b| {
        b.iter(|| {
            let mut simulator = Simulator::new(
                reference_config(black_box(999), 10_000),
                TimerCompressor::new(3, 16, 2),
            );
            black_box(simulator.run().expect("Simulation should succeed"));
        });
    });
}

fn benchmark_pomdp_session(c: &mut Criterion) {
    let config = reference_config(7, 100);
    let model = Arc::new(PomdpModel::build(&config.parameters));
    let states = model.state_space().len();
    let policy = Arc::new(
        AlphaVectorPolicy::new(
            Action::ALL
                .into_iter()
                .enumerate()
                .map(|(i, action)| AlphaVector {
                    action,
                    obs_value: None,
                    values: (0..states).map(|s| ((s + i) % 3) as f64).collect(),
                })
                .collect(),
        )
        .expect("policy has vectors"),
    );

    c.bench_function("pomdp_session_100_packets", |b| {
        b.iter(|| {
            let compressor = PomdpCompressor::new(Arc::clone(&model), Arc::clone(&policy))
                .expect("policy matches model");
            let mut simulator = Simulator::new(config, compressor);
            black_box(simulator.run().expect("Simulation should succeed"));
        });
    });
}

criterion_group!(
    benches,
    benchmark_timer_session,
    benchmark_timer_throughput,
    benchmark_pomdp_session
);
criterion_main!(benches);
