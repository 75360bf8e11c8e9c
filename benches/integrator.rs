use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use glam::DVec3;
use patched_conic_sim::{
    config::{IntegratorConfig, StepScheme},
    BodyId, EngineConfig, NBodyIntegrator, Probe, SolarSystem, SECONDS_PER_DAY,
};
use std::hint::black_box;

const STEPS: u64 = 1024;

fn criterion_benchmark(c: &mut Criterion) {
    let system = SolarSystem::new(EngineConfig::default()).expect("default solar system");
    let earth = system.state_at_time(BodyId::Earth, 0.0).expect("earth");
    let probe = Probe::new(
        earth.position + DVec3::new(1e9, 0.0, 0.0),
        earth.velocity + DVec3::new(0.0, 500.0, 0.0),
    );

    let mut group = c.benchmark_group("integrator_steps");
    group.throughput(Throughput::Elements(STEPS));

    for (name, scheme, culling) in [
        ("kick-drift culled", StepScheme::KickDrift, true),
        ("kick-drift summed", StepScheme::KickDrift, false),
        ("velocity verlet culled", StepScheme::VelocityVerlet, true),
    ] {
        let config = IntegratorConfig {
            scheme,
            soi_culling: culling,
            max_steps: STEPS as usize,
            ..IntegratorConfig::fixed_step(600.0)
        };

        group.bench_function(name, |b| {
            let mut integrator = NBodyIntegrator::new(&system, config.clone());
            b.iter(|| integrator.integrate(black_box(probe), 0.0, 1e9))
        });
    }

    group.finish();

    c.bench_function("adaptive month", |b| {
        let mut integrator = system.integrator();
        b.iter(|| integrator.integrate(black_box(probe), 0.0, 30.0 * SECONDS_PER_DAY))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
