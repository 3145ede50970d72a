//! # Hermite Backend Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use profile_gen_lib::{
    motion_config::{FitMethod, MotionConfig, SampleRate},
    traj_backend::{HermiteBackend, TrajectoryBackend, Waypoint},
};

fn hermite_benchmark(c: &mut Criterion) {
    // ---- Build a dummy S-bend path ----

    let waypoints = vec![
        Waypoint::new(0.0, 0.0, 0.0),
        Waypoint::new(2.0, 1.0, 0.4),
        Waypoint::new(4.0, 1.5, 0.0),
        Waypoint::new(6.0, 0.5, -0.4),
        Waypoint::new(8.0, 0.0, 0.0),
    ];

    let config = MotionConfig {
        fit_method: FitMethod::HermiteCubic,
        sample_rate: SampleRate::Low,
        dt_s: 0.02,
        max_vel_ms: 3.0,
        max_accel_mss: 2.5,
        max_jerk_msss: 60.0,
        wheelbase_m: 0.6,
    };

    let backend = HermiteBackend::default();

    c.bench_function("HermiteBackend::generate::cubic", |b| {
        b.iter(|| backend.generate(&waypoints, &config).unwrap())
    });

    let quintic = MotionConfig {
        fit_method: FitMethod::HermiteQuintic,
        ..config
    };

    c.bench_function("HermiteBackend::generate::quintic", |b| {
        b.iter(|| backend.generate(&waypoints, &quintic).unwrap())
    });

    let trajectory = backend.generate(&waypoints, &config).unwrap();

    c.bench_function("HermiteBackend::tank_modify", |b| {
        b.iter(|| backend.tank_modify(&trajectory, config.wheelbase_m))
    });
}

criterion_group!(benches, hermite_benchmark);
criterion_main!(benches);
