//! Criterion benchmarks for the three scheduling optimizers.
//!
//! Uses a synthetic clinic-day instance so all algorithms are measured
//! on identical input.

use appt_solver::csp::{CspConfig, CspRunner};
use appt_solver::ga::{GaConfig, GaRunner};
use appt_solver::model::{Appointment, AppointmentType, Priority, Resource, ResourceType};
use appt_solver::sa::{SaConfig, SaRunner};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use chrono::{NaiveDate, NaiveDateTime};

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// A day of clinic appointments spread over staggered starts, with a
/// third of them requiring the "exam" capability.
fn clinic_day(n: usize) -> (Vec<Appointment>, Vec<Resource>) {
    let types = [
        AppointmentType::Consultation,
        AppointmentType::FollowUp,
        AppointmentType::Therapy,
        AppointmentType::Diagnostic,
    ];
    let priorities = [Priority::Low, Priority::Medium, Priority::High];

    let appointments = (0..n)
        .map(|i| {
            let hour = 8 + (i % 9) as u32;
            let minute = if i % 2 == 0 { 0 } else { 30 };
            let mut a = Appointment::new(
                format!("a{i}"),
                format!("Appointment {i}"),
                at(hour, minute),
                30 + 15 * (i % 3) as i64,
            )
            .unwrap()
            .with_type(types[i % types.len()])
            .with_priority(priorities[i % priorities.len()]);
            if i % 3 == 0 {
                a = a.with_required_capability("exam");
            }
            a
        })
        .collect();

    let resources = (0..(n / 4).max(2))
        .map(|i| {
            let mut r = Resource::new(
                format!("r{i}"),
                format!("Room {i}"),
                ResourceType::Room,
            )
            .with_cost(40.0 + 20.0 * (i % 3) as f64)
            .with_availability(at(8, 0), at(18, 0));
            if i % 2 == 0 {
                r = r.with_capability("exam");
            }
            r
        })
        .collect();

    (appointments, resources)
}

fn bench_csp(c: &mut Criterion) {
    let mut group = c.benchmark_group("csp");
    group.sample_size(10);

    for &n in &[10, 25, 50] {
        let (appointments, resources) = clinic_day(n);
        let config = CspConfig::default();
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(appointments, resources, config),
            |b, (a, r, cfg)| {
                b.iter(|| {
                    let result = CspRunner::run(black_box(a), black_box(r), black_box(cfg));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_ga(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga");
    group.sample_size(10);

    for (n, pop, gens) in [(10usize, 50usize, 50usize), (25, 50, 30), (50, 100, 20)] {
        let (appointments, resources) = clinic_day(n);
        let config = GaConfig::default()
            .with_population_size(pop)
            .with_max_generations(gens)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_p{}_g{}", n, pop, gens), n),
            &(appointments, resources, config),
            |b, (a, r, cfg)| {
                b.iter(|| {
                    let result = GaRunner::run(black_box(a), black_box(r), black_box(cfg));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_sa(c: &mut Criterion) {
    let mut group = c.benchmark_group("sa");
    group.sample_size(10);

    for &n in &[10, 25, 50] {
        let (appointments, resources) = clinic_day(n);
        let config = SaConfig::default()
            .with_max_iterations(1000)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(appointments, resources, config),
            |b, (a, r, cfg)| {
                b.iter(|| {
                    let result = SaRunner::run(black_box(a), black_box(r), black_box(cfg));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_csp, bench_ga, bench_sa);
criterion_main!(benches);
