//! Performance benchmarks for the Shift Rotation Engine.
//!
//! The engine is synchronous pure computation, so the interesting numbers
//! are single-month generation, multi-month runs with history threading,
//! full-schedule validation and a repair pass over a broken month.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rota_engine::engine::Engine;
use rota_engine::models::{
    Assignment, Designation, Employee, Gender, ScheduleHistory, Shift, ShiftTemplate, Team,
    YearMonth,
};

fn employee(id: &str, level: u8, gender: Gender) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {id}"),
        gender,
        designation: Designation {
            id: format!("des_{level}"),
            title: format!("Level {level}"),
            hierarchy_level: level,
            monthly_leave_allowance: 2,
        },
        leave_dates: BTreeSet::new(),
    }
}

/// A team sized for the given template with two people per shift plus two
/// floater slots of slack.
fn team_of(template: ShiftTemplate) -> Team {
    let size = template.len() * 2 + 2;
    let roster = (0..size)
        .map(|i| {
            let level = match i {
                0 | 1 => 1,
                2 | 3 => 2,
                _ => 3,
            };
            let gender = if i % 2 == 0 { Gender::Female } else { Gender::Male };
            employee(&format!("emp_{:02}", i + 1), level, gender)
        })
        .collect();
    Team {
        id: "team_bench".to_string(),
        name: "Benchmark".to_string(),
        template,
        people_per_shift: 2,
        roster,
    }
}

fn bench_generate_single_month(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_month");
    for (label, template) in [
        ("3-shift", ShiftTemplate::ThreeShift),
        ("4-shift", ShiftTemplate::FourShift),
        ("5-shift", ShiftTemplate::FiveShift),
    ] {
        let team = team_of(template);
        let engine = Engine::default();
        group.bench_with_input(BenchmarkId::from_parameter(label), &team, |b, team| {
            b.iter(|| {
                engine
                    .generate(
                        black_box(team),
                        YearMonth::new(2026, 1),
                        &ScheduleHistory::default(),
                    )
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_generate_run(c: &mut Criterion) {
    let team = team_of(ShiftTemplate::ThreeShift);
    let engine = Engine::default();
    let mut group = c.benchmark_group("generate_run");
    for months in [3usize, 6, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(months), &months, |b, months| {
            b.iter(|| {
                engine
                    .generate_run(black_box(&team), YearMonth::new(2026, 1), *months)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let team = team_of(ShiftTemplate::FiveShift);
    let engine = Engine::default();
    let run = engine
        .generate_run(&team, YearMonth::new(2026, 1), 6)
        .unwrap();
    c.bench_function("validate_run_6_months", |b| {
        b.iter(|| engine.validate_run(black_box(&team), black_box(&run)))
    });
}

fn bench_repair(c: &mut Criterion) {
    let team = team_of(ShiftTemplate::ThreeShift);
    let engine = Engine::default();
    let mut broken = engine
        .generate(&team, YearMonth::new(2026, 1), &ScheduleHistory::default())
        .unwrap();
    // Knock one shift short and put an exempt employee on floater duty.
    broken.assign("emp_05", Assignment::Floater);
    broken.assign("emp_01", Assignment::Floater);
    broken.assign("emp_07", Assignment::Shift(Shift::Morning));

    c.bench_function("repair_broken_month", |b| {
        b.iter(|| engine.repair(black_box(&team), black_box(&broken), &ScheduleHistory::default()))
    });
}

criterion_group!(
    benches,
    bench_generate_single_month,
    bench_generate_run,
    bench_validate,
    bench_repair
);
criterion_main!(benches);
