use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::Vec2;
use shadow_lab::shadow::{MomentsGrid, SatBuilder};

fn moments(size: u32) -> MomentsGrid {
    MomentsGrid::from_depths(size, size, |x, y| ((x * 7 + y * 13) % 97) as f32 / 97.0)
}

pub fn build_sat(c: &mut Criterion) {
    let mut group = c.benchmark_group("sat_build");
    for size in [64u32, 256, 512] {
        let grid = moments(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &grid, |b, grid| {
            let builder = SatBuilder::default();
            b.iter(|| black_box(builder.build(grid.clone())));
        });
    }
    group.finish();
}

pub fn sat_base(c: &mut Criterion) {
    let grid = moments(256);
    let mut group = c.benchmark_group("sat_base");
    for base in [2u32, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(base), &base, |b, &base| {
            let builder = SatBuilder::new(base);
            b.iter(|| black_box(builder.build(grid.clone())));
        });
    }
    group.finish();
}

pub fn box_query(c: &mut Criterion) {
    let sat = SatBuilder::default().build(MomentsGrid::filled(512, 512, Vec2::new(0.5, 0.25)));
    c.bench_function("sat_box_mean", |b| {
        b.iter(|| {
            let mut acc = Vec2::ZERO;
            for y in (2..510).step_by(7) {
                for x in (2..510).step_by(7) {
                    acc += sat.box_mean(x - 2, y - 2, x + 2, y + 2);
                }
            }
            black_box(acc)
        });
    });
}

criterion_group!(benches, build_sat, sat_base, box_query);
criterion_main!(benches);
