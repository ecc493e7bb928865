//! Benchmarks for lattice construction and field evaluation.
//!
//! Run with: cargo bench -p ffd-lattice
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p ffd-lattice -- --save-baseline main
//! 2. After changes: cargo bench -p ffd-lattice -- --baseline main

#![allow(missing_docs, clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ffd_lattice::{DisplacementMode, FfdLattice, LatticeParams};
use ffd_types::{Point3, PointCloud, Shape, Vector3};
use std::f64::consts::{PI, TAU};

// =============================================================================
// Fixture Generation
// =============================================================================

/// Regular grid of `side^3` probe points filling most of a span-2 cube.
fn probe_cloud(side: usize) -> PointCloud {
    let mut cloud = PointCloud::with_capacity(side * side * side);
    let step = 1.6 / (side - 1) as f64;
    for xi in 0..side {
        for yi in 0..side {
            for zi in 0..side {
                cloud.push(Point3::new(
                    step.mul_add(xi as f64, -0.8),
                    step.mul_add(yi as f64, -0.8),
                    step.mul_add(zi as f64, -0.8),
                ));
            }
        }
    }
    cloud
}

/// Cube lattice with a bent control field, ready for evaluation.
fn bent_cube_lattice(nodes: usize) -> FfdLattice {
    let shape = Shape::cube(Point3::origin(), [2.0, 2.0, 2.0]);
    let params =
        LatticeParams::new(nodes, nodes, nodes).with_mode(DisplacementMode::Global);
    let mut lattice = FfdLattice::new(shape, params);

    let field: Vec<Vector3<f64>> = (0..lattice.dof_count())
        .map(|i| Vector3::new(0.0, 0.0, 0.05 * (i % 7) as f64))
        .collect();
    lattice.set_displacements(field).unwrap();
    lattice
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("LatticeBuild");

    let cube = Shape::cube(Point3::origin(), [2.0, 2.0, 2.0]);
    group.bench_function("cube_4x4x4", |b| {
        b.iter(|| {
            let mut lattice =
                FfdLattice::new(black_box(cube.clone()), LatticeParams::new(4, 4, 4));
            black_box(lattice.dof_count())
        });
    });

    let sphere = Shape::sphere(Point3::origin(), [1.0, TAU, PI]);
    group.bench_function("sphere_5x9x5", |b| {
        b.iter(|| {
            let mut lattice =
                FfdLattice::new(black_box(sphere.clone()), LatticeParams::new(5, 9, 5));
            black_box(lattice.dof_count())
        });
    });

    group.finish();
}

fn bench_point_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("PointEvaluation");

    for nodes in [3, 5, 8] {
        let mut lattice = bent_cube_lattice(nodes);
        lattice.build();
        group.bench_function(format!("cube_{nodes}x{nodes}x{nodes}"), |b| {
            b.iter(|| black_box(lattice.deform_point(black_box(&Point3::new(0.21, -0.4, 0.33)))));
        });
    }

    group.finish();
}

fn bench_cloud_deformation(c: &mut Criterion) {
    let mut group = c.benchmark_group("CloudDeformation");

    // 10^3 stays sequential, 22^3 crosses the parallel threshold.
    for side in [10, 22] {
        let cloud = probe_cloud(side);
        let mut lattice = bent_cube_lattice(4);
        lattice.build();

        group.throughput(Throughput::Elements(cloud.len() as u64));
        group.bench_function(format!("{}_points", cloud.len()), |b| {
            b.iter(|| black_box(lattice.deform_cloud(black_box(&cloud))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_point_evaluation,
    bench_cloud_deformation
);
criterion_main!(benches);
