/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use leed_rs::beams::{generate, select, BeamList, Incidence, OpticalPotential};
use leed_rs::lattice::sum_same_layer;
use leed_rs::layer::{assemble_composite, CompositeSettings, GauntCache};
use leed_rs::matrix::{partitioned_inverse, Matrix, NumKind};
use leed_rs::phase::PhaseShiftId;
use leed_rs::structure::{Atom, Layer, LayerRole, SurfaceLattice};
use num_complex::Complex64;

const ENERGY: f64 = 4.0;
const EPS: f64 = 1e-3;

fn test_matrix(n: usize) -> Matrix {
    let mut m = Matrix::zeros(n, n, NumKind::Complex).unwrap();
    for i in 1..=n {
        for j in 1..=n {
            let x = ((i * 7 + j * 3) % 11) as f64 / 11.0;
            let diag = if i == j { n as f64 } else { 0.0 };
            m.set(i, j, Complex64::new(diag + x, 0.5 * x)).unwrap();
        }
    }
    m
}

fn t_matrix(l_max: usize) -> Matrix {
    let mut diag = Vec::new();
    for l in 0..=l_max {
        let delta = (1.2 - 0.2 * l as f64).max(0.0);
        let t = delta.sin() * Complex64::from_polar(1.0, delta);
        diag.extend(std::iter::repeat(t).take(2 * l + 1));
    }
    Matrix::diagonal(&diag).unwrap()
}

fn setup() -> (SurfaceLattice, BeamList, Complex64) {
    let lattice = SurfaceLattice::primitive([4.7, 0.0], [0.0, 4.7]).unwrap();
    let incidence = Incidence::new(0.1, 0.0);
    let potential = OpticalPotential::new(-0.4, 0.15);
    let full = generate(ENERGY, &lattice, &incidence, potential.vr, EPS, 3.0).unwrap();
    let beams = select(&full, ENERGY, &potential, &incidence, EPS, 3.0, lattice.area).unwrap();
    (lattice, beams, potential.wave_number(ENERGY))
}

fn inversion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Matrix Inversion");
    let m = test_matrix(128);

    group.bench_function("inverse_128", |b| {
        b.iter(|| black_box(m.inverse().unwrap()))
    });

    group.bench_function("partitioned_inverse_128", |b| {
        b.iter(|| black_box(partitioned_inverse(&m, 64).unwrap()))
    });

    group.finish();
}

fn lattice_sum_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Lattice Sums");
    let (lattice, _, k) = setup();

    for l_max in [4usize, 8] {
        group.bench_function(format!("same_layer_l{}", l_max), |b| {
            b.iter(|| {
                black_box(
                    sum_same_layer(k, [0.1, 0.0], lattice.a1, lattice.a2, l_max, EPS).unwrap(),
                )
            })
        });
    }

    group.finish();
}

fn composite_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Composite Layer");
    group.sample_size(10);
    let (lattice, beams, k) = setup();
    let l_max = 6;
    let t = vec![t_matrix(l_max)];
    let settings = CompositeSettings {
        l_max,
        epsilon: EPS,
    };
    let atoms = vec![
        Atom::new(PhaseShiftId(0), [0.0, 0.0, 0.0]),
        Atom::new(PhaseShiftId(0), [2.35, 2.35, 3.3]),
    ];
    let layer = Layer::new(0, LayerRole::Bulk, [0.0; 3], &lattice, atoms).unwrap();

    group.bench_function("two_plane_layer", |b| {
        let mut cache = GauntCache::new();
        b.iter(|| {
            black_box(assemble_composite(&layer, &beams, &t, k, &settings, &mut cache).unwrap())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    inversion_benchmark,
    lattice_sum_benchmark,
    composite_benchmark
);
criterion_main!(benches);
