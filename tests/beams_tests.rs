/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

use leed_rs::beams::{cutoff_k2, generate, select, Incidence, OpticalPotential};
use leed_rs::structure::SurfaceLattice;

const EPS: f64 = 1e-3;
const DMIN: f64 = 3.0;

fn p2x2() -> SurfaceLattice {
    SurfaceLattice::new([4.8, 0.0], [0.0, 4.8], [[2.0, 0.0], [0.0, 2.0]]).unwrap()
}

#[test]
fn test_superstructure_beams_fill_all_sets() {
    let lattice = p2x2();
    let incidence = Incidence::default();
    let full = generate(5.0, &lattice, &incidence, -0.4, EPS, DMIN).unwrap();
    assert_eq!(full.set_count(), 4);
    assert_eq!(full.specular_index(), Some(0));
    assert!(full.iter().any(|b| b.ind_1 == 0.5 && b.ind_2 == 0.0));
    assert!(full.iter().any(|b| b.ind_1 == -0.5 && b.ind_2 == 0.5));
}

#[test]
fn test_lower_energy_selects_fewer_beams() {
    let lattice = p2x2();
    let incidence = Incidence::new(0.15, 0.0);
    let potential = OpticalPotential::new(-0.4, 0.15);
    let full = generate(5.0, &lattice, &incidence, potential.vr, EPS, DMIN).unwrap();

    let low = select(&full, 2.0, &potential, &incidence, EPS, DMIN, lattice.area).unwrap();
    let high = select(&full, 5.0, &potential, &incidence, EPS, DMIN, lattice.area).unwrap();
    assert!(low.len() < high.len());
    assert!(high.len() <= full.len());
    assert_eq!(low.specular_index(), Some(0));

    // the canonical order survives the selection
    let position = |ind: (f64, f64)| {
        high.iter()
            .position(|b| (b.ind_1, b.ind_2) == ind)
            .unwrap()
    };
    let order: Vec<usize> = low.iter().map(|b| position((b.ind_1, b.ind_2))).collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_beam_count_matches_brute_force() {
    let lattice = SurfaceLattice::primitive([4.1, 0.3], [-0.8, 5.2]).unwrap();
    let (energy, vr) = (6.0, -0.35);
    let full = generate(energy, &lattice, &Incidence::default(), vr, EPS, DMIN).unwrap();

    let k_max_2 = cutoff_k2(energy - vr, EPS, DMIN).unwrap();
    let mut count = 0;
    for n1 in -60i32..=60 {
        for n2 in -60i32..=60 {
            let g = lattice.reciprocal_vector(n1 as f64, n2 as f64);
            if g[0] * g[0] + g[1] * g[1] <= k_max_2 {
                count += 1;
            }
        }
    }
    assert_eq!(full.len(), count);
}

#[test]
fn test_skewed_superstructure_count_matches_brute_force() {
    // same superstructure as [[1, 1], [0, 2]], written with a sheared first row
    let lattice =
        SurfaceLattice::new([4.8, 0.0], [0.0, 4.8], [[1.0, 5.0], [0.0, 2.0]]).unwrap();
    let (energy, vr) = (5.0, -0.4);
    let full = generate(energy, &lattice, &Incidence::default(), vr, EPS, DMIN).unwrap();
    assert_eq!(full.set_count(), 2);
    assert!(full.iter().any(|b| b.ind_1 == 0.5 && b.ind_2 == 0.5));

    let rs = lattice.recip_superstructure;
    let k_max_2 = cutoff_k2(energy - vr, EPS, DMIN).unwrap();
    let mut count = 0;
    for n1 in -60i32..=60 {
        for n2 in -60i32..=60 {
            let ind_1 = n1 as f64 * rs[0][0] + n2 as f64 * rs[1][0];
            let ind_2 = n1 as f64 * rs[0][1] + n2 as f64 * rs[1][1];
            let g = lattice.reciprocal_vector(ind_1, ind_2);
            if g[0] * g[0] + g[1] * g[1] <= k_max_2 {
                count += 1;
            }
        }
    }
    assert_eq!(full.len(), count);
}
