/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

use approx::assert_relative_eq;
use leed_rs::phase::{
    build_scattering_matrices, CumulantCache, PhaseError, PhaseShiftLibrary, ThermalModel,
};
use leed_rs::utils::constants::HARTREE;
use std::fs::File;
use std::io::Write;
use tempfile::{tempdir, TempDir};

/// Create `<tag>.phs` in a fresh temporary directory
fn create_phase_file(tag: &str, content: &str) -> TempDir {
    let dir = tempdir().unwrap();
    let mut file = File::create(dir.path().join(format!("{}.phs", tag))).unwrap();
    write!(file, "{}", content).unwrap();
    dir
}

const GLUED_EV: &str = "# fixed-format columns
3 2 eV
20.0
 0.50-0.10-0.02
40.0
 0.45-0.15
-0.03
60.0
 0.40-0.20-0.04
";

#[test]
fn test_fixed_format_file_in_ev() {
    let dir = create_phase_file("O", GLUED_EV);
    let mut library = PhaseShiftLibrary::with_search_dir(dir.path());
    let id = library
        .load("O", ThermalModel::DebyeWaller { mean_square: 0.0 })
        .unwrap();
    let set = library.get(id).unwrap();

    assert_eq!(set.l_max, 2);
    assert_eq!(set.energies.len(), 3);
    assert_relative_eq!(set.energies[1], 40.0 / HARTREE, epsilon = 1e-12);
    assert_eq!(set.shifts[1], vec![0.45, -0.15, -0.03]);

    let (lo, hi) = library.common_energy_range().unwrap();
    assert_relative_eq!(lo, 20.0 / HARTREE, epsilon = 1e-12);
    assert_relative_eq!(hi, 60.0 / HARTREE, epsilon = 1e-12);
}

#[test]
fn test_equivalent_loads_share_a_set() {
    let dir = create_phase_file("O", GLUED_EV);
    let mut library = PhaseShiftLibrary::with_search_dir(dir.path());
    let cold = ThermalModel::DebyeWaller { mean_square: 0.01 };
    let a = library.load("O", cold).unwrap();
    let b = library.load("O", cold).unwrap();
    let c = library
        .load("O", ThermalModel::DebyeWaller { mean_square: 0.05 })
        .unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(library.len(), 2);
}

#[test]
fn test_truncated_header_rejected() {
    let dir = create_phase_file("bad", "3\n1.0\n0.1\n");
    let mut library = PhaseShiftLibrary::with_search_dir(dir.path());
    let result = library.load("bad", ThermalModel::DebyeWaller { mean_square: 0.0 });
    assert!(matches!(result, Err(PhaseError::MalformedHeader { .. })));
}

#[test]
fn test_t_matrices_per_set() {
    let dir = create_phase_file("O", GLUED_EV);
    let mut library = PhaseShiftLibrary::with_search_dir(dir.path());
    library
        .load("O", ThermalModel::DebyeWaller { mean_square: 0.0 })
        .unwrap();
    library
        .load(
            "O",
            ThermalModel::Cumulant {
                ux: 0.1,
                uy: 0.1,
                uz: 0.2,
            },
        )
        .unwrap();

    let mut cache = CumulantCache::new();
    let energy = 30.0 / HARTREE;
    let t = build_scattering_matrices(&library, 3, energy, &mut cache).unwrap();
    assert_eq!(t.len(), 2);
    assert_eq!(t[0].rows(), 16);
    assert!(t[0].is_diagonal());
    assert_eq!(t[1].cols(), 16);

    // no displacement: t_0 = sin δ e^{iδ} with δ interpolated between grid points
    let delta: f64 = 0.475;
    let t00 = t[0].get(1, 1).unwrap();
    assert_relative_eq!(t00.re, delta.sin() * delta.cos(), epsilon = 1e-12);
    assert_relative_eq!(t00.im, delta.sin() * delta.sin(), epsilon = 1e-12);
    // l = 3 lies above the tabulated range
    assert_relative_eq!(t[0].get(16, 16).unwrap().norm(), 0.0);

    let below = build_scattering_matrices(&library, 3, 10.0 / HARTREE, &mut cache);
    assert!(matches!(below, Err(PhaseError::EnergyBelowRange { .. })));
}
