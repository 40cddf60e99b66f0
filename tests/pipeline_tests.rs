/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

use approx::assert_relative_eq;
use clap::Parser;
use leed_rs::cli::{self, Cli, IvCurves};
use leed_rs::engine::EngineError;
use leed_rs::input::InputError;
use leed_rs::phase::PhaseError;
use leed_rs::utils::ev_to_hartree;
use leed_rs::{LeedSession, RunDescription};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const CU_PHASE: &str = "# Cu test phase shifts (Hartree)
5 3
1.0
 1.20 0.80 0.30 0.05
2.0
 1.00 0.90 0.40 0.10
3.0
 0.85 0.95 0.50 0.15
4.0
 0.70 0.92 0.58 0.21
5.0
 0.58 0.88 0.63 0.26
";

fn description_json(phase_dir: &Path) -> String {
    format!(
        r#"{{
        "lattice": {{ "a1": [2.55, 0.0], "a2": [0.0, 2.55] }},
        "phase_shifts": [
            {{ "tag": "Cu", "displacement": {{ "type": "isotropic", "mean_square": 0.005 }} }}
        ],
        "layers": [
            {{ "role": "bulk", "atoms": [ {{ "phase": 0, "position": [0.0, 0.0, 0.0] }} ] }},
            {{ "role": "overlayer", "origin": [1.275, 1.275, 1.9],
               "atoms": [ {{ "phase": 0, "position": [0.0, 0.0, 0.0] }} ] }}
        ],
        "bulk_repeat": [1.275, 1.275, 1.805],
        "dmin": 1.5,
        "config": {{ "l_max": 3, "epsilon": 1e-3, "phase_dir": {:?} }}
    }}"#,
        phase_dir.to_string_lossy()
    )
}

/// Temporary directory holding `Cu.phs` and `run.json`
fn create_test_run() -> (TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let mut phase = File::create(dir.path().join("Cu.phs")).unwrap();
    write!(phase, "{}", CU_PHASE).unwrap();

    let run_path = dir.path().join("run.json");
    let mut run = File::create(&run_path).unwrap();
    write!(run, "{}", description_json(dir.path())).unwrap();
    (dir, run_path)
}

fn session(run_path: &Path) -> LeedSession {
    let description = RunDescription::from_file(run_path).unwrap();
    LeedSession::from_description(&description).unwrap()
}

#[test]
fn test_specular_intensity_is_physical() {
    let (_dir, run_path) = create_test_run();
    let mut session = session(&run_path);
    session.prepare_beams(ev_to_hartree(90.0)).unwrap();

    for energy in [50.0, 70.0, 90.0] {
        let result = session.compute_energy(ev_to_hartree(energy)).unwrap();
        assert_eq!(result.reflection.rows(), result.beams.len());
        assert!(!result.intensities.is_empty());

        let specular = &result.intensities[0];
        assert_eq!((specular.ind_1, specular.ind_2), (0.0, 0.0));
        assert!(specular.intensity > 0.0 && specular.intensity < 1.0);
        for beam in &result.intensities {
            assert!(beam.intensity.is_finite());
            assert!(beam.intensity >= 0.0);
        }
    }
}

#[test]
fn test_normal_incidence_keeps_fourfold_symmetry() {
    let (_dir, run_path) = create_test_run();
    let mut session = session(&run_path);
    let result = session.compute_energy(ev_to_hartree(70.0)).unwrap();

    let intensity = |i1: f64, i2: f64| {
        result
            .intensities
            .iter()
            .find(|b| b.ind_1 == i1 && b.ind_2 == i2)
            .map(|b| b.intensity)
            .unwrap()
    };
    let reference = intensity(1.0, 0.0);
    assert!(reference > 0.0);
    for (i1, i2) in [(0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)] {
        assert_relative_eq!(intensity(i1, i2), reference, max_relative = 1e-6);
    }
}

#[test]
fn test_repeated_energy_is_reproducible() {
    let (_dir, run_path) = create_test_run();
    let mut session = session(&run_path);
    session.prepare_beams(ev_to_hartree(80.0)).unwrap();

    let first = session.compute_energy(ev_to_hartree(60.0)).unwrap();
    // above the prepared range: beams are regenerated
    let _ = session.compute_energy(ev_to_hartree(100.0)).unwrap();
    let again = session.compute_energy(ev_to_hartree(60.0)).unwrap();

    assert_eq!(first.beams.len(), again.beams.len());
    for (a, b) in first.intensities.iter().zip(&again.intensities) {
        assert_relative_eq!(a.intensity, b.intensity, max_relative = 1e-10);
    }
}

#[test]
fn test_missing_phase_file_reported() {
    let (dir, run_path) = create_test_run();
    std::fs::remove_file(dir.path().join("Cu.phs")).unwrap();
    let description = RunDescription::from_file(&run_path).unwrap();
    let result = LeedSession::from_description(&description);
    assert!(matches!(
        result,
        Err(EngineError::Input(InputError::Phase(PhaseError::FileNotFound(_))))
    ));
}

#[test]
fn test_cli_table_and_json() {
    let (_dir, run_path) = create_test_run();
    let path = run_path.to_string_lossy().to_string();

    let args = Cli::try_parse_from([
        "leed-rs", path.as_str(), "--start", "50", "--stop", "58", "--step", "4",
    ])
    .unwrap();
    let table = cli::run(&args).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("# E(eV) (0.00,0.00)"));

    let args = Cli::try_parse_from([
        "leed-rs", path.as_str(), "--start", "50", "--stop", "54", "--step", "4", "--json",
    ])
    .unwrap();
    let json = cli::run(&args).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["energies"].as_array().unwrap().len(), 2);
    assert_eq!(value["beams"][0], serde_json::json!([0.0, 0.0]));
}

#[test]
fn test_curves_from_session() {
    let (_dir, run_path) = create_test_run();
    let mut session = session(&run_path);
    let results: Vec<_> = [50.0, 60.0]
        .iter()
        .map(|&e| session.compute_energy(ev_to_hartree(e)).unwrap())
        .collect();
    let curves = IvCurves::from_results(&results);
    assert_eq!(curves.energies.len(), 2);
    assert_relative_eq!(curves.energies[0], 50.0, epsilon = 1e-9);
    assert_eq!(curves.intensities[1].len(), curves.beams.len());
}
