/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Command Line Interface (CLI) module
//!
//! Evaluates a run description over an energy range and formats the beam
//! intensities as a whitespace table or as JSON.

use crate::engine::{EnergyResult, LeedSession};
use crate::input::{EngineConfig, RunDescription};
use crate::utils::conversions::{ev_to_hartree, hartree_to_ev};
use anyhow::{bail, Context};
use clap::{ArgAction, Parser};
use log::{info, LevelFilter};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "leed-rs",
    version,
    about = "Dynamical LEED intensities from a JSON run description"
)]
pub struct Cli {
    /// Run description (JSON)
    pub input: PathBuf,

    /// First energy (eV)
    #[arg(long, default_value_t = 50.0)]
    pub start: f64,

    /// Last energy (eV)
    #[arg(long, default_value_t = 300.0)]
    pub stop: f64,

    /// Energy step (eV)
    #[arg(long, default_value_t = 4.0)]
    pub step: f64,

    /// Directory with the phase shift files
    #[arg(long)]
    pub phase_dir: Option<PathBuf>,

    /// Upper bound of the angular momentum
    #[arg(long)]
    pub l_max: Option<usize>,

    /// Amplitude cutoff for beams and lattice sums
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log level selected by `-v`
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Replace configuration values given on the command line
    pub fn apply_overrides(&self, config: &mut EngineConfig) {
        if let Some(dir) = &self.phase_dir {
            config.phase_dir = Some(dir.clone());
        }
        if let Some(l_max) = self.l_max {
            config.l_max = l_max;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
    }

    /// Energies of the scan (eV), `stop` included when it lies on the grid
    pub fn energies(&self) -> anyhow::Result<Vec<f64>> {
        if self.step <= 0.0 {
            bail!("energy step must be positive, got {}", self.step);
        }
        if self.stop < self.start {
            bail!(
                "energy range is empty: start {} eV lies above stop {} eV",
                self.start,
                self.stop
            );
        }
        let n = ((self.stop - self.start) / self.step + 1.0e-9).floor() as usize;
        Ok((0..=n).map(|i| self.start + i as f64 * self.step).collect())
    }
}

/// Intensity-energy curves of the beams propagating at the highest energy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IvCurves {
    /// Beam indices
    pub beams: Vec<[f64; 2]>,
    /// Energies (eV)
    pub energies: Vec<f64>,
    /// `intensities[e][b]`; zero where the beam does not propagate
    pub intensities: Vec<Vec<f64>>,
}

impl IvCurves {
    pub fn from_results(results: &[EnergyResult]) -> Self {
        let beams: Vec<[f64; 2]> = results
            .last()
            .map(|r| r.intensities.iter().map(|b| [b.ind_1, b.ind_2]).collect())
            .unwrap_or_default();
        let same =
            |a: [f64; 2], b: [f64; 2]| (a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6;
        let intensities = results
            .iter()
            .map(|r| {
                beams
                    .iter()
                    .map(|&idx| {
                        r.intensities
                            .iter()
                            .find(|b| same([b.ind_1, b.ind_2], idx))
                            .map_or(0.0, |b| b.intensity)
                    })
                    .collect()
            })
            .collect();
        Self {
            beams,
            energies: results.iter().map(|r| hartree_to_ev(r.energy)).collect(),
            intensities,
        }
    }

    /// Whitespace table with one row per energy
    pub fn to_table(&self) -> String {
        let mut out = String::from("# E(eV)");
        for b in &self.beams {
            let _ = write!(out, " ({:.2},{:.2})", b[0], b[1]);
        }
        out.push('\n');
        for (energy, row) in self.energies.iter().zip(&self.intensities) {
            let _ = write!(out, "{:8.2}", energy);
            for value in row {
                let _ = write!(out, " {:.6e}", value);
            }
            out.push('\n');
        }
        out
    }
}

/// Run the calculation described by the command line
///
/// # Returns
///
/// The formatted output, a table or JSON
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    let mut description = RunDescription::from_file(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    cli.apply_overrides(&mut description.config);

    let energies = cli.energies()?;
    let mut session = LeedSession::from_description(&description)
        .context("setting up the calculation")?;
    session.prepare_beams(ev_to_hartree(cli.stop))?;

    let mut results = Vec::with_capacity(energies.len());
    for energy in energies {
        let result = session
            .compute_energy(ev_to_hartree(energy))
            .with_context(|| format!("at {:.2} eV", energy))?;
        info!(
            "{:.2} eV: {} beams propagating",
            energy,
            result.intensities.len()
        );
        results.push(result);
    }

    let curves = IvCurves::from_results(&results);
    if cli.json {
        Ok(serde_json::to_string_pretty(&curves)?)
    } else {
        Ok(curves.to_table())
    }
}
