/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Energy-point driver
//!
//! [`LeedSession`] owns everything that persists between energies: the
//! configuration, the crystal, the phase-shift library, the beam list of the
//! current energy range and the cached coupling tables. Each call of
//! [`LeedSession::compute_energy`] runs the whole pipeline for one energy:
//!
//! 1. select the beams
//! 2. build the atomic t-matrices
//! 3. assemble the matrices of every layer
//! 4. stack the layers and repeat the bulk
//! 5. derive the beam intensities

pub mod errors;

pub use errors::{EngineError, Result};

use crate::beams::{self, BeamList};
use crate::doubling::crystal_reflection;
use crate::input::{EngineConfig, RunDescription};
use crate::layer::{assemble_composite, CompositeSettings, GauntCache};
use crate::matrix::Matrix;
use crate::phase::{build_scattering_matrices, CumulantCache, PhaseShiftLibrary};
use crate::structure::Crystal;
use log::{debug, info, warn};
use serde::Serialize;

/// Intensity of one beam
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeamIntensity {
    pub ind_1: f64,
    pub ind_2: f64,
    pub intensity: f64,
}

/// Result of one energy point
#[derive(Debug, Clone)]
pub struct EnergyResult {
    /// Vacuum energy (Hartree)
    pub energy: f64,
    /// Beams selected at this energy
    pub beams: BeamList,
    /// Reflection matrix of the crystal in beam order
    pub reflection: Matrix,
    /// Intensities of the beams propagating in vacuum, in beam order
    pub intensities: Vec<BeamIntensity>,
}

/// Computation context of a LEED calculation
#[derive(Debug)]
pub struct LeedSession {
    config: EngineConfig,
    crystal: Crystal,
    library: PhaseShiftLibrary,
    cumulant_cache: CumulantCache,
    gaunt_cache: GauntCache,
    /// Beam list and the maximum energy it was generated for
    beams: Option<(f64, BeamList)>,
}

impl LeedSession {
    /// Create a session from its parts
    pub fn new(config: EngineConfig, crystal: Crystal, library: PhaseShiftLibrary) -> Result<Self> {
        config.validate()?;
        if config.l_max > library.max_l() {
            debug!(
                "l_max = {} exceeds the largest tabulated l = {}; higher channels start empty",
                config.l_max,
                library.max_l()
            );
        }
        Ok(Self {
            config,
            crystal,
            library,
            cumulant_cache: CumulantCache::new(),
            gaunt_cache: GauntCache::new(),
            beams: None,
        })
    }

    /// Load the phase shifts and build the crystal of a run description
    pub fn from_description(description: &RunDescription) -> Result<Self> {
        let config = description.config.clone();
        let mut library = match &config.phase_dir {
            Some(dir) => PhaseShiftLibrary::with_search_dir(dir),
            None => PhaseShiftLibrary::new(),
        };
        let ids = description.load_phase_shifts(&mut library)?;
        let crystal = description.build_crystal(&ids)?;
        info!(
            "{} layers ({} bulk), {} phase shift sets",
            crystal.layers.len(),
            crystal.bulk_layers().len(),
            library.len()
        );
        Self::new(config, crystal, library)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn crystal(&self) -> &Crystal {
        &self.crystal
    }

    pub fn library(&self) -> &PhaseShiftLibrary {
        &self.library
    }

    /// Generate the beam list for energies up to `energy_max` (Hartree)
    ///
    /// The list is kept when it was already generated for the same maximum.
    pub fn prepare_beams(&mut self, energy_max: f64) -> Result<&BeamList> {
        let current = match self.beams.take() {
            Some((e, list)) if (e - energy_max).abs() <= f64::EPSILON * energy_max.abs() => {
                (e, list)
            }
            _ => {
                let list = beams::generate(
                    energy_max,
                    &self.crystal.lattice,
                    &self.config.incidence(),
                    self.config.optical_potential().vr,
                    self.config.epsilon,
                    self.crystal.dmin,
                )?;
                info!(
                    "{} beams generated up to {:.4} Hartree",
                    list.len(),
                    energy_max
                );
                (energy_max, list)
            }
        };
        Ok(&self.beams.insert(current).1)
    }

    /// Reflection matrix and beam intensities at one vacuum energy (Hartree)
    ///
    /// Beams are regenerated when `energy` lies above the prepared range.
    pub fn compute_energy(&mut self, energy: f64) -> Result<EnergyResult> {
        let energy_max = match &self.beams {
            Some((e_max, _)) if energy <= *e_max => *e_max,
            Some(_) => {
                warn!(
                    "energy {:.4} Hartree lies above the prepared beam range; regenerating",
                    energy
                );
                energy
            }
            None => energy,
        };
        let full = self.prepare_beams(energy_max)?.clone();

        let potential = self.config.optical_potential();
        let incidence = self.config.incidence();
        let selected = beams::select(
            &full,
            energy,
            &potential,
            &incidence,
            self.config.epsilon,
            self.crystal.dmin,
            self.crystal.lattice.area,
        )?;
        let specular = selected
            .specular_index()
            .ok_or(EngineError::MissingSpecularBeam(selected.len()))?;

        let e_crystal = potential.crystal_energy(energy);
        let k = potential.wave_number(energy);
        let t_matrices = build_scattering_matrices(
            &self.library,
            self.config.l_max,
            e_crystal.re,
            &mut self.cumulant_cache,
        )?;

        let settings = CompositeSettings {
            l_max: self.config.l_max,
            epsilon: self.config.epsilon,
        };
        let mut layer_matrices = Vec::with_capacity(self.crystal.layers.len());
        for layer in &self.crystal.layers {
            layer_matrices.push(assemble_composite(
                layer,
                &selected,
                &t_matrices,
                k,
                &settings,
                &mut self.gaunt_cache,
            )?);
        }

        let reflection = crystal_reflection(
            &self.crystal,
            &layer_matrices,
            &selected,
            self.config.max_doublings,
            self.config.bulk_tolerance,
        )?;

        let intensities = beam_intensities(&selected, &reflection, specular, energy)?;
        debug!(
            "{:.4} Hartree: {} beams, {} propagating, specular intensity {:.4e}",
            energy,
            selected.len(),
            intensities.len(),
            reflection.get(specular + 1, specular + 1)?.norm_sqr()
        );

        Ok(EnergyResult {
            energy,
            beams: selected,
            reflection,
            intensities,
        })
    }
}

/// Normal momentum of a beam in vacuum, zero for evanescent beams
fn vacuum_k_z(k_parallel: [f64; 2], energy: f64) -> f64 {
    let k_par_2 = k_parallel[0] * k_parallel[0] + k_parallel[1] * k_parallel[1];
    (2.0 * energy - k_par_2).max(0.0).sqrt()
}

/// `I_g = |R_g0|² k_z(g) / k_z(0)` for the beams that propagate in vacuum
pub fn beam_intensities(
    beams: &BeamList,
    reflection: &Matrix,
    specular: usize,
    energy: f64,
) -> Result<Vec<BeamIntensity>> {
    let k_z0 = vacuum_k_z(beams[specular].k_parallel(), energy);
    let mut intensities = Vec::new();
    for (g, beam) in beams.iter().enumerate() {
        let k_z = vacuum_k_z(beam.k_parallel(), energy);
        if k_z <= 0.0 {
            continue;
        }
        let amplitude = reflection.get(g + 1, specular + 1)?;
        intensities.push(BeamIntensity {
            ind_1: beam.ind_1,
            ind_2: beam.ind_2,
            intensity: amplitude.norm_sqr() * k_z / k_z0,
        });
    }
    Ok(intensities)
}
