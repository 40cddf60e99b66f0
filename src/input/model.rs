/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! JSON run description
//!
//! Lengths are given in Ångström and displacements in Å (root mean square)
//! or Å² (mean square). They are converted to Bohr when the crystal and the
//! phase-shift library are built.

use super::config::EngineConfig;
use super::errors::{InputError, Result};
use crate::phase::{Displacement, PhaseShiftId, PhaseShiftLibrary, ScatteringKind, ThermalModel};
use crate::structure::{Atom, Crystal, Layer, LayerRole, SurfaceLattice};
use crate::utils::conversions::{angstrom_to_bohr, square_angstrom_to_bohr, vector_to_bohr};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn identity() -> [[f64; 2]; 2] {
    [[1.0, 0.0], [0.0, 1.0]]
}

fn diagonal_kind() -> ScatteringKind {
    ScatteringKind::Diagonal
}

fn no_displacement() -> Displacement {
    Displacement::Isotropic { mean_square: 0.0 }
}

/// Surface lattice in Ångström
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatticeSpec {
    pub a1: [f64; 2],
    pub a2: [f64; 2],
    /// Superstructure matrix, rows are the superstructure basis vectors in
    /// units of `a1` and `a2`
    #[serde(default = "identity")]
    pub superstructure: [[f64; 2]; 2],
}

/// One phase-shift set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseShiftSpec {
    /// File name without `.phs`, or an absolute path
    pub tag: String,
    #[serde(default = "diagonal_kind")]
    pub kind: ScatteringKind,
    #[serde(default = "no_displacement")]
    pub displacement: Displacement,
}

/// One atom of a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtomSpec {
    /// Index into `phase_shifts`
    pub phase: usize,
    /// Position in layer coordinates (Å)
    pub position: [f64; 3],
}

/// One layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSpec {
    pub role: LayerRole,
    /// Layer origin in crystal coordinates (Å)
    #[serde(default)]
    pub origin: [f64; 3],
    pub atoms: Vec<AtomSpec>,
}

/// Complete description of a LEED calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunDescription {
    pub lattice: LatticeSpec,
    pub phase_shifts: Vec<PhaseShiftSpec>,
    /// Layers from the deepest to the outermost
    pub layers: Vec<LayerSpec>,
    /// Translation between consecutive bulk units (Å)
    pub bulk_repeat: [f64; 3],
    /// Minimum interlayer spacing (Å)
    pub dmin: f64,
    #[serde(default)]
    pub config: EngineConfig,
}

impl RunDescription {
    /// Read a run description from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("read run description from {}", path.display());
        Self::from_json(&text)
    }

    /// Parse and validate a run description
    pub fn from_json(text: &str) -> Result<Self> {
        let description: RunDescription = serde_json::from_str(text)?;
        description.validate()?;
        Ok(description)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.phase_shifts.is_empty() {
            return Err(InputError::InvalidFormat(
                "at least one phase shift set is required".to_string(),
            ));
        }
        if self.layers.is_empty() {
            return Err(InputError::InvalidFormat(
                "at least one layer is required".to_string(),
            ));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if let Some(atom) = layer.atoms.iter().find(|a| a.phase >= self.phase_shifts.len()) {
                return Err(InputError::InvalidFormat(format!(
                    "layer {} refers to phase shift set {}, but only {} are defined",
                    i,
                    atom.phase,
                    self.phase_shifts.len()
                )));
            }
        }
        self.config.validate()
    }

    /// Surface lattice in Bohr
    pub fn surface_lattice(&self) -> Result<SurfaceLattice> {
        let to_bohr = |v: [f64; 2]| [angstrom_to_bohr(v[0]), angstrom_to_bohr(v[1])];
        Ok(SurfaceLattice::new(
            to_bohr(self.lattice.a1),
            to_bohr(self.lattice.a2),
            self.lattice.superstructure,
        )?)
    }

    /// Thermal model of every phase-shift entry, in Bohr
    pub fn thermal_models(&self) -> Result<Vec<ThermalModel>> {
        self.phase_shifts
            .iter()
            .map(|spec| -> Result<ThermalModel> {
                let displacement = match spec.displacement {
                    Displacement::Isotropic { mean_square } => Displacement::Isotropic {
                        mean_square: square_angstrom_to_bohr(mean_square),
                    },
                    Displacement::Anisotropic { ux, uy, uz } => Displacement::Anisotropic {
                        ux: angstrom_to_bohr(ux),
                        uy: angstrom_to_bohr(uy),
                        uz: angstrom_to_bohr(uz),
                    },
                };
                Ok(ThermalModel::from_parts(spec.kind, displacement)?)
            })
            .collect()
    }

    /// Load every phase-shift entry into `library`
    ///
    /// # Returns
    ///
    /// The library id of each entry of `phase_shifts`. Entries naming the
    /// same file and displacement share one id.
    pub fn load_phase_shifts(&self, library: &mut PhaseShiftLibrary) -> Result<Vec<PhaseShiftId>> {
        let models = self.thermal_models()?;
        let mut ids = Vec::with_capacity(models.len());
        for (spec, model) in self.phase_shifts.iter().zip(models) {
            ids.push(library.load(&spec.tag, model)?);
        }
        info!(
            "{} phase shift entries loaded as {} sets",
            ids.len(),
            library.len()
        );
        Ok(ids)
    }

    /// Crystal in Bohr with atoms referring to the library ids in `ids`
    pub fn build_crystal(&self, ids: &[PhaseShiftId]) -> Result<Crystal> {
        let lattice = self.surface_lattice()?;
        let mut layers = Vec::with_capacity(self.layers.len());
        for (index, spec) in self.layers.iter().enumerate() {
            let atoms = spec
                .atoms
                .iter()
                .map(|a| -> Result<Atom> {
                    let id = ids.get(a.phase).copied().ok_or_else(|| {
                        InputError::InvalidFormat(format!(
                            "no library id for phase shift entry {}",
                            a.phase
                        ))
                    })?;
                    Ok(Atom::new(id, vector_to_bohr(a.position)))
                })
                .collect::<Result<Vec<_>>>()?;
            layers.push(Layer::new(
                index,
                spec.role,
                vector_to_bohr(spec.origin),
                &lattice,
                atoms,
            )?);
        }
        Ok(Crystal::new(
            lattice,
            layers,
            vector_to_bohr(self.bulk_repeat),
            angstrom_to_bohr(self.dmin),
        )?)
    }
}
