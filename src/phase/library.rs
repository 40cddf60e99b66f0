/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Registry of loaded phase shift sets

use super::errors::{PhaseError, Result};
use super::parser::parse_phase_shifts;
use super::{PhaseShiftId, PhaseShiftSet, ThermalModel};
use log::{debug, info};
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Environment variable naming the default phase shift directory
pub const PHASE_ENV_VAR: &str = "CLEED_PHASE";

/// Extension appended to phase shift tags
const PHASE_EXTENSION: &str = "phs";

/// Resolve a phase shift tag or path to a file path
///
/// Absolute paths are used unchanged. A tag is looked up as `<dir>/<tag>.phs`
/// where `dir` is `search_dir` if given, otherwise the value of
/// [`PHASE_ENV_VAR`] passed as `env_value`.
pub fn resolve_phase_path(
    tag: &str,
    search_dir: Option<&Path>,
    env_value: Option<OsString>,
) -> Result<PathBuf> {
    let candidate = Path::new(tag);
    if candidate.is_absolute() {
        return Ok(candidate.to_path_buf());
    }
    let dir = match (search_dir, env_value) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(value)) => PathBuf::from(value),
        (None, None) => {
            return Err(PhaseError::EnvironmentVariable(
                PHASE_ENV_VAR.to_string(),
                tag.to_string(),
            ))
        }
    };
    Ok(dir.join(format!("{}.{}", tag, PHASE_EXTENSION)))
}

/// Phase shift sets of all atom types in a run
///
/// Loading the same file with an equivalent thermal model twice returns the
/// handle of the first load.
#[derive(Debug, Clone, Default)]
pub struct PhaseShiftLibrary {
    sets: Vec<PhaseShiftSet>,
    search_dir: Option<PathBuf>,
}

impl PhaseShiftLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library resolving tags relative to `dir` instead of the environment
    pub fn with_search_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            sets: Vec::new(),
            search_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    pub fn search_dir(&self) -> Option<&Path> {
        self.search_dir.as_deref()
    }

    /// Load a phase shift set
    ///
    /// # Arguments
    ///
    /// * `tag` - Absolute file path, or a tag resolved by [`resolve_phase_path`]
    /// * `thermal` - Thermal model applied when building t-matrices
    ///
    /// # Returns
    ///
    /// Handle of the new set, or of an already loaded equivalent one
    pub fn load(&mut self, tag: &str, thermal: ThermalModel) -> Result<PhaseShiftId> {
        let path = resolve_phase_path(
            tag,
            self.search_dir.as_deref(),
            std::env::var_os(PHASE_ENV_VAR),
        )?;

        if let Some(id) = self.find(&path, &thermal) {
            debug!("reusing phase shift set {} for {}", id.0, path.display());
            return Ok(id);
        }

        let file = File::open(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PhaseError::FileNotFound(path.clone())
            } else {
                PhaseError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let table = parse_phase_shifts(BufReader::new(file), &path)?;
        info!(
            "loaded phase shifts from {} ({} energies, l_max = {})",
            path.display(),
            table.energies.len(),
            table.l_max
        );

        Ok(self.add_set(PhaseShiftSet {
            l_max: table.l_max,
            energies: table.energies,
            shifts: table.shifts,
            thermal,
            source: path,
        }))
    }

    /// Register an already built set, deduplicating like [`load`](Self::load)
    pub fn add_set(&mut self, set: PhaseShiftSet) -> PhaseShiftId {
        if let Some(id) = self.find(&set.source, &set.thermal) {
            return id;
        }
        self.sets.push(set);
        PhaseShiftId(self.sets.len() - 1)
    }

    fn find(&self, path: &Path, thermal: &ThermalModel) -> Option<PhaseShiftId> {
        self.sets
            .iter()
            .position(|s| s.source == path && s.thermal.matches(thermal))
            .map(PhaseShiftId)
    }

    pub fn get(&self, id: PhaseShiftId) -> Result<&PhaseShiftSet> {
        self.sets.get(id.0).ok_or(PhaseError::UnknownPhaseShift(id.0))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhaseShiftId, &PhaseShiftSet)> {
        self.sets
            .iter()
            .enumerate()
            .map(|(i, s)| (PhaseShiftId(i), s))
    }

    /// Largest angular momentum over all sets
    pub fn max_l(&self) -> usize {
        self.sets.iter().map(|s| s.l_max).max().unwrap_or(0)
    }

    /// Energy window `[max of minima, min of maxima]` covered by every set
    pub fn common_energy_range(&self) -> Option<(f64, f64)> {
        self.sets.iter().map(|s| s.energy_range()).reduce(|a, b| (a.0.max(b.0), a.1.min(b.1)))
    }
}
