/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Run descriptions and engine configuration
//!
//! A calculation is described by a JSON document holding the surface
//! lattice, the phase-shift sets, the layers and an optional `config` block:
//!
//! ```json
//! {
//!   "lattice": { "a1": [2.49, 0.0], "a2": [0.0, 2.49] },
//!   "phase_shifts": [ { "tag": "Ni" } ],
//!   "layers": [ { "role": "bulk", "atoms": [ { "phase": 0, "position": [0, 0, 0] } ] } ],
//!   "bulk_repeat": [1.245, 1.245, 1.76],
//!   "dmin": 1.2,
//!   "config": { "l_max": 6 }
//! }
//! ```

pub mod config;
pub mod errors;
pub mod model;

pub use config::EngineConfig;
pub use errors::{InputError, Result};
pub use model::{AtomSpec, LatticeSpec, LayerSpec, PhaseShiftSpec, RunDescription};
