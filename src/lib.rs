/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! # leed-rs
//!
//! Dynamical low-energy electron diffraction (LEED) intensities from a
//! layered crystal model.
//!
//! The calculation follows the layer-doubling scheme: every layer is solved
//! in a spherical-wave basis including all multiple scattering between its
//! atoms, converted into plane-wave reflection and transmission matrices,
//! and the layers are stacked in the beam representation. The bulk is built
//! by repeated doubling until the reflection matrix converges.
//!
//! All quantities are in Hartree atomic units internally. The z axis points
//! towards the vacuum.

pub mod beams;
pub mod cli;
pub mod doubling;
pub mod engine;
pub mod input;
pub mod lattice;
pub mod layer;
pub mod matrix;
pub mod phase;
pub mod structure;
pub mod utils;

pub use engine::{BeamIntensity, EnergyResult, LeedSession};
pub use input::{EngineConfig, RunDescription};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
