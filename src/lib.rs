//! Average-atom self-consistent field calculations
//!
//! An atom sits at the centre of a neutral sphere of plasma (the ion-sphere
//! model). Kohn-Sham orbitals, density and potential are iterated to self
//! consistency on a logarithmic radial grid, giving the free energy and the
//! ionization state at a given temperature and density.

pub mod app;
pub mod config;
pub mod error;
pub mod grid;
pub mod io;
pub mod model;
pub mod scf_impl;
pub mod units;
pub mod validation;
pub mod xc;

pub use error::{AvAtomError, Result};
pub use model::RunConfig;
pub use scf_impl::{FieldBuilder, OrbitalSolver, ScfEngine, ScfOutcome, ScfStatus, StaticKs};
