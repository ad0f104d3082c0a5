//! Self-consistent field iteration for the ion-sphere model
//!
//! The engine in [`engine`] only talks to two collaborators: an
//! [`OrbitalSolver`] that turns a Kohn-Sham potential into occupied orbitals,
//! and a [`FieldBuilder`] that turns orbitals into density, potential and
//! energy. [`StaticKs`] implements both on a logarithmic radial grid.
//!
//! Spin-resolved quantities are stored as `nspin × ngrid` matrices, one row per
//! spin channel.

mod convergence;
mod engine;
mod occupation;
mod radial;
mod staticks;
mod unbound;


pub use convergence::{ConvergenceResult, ConvergenceTracker};
pub use engine::{IterationState, ScfEngine, ScfOutcome, ScfStatus, MIXING_START_ITERATION};
pub use occupation::{
    degeneracy, fermi_dirac, find_chemical_potential, occupation_entropy, Level, TEMP_FLOOR,
};
pub use radial::{align_eigenvectors, RadialSolver, RadialStates, Tridiagonal};
pub use staticks::StaticKs;
pub use unbound::{fermi_integral, IdealGas, UnboundElectrons};

use crate::error::Result;
use nalgebra::{DMatrix, DVector};

/// Kohn-Sham eigenstates for every spin channel and angular momentum.
#[derive(Debug, Clone)]
pub struct Orbitals {
    /// Indexed as `states[spin][l]`
    pub states: Vec<Vec<RadialStates>>,
    /// Potential the states were solved in, one row per spin
    pub potential: DMatrix<f64>,
}

impl Orbitals {
    pub fn nspin(&self) -> usize {
        self.states.len()
    }

    pub fn lmax(&self) -> usize {
        self.states.first().map_or(0, Vec::len)
    }

    pub fn nmax(&self) -> usize {
        self.states
            .first()
            .and_then(|s| s.first())
            .map_or(0, |st| st.energies.len())
    }

    /// Eigenvalues of one spin channel as an `lmax × nmax` table.
    pub fn eigenvalues(&self, spin: usize) -> DMatrix<f64> {
        let channel = &self.states[spin];
        DMatrix::from_fn(self.lmax(), self.nmax(), |l, n| channel[l].energies[n])
    }
}

/// Occupation of the orbitals and the unbound electrons, per spin channel.
#[derive(Debug, Clone)]
pub struct Occupations {
    pub mu: Vec<f64>,
    /// Degeneracy times Fermi factor, `lmax × nmax` per spin
    pub occnums: Vec<DMatrix<f64>>,
    pub unbound: Vec<UnboundElectrons>,
}

#[derive(Debug, Clone)]
pub struct Density {
    pub bound: DMatrix<f64>,
    pub unbound: DMatrix<f64>,
}

impl Density {
    pub fn total(&self) -> DMatrix<f64> {
        &self.bound + &self.unbound
    }

    /// Total density summed over spin channels.
    pub fn spin_summed(&self) -> DVector<f64> {
        self.total().row_sum().transpose()
    }
}

#[derive(Debug, Clone)]
pub struct Potential {
    pub v_en: DVector<f64>,
    pub v_ha: DVector<f64>,
    /// Exchange-correlation potential, one row per spin
    pub v_xc: DMatrix<f64>,
}

impl Potential {
    /// Kohn-Sham potential v_en + v_ha + v_xc for each spin channel.
    pub fn total(&self) -> DMatrix<f64> {
        let mut v_s = self.v_xc.clone();
        for mut row in v_s.row_iter_mut() {
            for (i, v) in row.iter_mut().enumerate() {
                *v += self.v_en[i] + self.v_ha[i];
            }
        }
        v_s
    }
}

/// Energy and entropy contributions in Hartree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Energy {
    pub kinetic_bound: f64,
    pub kinetic_unbound: f64,
    pub electron_nuclear: f64,
    pub hartree: f64,
    pub exchange: f64,
    pub correlation: f64,
    pub entropy_bound: f64,
    pub entropy_unbound: f64,
    pub temp: f64,
}

impl Energy {
    pub fn kinetic(&self) -> f64 {
        self.kinetic_bound + self.kinetic_unbound
    }

    pub fn xc(&self) -> f64 {
        self.exchange + self.correlation
    }

    pub fn total(&self) -> f64 {
        self.kinetic() + self.electron_nuclear + self.hartree + self.xc()
    }

    pub fn entropy(&self) -> f64 {
        self.entropy_bound + self.entropy_unbound
    }

    /// Free energy F = E - T·S
    pub fn free(&self) -> f64 {
        self.total() - self.temp * self.entropy()
    }

    pub fn is_finite(&self) -> bool {
        [
            self.kinetic_bound,
            self.kinetic_unbound,
            self.electron_nuclear,
            self.hartree,
            self.exchange,
            self.correlation,
            self.entropy_bound,
            self.entropy_unbound,
        ]
        .iter()
        .all(|x| x.is_finite())
    }
}

/// Produces orbitals from a potential and occupies them.
pub trait OrbitalSolver {
    fn solve(&self, potential: &DMatrix<f64>) -> Result<Orbitals>;
    fn occupy(&self, orbitals: &Orbitals) -> Result<Occupations>;
}

/// Builds density, potential and energy from occupied orbitals.
pub trait FieldBuilder {
    /// Potential used to generate the very first orbitals.
    fn initial_potential(&self) -> DMatrix<f64>;
    fn density(&self, orbitals: &Orbitals, occupations: &Occupations) -> Result<Density>;
    fn potential(&self, density: &Density) -> Result<Potential>;
    fn energy(
        &self,
        orbitals: &Orbitals,
        occupations: &Occupations,
        density: &Density,
        potential: &Potential,
    ) -> Result<Energy>;
}
