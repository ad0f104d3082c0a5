//! Validated, immutable description of one calculation
//!
//! Everything here is produced by [`crate::validation`] and only read
//! afterwards; the SCF engine and the report writer both borrow a [`RunConfig`].

use crate::validation::InputWarning;
use crate::xc::XcFunctional;
use periodic_table_on_an_enum::Element;
use std::fmt;

/// Chemical element identified by its symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub symbol: String,
    pub atomic_number: i64,
    /// Atomic mass in amu
    pub atomic_mass: f64,
}

impl From<Element> for Species {
    fn from(element: Element) -> Self {
        Species {
            symbol: element.get_symbol().to_string(),
            atomic_number: element.get_atomic_number() as i64,
            atomic_mass: element.get_atomic_mass() as f64,
        }
    }
}

/// The atom and its plasma environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomSpec {
    pub species: Species,
    /// Net charge of the ion
    pub charge: i64,
    /// Number of electrons, atomic number minus charge
    pub nele: usize,
    /// Ion-sphere radius in bohr
    pub radius: f64,
    /// Mass density in g/cm^3
    pub density: f64,
    /// Electronic temperature in Hartree
    pub temp: f64,
}

impl AtomSpec {
    pub fn atomic_number(&self) -> i64 {
        self.species.atomic_number
    }

    pub fn atomic_mass(&self) -> f64 {
        self.species.atomic_mass
    }

    /// Ion-sphere volume in bohr^3
    pub fn volume(&self) -> f64 {
        crate::units::sphere_volume(self.radius)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    Dirichlet,
    Neumann,
}

impl BoundaryCondition {
    pub const PERMITTED: [&'static str; 2] = ["dirichlet", "neumann"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "dirichlet" => Some(BoundaryCondition::Dirichlet),
            "neumann" => Some(BoundaryCondition::Neumann),
            _ => None,
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::Dirichlet => write!(f, "dirichlet"),
            BoundaryCondition::Neumann => write!(f, "neumann"),
        }
    }
}

/// How electrons outside the bound spectrum are described.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnboundTreatment {
    /// Uniform ideal Fermi gas filling the ion sphere
    Ideal,
}

impl UnboundTreatment {
    pub const PERMITTED: [&'static str; 1] = ["ideal"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ideal" => Some(UnboundTreatment::Ideal),
            _ => None,
        }
    }
}

impl fmt::Display for UnboundTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnboundTreatment::Ideal => write!(f, "ideal"),
        }
    }
}

/// Theoretical model choices for the ion-sphere calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub bc: BoundaryCondition,
    pub spinpol: bool,
    pub spinmag: i64,
    /// Electrons per spin channel: one entry unpolarized, two (up, down) polarized
    pub nele: Vec<usize>,
    pub xfunc: XcFunctional,
    pub cfunc: XcFunctional,
    pub unbound: UnboundTreatment,
}

impl ModelConfig {
    pub fn spindims(&self) -> usize {
        self.nele.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub ngrid: usize,
    /// Left edge of the logarithmic grid, r0 = exp(x0)
    pub x0: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceParams {
    pub econv: f64,
    pub nconv: f64,
    pub vconv: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScfParams {
    pub maxscf: usize,
    pub mixfrac: f64,
    /// Eigenvalues computed per angular momentum
    pub nmax: usize,
    /// Angular momenta considered, l = 0..lmax
    pub lmax: usize,
}

/// Everything a run needs, validated once and shared read-only.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub atom: AtomSpec,
    pub model: ModelConfig,
    pub grid: GridParams,
    pub conv: ConvergenceParams,
    pub scf: ScfParams,
    /// Advisory conditions found during validation
    pub warnings: Vec<InputWarning>,
}
