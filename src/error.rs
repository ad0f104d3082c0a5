//! Error types for input validation and the SCF calculation
//!
//! Every variant carries a human-readable reason and prints with the input
//! category as prefix, so the binary can report a failure in one line.

use std::path::PathBuf;
use thiserror::Error;

/// Which slot of the exchange-correlation pair a functional was given for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XcSlot {
    Exchange,
    Correlation,
}

impl std::fmt::Display for XcSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XcSlot::Exchange => write!(f, "exchange"),
            XcSlot::Correlation => write!(f, "correlation"),
        }
    }
}

/// Why a functional could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionalFailure {
    /// The input was neither an integer id nor a string name.
    NotIdOrName,
    /// The id or name does not match any known functional.
    Unknown(String),
    /// The functional exists but belongs to a family that is not supported.
    UnsupportedFamily { name: String, family: String },
}

impl std::fmt::Display for FunctionalFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionalFailure::NotIdOrName => {
                write!(f, "functional is not an id (int) or name (str)")
            }
            FunctionalFailure::Unknown(given) => {
                write!(f, "'{given}' is not a valid functional name or id")
            }
            FunctionalFailure::UnsupportedFamily { name, family } => write!(
                f,
                "'{name}' belongs to the {family} family, which is not supported (supported: lda)"
            ),
        }
    }
}

/// The primary error type for all fallible operations in the library.
#[derive(Error, Debug)]
pub enum AvAtomError {
    #[error("Error in atomic species input: {0}")]
    Species(String),

    #[error("Error in units input: {0}")]
    Unit(String),

    #[error("Error in temperature input: {0}")]
    Temperature(String),

    #[error("Error in charge input: {0}")]
    Charge(String),

    #[error("Error in density input: {0}")]
    Density(String),

    #[error("Error in spin input: {0}")]
    Spin(String),

    #[error("Error in xc input ({slot}): {reason}")]
    Functional {
        slot: XcSlot,
        reason: FunctionalFailure,
    },

    #[error("Error in boundary condition input: {0}")]
    BoundaryCondition(String),

    #[error("Error in unbound electron input: {0}")]
    UnboundTreatment(String),

    #[error("Error in grid inputs: {0}")]
    Grid(String),

    #[error("Error in convergence inputs: {0}")]
    ConvergenceParam(String),

    #[error("Error in scf_params input: {0}")]
    ScfParam(String),

    /// Non-finite values produced by the eigensolver or a density/potential build.
    #[error("Numerical failure during SCF iteration {iteration}: {reason}")]
    Numerical { iteration: usize, reason: String },

    #[error("I/O error at path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AvAtomError {
    pub(crate) fn numerical(iteration: usize, reason: impl Into<String>) -> Self {
        AvAtomError::Numerical {
            iteration,
            reason: reason.into(),
        }
    }

    /// True for failures raised while checking inputs, before any numerical work.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            AvAtomError::Numerical { .. } | AvAtomError::Io { .. } | AvAtomError::Csv(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AvAtomError>;
