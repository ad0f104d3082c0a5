//! Input validation
//!
//! Every external parameter goes through here before any numerical work.
//! Errors abort immediately; advisory conditions are logged with `warn!` and
//! collected so the caller can inspect them, but never change control flow.

mod atom;
mod cell;
mod model;
mod params;

pub use atom::{validate_charge, validate_species, validate_temperature};
pub use cell::{reconcile_radius_density, validate_radius_density, CellSize, DENSITY_TOLERANCE};
pub use model::{
    calc_nele, validate_boundary_condition, validate_functional, validate_functional_with,
    validate_spin, validate_unbound_treatment, SpinConfig,
};
pub use params::{validate_convergence_params, validate_grid_params, validate_scf_params};

use crate::config::{Config, InputValue};
use crate::error::{AvAtomError, Result};
use crate::model::{AtomSpec, BoundaryCondition, ModelConfig, RunConfig};
use crate::xc::{BuiltinResolver, FunctionalResolver};
use std::fmt;
use tracing::warn;

/// Non-fatal conditions: the calculation proceeds, results may be poor.
#[derive(Debug, Clone, PartialEq)]
pub enum InputWarning {
    TemperatureLow(f64),
    TemperatureHigh(f64),
    GridCountLow(usize),
    GridCountHigh(usize),
}

impl fmt::Display for InputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputWarning::TemperatureLow(t) | InputWarning::TemperatureHigh(t) => {
                let level = if matches!(self, InputWarning::TemperatureLow(_)) {
                    "low"
                } else {
                    "high"
                };
                write!(
                    f,
                    "temperature {t:.4e} Ha is very {level}; proceeding anyway, \
                     but results may not be accurate (normal range is 0.01 -- 3.5 Ha)"
                )
            }
            InputWarning::GridCountLow(n) => write!(
                f,
                "number of grid points ({n}) is very low; proceeding anyway, \
                 but results may be inaccurate (suggested range is 1000 -- 5000)"
            ),
            InputWarning::GridCountHigh(n) => write!(
                f,
                "number of grid points ({n}) is very high; proceeding anyway, \
                 but the calculation may be expensive (suggested range is 1000 -- 5000)"
            ),
        }
    }
}

pub(crate) fn push_warning(warnings: &mut Vec<InputWarning>, warning: InputWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}

fn required<'a>(
    value: &'a Option<InputValue>,
    err: impl FnOnce() -> AvAtomError,
) -> Result<&'a InputValue> {
    value.as_ref().ok_or_else(err)
}

/// Validate a whole configuration into an immutable [`RunConfig`].
pub fn validate_run(config: &Config) -> Result<RunConfig> {
    validate_run_with(config, &BuiltinResolver)
}

/// As [`validate_run`], with a caller-supplied functional resolver.
pub fn validate_run_with(config: &Config, resolver: &dyn FunctionalResolver) -> Result<RunConfig> {
    let config = config.clone().with_defaults();
    let mut warnings = Vec::new();

    let atom_in = &config.atom;
    let species = validate_species(&atom_in.species)?;

    let temp_units = atom_in.temperature_units.as_deref().unwrap_or("ha");
    let temp = validate_temperature(&atom_in.temperature, temp_units, &mut warnings)?;

    let charge = validate_charge(required(&atom_in.charge, || {
        AvAtomError::Charge("charge is not specified".into())
    })?)?;
    let nele = species.atomic_number.checked_sub(charge).ok_or_else(|| {
        AvAtomError::Charge(format!("net charge {charge} is out of range for any ion"))
    })?;
    if nele <= 0 {
        return Err(AvAtomError::Charge(format!(
            "net charge {charge} leaves no electrons for {} (Z = {})",
            species.symbol, species.atomic_number
        )));
    }

    let cell = validate_radius_density(
        species.atomic_mass,
        atom_in.radius.as_ref(),
        atom_in.density.as_ref(),
        atom_in.radius_units.as_deref().unwrap_or("bohr"),
        atom_in.density_units.as_deref().unwrap_or("g/cm3"),
    )?;

    let atom = AtomSpec {
        species,
        charge,
        nele: nele as usize,
        radius: cell.radius,
        density: cell.density,
        temp,
    };

    let model_in = &config.model;
    let spin = validate_spin(
        required(&model_in.spinpol, || AvAtomError::Spin("spinpol is not specified".into()))?,
        required(&model_in.spinmag, || AvAtomError::Spin("spinmag is not specified".into()))?,
        atom.nele,
    )?;
    let (xfunc, cfunc) = validate_functional_with(
        resolver,
        required(&model_in.xfunc, || AvAtomError::Functional {
            slot: crate::error::XcSlot::Exchange,
            reason: crate::error::FunctionalFailure::NotIdOrName,
        })?,
        required(&model_in.cfunc, || AvAtomError::Functional {
            slot: crate::error::XcSlot::Correlation,
            reason: crate::error::FunctionalFailure::NotIdOrName,
        })?,
    )?;
    let bc = validate_boundary_condition(required(&model_in.bc, || {
        AvAtomError::BoundaryCondition("boundary condition is not specified".into())
    })?)?;
    let unbound = validate_unbound_treatment(required(&model_in.unbound, || {
        AvAtomError::UnboundTreatment("unbound treatment is not specified".into())
    })?)?;

    let model = ModelConfig {
        bc,
        spinpol: spin.spinpol,
        spinmag: spin.spinmag,
        nele: spin.nele,
        xfunc: xfunc.functional(),
        cfunc: cfunc.functional(),
        unbound,
    };

    let grid = validate_grid_params(&config.grid_params, &mut warnings)?;
    let conv = validate_convergence_params(&config.conv_params)?;
    let scf = validate_scf_params(&config.scf_params)?;

    // Dirichlet pins the outermost point, leaving one unknown fewer
    let unknowns = match bc {
        BoundaryCondition::Dirichlet => grid.ngrid - 1,
        BoundaryCondition::Neumann => grid.ngrid,
    };
    if scf.nmax > unknowns {
        return Err(AvAtomError::Grid(format!(
            "{} grid points with {bc} boundary give {unknowns} radial unknowns, \
             fewer than nmax = {}",
            grid.ngrid, scf.nmax
        )));
    }

    Ok(RunConfig {
        atom,
        model,
        grid,
        conv,
        scf,
        warnings,
    })
}
