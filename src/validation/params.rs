use super::{push_warning, InputWarning};
use crate::config::{
    ConvParamsInput, GridParamsInput, InputValue, ScfParamsInput, DEFAULT_ECONV, DEFAULT_LMAX,
    DEFAULT_MAXSCF, DEFAULT_MIXFRAC, DEFAULT_NCONV, DEFAULT_NGRID, DEFAULT_NMAX, DEFAULT_VCONV,
    DEFAULT_X0,
};
use crate::error::{AvAtomError, Result};
use crate::model::{ConvergenceParams, GridParams, ScfParams};

const NGRID_LOW: usize = 500;
const NGRID_HIGH: usize = 5000;
/// Grids starting to the right of this rarely converge.
const X0_MAX: f64 = -3.0;

fn or_default(value: &Option<InputValue>, default: impl Into<InputValue>) -> InputValue {
    value.clone().unwrap_or_else(|| default.into())
}

pub fn validate_grid_params(
    input: &GridParamsInput,
    warnings: &mut Vec<InputWarning>,
) -> Result<GridParams> {
    let ngrid = or_default(&input.ngrid, DEFAULT_NGRID);
    let x0 = or_default(&input.x0, DEFAULT_X0);

    let ngrid = ngrid
        .as_i64()
        .ok_or_else(|| {
            AvAtomError::Grid(format!("number of grid points '{ngrid}' not an integer"))
        })?;
    // three points are the least the finite-difference solver can use
    if ngrid < 3 {
        return Err(AvAtomError::Grid(format!(
            "number of grid points must be a positive integer of at least 3 (got {ngrid})"
        )));
    }
    let ngrid = ngrid as usize;
    if ngrid < NGRID_LOW {
        push_warning(warnings, InputWarning::GridCountLow(ngrid));
    } else if ngrid > NGRID_HIGH {
        push_warning(warnings, InputWarning::GridCountHigh(ngrid));
    }

    let x0 = x0
        .as_f64()
        .ok_or_else(|| AvAtomError::Grid(format!("x0 '{x0}' is not a number")))?;
    if !x0.is_finite() || x0 > X0_MAX {
        return Err(AvAtomError::Grid(
            "x0 is too high, calculation will likely not converge".into(),
        ));
    }

    Ok(GridParams { ngrid, x0 })
}

fn threshold(value: &Option<InputValue>, default: f64, name: &str) -> Result<f64> {
    let value = or_default(value, default);
    let x = value
        .as_f64()
        .ok_or_else(|| AvAtomError::ConvergenceParam(format!("{name} '{value}' is not a number")))?;
    if !x.is_finite() || x < 0.0 {
        return Err(AvAtomError::ConvergenceParam(format!("{name} cannot be negative")));
    }
    Ok(x)
}

pub fn validate_convergence_params(input: &ConvParamsInput) -> Result<ConvergenceParams> {
    Ok(ConvergenceParams {
        econv: threshold(&input.econv, DEFAULT_ECONV, "econv")?,
        nconv: threshold(&input.nconv, DEFAULT_NCONV, "nconv")?,
        vconv: threshold(&input.vconv, DEFAULT_VCONV, "vconv")?,
    })
}

fn positive_count(value: &Option<InputValue>, default: i64, name: &str) -> Result<usize> {
    let value = or_default(value, default);
    let n = value
        .as_i64()
        .ok_or_else(|| AvAtomError::ScfParam(format!("{name} '{value}' is not an integer")))?;
    if n < 1 {
        return Err(AvAtomError::ScfParam(format!("{name} must be at least 1")));
    }
    Ok(n as usize)
}

pub fn validate_scf_params(input: &ScfParamsInput) -> Result<ScfParams> {
    let maxscf = positive_count(&input.maxscf, DEFAULT_MAXSCF, "maxscf")?;
    let nmax = positive_count(&input.nmax, DEFAULT_NMAX, "nmax")?;
    let lmax = positive_count(&input.lmax, DEFAULT_LMAX, "lmax")?;

    let mixfrac = or_default(&input.mixfrac, DEFAULT_MIXFRAC);
    let mixfrac = mixfrac
        .as_f64()
        .ok_or_else(|| AvAtomError::ScfParam(format!("mixfrac '{mixfrac}' is not a number")))?;
    if !(0.0..=1.0).contains(&mixfrac) {
        return Err(AvAtomError::ScfParam("mixfrac must be in range [0,1]".into()));
    }

    Ok(ScfParams {
        maxscf,
        mixfrac,
        nmax,
        lmax,
    })
}
