//! Ion-sphere size from radius, density or both

use crate::config::{InputValue, UNSPECIFIED};
use crate::error::{AvAtomError, Result};
use crate::units::{density_to_radius, radius_to_density, DensityUnit, LengthUnit};
use tracing::debug;

/// Largest relative mismatch accepted when both radius and density are given.
pub const DENSITY_TOLERANCE: f64 = 5e-2;
/// Smallest accepted radius in bohr.
const RADIUS_MIN: f64 = 0.1;
/// Largest accepted mass density in g/cm^3.
const DENSITY_MAX: f64 = 100.0;

/// Radius (bohr) and mass density (g/cm^3) of the ion sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub radius: f64,
    pub density: f64,
}

fn specified(value: Option<&InputValue>, what: &str) -> Result<Option<f64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let x = value
        .as_f64()
        .ok_or_else(|| AvAtomError::Density(format!("{what} '{value}' is not a number")))?;
    if !x.is_finite() {
        return Err(AvAtomError::Density(format!("{what} is not finite")));
    }
    Ok(if x == UNSPECIFIED { None } else { Some(x) })
}

/// Parse units and values, then reconcile. A missing value or the
/// [`UNSPECIFIED`] sentinel means "not given".
pub fn validate_radius_density(
    atom_mass: f64,
    radius: Option<&InputValue>,
    density: Option<&InputValue>,
    radius_unit: &str,
    density_unit: &str,
) -> Result<CellSize> {
    let radius_unit = LengthUnit::parse(radius_unit).ok_or_else(|| {
        AvAtomError::Unit(format!(
            "radius units '{radius_unit}' not recognised (use bohr or angstrom)"
        ))
    })?;
    let density_unit = DensityUnit::parse(density_unit).ok_or_else(|| {
        AvAtomError::Unit(format!("density units '{density_unit}' not recognised (use g/cm3)"))
    })?;

    let radius = specified(radius, "radius")?.map(|r| radius_unit.to_bohr(r));
    let density = specified(density, "density")?.map(|d| density_unit.to_g_per_cm3(d));
    reconcile_radius_density(atom_mass, radius, density)
}

fn check_radius(radius: f64) -> Result<()> {
    if radius < RADIUS_MIN {
        return Err(AvAtomError::Density(format!(
            "radius must be a positive number greater than {RADIUS_MIN} bohr"
        )));
    }
    Ok(())
}

fn check_density(density: f64) -> Result<()> {
    if density <= 0.0 || density > DENSITY_MAX {
        return Err(AvAtomError::Density(format!(
            "density must be a positive number no greater than {DENSITY_MAX} g/cm^3"
        )));
    }
    Ok(())
}

/// Resolve the ion sphere from radius (bohr) and/or density (g/cm^3).
///
/// With both given the radius is the anchor: the density is recomputed from it
/// and must agree with the given one within [`DENSITY_TOLERANCE`].
pub fn reconcile_radius_density(
    atom_mass: f64,
    radius: Option<f64>,
    density: Option<f64>,
) -> Result<CellSize> {
    match (radius, density) {
        (Some(radius), None) => {
            check_radius(radius)?;
            Ok(CellSize {
                radius,
                density: radius_to_density(atom_mass, radius),
            })
        }
        (None, Some(density)) => {
            check_density(density)?;
            Ok(CellSize {
                radius: density_to_radius(atom_mass, density),
                density,
            })
        }
        (Some(radius), Some(density)) => {
            check_radius(radius)?;
            check_density(density)?;
            let density_test = radius_to_density(atom_mass, radius);
            let mismatch = ((density_test - density) / density).abs();
            debug!(
                "radius {:.4} bohr gives density {:.4} g/cm^3 (given {:.4}, mismatch {:.2e})",
                radius, density_test, density, mismatch
            );
            if mismatch > DENSITY_TOLERANCE {
                return Err(AvAtomError::Density(
                    "incompatible radius and density".into(),
                ));
            }
            Ok(CellSize {
                radius,
                density: density_test,
            })
        }
        (None, None) => Err(AvAtomError::Density(
            "one of radius or density must be specified".into(),
        )),
    }
}
