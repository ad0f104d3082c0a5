//! Physical constants and unit conversions
//!
//! All quantities inside the calculation are in Hartree atomic units;
//! mass density is kept in g/cm^3.

use std::f64::consts::PI;

/// Hartree per electron-volt
pub const EV_TO_HA: f64 = 1.0 / 27.211_386_245_988;
/// Hartree per kelvin (Boltzmann constant in Hartree/K)
pub const K_TO_HA: f64 = 3.166_811_563_455_5e-6;
/// Bohr per angstrom
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / 0.529_177_210_903;
/// Bohr per centimetre
pub const CM_TO_BOHR: f64 = ANGSTROM_TO_BOHR * 1.0e8;
/// Grams per atomic mass unit
pub const AMU_TO_G: f64 = 1.660_539_066_60e-24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Hartree,
    ElectronVolt,
    Kelvin,
}

impl TemperatureUnit {
    /// Parse a case-insensitive unit string ("ha", "ev" or "k").
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_lowercase().as_str() {
            "ha" | "hartree" => Some(TemperatureUnit::Hartree),
            "ev" => Some(TemperatureUnit::ElectronVolt),
            "k" | "kelvin" => Some(TemperatureUnit::Kelvin),
            _ => None,
        }
    }

    pub fn to_hartree(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Hartree => value,
            TemperatureUnit::ElectronVolt => value * EV_TO_HA,
            TemperatureUnit::Kelvin => value * K_TO_HA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Bohr,
    Angstrom,
}

impl LengthUnit {
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_lowercase().as_str() {
            "bohr" => Some(LengthUnit::Bohr),
            "angstrom" | "ang" => Some(LengthUnit::Angstrom),
            _ => None,
        }
    }

    pub fn to_bohr(self, value: f64) -> f64 {
        match self {
            LengthUnit::Bohr => value,
            LengthUnit::Angstrom => value * ANGSTROM_TO_BOHR,
        }
    }
}

/// Mass density units; only g/cm^3 is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityUnit {
    GramPerCubicCm,
}

impl DensityUnit {
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_lowercase().as_str() {
            "g/cm3" | "gcm3" | "g/cm^3" => Some(DensityUnit::GramPerCubicCm),
            _ => None,
        }
    }

    pub fn to_g_per_cm3(self, value: f64) -> f64 {
        match self {
            DensityUnit::GramPerCubicCm => value,
        }
    }
}

pub fn ha_to_ev(value: f64) -> f64 {
    value / EV_TO_HA
}

pub fn ha_to_kelvin(value: f64) -> f64 {
    value / K_TO_HA
}

pub fn bohr_to_angstrom(value: f64) -> f64 {
    value / ANGSTROM_TO_BOHR
}

/// Volume of a sphere of radius `radius`.
pub fn sphere_volume(radius: f64) -> f64 {
    4.0 * PI * radius.powi(3) / 3.0
}

/// Mass density (g/cm^3) of one atom of mass `atomic_mass` (amu) in a sphere of
/// radius `radius` (bohr).
pub fn radius_to_density(atomic_mass: f64, radius: f64) -> f64 {
    let rad_cm = radius / CM_TO_BOHR;
    let mass_g = AMU_TO_G * atomic_mass;
    mass_g / sphere_volume(rad_cm)
}

/// Sphere radius (bohr) holding one atom of mass `atomic_mass` (amu) at mass
/// density `density` (g/cm^3).
pub fn density_to_radius(atomic_mass: f64, density: f64) -> f64 {
    let mass_g = AMU_TO_G * atomic_mass;
    let vol_cm = mass_g / density;
    let rad_cm = (3.0 * vol_cm / (4.0 * PI)).cbrt();
    rad_cm * CM_TO_BOHR
}
