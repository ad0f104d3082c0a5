//! Configuration management for average-atom calculations
//!
//! This module holds the raw input structures read from YAML, the documented
//! default for every optional key, and the default-filling step. Checking the
//! values is left to [`crate::validation`].

mod args;
mod value;

pub use args::Args;
pub use value::InputValue;

use serde::{Deserialize, Serialize};

/// Marks a radius or density as not given.
pub const UNSPECIFIED: f64 = -1.0;
/// Spin magnetization value that requests automatic assignment.
pub const SPINMAG_AUTO: i64 = -1;

pub const DEFAULT_TEMPERATURE_UNITS: &str = "ha";
pub const DEFAULT_RADIUS_UNITS: &str = "bohr";
pub const DEFAULT_DENSITY_UNITS: &str = "g/cm3";
pub const DEFAULT_CHARGE: i64 = 0;

pub const DEFAULT_XFUNC: &str = "lda_x";
pub const DEFAULT_CFUNC: &str = "lda_c_pw";
pub const DEFAULT_BC: &str = "dirichlet";
pub const DEFAULT_SPINPOL: bool = false;
pub const DEFAULT_UNBOUND: &str = "ideal";

pub const DEFAULT_NGRID: i64 = 1000;
pub const DEFAULT_X0: f64 = -12.0;

pub const DEFAULT_ECONV: f64 = 1.0e-5;
pub const DEFAULT_NCONV: f64 = 1.0e-3;
pub const DEFAULT_VCONV: f64 = 1.0e-3;

pub const DEFAULT_MAXSCF: i64 = 30;
pub const DEFAULT_MIXFRAC: f64 = 0.3;
pub const DEFAULT_NMAX: i64 = 3;
pub const DEFAULT_LMAX: i64 = 3;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub atom: AtomInput,
    #[serde(default)]
    pub model: ModelInput,
    #[serde(default)]
    pub grid_params: GridParamsInput,
    #[serde(default)]
    pub conv_params: ConvParamsInput,
    #[serde(default)]
    pub scf_params: ScfParamsInput,
    #[serde(default)]
    pub output: OutputParams,
}

/// Atomic species and plasma conditions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AtomInput {
    pub species: InputValue,
    pub temperature: InputValue,
    pub temperature_units: Option<String>,
    pub charge: Option<InputValue>,
    pub radius: Option<InputValue>,
    pub density: Option<InputValue>,
    pub radius_units: Option<String>,
    pub density_units: Option<String>,
}

impl AtomInput {
    pub fn new(species: impl Into<InputValue>, temperature: impl Into<InputValue>) -> Self {
        AtomInput {
            species: species.into(),
            temperature: temperature.into(),
            temperature_units: None,
            charge: None,
            radius: None,
            density: None,
            radius_units: None,
            density_units: None,
        }
    }

    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.temperature_units.is_none() {
            self.temperature_units = Some(DEFAULT_TEMPERATURE_UNITS.to_string());
        }
        if self.charge.is_none() {
            self.charge = Some(InputValue::Int(DEFAULT_CHARGE));
        }
        if self.radius.is_none() {
            self.radius = Some(InputValue::Float(UNSPECIFIED));
        }
        if self.density.is_none() {
            self.density = Some(InputValue::Float(UNSPECIFIED));
        }
        if self.radius_units.is_none() {
            self.radius_units = Some(DEFAULT_RADIUS_UNITS.to_string());
        }
        if self.density_units.is_none() {
            self.density_units = Some(DEFAULT_DENSITY_UNITS.to_string());
        }
        self
    }
}

/// Ion-sphere model choices
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelInput {
    pub xfunc: Option<InputValue>,
    pub cfunc: Option<InputValue>,
    pub bc: Option<InputValue>,
    pub spinpol: Option<InputValue>,
    pub spinmag: Option<InputValue>,
    pub unbound: Option<InputValue>,
}

impl ModelInput {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.xfunc.is_none() {
            self.xfunc = Some(DEFAULT_XFUNC.into());
        }
        if self.cfunc.is_none() {
            self.cfunc = Some(DEFAULT_CFUNC.into());
        }
        if self.bc.is_none() {
            self.bc = Some(DEFAULT_BC.into());
        }
        if self.spinpol.is_none() {
            self.spinpol = Some(DEFAULT_SPINPOL.into());
        }
        if self.spinmag.is_none() {
            self.spinmag = Some(SPINMAG_AUTO.into());
        }
        if self.unbound.is_none() {
            self.unbound = Some(DEFAULT_UNBOUND.into());
        }
        self
    }
}

/// Radial grid parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GridParamsInput {
    pub ngrid: Option<InputValue>,
    pub x0: Option<InputValue>,
}

impl GridParamsInput {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.ngrid.is_none() {
            self.ngrid = Some(DEFAULT_NGRID.into());
        }
        if self.x0.is_none() {
            self.x0 = Some(DEFAULT_X0.into());
        }
        self
    }
}

/// Convergence thresholds for energy, density and potential
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConvParamsInput {
    pub econv: Option<InputValue>,
    pub nconv: Option<InputValue>,
    pub vconv: Option<InputValue>,
}

impl ConvParamsInput {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.econv.is_none() {
            self.econv = Some(DEFAULT_ECONV.into());
        }
        if self.nconv.is_none() {
            self.nconv = Some(DEFAULT_NCONV.into());
        }
        if self.vconv.is_none() {
            self.vconv = Some(DEFAULT_VCONV.into());
        }
        self
    }
}

/// SCF cycle parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScfParamsInput {
    pub maxscf: Option<InputValue>,
    pub mixfrac: Option<InputValue>,
    pub nmax: Option<InputValue>,
    pub lmax: Option<InputValue>,
}

impl ScfParamsInput {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.maxscf.is_none() {
            self.maxscf = Some(DEFAULT_MAXSCF.into());
        }
        if self.mixfrac.is_none() {
            self.mixfrac = Some(DEFAULT_MIXFRAC.into());
        }
        if self.nmax.is_none() {
            self.nmax = Some(DEFAULT_NMAX.into());
        }
        if self.lmax.is_none() {
            self.lmax = Some(DEFAULT_LMAX.into());
        }
        self
    }
}

/// Where and whether to write the density / potential tables
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputParams {
    pub write_csv: Option<bool>,
    pub directory: Option<String>,
}

impl Default for OutputParams {
    fn default() -> Self {
        OutputParams {
            write_csv: Some(true),
            directory: Some(".".to_string()),
        }
    }
}

impl OutputParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.write_csv.is_none() {
            self.write_csv = defaults.write_csv;
        }
        if self.directory.is_none() {
            self.directory = defaults.directory;
        }
        self
    }
}

impl Config {
    /// Configuration for `atom` with every other section defaulted.
    pub fn for_atom(atom: AtomInput) -> Self {
        Config {
            atom,
            model: ModelInput::default(),
            grid_params: GridParamsInput::default(),
            conv_params: ConvParamsInput::default(),
            scf_params: ScfParamsInput::default(),
            output: OutputParams::default(),
        }
        .with_defaults()
    }

    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.atom = self.atom.with_defaults();
        self.model = self.model.with_defaults();
        self.grid_params = self.grid_params.with_defaults();
        self.conv_params = self.conv_params.with_defaults();
        self.scf_params = self.scf_params.with_defaults();
        self.output = self.output.with_defaults();
        self
    }

    /// Apply command-line overrides on top of the file values.
    pub fn apply_overrides(mut self, args: &Args) -> Self {
        if let Some(temp) = args.temperature {
            self.atom.temperature = temp.into();
        }
        if let Some(maxscf) = args.maxscf {
            self.scf_params.maxscf = Some(maxscf.into());
        }
        if let Some(mixfrac) = args.mixfrac {
            self.scf_params.mixfrac = Some(mixfrac.into());
        }
        if let Some(ngrid) = args.ngrid {
            self.grid_params.ngrid = Some(ngrid.into());
        }
        if let Some(ref dir) = args.csv_dir {
            self.output.directory = Some(dir.clone());
        }
        if args.no_csv {
            self.output.write_csv = Some(false);
        }
        self
    }

    pub fn write_csv(&self) -> bool {
        self.output.write_csv.unwrap_or(true)
    }

    pub fn output_directory(&self) -> String {
        self.output
            .directory
            .clone()
            .unwrap_or_else(|| ".".to_string())
    }
}
