//! Command-line argument parsing for average-atom calculations

use clap::Parser;

/// Average-atom SCF calculation with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override electronic temperature (in the units of the config file)
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Override maximum SCF cycles
    #[arg(long)]
    pub maxscf: Option<i64>,

    /// Override potential mixing fraction
    #[arg(long)]
    pub mixfrac: Option<f64>,

    /// Override number of radial grid points
    #[arg(long)]
    pub ngrid: Option<i64>,

    /// Directory for density.csv and potential.csv
    #[arg(long)]
    pub csv_dir: Option<String>,

    /// Do not write the CSV files
    #[arg(long)]
    pub no_csv: bool,

    /// Log every SCF step at debug level
    #[arg(short, long)]
    pub verbose: bool,
}
