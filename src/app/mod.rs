mod runner;

pub use runner::{run_calculation, CalculationResult};

use crate::config::{Args, Config};
use crate::error::AvAtomError;
use crate::io::{setup_output, write_fields};
use crate::validation::validate_run;
use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing::info;

pub struct AvAtomApplication {
    args: Args,
    config: Config,
}

impl AvAtomApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_deref(), self.args.verbose)?;
        info!("Configuration read from: {}", self.args.config_file);

        let run = validate_run(&self.config).map_err(into_report)?;
        let result = run_calculation(&run).map_err(into_report)?;

        if self.config.write_csv() {
            let dir = self.config.output_directory();
            let state = &result.outcome.state;
            let written = write_fields(
                Path::new(&dir),
                &result.radii,
                &state.density,
                &state.potential,
            )
            .wrap_err_with(|| format!("Unable to write CSV output to {}", dir))?;
            for path in written {
                info!("Wrote {}", path.display());
            }
        }

        Ok(())
    }
}

/// Headline for a library failure: bad input versus a failed calculation.
fn failure_context(err: &AvAtomError) -> &'static str {
    if err.is_validation() {
        "Invalid input parameters"
    } else {
        "Average-atom calculation failed"
    }
}

fn into_report(err: AvAtomError) -> Report {
    let context = failure_context(&err);
    Report::new(err).wrap_err(context)
}

/// Read the YAML file named in `args`, fill defaults and apply command-line overrides.
pub fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults()
        .apply_overrides(args);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_context() {
        let spin = AvAtomError::Spin("spin magnetization 2 exceeds 1 electrons".into());
        assert_eq!(failure_context(&spin), "Invalid input parameters");

        let report = into_report(AvAtomError::numerical(4, "density contains non-finite values"));
        assert_eq!(report.to_string(), "Average-atom calculation failed");
        let chain: Vec<String> = report.chain().map(|e| e.to_string()).collect();
        assert!(chain[1].starts_with("Numerical failure during SCF iteration 4"));
    }
}
