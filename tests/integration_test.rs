//! Integration tests for complete average-atom runs
//!
//! These tests use the example YAML files to validate end-to-end functionality.

use avatom::app::{load_config, run_calculation};
use avatom::config::{Args, Config};
use avatom::io::{write_fields, DENSITY_FILE, POTENTIAL_FILE};
use avatom::scf_impl::ScfStatus;
use avatom::validation::validate_run;
use avatom::AvAtomError;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Helper function to get the path to example files
    fn example_path(filename: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("example")
            .join(filename)
    }

    fn read_example(filename: &str) -> Config {
        let content = fs::read_to_string(example_path(filename)).unwrap();
        serde_yml::from_str::<Config>(&content).unwrap().with_defaults()
    }

    #[test]
    fn test_examples_validate() {
        for name in ["hydrogen.yaml", "helium_spin.yaml", "aluminium.yaml"] {
            let run = validate_run(&read_example(name))
                .unwrap_or_else(|e| panic!("{name} failed validation: {e}"));
            assert_eq!(run.model.nele.iter().sum::<usize>(), run.atom.nele);
        }

        let helium = validate_run(&read_example("helium_spin.yaml")).unwrap();
        assert_eq!(helium.model.nele, vec![1, 1]);
        assert!((helium.atom.temp - 0.4998).abs() < 1e-3);
    }

    #[test]
    fn test_hydrogen_converges() {
        let run = validate_run(&read_example("hydrogen.yaml")).unwrap();
        let result = run_calculation(&run).unwrap();
        let outcome = &result.outcome;

        assert_eq!(outcome.status, ScfStatus::Converged);
        assert!(outcome.iterations <= run.scf.maxscf);

        let free = result.free_energy();
        assert!(free > -0.6 && free < -0.45, "free energy {free}");

        let state = &outcome.state;
        let mis = state.occupations.unbound[0].nele;
        assert!(mis > 0.0 && mis < 1.0, "mean ionization {mis}");
        // the 1s level stays bound in a 3 bohr sphere
        assert!(state.orbitals.eigenvalues(0)[(0, 0)] < 0.0);
        assert!(state.energy.entropy() > 0.0);
    }

    #[test]
    fn test_iteration_budget_is_not_an_error() {
        let mut config = read_example("hydrogen.yaml");
        config.scf_params.maxscf = Some(3.into());
        let run = validate_run(&config).unwrap();
        let result = run_calculation(&run).unwrap();
        assert_eq!(result.outcome.status, ScfStatus::MaxIterationsReached);
        assert_eq!(result.outcome.iterations, 3);
        assert!(result.free_energy().is_finite());
    }

    #[test]
    fn test_spin_polarized_hydrogen_runs() {
        let mut config = read_example("hydrogen.yaml");
        config.model.spinpol = Some(true.into());
        config.scf_params.maxscf = Some(5.into());
        let run = validate_run(&config).unwrap();
        assert_eq!(run.model.nele, vec![1, 0]);

        let result = run_calculation(&run).unwrap();
        let state = &result.outcome.state;
        assert_eq!(state.density.bound.nrows(), 2);
        assert_eq!(state.occupations.mu.len(), 2);
        assert!(state.occupations.unbound[1].nele < 1e-6);
    }

    #[test]
    fn test_csv_written_for_final_state() {
        let mut config = read_example("hydrogen.yaml");
        config.scf_params.maxscf = Some(2.into());
        let run = validate_run(&config).unwrap();
        let result = run_calculation(&run).unwrap();

        let dir = std::env::temp_dir().join(format!("avatom-it-{}", std::process::id()));
        let state = &result.outcome.state;
        write_fields(&dir, &result.radii, &state.density, &state.potential).unwrap();

        let density = fs::read_to_string(dir.join(DENSITY_FILE)).unwrap();
        let mut lines = density.lines();
        assert_eq!(lines.next(), Some("r,n_b,n_ub"));
        assert_eq!(lines.count(), run.grid.ngrid);

        let potential = fs::read_to_string(dir.join(POTENTIAL_FILE)).unwrap();
        assert!(potential.starts_with("r,v_en,v_ha,v_xc"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_input_is_rejected_before_scf() {
        let mut config = read_example("hydrogen.yaml");
        config.model.spinpol = Some(true.into());
        config.model.spinmag = Some(2.into());
        let err = validate_run(&config).unwrap_err();
        assert!(matches!(err, AvAtomError::Spin(_)));
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Error in spin input"));
    }

    #[test]
    fn test_cli_overrides() {
        let path = example_path("hydrogen.yaml");
        let args = Args::parse_from([
            "avatom",
            "--config-file",
            path.to_str().unwrap(),
            "--maxscf",
            "7",
            "--ngrid",
            "400",
            "--no-csv",
        ]);
        let config = load_config(&args).unwrap();
        let run = validate_run(&config).unwrap();
        assert_eq!(run.scf.maxscf, 7);
        assert_eq!(run.grid.ngrid, 400);
        assert!(!config.write_csv());
    }
}
