use crate::error::Result;
use crate::io::report;
use crate::model::RunConfig;
use crate::scf_impl::{ScfEngine, ScfOutcome, StaticKs};
use nalgebra::DVector;
use tracing::info;

/// Converged (or last) SCF state together with the radial grid it lives on.
#[derive(Debug, Clone)]
pub struct CalculationResult {
    pub outcome: ScfOutcome,
    pub radii: DVector<f64>,
}

impl CalculationResult {
    pub fn free_energy(&self) -> f64 {
        self.outcome.state.energy.free()
    }
}

/// Run the SCF cycle for a validated configuration, logging the report as it goes.
pub fn run_calculation(run: &RunConfig) -> Result<CalculationResult> {
    info!("\n{}", report::atomic_info(&run.atom));
    info!("\n{}", report::model_info(&run.model));

    let ks = StaticKs::new(run);
    let engine = ScfEngine::new(&ks, &ks, run.conv, run.scf);

    info!("\n{}", report::scf_header(&run.conv));
    let outcome = engine.run_with(|state| {
        info!(
            "{}",
            report::scf_cycle(state.iteration, state.energy.free(), &state.convergence)
        )
    })?;
    info!("\n{}", report::scf_final(&outcome, run.scf.maxscf));

    Ok(CalculationResult {
        outcome,
        radii: ks.grid().r().clone(),
    })
}
