//! The SCF loop
//!
//! Initializing: solve and occupy orbitals in the initial potential.
//! Iterating: density, potential, energy, mixing, new orbitals, convergence.
//! Terminal: `Converged` or `MaxIterationsReached`; running out of iterations
//! is reported through [`ScfStatus`], not as an error.

use super::convergence::{ConvergenceResult, ConvergenceTracker};
use super::{Density, Energy, FieldBuilder, Occupations, OrbitalSolver, Orbitals, Potential};
use crate::error::{AvAtomError, Result};
use crate::model::{ConvergenceParams, ScfParams};
use nalgebra::DMatrix;
use tracing::{debug, info};

/// Potential mixing starts at this iteration index; earlier iterations use the
/// freshly built potential unmixed.
pub const MIXING_START_ITERATION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScfStatus {
    Converged,
    MaxIterationsReached,
}

/// Everything produced by the latest completed iteration.
#[derive(Debug, Clone)]
pub struct IterationState {
    pub iteration: usize,
    pub orbitals: Orbitals,
    pub occupations: Occupations,
    pub density: Density,
    pub potential: Potential,
    /// Potential actually used for the next orbitals, after mixing
    pub v_s: DMatrix<f64>,
    pub energy: Energy,
    pub convergence: ConvergenceResult,
}

#[derive(Debug, Clone)]
pub struct ScfOutcome {
    pub status: ScfStatus,
    /// Number of iterations performed
    pub iterations: usize,
    pub state: IterationState,
}

impl ScfOutcome {
    pub fn converged(&self) -> bool {
        self.status == ScfStatus::Converged
    }
}

pub struct ScfEngine<'a, S: OrbitalSolver, B: FieldBuilder> {
    solver: &'a S,
    builder: &'a B,
    conv: ConvergenceParams,
    scf: ScfParams,
}

fn ensure_finite(iteration: usize, what: &str, values: &DMatrix<f64>) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(AvAtomError::numerical(iteration, format!("{what} contains non-finite values")))
    }
}

/// Stamp a numerical failure from a collaborator with the current iteration.
fn at_iteration(iteration: usize) -> impl Fn(AvAtomError) -> AvAtomError {
    move |err| match err {
        AvAtomError::Numerical { reason, .. } => AvAtomError::Numerical { iteration, reason },
        other => other,
    }
}

/// v = α·v_new + (1-α)·v_prev
pub fn mix_potential(alpha: f64, v_new: &DMatrix<f64>, v_prev: &DMatrix<f64>) -> DMatrix<f64> {
    v_new * alpha + v_prev * (1.0 - alpha)
}

impl<'a, S: OrbitalSolver, B: FieldBuilder> ScfEngine<'a, S, B> {
    pub fn new(solver: &'a S, builder: &'a B, conv: ConvergenceParams, scf: ScfParams) -> Self {
        ScfEngine {
            solver,
            builder,
            conv,
            scf,
        }
    }

    fn solve_and_occupy(
        &self,
        iteration: usize,
        v: &DMatrix<f64>,
    ) -> Result<(Orbitals, Occupations)> {
        let orbitals = self.solver.solve(v).map_err(at_iteration(iteration))?;
        for s in 0..orbitals.nspin() {
            ensure_finite(iteration, "orbital energies", &orbitals.eigenvalues(s))?;
        }
        let occupations = self.solver.occupy(&orbitals).map_err(at_iteration(iteration))?;
        if !occupations.mu.iter().all(|mu| mu.is_finite()) {
            return Err(AvAtomError::numerical(iteration, "chemical potential is not finite"));
        }
        Ok((orbitals, occupations))
    }

    pub fn run(&self) -> Result<ScfOutcome> {
        self.run_with(|state| {
            debug!(
                "iteration {}: F = {:.7}, dE = {:.3e}",
                state.iteration,
                state.energy.free(),
                state.convergence.de
            )
        })
    }

    /// Run the loop, calling `on_cycle` after every iteration.
    pub fn run_with(&self, mut on_cycle: impl FnMut(&IterationState)) -> Result<ScfOutcome> {
        info!("Initializing orbitals in the initial potential");
        let v_init = self.builder.initial_potential();
        ensure_finite(0, "initial potential", &v_init)?;
        let (mut orbitals, mut occupations) = self.solve_and_occupy(0, &v_init)?;

        let mut tracker = ConvergenceTracker::new(self.conv);
        let mut v_prev: Option<DMatrix<f64>> = None;
        let mut last: Option<IterationState> = None;

        for iscf in 0..self.scf.maxscf {
            let density = self
                .builder
                .density(&orbitals, &occupations)
                .map_err(at_iteration(iscf))?;
            ensure_finite(iscf, "density", &density.total())?;

            let potential = self.builder.potential(&density).map_err(at_iteration(iscf))?;
            let v_new = potential.total();
            ensure_finite(iscf, "potential", &v_new)?;

            let energy = self
                .builder
                .energy(&orbitals, &occupations, &density, &potential)
                .map_err(at_iteration(iscf))?;
            if !energy.is_finite() {
                return Err(AvAtomError::numerical(iscf, "energy is not finite"));
            }

            let v_s = match &v_prev {
                Some(prev) if iscf >= MIXING_START_ITERATION => {
                    mix_potential(self.scf.mixfrac, &v_new, prev)
                }
                _ => v_new,
            };

            let (new_orbitals, new_occupations) = self.solve_and_occupy(iscf, &v_s)?;
            let convergence = tracker.check(energy.free(), &density.total(), &v_s);

            let state = IterationState {
                iteration: iscf,
                orbitals: std::mem::replace(&mut orbitals, new_orbitals),
                occupations: std::mem::replace(&mut occupations, new_occupations),
                density,
                potential,
                v_s: v_s.clone(),
                energy,
                convergence,
            };
            v_prev = Some(v_s);
            on_cycle(&state);

            let converged = state.convergence.converged;
            last = Some(state);
            if converged {
                break;
            }
        }

        // maxscf >= 1 after validation, so at least one iteration ran
        let state = last.ok_or_else(|| AvAtomError::ScfParam("maxscf must be at least 1".into()))?;
        let iterations = state.iteration + 1;
        let status = if state.convergence.converged {
            ScfStatus::Converged
        } else {
            ScfStatus::MaxIterationsReached
        };
        match status {
            ScfStatus::Converged => info!("SCF cycle converged after {} iterations", iterations),
            ScfStatus::MaxIterationsReached => {
                info!("SCF cycle did not converge in {} iterations", self.scf.maxscf)
            }
        }
        Ok(ScfOutcome {
            status,
            iterations,
            state,
        })
    }
}
