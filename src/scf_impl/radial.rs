//! Radial Kohn-Sham eigensolver on the logarithmic grid
//!
//! With y = P(r)/√r and x = ln r the radial equation becomes
//!
//! ```text
//! -½ y'' + [(l+½)²/2 + r² v(r)] y = ε r² y
//! ```
//!
//! which a three-point stencil turns into the generalized problem A y = ε B y
//! with B = diag(r²). Scaling by B^{-1/2} gives a symmetric tridiagonal matrix
//! whose lowest eigenvalues are bracketed with Sturm sequences and whose
//! eigenvectors come from inverse iteration.

use crate::error::{AvAtomError, Result};
use crate::grid::LogGrid;
use crate::model::BoundaryCondition;
use nalgebra::{DMatrix, DVector};
use std::cmp::Ordering;

const BISECTION_MAX_STEPS: usize = 200;
const BISECTION_TOL: f64 = 1e-13;
const INVERSE_ITERATIONS: usize = 3;
/// Replaces exactly vanishing pivots in the Sturm count and Thomas sweeps.
const PIVOT_FLOOR: f64 = 1e-300;

/// Symmetric tridiagonal matrix, `diag` of length m and `off` of length m - 1.
#[derive(Debug, Clone)]
pub struct Tridiagonal {
    pub diag: Vec<f64>,
    pub off: Vec<f64>,
}

impl Tridiagonal {
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Number of eigenvalues strictly below `lambda`.
    pub fn sturm_count(&self, lambda: f64) -> usize {
        let mut count = 0;
        let mut q = 0.0;
        for i in 0..self.len() {
            q = if i == 0 {
                self.diag[0] - lambda
            } else {
                let prev = if q == 0.0 { PIVOT_FLOOR } else { q };
                self.diag[i] - lambda - self.off[i - 1] * self.off[i - 1] / prev
            };
            if q < 0.0 {
                count += 1;
            }
        }
        count
    }

    /// Gershgorin interval containing the whole spectrum.
    pub fn spectrum_bounds(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for i in 0..self.len() {
            let left = if i > 0 { self.off[i - 1].abs() } else { 0.0 };
            let right = if i + 1 < self.len() { self.off[i].abs() } else { 0.0 };
            lo = lo.min(self.diag[i] - left - right);
            hi = hi.max(self.diag[i] + left + right);
        }
        (lo, hi)
    }

    /// The `k`-th smallest eigenvalue (zero based) by bisection.
    pub fn eigenvalue(&self, k: usize) -> f64 {
        let (mut lo, mut hi) = self.spectrum_bounds();
        for _ in 0..BISECTION_MAX_STEPS {
            let mid = 0.5 * (lo + hi);
            if self.sturm_count(mid) > k {
                hi = mid;
            } else {
                lo = mid;
            }
            if hi - lo < BISECTION_TOL * mid.abs().max(1.0) {
                break;
            }
        }
        0.5 * (lo + hi)
    }

    /// Solve (T - shift) z = rhs with the Thomas algorithm.
    fn shifted_solve(&self, shift: f64, rhs: &[f64]) -> Vec<f64> {
        let m = self.len();
        let mut c = vec![0.0; m];
        let mut g = vec![0.0; m];
        let guard = |d: f64| if d.abs() < PIVOT_FLOOR { PIVOT_FLOOR } else { d };

        let d0 = guard(self.diag[0] - shift);
        if m > 1 {
            c[0] = self.off[0] / d0;
        }
        g[0] = rhs[0] / d0;
        for i in 1..m {
            let denom = guard(self.diag[i] - shift - self.off[i - 1] * c[i - 1]);
            if i + 1 < m {
                c[i] = self.off[i] / denom;
            }
            g[i] = (rhs[i] - self.off[i - 1] * g[i - 1]) / denom;
        }

        let mut z = vec![0.0; m];
        z[m - 1] = g[m - 1];
        for i in (0..m - 1).rev() {
            z[i] = g[i] - c[i] * z[i + 1];
        }
        z
    }

    /// Eigenvector for a converged eigenvalue, normalised so that Σ z² dx = 1.
    pub fn eigenvector(&self, lambda: f64, dx: f64) -> Vec<f64> {
        let mut z = vec![1.0; self.len()];
        for _ in 0..INVERSE_ITERATIONS {
            z = self.shifted_solve(lambda, &z);
            let norm = (z.iter().map(|v| v * v).sum::<f64>() * dx).sqrt();
            if norm > 0.0 && norm.is_finite() {
                z.iter_mut().for_each(|v| *v /= norm);
            }
        }
        z
    }
}

/// Flip each column so that its largest-magnitude component is positive.
pub fn align_eigenvectors(mut eigvecs: DMatrix<f64>) -> DMatrix<f64> {
    for j in 0..eigvecs.ncols() {
        let max_val = eigvecs
            .column(j)
            .iter()
            .copied()
            .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Less))
            .unwrap_or(0.0);
        if max_val < 0.0 {
            eigvecs.column_mut(j).neg_mut();
        }
    }
    eigvecs
}

/// Eigenvalues and radial functions y(r) for one (spin, l) channel.
#[derive(Debug, Clone)]
pub struct RadialStates {
    pub energies: DVector<f64>,
    /// One column per state, sampled on the full grid
    pub functions: DMatrix<f64>,
}

#[derive(Debug, Clone)]
pub struct RadialSolver {
    grid: LogGrid,
    bc: BoundaryCondition,
    nmax: usize,
}

impl RadialSolver {
    pub fn new(grid: LogGrid, bc: BoundaryCondition, nmax: usize) -> Self {
        RadialSolver { grid, bc, nmax }
    }

    pub fn grid(&self) -> &LogGrid {
        &self.grid
    }

    pub fn nmax(&self) -> usize {
        self.nmax
    }

    /// Unknowns of the discrete problem. Dirichlet pins y = 0 at the edge.
    fn unknowns(&self) -> usize {
        match self.bc {
            BoundaryCondition::Dirichlet => self.grid.len() - 1,
            BoundaryCondition::Neumann => self.grid.len(),
        }
    }

    /// Quadrature weights; the Neumann ghost point halves the last cell.
    fn weights(&self, m: usize) -> Vec<f64> {
        let mut w = vec![1.0; m];
        if self.bc == BoundaryCondition::Neumann {
            w[m - 1] = 0.5;
        }
        w
    }

    /// Symmetric form of the discretized Hamiltonian for potential `v` and angular momentum `l`.
    pub fn hamiltonian(&self, v: &DVector<f64>, l: usize) -> Tridiagonal {
        let r = self.grid.r();
        let dx = self.grid.dx();
        let m = self.unknowns();
        let w = self.weights(m);
        let centrifugal = (l as f64 + 0.5).powi(2) / 2.0;
        let coupling = -0.5 / (dx * dx);

        let diag = (0..m)
            .map(|i| (1.0 / (dx * dx) + centrifugal + r[i] * r[i] * v[i]) / (r[i] * r[i]))
            .collect();
        let off = (0..m.saturating_sub(1))
            .map(|i| coupling / ((w[i] * w[i + 1]).sqrt() * r[i] * r[i + 1]))
            .collect();
        Tridiagonal { diag, off }
    }

    /// Lowest `nmax` states for potential `v` and angular momentum `l`.
    pub fn solve(&self, v: &DVector<f64>, l: usize) -> Result<RadialStates> {
        let m = self.unknowns();
        if self.nmax > m {
            return Err(AvAtomError::Grid(format!(
                "{m} radial unknowns cannot hold {} eigenstates",
                self.nmax
            )));
        }

        let r = self.grid.r();
        let dx = self.grid.dx();
        let w = self.weights(m);
        let hamiltonian = self.hamiltonian(v, l);

        let mut energies = DVector::zeros(self.nmax);
        let mut functions = DMatrix::zeros(self.grid.len(), self.nmax);
        for k in 0..self.nmax {
            let eps = hamiltonian.eigenvalue(k);
            let z = hamiltonian.eigenvector(eps, dx);
            energies[k] = eps;
            for i in 0..m {
                functions[(i, k)] = z[i] / (w[i].sqrt() * r[i]);
            }
        }

        Ok(RadialStates {
            energies,
            functions: align_eigenvectors(functions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn coulomb_solver(bc: BoundaryCondition, radius: f64) -> (RadialSolver, DVector<f64>) {
        let grid = LogGrid::new(1000, -10.0, radius);
        let v = grid.r().map(|r| -1.0 / r);
        (RadialSolver::new(grid, bc, 3), v)
    }

    #[test]
    fn test_sturm_count_on_diagonal_matrix() {
        let t = Tridiagonal {
            diag: vec![1.0, 2.0, 3.0],
            off: vec![0.0, 0.0],
        };
        assert_eq!(t.sturm_count(0.5), 0);
        assert_eq!(t.sturm_count(2.5), 2);
        assert_eq!(t.sturm_count(10.0), 3);
        assert_relative_eq!(t.eigenvalue(1), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_two_by_two_eigenvalues() {
        // [[2, 1], [1, 2]] has eigenvalues 1 and 3
        let t = Tridiagonal {
            diag: vec![2.0, 2.0],
            off: vec![1.0],
        };
        assert_relative_eq!(t.eigenvalue(0), 1.0, epsilon = 1e-10);
        assert_relative_eq!(t.eigenvalue(1), 3.0, epsilon = 1e-10);
        let z = t.eigenvector(1.0, 1.0);
        assert_relative_eq!(z[0], -z[1], epsilon = 1e-8);
    }

    #[test]
    fn test_hydrogen_spectrum() {
        let (solver, v) = coulomb_solver(BoundaryCondition::Dirichlet, 30.0);
        let s = solver.solve(&v, 0).unwrap();
        assert_relative_eq!(s.energies[0], -0.5, epsilon = 1e-3);
        assert_relative_eq!(s.energies[1], -0.125, epsilon = 1e-3);
        let p = solver.solve(&v, 1).unwrap();
        assert_relative_eq!(p.energies[0], -0.125, epsilon = 1e-3);
    }

    #[test]
    fn test_states_are_normalised_and_aligned() {
        let (solver, v) = coulomb_solver(BoundaryCondition::Dirichlet, 30.0);
        let states = solver.solve(&v, 0).unwrap();
        let r = solver.grid().r();
        for k in 0..3 {
            let y = states.functions.column(k).into_owned();
            let density = y.component_mul(&y).component_mul(&r.map(|r| r * r));
            assert_relative_eq!(solver.grid().integrate_x(&density), 1.0, epsilon = 1e-3);
            let peak = y.iter().copied().fold(0.0f64, |a, b| if b.abs() > a.abs() { b } else { a });
            assert!(peak > 0.0);
        }
        assert_eq!(states.functions[(r.len() - 1, 0)], 0.0);
    }

    #[test]
    fn test_neumann_lies_below_dirichlet() {
        let (dirichlet, v) = coulomb_solver(BoundaryCondition::Dirichlet, 3.0);
        let (neumann, _) = coulomb_solver(BoundaryCondition::Neumann, 3.0);
        let ed = dirichlet.solve(&v, 0).unwrap().energies;
        let en = neumann.solve(&v, 0).unwrap().energies;
        assert!(en[0] < ed[0]);
        assert!(en[0] < -0.5);
    }

    #[test]
    fn test_too_many_states_for_grid() {
        let grid = LogGrid::new(3, -5.0, 2.0);
        let v = grid.r().map(|r| -1.0 / r);
        let solver = RadialSolver::new(grid, BoundaryCondition::Dirichlet, 3);
        assert!(solver.solve(&v, 0).is_err());
    }
}
