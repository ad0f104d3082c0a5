//! Convergence tracking between successive SCF iterations

use crate::model::ConvergenceParams;
use nalgebra::DMatrix;

/// Changes since the previous iteration; `dn` and `dv` hold one entry per spin channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceResult {
    pub de: f64,
    pub dn: Vec<f64>,
    pub dv: Vec<f64>,
    pub converged: bool,
}

impl ConvergenceResult {
    pub fn max_dn(&self) -> f64 {
        self.dn.iter().copied().fold(0.0, f64::max)
    }

    pub fn max_dv(&self) -> f64 {
        self.dv.iter().copied().fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    energy: f64,
    density: DMatrix<f64>,
    potential: DMatrix<f64>,
}

/// Compares each iteration with the one before; only the latest snapshot is kept.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    params: ConvergenceParams,
    last: Option<Snapshot>,
    checks: usize,
}

fn row_max_abs(m: &DMatrix<f64>) -> Vec<f64> {
    m.row_iter().map(|row| row.amax()).collect()
}

impl ConvergenceTracker {
    pub fn new(params: ConvergenceParams) -> Self {
        ConvergenceTracker {
            params,
            last: None,
            checks: 0,
        }
    }

    /// Number of evaluations so far.
    pub fn checks(&self) -> usize {
        self.checks
    }

    /// Record `energy`, `density` and `potential` (rows are spin channels) and
    /// report the change. The first call has nothing to compare with: it reports
    /// the raw magnitudes and is never converged.
    pub fn check(
        &mut self,
        energy: f64,
        density: &DMatrix<f64>,
        potential: &DMatrix<f64>,
    ) -> ConvergenceResult {
        self.checks += 1;
        let result = match &self.last {
            None => ConvergenceResult {
                de: energy.abs(),
                dn: row_max_abs(density),
                dv: row_max_abs(potential),
                converged: false,
            },
            Some(prev) => {
                let de = (energy - prev.energy).abs();
                let dn = row_max_abs(&(density - &prev.density));
                let dv = row_max_abs(&(potential - &prev.potential));
                let converged = de < self.params.econv
                    && dn.iter().all(|&d| d < self.params.nconv)
                    && dv.iter().all(|&d| d < self.params.vconv);
                ConvergenceResult { de, dn, dv, converged }
            }
        };

        self.last = Some(Snapshot {
            energy,
            density: density.clone(),
            potential: potential.clone(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> ConvergenceParams {
        ConvergenceParams {
            econv: 1e-5,
            nconv: 1e-3,
            vconv: 1e-3,
        }
    }

    #[test]
    fn test_first_check_reports_magnitudes() {
        let mut tracker = ConvergenceTracker::new(params());
        let n = DMatrix::from_row_slice(1, 3, &[0.1, -0.7, 0.2]);
        let v = DMatrix::from_row_slice(1, 3, &[-5.0, -1.0, 0.0]);
        let result = tracker.check(-2.5, &n, &v);
        assert_eq!(result.de, 2.5);
        assert_eq!(result.dn, vec![0.7]);
        assert_eq!(result.dv, vec![5.0]);
        assert!(!result.converged);
    }

    #[test]
    fn test_identical_iterations_converge() {
        let mut tracker = ConvergenceTracker::new(params());
        let n = DMatrix::from_element(2, 4, 0.3);
        let v = DMatrix::from_element(2, 4, -1.0);
        assert!(!tracker.check(-1.0, &n, &v).converged);
        let result = tracker.check(-1.0, &n, &v);
        assert!(result.converged);
        assert_eq!(result.dn, vec![0.0, 0.0]);
        assert_eq!(tracker.checks(), 2);
    }

    #[test]
    fn test_every_quantity_must_be_below_threshold() {
        let mut tracker = ConvergenceTracker::new(params());
        let n = DMatrix::from_element(2, 3, 0.3);
        let v = DMatrix::from_element(2, 3, -1.0);
        tracker.check(-1.0, &n, &v);

        // spin-down potential moves too much
        let mut v2 = v.clone();
        v2[(1, 2)] += 0.01;
        let result = tracker.check(-1.0, &n, &v2);
        assert!(!result.converged);
        assert_relative_eq!(result.max_dv(), 0.01, epsilon = 1e-12);
        assert_eq!(result.dv[0], 0.0);

        // energy alone
        let result = tracker.check(-1.001, &n, &v2);
        assert!(!result.converged);
        assert_relative_eq!(result.de, 1e-3, epsilon = 1e-12);
    }

    #[test]
    fn test_compares_with_latest_only() {
        let mut tracker = ConvergenceTracker::new(params());
        let v = DMatrix::from_element(1, 2, 0.0);
        tracker.check(0.0, &DMatrix::from_element(1, 2, 0.0), &v);
        tracker.check(0.0, &DMatrix::from_element(1, 2, 1.0), &v);
        let result = tracker.check(0.0, &DMatrix::from_element(1, 2, 1.5), &v);
        assert_relative_eq!(result.max_dn(), 0.5);
    }
}
