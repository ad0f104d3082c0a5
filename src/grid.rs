//! Logarithmic radial grid
//!
//! Points are uniform in x = ln r, from `x0` up to the ion-sphere radius, so
//! the core region is resolved finely while the outer region stays cheap.

use nalgebra::DVector;
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct LogGrid {
    x: DVector<f64>,
    r: DVector<f64>,
    dx: f64,
}

impl LogGrid {
    /// Grid of `ngrid` points with `r[0] = exp(x0)` and `r[ngrid - 1] = radius`.
    pub fn new(ngrid: usize, x0: f64, radius: f64) -> Self {
        let xmax = radius.ln();
        let dx = (xmax - x0) / (ngrid.max(2) - 1) as f64;
        let x = DVector::from_fn(ngrid, |i, _| x0 + i as f64 * dx);
        let mut r = x.map(f64::exp);
        // pin the outer edge exactly to the cell radius
        if let Some(last) = r.as_mut_slice().last_mut() {
            *last = radius;
        }
        LogGrid { x, r, dx }
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    pub fn r(&self) -> &DVector<f64> {
        &self.r
    }

    pub fn radius(&self) -> f64 {
        self.r[self.len() - 1]
    }

    /// Trapezoid rule for ∫ f dx over the whole grid.
    pub fn integrate_x(&self, f: &DVector<f64>) -> f64 {
        let n = f.len();
        if n < 2 {
            return 0.0;
        }
        self.dx * (f.sum() - 0.5 * (f[0] + f[n - 1]))
    }

    /// Volume integral ∫ f d³r = 4π ∫ f r³ dx for a spherically symmetric f.
    pub fn integrate_volume(&self, f: &DVector<f64>) -> f64 {
        let weighted = f.component_mul(&self.r.map(|r| r * r * r));
        4.0 * PI * self.integrate_x(&weighted)
    }

    /// Running trapezoid integral from the first point, `out[i] = ∫_{x0}^{x_i} f dx`.
    pub fn cumulative_from_origin(&self, f: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::zeros(f.len());
        for i in 1..f.len() {
            out[i] = out[i - 1] + 0.5 * self.dx * (f[i] + f[i - 1]);
        }
        out
    }

    /// Running trapezoid integral to the last point, `out[i] = ∫_{x_i}^{xmax} f dx`.
    pub fn cumulative_to_edge(&self, f: &DVector<f64>) -> DVector<f64> {
        let n = f.len();
        let mut out = DVector::zeros(n);
        for i in (0..n.saturating_sub(1)).rev() {
            out[i] = out[i + 1] + 0.5 * self.dx * (f[i] + f[i + 1]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_endpoints() {
        let grid = LogGrid::new(101, -8.0, 4.0);
        assert_eq!(grid.len(), 101);
        assert_relative_eq!(grid.r()[0], (-8.0f64).exp());
        assert_eq!(grid.radius(), 4.0);
        assert_relative_eq!(grid.x()[100], 4.0f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_volume() {
        let grid = LogGrid::new(2000, -10.0, 3.0);
        let ones = DVector::from_element(grid.len(), 1.0);
        assert_relative_eq!(
            grid.integrate_volume(&ones),
            4.0 / 3.0 * PI * 27.0,
            max_relative = 1e-4
        );
    }

    #[test]
    fn test_hydrogen_density_normalised() {
        let grid = LogGrid::new(1000, -10.0, 30.0);
        let n = grid.r().map(|r| (-2.0 * r).exp() / PI);
        assert_relative_eq!(grid.integrate_volume(&n), 1.0, max_relative = 1e-4);
    }

    #[test]
    fn test_cumulative_integrals_split_total() {
        let grid = LogGrid::new(400, -6.0, 2.0);
        let f = grid.r().map(|r| r * r);
        let total = grid.integrate_x(&f);
        let left = grid.cumulative_from_origin(&f);
        let right = grid.cumulative_to_edge(&f);
        for i in [0, 57, 399] {
            assert_relative_eq!(left[i] + right[i], total, max_relative = 1e-12);
        }
    }
}
