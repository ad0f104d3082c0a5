//! Ideal Fermi gas model for the unbound electrons
//!
//! Unbound electrons fill the ion sphere uniformly with the free-electron
//! density of states, so the density, kinetic energy and entropy follow from
//! the complete Fermi-Dirac integrals F_{1/2} and F_{3/2}.

use super::occupation::{fermi_dirac, TEMP_FLOOR};
use std::f64::consts::{PI, SQRT_2};

/// Simpson intervals per integration segment.
const SIMPSON_INTERVALS: usize = 400;
/// Upper cutoff of the energy integrals, in units of kT above the chemical potential.
const TAIL_WIDTH: f64 = 50.0;

/// Unbound electron properties for one spin channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UnboundElectrons {
    /// Uniform number density (bohr^-3)
    pub density: f64,
    /// Number of unbound electrons in the sphere
    pub nele: f64,
    pub kinetic: f64,
    pub entropy: f64,
}

fn simpson(f: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> f64 {
    if b <= a {
        return 0.0;
    }
    let h = (b - a) / n as f64;
    let mut sum = f(a) + f(b);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + i as f64 * h);
    }
    sum * h / 3.0
}

/// ∫_0^∞ ε^order f(ε; μ, T) dε, integrated in t = √ε.
///
/// The window of ±`TAIL_WIDTH`·kT around the Fermi edge gets its own segment
/// so that it stays resolved however small T is.
pub fn fermi_integral(order: f64, mu: f64, temp: f64) -> f64 {
    let temp = temp.max(TEMP_FLOOR);
    let t_edge_lo = (mu - TAIL_WIDTH * temp).max(0.0).sqrt();
    let t_max = (mu.max(0.0) + TAIL_WIDTH * temp).sqrt();
    let integrand = |t: f64| 2.0 * t.powf(2.0 * order + 1.0) * fermi_dirac(t * t, mu, temp);
    simpson(integrand, 0.0, t_edge_lo, SIMPSON_INTERVALS)
        + simpson(integrand, t_edge_lo, t_max, SIMPSON_INTERVALS)
}

/// Free-electron gas in a sphere of fixed volume at fixed temperature.
#[derive(Debug, Clone, Copy)]
pub struct IdealGas {
    volume: f64,
    temp: f64,
    nspin: usize,
}

impl IdealGas {
    pub fn new(volume: f64, temp: f64, nspin: usize) -> Self {
        IdealGas { volume, temp, nspin }
    }

    pub fn temp(&self) -> f64 {
        self.temp
    }

    /// Density-of-states prefactor per channel, (2/nspin)·√2/(2π²).
    fn prefactor(&self) -> f64 {
        2.0 / self.nspin as f64 * SQRT_2 / (2.0 * PI * PI)
    }

    pub fn density(&self, mu: f64) -> f64 {
        self.prefactor() * fermi_integral(0.5, mu, self.temp)
    }

    pub fn electrons(&self, mu: f64) -> f64 {
        self.density(mu) * self.volume
    }

    pub fn evaluate(&self, mu: f64) -> UnboundElectrons {
        let density = self.density(mu);
        let nele = density * self.volume;
        let kinetic = self.volume * self.prefactor() * fermi_integral(1.5, mu, self.temp);
        let entropy = (5.0 / 3.0 * kinetic - mu * nele) / self.temp.max(TEMP_FLOOR);
        UnboundElectrons {
            density,
            nele,
            kinetic,
            entropy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_degenerate_limit() {
        // at T -> 0, ∫ ε^p dε up to μ is μ^{p+1}/(p+1)
        let mu: f64 = 0.8;
        assert_relative_eq!(
            fermi_integral(0.5, mu, 1e-7),
            2.0 / 3.0 * mu.powf(1.5),
            max_relative = 1e-4
        );
        assert_relative_eq!(fermi_integral(1.5, mu, 1e-7), 0.4 * mu.powf(2.5), max_relative = 1e-4);
    }

    #[test]
    fn test_classical_limit() {
        // for μ << -T, F_{1/2} -> Γ(3/2) T^{3/2} exp(μ/T)
        let temp: f64 = 1.0;
        let mu = -10.0;
        let expected = 0.5 * PI.sqrt() * temp.powf(1.5) * (mu / temp).exp();
        assert_relative_eq!(fermi_integral(0.5, mu, temp), expected, max_relative = 1e-3);
    }

    #[test]
    fn test_free_electron_density() {
        // unpolarized T = 0 gas: n = k_F³/(3π²) with k_F = √(2μ)
        let gas = IdealGas::new(1.0, 1e-7, 1);
        let mu: f64 = 0.5;
        let k_f = (2.0 * mu).sqrt();
        assert_relative_eq!(gas.density(mu), k_f.powi(3) / (3.0 * PI * PI), max_relative = 1e-4);
    }

    #[test]
    fn test_polarized_channel_holds_half() {
        let unpolarized = IdealGas::new(50.0, 0.3, 1);
        let polarized = IdealGas::new(50.0, 0.3, 2);
        assert_relative_eq!(
            polarized.electrons(0.2) * 2.0,
            unpolarized.electrons(0.2),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_entropy_positive_at_finite_temperature() {
        let gas = IdealGas::new(100.0, 0.5, 1);
        let ub = gas.evaluate(-0.2);
        assert!(ub.nele > 0.0);
        assert!(ub.kinetic > 0.0);
        assert!(ub.entropy > 0.0);
    }
}
