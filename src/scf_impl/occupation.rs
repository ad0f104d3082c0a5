//! Fermi-Dirac occupation of the bound spectrum
//!
//! Each spin channel gets its own chemical potential, chosen so that bound
//! plus unbound electrons add up to the channel's electron count.

use super::unbound::IdealGas;
use nalgebra::DMatrix;

/// Temperatures below this are treated as this value in the Fermi function.
pub const TEMP_FLOOR: f64 = 1e-6;

const BRACKET_STEPS: usize = 200;
const BISECTION_STEPS: usize = 200;
const MU_TOL: f64 = 1e-12;

pub fn fermi_dirac(energy: f64, mu: f64, temp: f64) -> f64 {
    let x = (energy - mu) / temp.max(TEMP_FLOOR);
    if x > 700.0 {
        0.0
    } else if x < -700.0 {
        1.0
    } else {
        1.0 / (1.0 + x.exp())
    }
}

/// Orbital degeneracy (2l+1) times the spin factor 2/nspin.
pub fn degeneracy(l: usize, nspin: usize) -> f64 {
    (2 * l + 1) as f64 * 2.0 / nspin as f64
}

/// Mixing entropy -[f ln f + (1-f) ln(1-f)] of one orbital.
pub fn occupation_entropy(f: f64) -> f64 {
    if f <= 0.0 || f >= 1.0 {
        return 0.0;
    }
    -(f * f.ln() + (1.0 - f) * (1.0 - f).ln())
}

/// A bound level and how many electrons it can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    pub energy: f64,
    pub degeneracy: f64,
}

/// Electrons at chemical potential `mu`: bound levels plus the unbound gas.
pub fn electron_count(levels: &[Level], gas: &IdealGas, mu: f64) -> f64 {
    let bound: f64 = levels
        .iter()
        .map(|lv| lv.degeneracy * fermi_dirac(lv.energy, mu, gas.temp()))
        .sum();
    bound + gas.electrons(mu)
}

/// Chemical potential that holds `target` electrons, by bracketing and bisection.
///
/// Returns `None` if no bracket is found, which only happens for non-finite input.
pub fn find_chemical_potential(levels: &[Level], gas: &IdealGas, target: f64) -> Option<f64> {
    let temp = gas.temp().max(TEMP_FLOOR);
    let lowest = levels.iter().map(|lv| lv.energy).fold(0.0, f64::min);
    let highest = levels.iter().map(|lv| lv.energy).fold(0.0, f64::max);

    let mut lo = lowest - 50.0 * temp - 1.0;
    let mut width = 1.0;
    let mut steps = 0;
    while electron_count(levels, gas, lo) > target {
        width *= 2.0;
        lo -= width;
        steps += 1;
        if steps > BRACKET_STEPS || !lo.is_finite() {
            return None;
        }
    }

    let mut hi = highest + 1.0;
    let mut width = 1.0;
    let mut steps = 0;
    while electron_count(levels, gas, hi) < target {
        width *= 2.0;
        hi += width;
        steps += 1;
        if steps > BRACKET_STEPS || !hi.is_finite() {
            return None;
        }
    }

    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if electron_count(levels, gas, mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < MU_TOL * mid.abs().max(1.0) {
            break;
        }
    }
    Some(0.5 * (lo + hi))
}

/// Occupation numbers g·f for one channel laid out as (l, n), zero for unbound levels.
pub fn occupation_numbers(
    energies: &DMatrix<f64>,
    nspin: usize,
    mu: f64,
    temp: f64,
) -> DMatrix<f64> {
    DMatrix::from_fn(energies.nrows(), energies.ncols(), |l, n| {
        let e = energies[(l, n)];
        if e < 0.0 {
            degeneracy(l, nspin) * fermi_dirac(e, mu, temp)
        } else {
            0.0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fermi_dirac_limits() {
        assert_eq!(fermi_dirac(-1.0, 0.0, 0.0), 1.0);
        assert_eq!(fermi_dirac(1.0, 0.0, 0.0), 0.0);
        assert_relative_eq!(fermi_dirac(0.3, 0.3, 0.1), 0.5);
    }

    #[test]
    fn test_degeneracy() {
        assert_eq!(degeneracy(0, 1), 2.0);
        assert_eq!(degeneracy(2, 1), 10.0);
        assert_eq!(degeneracy(1, 2), 3.0);
    }

    #[test]
    fn test_entropy_vanishes_for_integer_occupation() {
        assert_eq!(occupation_entropy(0.0), 0.0);
        assert_eq!(occupation_entropy(1.0), 0.0);
        assert_relative_eq!(occupation_entropy(0.5), std::f64::consts::LN_2);
    }

    #[test]
    fn test_chemical_potential_fills_levels() {
        // cold, tiny cell: unbound electrons are negligible below the continuum
        let gas = IdealGas::new(1.0, 1e-3, 1);
        let levels = [
            Level { energy: -2.0, degeneracy: 2.0 },
            Level { energy: -0.5, degeneracy: 6.0 },
        ];
        let mu = find_chemical_potential(&levels, &gas, 5.0).unwrap();
        assert!(mu > -0.51 && mu < -0.49);
        assert_relative_eq!(electron_count(&levels, &gas, mu), 5.0, epsilon = 1e-8);
    }

    #[test]
    fn test_chemical_potential_with_unbound_electrons() {
        let gas = IdealGas::new(100.0, 0.5, 1);
        let levels = [Level { energy: -1.0, degeneracy: 2.0 }];
        let mu = find_chemical_potential(&levels, &gas, 4.0).unwrap();
        assert_relative_eq!(electron_count(&levels, &gas, mu), 4.0, epsilon = 1e-8);
        assert!(gas.electrons(mu) > 0.0);
    }

    #[test]
    fn test_empty_channel() {
        let gas = IdealGas::new(10.0, 0.1, 2);
        let levels = [Level { energy: -0.5, degeneracy: 1.0 }];
        let mu = find_chemical_potential(&levels, &gas, 0.0).unwrap();
        assert!(electron_count(&levels, &gas, mu) < 1e-10);
    }

    #[test]
    fn test_occupation_numbers_skip_positive_levels() {
        let energies = DMatrix::from_row_slice(2, 2, &[-1.0, 0.2, -0.1, 0.5]);
        let occ = occupation_numbers(&energies, 1, 0.0, 1e-4);
        assert_relative_eq!(occ[(0, 0)], 2.0);
        assert_relative_eq!(occ[(1, 0)], 6.0);
        assert_eq!(occ[(0, 1)], 0.0);
        assert_eq!(occ[(1, 1)], 0.0);
    }
}
