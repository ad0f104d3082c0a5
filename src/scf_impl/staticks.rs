//! Static Kohn-Sham collaborators on the logarithmic grid

use super::occupation::{
    degeneracy, find_chemical_potential, occupation_entropy, occupation_numbers, Level,
};
use super::radial::{RadialSolver, RadialStates};
use super::unbound::IdealGas;
use super::{Density, Energy, FieldBuilder, Occupations, OrbitalSolver, Orbitals, Potential};
use crate::error::{AvAtomError, Result};
use crate::grid::LogGrid;
use crate::model::RunConfig;
use crate::xc::XcFunctional;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::f64::consts::PI;
use tracing::debug;

/// Kohn-Sham orbitals, density, potential and energy for one ion sphere.
#[derive(Debug, Clone)]
pub struct StaticKs {
    solver: RadialSolver,
    atomic_number: f64,
    temp: f64,
    nele: Vec<usize>,
    lmax: usize,
    xfunc: XcFunctional,
    cfunc: XcFunctional,
    gas: IdealGas,
}

impl StaticKs {
    pub fn new(run: &RunConfig) -> Self {
        let grid = LogGrid::new(run.grid.ngrid, run.grid.x0, run.atom.radius);
        let nspin = run.model.spindims();
        StaticKs {
            solver: RadialSolver::new(grid, run.model.bc, run.scf.nmax),
            atomic_number: run.atom.atomic_number() as f64,
            temp: run.atom.temp,
            nele: run.model.nele.clone(),
            lmax: run.scf.lmax,
            xfunc: run.model.xfunc,
            cfunc: run.model.cfunc,
            gas: IdealGas::new(run.atom.volume(), run.atom.temp, nspin),
        }
    }

    pub fn grid(&self) -> &LogGrid {
        self.solver.grid()
    }

    fn nspin(&self) -> usize {
        self.nele.len()
    }

    pub fn electron_nuclear(&self) -> DVector<f64> {
        self.grid().r().map(|r| -self.atomic_number / r)
    }

    /// Hartree potential by radial Poisson integration:
    /// v_ha(r) = 4π [ (1/r) ∫_0^r n r'² dr' + ∫_r^R n r' dr' ]
    pub fn hartree(&self, n: &DVector<f64>) -> DVector<f64> {
        let grid = self.grid();
        let r = grid.r();
        let inner = grid.cumulative_from_origin(&n.zip_map(r, |n, r| n * r * r * r));
        let outer = grid.cumulative_to_edge(&n.zip_map(r, |n, r| n * r * r));
        DVector::from_fn(n.len(), |i, _| 4.0 * PI * (inner[i] / r[i] + outer[i]))
    }

    /// Energy density and potential of one functional for every spin.
    fn xc_terms(
        &self,
        functional: XcFunctional,
        density: &DMatrix<f64>,
    ) -> (DVector<f64>, DMatrix<f64>) {
        let ngrid = density.ncols();
        let mut e = DVector::zeros(ngrid);
        let mut v = DMatrix::zeros(self.nspin(), ngrid);
        for i in 0..ngrid {
            let point = if self.nspin() == 1 {
                let half = 0.5 * density[(0, i)];
                functional.evaluate(half, half)
            } else {
                functional.evaluate(density[(0, i)], density[(1, i)])
            };
            e[i] = point.energy_density;
            v[(0, i)] = point.v_up;
            if self.nspin() == 2 {
                v[(1, i)] = point.v_dw;
            }
        }
        (e, v)
    }

    fn energy_density_xc(&self, density: &DMatrix<f64>) -> (DVector<f64>, DVector<f64>) {
        let (ex, _) = self.xc_terms(self.xfunc, density);
        let (ec, _) = self.xc_terms(self.cfunc, density);
        (ex, ec)
    }
}

impl OrbitalSolver for StaticKs {
    /// Solve every (spin, l) channel in parallel, then regroup by spin.
    fn solve(&self, potential: &DMatrix<f64>) -> Result<Orbitals> {
        let nspin = self.nspin();
        let pairs: Vec<(usize, usize)> = (0..nspin)
            .flat_map(|s| (0..self.lmax).map(move |l| (s, l)))
            .collect();

        let solved: Vec<RadialStates> = pairs
            .par_iter()
            .map(|&(s, l)| {
                let v = potential.row(s).transpose();
                self.solver.solve(&v, l)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut states: Vec<Vec<RadialStates>> = vec![Vec::with_capacity(self.lmax); nspin];
        for ((s, _), st) in pairs.into_iter().zip(solved) {
            states[s].push(st);
        }
        Ok(Orbitals {
            states,
            potential: potential.clone(),
        })
    }

    fn occupy(&self, orbitals: &Orbitals) -> Result<Occupations> {
        let nspin = self.nspin();
        let mut mu = Vec::with_capacity(nspin);
        let mut occnums = Vec::with_capacity(nspin);
        let mut unbound = Vec::with_capacity(nspin);

        for s in 0..nspin {
            let energies = orbitals.eigenvalues(s);
            let levels: Vec<Level> = energies
                .row_iter()
                .enumerate()
                .flat_map(|(l, row)| {
                    row.iter()
                        .filter(|&&e| e < 0.0)
                        .map(|&e| Level {
                            energy: e,
                            degeneracy: degeneracy(l, nspin),
                        })
                        .collect::<Vec<_>>()
                })
                .collect();

            let target = self.nele[s] as f64;
            let mu_s = find_chemical_potential(&levels, &self.gas, target).ok_or_else(|| {
                let reason = format!("no chemical potential found for spin channel {s}");
                AvAtomError::numerical(0, reason)
            })?;
            debug!("spin {}: mu = {:.6}, {} bound levels", s, mu_s, levels.len());

            occnums.push(occupation_numbers(&energies, nspin, mu_s, self.temp));
            unbound.push(self.gas.evaluate(mu_s));
            mu.push(mu_s);
        }

        Ok(Occupations { mu, occnums, unbound })
    }
}

impl FieldBuilder for StaticKs {
    fn initial_potential(&self) -> DMatrix<f64> {
        let v_en = self.electron_nuclear();
        DMatrix::from_fn(self.nspin(), v_en.len(), |_, i| v_en[i])
    }

    /// n_s(r) = Σ_{nl} occ · y²/(4πr) plus the uniform unbound density.
    fn density(&self, orbitals: &Orbitals, occupations: &Occupations) -> Result<Density> {
        let r = self.grid().r();
        let ngrid = r.len();
        let nspin = self.nspin();
        let mut bound = DMatrix::zeros(nspin, ngrid);
        let mut unbound = DMatrix::zeros(nspin, ngrid);

        for s in 0..nspin {
            for (l, states) in orbitals.states[s].iter().enumerate() {
                for n in 0..states.energies.len() {
                    let occ = occupations.occnums[s][(l, n)];
                    if occ == 0.0 {
                        continue;
                    }
                    let y = states.functions.column(n);
                    for i in 0..ngrid {
                        bound[(s, i)] += occ * y[i] * y[i] / (4.0 * PI * r[i]);
                    }
                }
            }
            unbound.row_mut(s).fill(occupations.unbound[s].density);
        }
        Ok(Density { bound, unbound })
    }

    fn potential(&self, density: &Density) -> Result<Potential> {
        let total = density.total();
        let n = density.spin_summed();
        let v_en = self.electron_nuclear();
        let v_ha = self.hartree(&n);
        let (_, vx) = self.xc_terms(self.xfunc, &total);
        let (_, vc) = self.xc_terms(self.cfunc, &total);
        Ok(Potential {
            v_en,
            v_ha,
            v_xc: vx + vc,
        })
    }

    fn energy(
        &self,
        orbitals: &Orbitals,
        occupations: &Occupations,
        density: &Density,
        potential: &Potential,
    ) -> Result<Energy> {
        let grid = self.grid();
        let nspin = self.nspin();

        // bound kinetic energy: eigenvalue sum less the potential energy in the solving potential
        let mut kinetic_bound = 0.0;
        let mut entropy_bound = 0.0;
        for s in 0..nspin {
            let eigs = orbitals.eigenvalues(s);
            let occ = &occupations.occnums[s];
            kinetic_bound += occ.component_mul(&eigs).sum();
            let n_b = density.bound.row(s).transpose();
            let v_s = orbitals.potential.row(s).transpose();
            kinetic_bound -= grid.integrate_volume(&n_b.component_mul(&v_s));

            for l in 0..occ.nrows() {
                let g = degeneracy(l, nspin);
                for n in 0..occ.ncols() {
                    entropy_bound += g * occupation_entropy(occ[(l, n)] / g);
                }
            }
        }

        let n = density.spin_summed();
        let (ex, ec) = self.energy_density_xc(&density.total());

        Ok(Energy {
            kinetic_bound,
            kinetic_unbound: occupations.unbound.iter().map(|u| u.kinetic).sum(),
            electron_nuclear: grid.integrate_volume(&n.component_mul(&potential.v_en)),
            hartree: 0.5 * grid.integrate_volume(&n.component_mul(&potential.v_ha)),
            exchange: grid.integrate_volume(&ex),
            correlation: grid.integrate_volume(&ec),
            entropy_bound,
            entropy_unbound: occupations.unbound.iter().map(|u| u.entropy).sum(),
            temp: self.temp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AtomInput, Config};
    use crate::validation::validate_run;
    use approx::assert_relative_eq;

    fn hydrogen(spinpol: bool) -> StaticKs {
        hydrogen_on_grid(300, spinpol)
    }

    fn hydrogen_on_grid(ngrid: i64, spinpol: bool) -> StaticKs {
        let mut atom = AtomInput::new("H", 0.1);
        atom.radius = Some(3.0.into());
        let mut config = Config::for_atom(atom);
        config.grid_params.ngrid = Some(ngrid.into());
        config.grid_params.x0 = Some((-10.0).into());
        config.model.spinpol = Some(spinpol.into());
        StaticKs::new(&validate_run(&config).unwrap())
    }

    #[test]
    fn test_electron_count_is_conserved() {
        let ks = hydrogen(false);
        let orbitals = ks.solve(&ks.initial_potential()).unwrap();
        let occ = ks.occupy(&orbitals).unwrap();
        let density = ks.density(&orbitals, &occ).unwrap();
        let n = density.spin_summed();
        assert_relative_eq!(ks.grid().integrate_volume(&n), 1.0, epsilon = 2e-3);
    }

    #[test]
    fn test_polarized_channels_hold_their_electrons() {
        let ks = hydrogen(true);
        let orbitals = ks.solve(&ks.initial_potential()).unwrap();
        assert_eq!(orbitals.nspin(), 2);
        let occ = ks.occupy(&orbitals).unwrap();
        let density = ks.density(&orbitals, &occ).unwrap();
        let up = density.total().row(0).transpose();
        let dw = density.total().row(1).transpose();
        assert_relative_eq!(ks.grid().integrate_volume(&up), 1.0, epsilon = 2e-3);
        assert!(ks.grid().integrate_volume(&dw) < 1e-6);
    }

    #[test]
    fn test_hartree_of_uniform_sphere() {
        // uniform sphere of charge Q: v(r) = Q (3R² - r²) / (2R³)
        // trapezoid error is O(dx²), about 1e-4 relative at 1000 points
        let ks = hydrogen_on_grid(1000, false);
        let radius = ks.grid().radius();
        let n0 = 1.0 / crate::units::sphere_volume(radius);
        let n = DVector::from_element(ks.grid().len(), n0);
        let v = ks.hartree(&n);
        let r = ks.grid().r();
        for i in [0, 500, 999] {
            let expected = (3.0 * radius * radius - r[i] * r[i]) / (2.0 * radius.powi(3));
            assert_relative_eq!(v[i], expected, max_relative = 1e-3);
        }
    }

    #[test]
    fn test_energy_terms_have_expected_signs() {
        let ks = hydrogen(false);
        let orbitals = ks.solve(&ks.initial_potential()).unwrap();
        let occ = ks.occupy(&orbitals).unwrap();
        let density = ks.density(&orbitals, &occ).unwrap();
        let potential = ks.potential(&density).unwrap();
        let energy = ks.energy(&orbitals, &occ, &density, &potential).unwrap();
        assert!(energy.kinetic_bound > 0.0);
        assert!(energy.electron_nuclear < 0.0);
        assert!(energy.hartree > 0.0);
        assert!(energy.exchange < 0.0);
        assert!(energy.correlation < 0.0);
        assert!(energy.entropy() >= 0.0);
        assert!(energy.is_finite());
        assert_relative_eq!(energy.free(), energy.total() - 0.1 * energy.entropy());
    }
}
