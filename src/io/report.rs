//! Human-readable report blocks
//!
//! Every function returns the formatted text; the caller decides where it
//! goes (the application logs it with `info!`).

use crate::model::{AtomSpec, ConvergenceParams, ModelConfig};
use crate::scf_impl::{ConvergenceResult, Energy, Occupations, Orbitals, ScfOutcome, ScfStatus};
use crate::units::{bohr_to_angstrom, ha_to_ev, ha_to_kelvin};
use nalgebra::DMatrix;
use std::fmt::Write;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

const RULE_WIDE: usize = 65;
const RULE_BOX: usize = 45;

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{label:30}: {value}");
}

pub fn atomic_info(atom: &AtomSpec) -> String {
    let mut out = String::from("Atomic information:\n\n");
    line(&mut out, "Atomic species", &atom.species.symbol);
    line(
        &mut out,
        "Atomic charge / weight",
        format!("{:<3} / {:<.3}", atom.atomic_number(), atom.atomic_mass()),
    );
    line(&mut out, "Net charge", atom.charge);
    line(&mut out, "Number of electrons", atom.nele);
    line(&mut out, "Mass density", format!("{:<.3} g cm^-3", atom.density));
    line(
        &mut out,
        "Wigner-Seitz radius",
        format!("{:<.4} Bohr / {:<.4} Angstrom", atom.radius, bohr_to_angstrom(atom.radius)),
    );
    line(
        &mut out,
        "Electronic temperature",
        format!(
            "{:<.4} Ha / {:<.4} eV / {:<.4e} K",
            atom.temp,
            ha_to_ev(atom.temp),
            ha_to_kelvin(atom.temp)
        ),
    );
    out
}

pub fn model_info(model: &ModelConfig) -> String {
    let mut out = String::from("Using Ion-Sphere model\nIon-sphere model parameters:\n\n");
    line(&mut out, "Spin-polarized", model.spinpol);
    if model.spinpol {
        line(
            &mut out,
            "Number of up / down electrons",
            format!("{} / {}", model.nele[0], model.nele[1]),
        );
    } else {
        line(&mut out, "Number of electrons", model.nele[0]);
    }
    line(&mut out, "Exchange functional", model.xfunc.name());
    line(&mut out, "Correlation functional", model.cfunc.name());
    line(&mut out, "Boundary condition", model.bc);
    line(&mut out, "Unbound electron treatment", model.unbound);
    out
}

/// Column header of the per-cycle table, with the thresholds in brackets.
pub fn scf_header(conv: &ConvergenceParams) -> String {
    format!(
        "Starting SCF energy calculation\n\n\
         {:>4}   {:>12}   dE ({:<4.1e})   dn ({:<4.1e})   dv ({:<4.1e})\n{}",
        "iscf",
        "E_free (Ha)",
        conv.econv,
        conv.nconv,
        conv.vconv,
        "-".repeat(RULE_WIDE)
    )
}

pub fn scf_cycle(iteration: usize, free_energy: f64, conv: &ConvergenceResult) -> String {
    format!(
        "{:4}   {:12.7}   {:12.3e}   {:12.3e}   {:12.3e}",
        iteration,
        free_energy,
        conv.de,
        conv.max_dn(),
        conv.max_dv()
    )
}

pub fn final_energies(energy: &Energy) -> String {
    let rule = "-".repeat(RULE_BOX);
    let mut out = String::from("Final energies (Ha)\n\n");
    let _ = writeln!(out, "{rule}");
    let mut entry = |label: &str, value: f64, indent: bool| {
        if indent {
            let _ = writeln!(out, "    {label:26} : {value:10.4}");
        } else {
            let _ = writeln!(out, "{label:30} : {value:10.4}");
        }
    };
    entry("Kinetic energy", energy.kinetic(), false);
    entry("bound", energy.kinetic_bound, true);
    entry("unbound", energy.kinetic_unbound, true);
    entry("Electron-nuclear energy", energy.electron_nuclear, false);
    entry("Hartree energy", energy.hartree, false);
    entry("Exchange-correlation energy", energy.xc(), false);
    entry("exchange", energy.exchange, true);
    entry("correlation", energy.correlation, true);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{:30} : {:10.4}", "Total energy", energy.total());
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{:30} : {:10.4}", "Entropy", energy.entropy());
    let _ = writeln!(out, "    {:26} : {:10.4}", "bound", energy.entropy_bound);
    let _ = writeln!(out, "    {:26} : {:10.4}", "unbound", energy.entropy_unbound);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{:30} : {:10.4}", "Total free energy", energy.free());
    let _ = writeln!(out, "{rule}");
    out
}

/// Chemical potential and mean ionization state, per spin channel.
pub fn chemical_potential(occupations: &Occupations) -> String {
    let join = |values: Vec<f64>| {
        values
            .iter()
            .map(|v| format!("{v:7.3}"))
            .collect::<Vec<_>>()
            .join(" / ")
    };
    let suffix = if occupations.mu.len() == 2 { " (u/d)" } else { "" };
    let mis = occupations.unbound.iter().map(|u| u.nele).collect();
    format!(
        "{:30} : {}\n{:30} : {}",
        format!("Chemical potential{suffix}"),
        join(occupations.mu.clone()),
        format!("Mean ionization state{suffix}"),
        join(mis)
    )
}

/// Rows and columns to print: every bound state plus one more in each direction.
pub fn table_extent(eigenvalues: &DMatrix<f64>) -> (usize, usize) {
    let mut max_l = None;
    let mut max_n = None;
    for l in 0..eigenvalues.nrows() {
        for n in 0..eigenvalues.ncols() {
            if eigenvalues[(l, n)] < 0.0 {
                max_l = Some(max_l.map_or(l, |m: usize| m.max(l)));
                max_n = Some(max_n.map_or(n, |m: usize| m.max(n)));
            }
        }
    }
    let rows = max_l.map_or(1, |m| m + 2).min(eigenvalues.nrows());
    let cols = max_n.map_or(1, |m| m + 2).min(eigenvalues.ncols());
    (rows, cols)
}

fn table(values: &DMatrix<f64>, rows: usize, cols: usize) -> String {
    let mut builder = Builder::default();
    let header = (0..cols).map(|n| if n == 0 { "n=l+1".to_string() } else { (n + 1).to_string() });
    builder.push_record(std::iter::once(String::new()).chain(header));
    for l in 0..rows {
        let label = if l == 0 { "l=0".to_string() } else { l.to_string() };
        let cells = (0..cols).map(|n| format!("{:.2}", values[(l, n)]));
        builder.push_record(std::iter::once(label).chain(cells));
    }
    let mut table = builder.build();
    table
        .with(Style::psql())
        .modify(Columns::new(1..), Alignment::right());
    format!("{table}\n")
}

/// Eigenvalue and occupation tables for every spin channel.
pub fn orbital_tables(orbitals: &Orbitals, occupations: &Occupations) -> (String, String) {
    let mut eigvals = String::new();
    let mut occnums = String::new();
    for s in 0..orbitals.nspin() {
        let energies = orbitals.eigenvalues(s);
        let (rows, cols) = table_extent(&energies);
        eigvals += &table(&energies, rows, cols);
        eigvals.push('\n');
        occnums += &table(&occupations.occnums[s], rows, cols);
        occnums.push('\n');
    }
    (eigvals, occnums)
}

/// Closing block: convergence status, energies, chemical potential and orbitals.
pub fn scf_final(outcome: &ScfOutcome, maxscf: usize) -> String {
    let mut out = "-".repeat(RULE_WIDE);
    out.push('\n');
    match outcome.status {
        ScfStatus::Converged => out += "SCF cycle converged\n\n",
        ScfStatus::MaxIterationsReached => {
            let _ = write!(out, "SCF cycle did not converge in {maxscf} iterations\n\n");
        }
    }

    let state = &outcome.state;
    out += &final_energies(&state.energy);
    out.push('\n');
    out += &chemical_potential(&state.occupations);

    let (eigvals, occnums) = orbital_tables(&state.orbitals, &state.occupations);
    out += "\n\nOrbital eigenvalues (Ha) :\n\n";
    out += &eigvals;
    out += "Orbital occupations g_l * f_nl :\n\n";
    out += &occnums;
    out
}
