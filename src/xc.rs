//! Exchange-correlation functionals
//!
//! Functionals are picked by libxc-style name or numeric id from a closed
//! catalog. Only the LDA family is evaluated; the other catalog entries are
//! there so that a known-but-unsupported choice can be told apart from a typo.
//!
//! Implemented:
//! - `lda_x` (1): Slater exchange, spin-scaled
//! - `lda_c_pz` (9): Perdew–Zunger 1981 correlation
//! - `lda_c_pw` (12): Perdew–Wang 1992 correlation

use crate::config::InputValue;
use crate::error::{AvAtomError, FunctionalFailure, Result, XcSlot};
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XcFamily {
    Lda,
    Gga,
    MetaGga,
    HybridGga,
}

impl XcFamily {
    pub fn name(&self) -> &'static str {
        match self {
            XcFamily::Lda => "lda",
            XcFamily::Gga => "gga",
            XcFamily::MetaGga => "mgga",
            XcFamily::HybridGga => "hyb_gga",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum XcKind {
    Exchange,
    Correlation,
    ExchangeCorrelation,
}

/// Functionals that can actually be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XcFunctional {
    /// Slater exchange
    LdaX,
    /// Perdew–Zunger 1981 correlation
    LdaCPz,
    /// Perdew–Wang 1992 correlation
    LdaCPw,
}

/// A functional resolved for one slot of the exchange-correlation pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedFunctional {
    Exchange(XcFunctional),
    Correlation(XcFunctional),
}

impl ResolvedFunctional {
    pub fn functional(&self) -> XcFunctional {
        match self {
            ResolvedFunctional::Exchange(f) | ResolvedFunctional::Correlation(f) => *f,
        }
    }
}

struct CatalogEntry {
    id: i64,
    name: &'static str,
    family: XcFamily,
    kind: XcKind,
    functional: Option<XcFunctional>,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: 1,
        name: "lda_x",
        family: XcFamily::Lda,
        kind: XcKind::Exchange,
        functional: Some(XcFunctional::LdaX),
    },
    CatalogEntry {
        id: 9,
        name: "lda_c_pz",
        family: XcFamily::Lda,
        kind: XcKind::Correlation,
        functional: Some(XcFunctional::LdaCPz),
    },
    CatalogEntry {
        id: 12,
        name: "lda_c_pw",
        family: XcFamily::Lda,
        kind: XcKind::Correlation,
        functional: Some(XcFunctional::LdaCPw),
    },
    CatalogEntry {
        id: 101,
        name: "gga_x_pbe",
        family: XcFamily::Gga,
        kind: XcKind::Exchange,
        functional: None,
    },
    CatalogEntry {
        id: 106,
        name: "gga_x_b88",
        family: XcFamily::Gga,
        kind: XcKind::Exchange,
        functional: None,
    },
    CatalogEntry {
        id: 130,
        name: "gga_c_pbe",
        family: XcFamily::Gga,
        kind: XcKind::Correlation,
        functional: None,
    },
    CatalogEntry {
        id: 131,
        name: "gga_c_lyp",
        family: XcFamily::Gga,
        kind: XcKind::Correlation,
        functional: None,
    },
    CatalogEntry {
        id: 263,
        name: "mgga_x_scan",
        family: XcFamily::MetaGga,
        kind: XcKind::Exchange,
        functional: None,
    },
    CatalogEntry {
        id: 267,
        name: "mgga_c_scan",
        family: XcFamily::MetaGga,
        kind: XcKind::Correlation,
        functional: None,
    },
    CatalogEntry {
        id: 402,
        name: "hyb_gga_xc_b3lyp",
        family: XcFamily::HybridGga,
        kind: XcKind::ExchangeCorrelation,
        functional: None,
    },
    CatalogEntry {
        id: 406,
        name: "hyb_gga_xc_pbeh",
        family: XcFamily::HybridGga,
        kind: XcKind::ExchangeCorrelation,
        functional: None,
    },
];

/// Resolves a name-or-id input into a functional for one slot.
pub trait FunctionalResolver {
    fn resolve(&self, slot: XcSlot, input: &InputValue) -> Result<ResolvedFunctional>;
}

/// Resolver backed by the built-in catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinResolver;

impl FunctionalResolver for BuiltinResolver {
    fn resolve(&self, slot: XcSlot, input: &InputValue) -> Result<ResolvedFunctional> {
        let fail = |reason| AvAtomError::Functional { slot, reason };

        let entry = match input {
            InputValue::Int(id) => CATALOG.iter().find(|e| e.id == *id),
            InputValue::Text(name) => {
                let name = name.trim().to_lowercase();
                CATALOG.iter().find(|e| e.name == name)
            }
            _ => return Err(fail(FunctionalFailure::NotIdOrName)),
        }
        .ok_or_else(|| fail(FunctionalFailure::Unknown(input.to_string())))?;

        let matches_slot = match slot {
            XcSlot::Exchange => entry.kind != XcKind::Correlation,
            XcSlot::Correlation => entry.kind != XcKind::Exchange,
        };
        if !matches_slot {
            return Err(fail(FunctionalFailure::Unknown(format!(
                "{} (not a {slot} functional)",
                entry.name
            ))));
        }

        match (entry.family, entry.functional) {
            (XcFamily::Lda, Some(functional)) => Ok(match slot {
                XcSlot::Exchange => ResolvedFunctional::Exchange(functional),
                XcSlot::Correlation => ResolvedFunctional::Correlation(functional),
            }),
            (family, _) => Err(fail(FunctionalFailure::UnsupportedFamily {
                name: entry.name.to_string(),
                family: family.name().to_string(),
            })),
        }
    }
}

/// Energy density (per volume) and potential for each spin at one grid point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct XcPoint {
    pub energy_density: f64,
    pub v_up: f64,
    pub v_dw: f64,
}

/// Densities below this are treated as vacuum.
const RHO_FLOOR: f64 = 1e-14;

impl XcFunctional {
    pub fn name(&self) -> &'static str {
        match self {
            XcFunctional::LdaX => "lda_x",
            XcFunctional::LdaCPz => "lda_c_pz",
            XcFunctional::LdaCPw => "lda_c_pw",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            XcFunctional::LdaX => 1,
            XcFunctional::LdaCPz => 9,
            XcFunctional::LdaCPw => 12,
        }
    }

    /// Evaluate for spin densities `rho_up`, `rho_dw`. An unpolarized caller
    /// passes half of the total density in each channel.
    pub fn evaluate(&self, rho_up: f64, rho_dw: f64) -> XcPoint {
        let rho_up = rho_up.max(0.0);
        let rho_dw = rho_dw.max(0.0);
        match self {
            XcFunctional::LdaX => slater_exchange(rho_up, rho_dw),
            XcFunctional::LdaCPz | XcFunctional::LdaCPw => {
                let rho = rho_up + rho_dw;
                if rho < RHO_FLOOR {
                    return XcPoint::default();
                }
                let rs = (3.0 / (4.0 * PI * rho)).cbrt();
                let zeta = ((rho_up - rho_dw) / rho).clamp(-1.0, 1.0);
                let (eps, deps_drs, deps_dzeta) = match self {
                    XcFunctional::LdaCPw => pw92(rs, zeta),
                    _ => pz81(rs, zeta),
                };
                let common = eps - rs / 3.0 * deps_drs;
                XcPoint {
                    energy_density: rho * eps,
                    v_up: common - (zeta - 1.0) * deps_dzeta,
                    v_dw: common - (zeta + 1.0) * deps_dzeta,
                }
            }
        }
    }
}

fn slater_exchange(rho_up: f64, rho_dw: f64) -> XcPoint {
    let c = (6.0 / PI).cbrt();
    let channel = |rho: f64| {
        if rho < RHO_FLOOR {
            (0.0, 0.0)
        } else {
            let cube = rho.cbrt();
            (-0.75 * c * rho * cube, -c * cube)
        }
    };
    let (e_up, v_up) = channel(rho_up);
    let (e_dw, v_dw) = channel(rho_dw);
    XcPoint {
        energy_density: e_up + e_dw,
        v_up,
        v_dw,
    }
}

/// Spin interpolation f(zeta) and its derivative.
fn spin_interpolation(zeta: f64) -> (f64, f64) {
    let denom = 2.0_f64.powf(4.0 / 3.0) - 2.0;
    let up = (1.0 + zeta).max(0.0);
    let dw = (1.0 - zeta).max(0.0);
    let f = (up.powf(4.0 / 3.0) + dw.powf(4.0 / 3.0) - 2.0) / denom;
    let df = 4.0 / 3.0 * (up.cbrt() - dw.cbrt()) / denom;
    (f, df)
}

/// PW92 G(rs) and dG/drs for one parameter set (A, alpha1, beta1..beta4).
fn pw92_g(rs: f64, p: [f64; 6]) -> (f64, f64) {
    let [a, alpha1, b1, b2, b3, b4] = p;
    let sqrt_rs = rs.sqrt();
    let q = 2.0 * a * (b1 * sqrt_rs + b2 * rs + b3 * rs * sqrt_rs + b4 * rs * rs);
    let dq = 2.0 * a * (0.5 * b1 / sqrt_rs + b2 + 1.5 * b3 * sqrt_rs + 2.0 * b4 * rs);
    let log = (1.0 + 1.0 / q).ln();
    let g = -2.0 * a * (1.0 + alpha1 * rs) * log;
    let dg = -2.0 * a * alpha1 * log + 2.0 * a * (1.0 + alpha1 * rs) * dq / (q * (q + 1.0));
    (g, dg)
}

/// Perdew–Wang 92: returns (eps_c, d eps_c / d rs, d eps_c / d zeta).
fn pw92(rs: f64, zeta: f64) -> (f64, f64, f64) {
    const PARA: [f64; 6] = [0.031091, 0.21370, 7.5957, 3.5876, 1.6382, 0.49294];
    const FERRO: [f64; 6] = [0.015545, 0.20548, 14.1189, 6.1977, 3.3662, 0.62517];
    const STIFF: [f64; 6] = [0.016887, 0.11125, 10.357, 3.6231, 0.88026, 0.49671];
    const FPP0: f64 = 1.709921;

    let (e0, de0) = pw92_g(rs, PARA);
    let (e1, de1) = pw92_g(rs, FERRO);
    // G with the stiffness parameters is minus the spin stiffness
    let (ga, dga) = pw92_g(rs, STIFF);

    let (f, df) = spin_interpolation(zeta);
    let z3 = zeta.powi(3);
    let z4 = zeta.powi(4);

    let eps = e0 + ga * f / FPP0 * (1.0 - z4) + (e1 - e0) * f * z4;
    let deps_drs = de0 * (1.0 - f * z4) + dga * f / FPP0 * (1.0 - z4) + de1 * f * z4;
    let deps_dzeta =
        4.0 * z3 * f * (e1 - e0 - ga / FPP0) + df * (z4 * (e1 - e0) + (1.0 - z4) * ga / FPP0);
    (eps, deps_drs, deps_dzeta)
}

/// PZ81 single-polarization branch: (eps, d eps / d rs).
fn pz81_branch(rs: f64, p: [f64; 7]) -> (f64, f64) {
    let [gamma, beta1, beta2, a, b, c, d] = p;
    if rs >= 1.0 {
        let sqrt_rs = rs.sqrt();
        let denom = 1.0 + beta1 * sqrt_rs + beta2 * rs;
        let eps = gamma / denom;
        let deps = -gamma * (0.5 * beta1 / sqrt_rs + beta2) / (denom * denom);
        (eps, deps)
    } else {
        let ln_rs = rs.ln();
        let eps = a * ln_rs + b + c * rs * ln_rs + d * rs;
        let deps = a / rs + c * (ln_rs + 1.0) + d;
        (eps, deps)
    }
}

/// Perdew–Zunger 81: returns (eps_c, d eps_c / d rs, d eps_c / d zeta).
fn pz81(rs: f64, zeta: f64) -> (f64, f64, f64) {
    const UNPOL: [f64; 7] = [-0.1423, 1.0529, 0.3334, 0.0311, -0.048, 0.0020, -0.0116];
    const POL: [f64; 7] = [-0.0843, 1.3981, 0.2611, 0.01555, -0.0269, 0.0007, -0.0048];

    let (eu, deu) = pz81_branch(rs, UNPOL);
    let (ep, dep) = pz81_branch(rs, POL);
    let (f, df) = spin_interpolation(zeta);
    (eu + f * (ep - eu), deu + f * (dep - deu), df * (ep - eu))
}
