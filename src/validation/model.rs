use crate::config::{InputValue, SPINMAG_AUTO};
use crate::error::{AvAtomError, Result, XcSlot};
use crate::model::{BoundaryCondition, UnboundTreatment};
use crate::xc::{BuiltinResolver, FunctionalResolver, ResolvedFunctional};

/// Validated spin settings and the resulting electron count per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinConfig {
    pub spinpol: bool,
    pub spinmag: i64,
    pub nele: Vec<usize>,
}

/// Checks spin polarization and magnetization against the electron number.
///
/// `spinmag == -1` picks 0 for an even and 1 for an odd electron count; any
/// other value must be non-negative with the same parity as `nele`.
pub fn validate_spin(
    spinpol: &InputValue,
    spinmag: &InputValue,
    nele: usize,
) -> Result<SpinConfig> {
    let spinpol = spinpol.as_bool().ok_or_else(|| {
        AvAtomError::Spin(format!("spin polarization '{spinpol}' is not of type bool"))
    })?;
    let spinmag = spinmag.as_i64().ok_or_else(|| {
        AvAtomError::Spin(format!("spin magnetization '{spinmag}' is not an integer"))
    })?;

    let nele_parity = (nele % 2) as i64;
    let spinmag = if spinmag == SPINMAG_AUTO {
        nele_parity
    } else if spinmag < 0 {
        return Err(AvAtomError::Spin(
            "spin magnetization is not a positive integer".into(),
        ));
    } else if spinmag % 2 != nele_parity {
        return Err(AvAtomError::Spin(format!(
            "spin magnetization {spinmag} is not compatible with total electron number {nele}"
        )));
    } else if spinmag as usize > nele {
        return Err(AvAtomError::Spin(format!(
            "spin magnetization {spinmag} exceeds total electron number {nele}"
        )));
    } else {
        spinmag
    };

    Ok(SpinConfig {
        spinpol,
        spinmag,
        nele: calc_nele(spinmag, nele, spinpol),
    })
}

/// Electron number in each spin channel; parity must already be checked.
pub fn calc_nele(spinmag: i64, nele: usize, spinpol: bool) -> Vec<usize> {
    if !spinpol {
        return vec![nele];
    }
    let m = spinmag as usize;
    vec![(nele + m) / 2, (nele - m) / 2]
}

/// Resolve the exchange and correlation functionals with the built-in catalog.
pub fn validate_functional(
    exchange: &InputValue,
    correlation: &InputValue,
) -> Result<(ResolvedFunctional, ResolvedFunctional)> {
    validate_functional_with(&BuiltinResolver, exchange, correlation)
}

pub fn validate_functional_with(
    resolver: &dyn FunctionalResolver,
    exchange: &InputValue,
    correlation: &InputValue,
) -> Result<(ResolvedFunctional, ResolvedFunctional)> {
    let x = resolver.resolve(XcSlot::Exchange, exchange)?;
    let c = resolver.resolve(XcSlot::Correlation, correlation)?;
    Ok((x, c))
}

pub fn validate_boundary_condition(bc: &InputValue) -> Result<BoundaryCondition> {
    let text = bc.as_str().ok_or_else(|| {
        AvAtomError::BoundaryCondition(format!("boundary condition '{bc}' is not a string"))
    })?;
    BoundaryCondition::parse(text).ok_or_else(|| {
        AvAtomError::BoundaryCondition(format!(
            "boundary condition '{text}' is not recognised; allowed: {}",
            BoundaryCondition::PERMITTED.join(", ")
        ))
    })
}

pub fn validate_unbound_treatment(unbound: &InputValue) -> Result<UnboundTreatment> {
    let text = unbound.as_str().ok_or_else(|| {
        AvAtomError::UnboundTreatment(format!(
            "unbound electron description '{unbound}' is not a string"
        ))
    })?;
    UnboundTreatment::parse(text).ok_or_else(|| {
        AvAtomError::UnboundTreatment(format!(
            "treatment of unbound electrons '{text}' not recognised; allowed: {}",
            UnboundTreatment::PERMITTED.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FunctionalFailure;
    use crate::xc::XcFunctional;

    fn spin(spinpol: bool, spinmag: i64, nele: usize) -> Result<SpinConfig> {
        validate_spin(&spinpol.into(), &spinmag.into(), nele)
    }

    #[test]
    fn test_spinmag_auto() {
        assert_eq!(spin(false, -1, 4).unwrap().spinmag, 0);
        assert_eq!(spin(false, -1, 5).unwrap().spinmag, 1);
        assert_eq!(spin(true, -1, 5).unwrap().nele, vec![3, 2]);
    }

    #[test]
    fn test_spinmag_parity_mismatch() {
        assert!(matches!(spin(true, 2, 5), Err(AvAtomError::Spin(_))));
        assert!(matches!(spin(true, 1, 4), Err(AvAtomError::Spin(_))));
        assert!(matches!(spin(true, -3, 5), Err(AvAtomError::Spin(_))));
        assert!(matches!(spin(true, 7, 5), Err(AvAtomError::Spin(_))));
    }

    #[test]
    fn test_parity_invariant_holds_after_validation() {
        for nele in 1..12usize {
            for m in -1..8i64 {
                if let Ok(cfg) = spin(true, m, nele) {
                    assert_eq!((nele as i64 - cfg.spinmag) % 2, 0);
                    assert_eq!(cfg.nele.iter().sum::<usize>(), nele);
                    assert_eq!(cfg.nele[0] - cfg.nele[1], cfg.spinmag as usize);
                }
            }
        }
    }

    #[test]
    fn test_spinpol_must_be_bool() {
        let err = validate_spin(&"yes".into(), &(-1).into(), 2);
        assert!(matches!(err, Err(AvAtomError::Spin(_))));
        let err = validate_spin(&false.into(), &1.5.into(), 2);
        assert!(matches!(err, Err(AvAtomError::Spin(_))));
    }

    #[test]
    fn test_functional_pair() {
        let (x, c) = validate_functional(&1.into(), &"lda_c_pz".into()).unwrap();
        assert_eq!(x, ResolvedFunctional::Exchange(XcFunctional::LdaX));
        assert_eq!(c, ResolvedFunctional::Correlation(XcFunctional::LdaCPz));

        match validate_functional(&"gga_x_pbe".into(), &"lda_c_pw".into()) {
            Err(AvAtomError::Functional {
                slot: XcSlot::Exchange,
                reason: FunctionalFailure::UnsupportedFamily { .. },
            }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_boundary_condition() {
        assert_eq!(
            validate_boundary_condition(&"Neumann".into()).unwrap(),
            BoundaryCondition::Neumann
        );
        assert!(matches!(
            validate_boundary_condition(&"periodic".into()),
            Err(AvAtomError::BoundaryCondition(_))
        ));
        assert!(matches!(
            validate_boundary_condition(&InputValue::Int(1)),
            Err(AvAtomError::BoundaryCondition(_))
        ));
    }

    #[test]
    fn test_unbound_treatment() {
        assert_eq!(validate_unbound_treatment(&"IDEAL".into()).unwrap(), UnboundTreatment::Ideal);
        assert!(matches!(
            validate_unbound_treatment(&"quantum".into()),
            Err(AvAtomError::UnboundTreatment(_))
        ));
    }
}
