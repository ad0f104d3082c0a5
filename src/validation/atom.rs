use super::{push_warning, InputWarning};
use crate::config::InputValue;
use crate::error::{AvAtomError, Result};
use crate::model::Species;
use crate::units::TemperatureUnit;
use periodic_table_on_an_enum::Element;

/// Temperatures (Ha) outside this range are accepted with a warning.
const TEMP_LOW: f64 = 0.01;
const TEMP_HIGH: f64 = 3.5;

/// Checks the species is a string naming an actual element, e.g. "He".
pub fn validate_species(name: &InputValue) -> Result<Species> {
    let symbol = name
        .as_str()
        .ok_or_else(|| AvAtomError::Species(format!("element '{name}' is not a string")))?;
    let element = Element::from_symbol(symbol.trim()).ok_or_else(|| {
        AvAtomError::Species(format!(
            "invalid element '{symbol}'; species must be a chemical symbol, e.g. 'He'"
        ))
    })?;
    Ok(Species::from(element))
}

/// Converts the temperature to Hartree and checks it is a non-negative number.
pub fn validate_temperature(
    value: &InputValue,
    unit: &str,
    warnings: &mut Vec<InputWarning>,
) -> Result<f64> {
    let unit = TemperatureUnit::parse(unit).ok_or_else(|| {
        AvAtomError::Unit(format!(
            "units of temperature '{unit}' are not recognised (use ha, ev or k)"
        ))
    })?;
    let raw = value
        .as_f64()
        .ok_or_else(|| AvAtomError::Temperature(format!("temperature '{value}' is not a number")))?;
    if !raw.is_finite() {
        return Err(AvAtomError::Temperature("temperature is not finite".into()));
    }

    let temp = unit.to_hartree(raw);
    if temp < 0.0 {
        return Err(AvAtomError::Temperature("temperature is negative".into()));
    }
    if temp < TEMP_LOW {
        push_warning(warnings, InputWarning::TemperatureLow(temp));
    } else if temp > TEMP_HIGH {
        push_warning(warnings, InputWarning::TemperatureHigh(temp));
    }
    Ok(temp)
}

/// Checks the net charge is an integer an ion can carry.
pub fn validate_charge(value: &InputValue) -> Result<i64> {
    match value.as_i64() {
        Some(charge) => Ok(charge),
        None if value.is_integer() => Err(AvAtomError::Charge(format!(
            "charge {value} is out of range for any ion"
        ))),
        None => Err(AvAtomError::Charge(format!("charge '{value}' is not an integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{EV_TO_HA, K_TO_HA};
    use approx::assert_relative_eq;

    #[test]
    fn test_species() {
        let species = validate_species(&"Al".into()).unwrap();
        assert_eq!(species.symbol, "Al");
        assert_eq!(species.atomic_number, 13);
        assert_relative_eq!(species.atomic_mass, 26.98, epsilon = 0.01);

        assert!(matches!(validate_species(&"Qq".into()), Err(AvAtomError::Species(_))));
        assert!(matches!(validate_species(&InputValue::Int(13)), Err(AvAtomError::Species(_))));
    }

    #[test]
    fn test_temperature_in_hartree_has_no_warning() {
        let mut warnings = Vec::new();
        let temp = validate_temperature(&1.0.into(), "ha", &mut warnings).unwrap();
        assert_eq!(temp, 1.0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_temperature_units_give_same_value() {
        let mut warnings = Vec::new();
        let t_ha = validate_temperature(&0.5.into(), "Ha", &mut warnings).unwrap();
        let t_ev = validate_temperature(&(0.5 / EV_TO_HA).into(), "EV", &mut warnings).unwrap();
        let t_k = validate_temperature(&(0.5 / K_TO_HA).into(), "k", &mut warnings).unwrap();
        assert_relative_eq!(t_ev, t_ha, max_relative = 1e-12);
        assert_relative_eq!(t_k, t_ha, max_relative = 1e-12);
    }

    #[test]
    fn test_temperature_in_ev() {
        let mut warnings = Vec::new();
        let temp = validate_temperature(&0.5.into(), "ev", &mut warnings).unwrap();
        assert_relative_eq!(temp, 0.5 * EV_TO_HA);
        // 0.018 Ha is inside the typical range
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_temperature_warnings_do_not_fail() {
        let mut warnings = Vec::new();
        assert!(validate_temperature(&0.0.into(), "ha", &mut warnings).is_ok());
        assert!(validate_temperature(&200.0.into(), "ev", &mut warnings).is_ok());
        assert!(matches!(warnings[0], InputWarning::TemperatureLow(_)));
        assert!(matches!(warnings[1], InputWarning::TemperatureHigh(_)));
    }

    #[test]
    fn test_temperature_errors() {
        let mut warnings = Vec::new();
        assert!(matches!(
            validate_temperature(&1.0.into(), "celsius", &mut warnings),
            Err(AvAtomError::Unit(_))
        ));
        assert!(matches!(
            validate_temperature(&(-0.1).into(), "ha", &mut warnings),
            Err(AvAtomError::Temperature(_))
        ));
        assert!(matches!(
            validate_temperature(&"hot".into(), "ha", &mut warnings),
            Err(AvAtomError::Temperature(_))
        ));
    }

    #[test]
    fn test_charge() {
        assert_eq!(validate_charge(&InputValue::Int(-2)).unwrap(), -2);
        assert_eq!(validate_charge(&InputValue::Int(i64::MAX)).unwrap(), i64::MAX);
        assert!(matches!(validate_charge(&1.5.into()), Err(AvAtomError::Charge(_))));
        assert!(matches!(validate_charge(&true.into()), Err(AvAtomError::Charge(_))));
        let err = validate_charge(&InputValue::Wide(-(1i128 << 80))).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
