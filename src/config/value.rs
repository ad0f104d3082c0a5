//! Loosely-typed scalar read from the YAML input
//!
//! Physical inputs are deserialized without committing to a Rust type, so a
//! wrong YAML type ends up as the matching validation error instead of a
//! generic parse failure.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    Bool(bool),
    Int(i64),
    /// Integer outside the i64 range; values beyond i128 saturate.
    Wide(i128),
    Float(f64),
    Text(String),
}

struct InputValueVisitor;

impl<'de> Visitor<'de> for InputValueVisitor {
    type Value = InputValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean, number or string")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<InputValue, E> {
        Ok(InputValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<InputValue, E> {
        Ok(InputValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<InputValue, E> {
        Ok(i64::try_from(v).map_or(InputValue::Wide(v as i128), InputValue::Int))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<InputValue, E> {
        Ok(i64::try_from(v).map_or(InputValue::Wide(v), InputValue::Int))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<InputValue, E> {
        let wide = i128::try_from(v).unwrap_or(i128::MAX);
        self.visit_i128(wide)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<InputValue, E> {
        Ok(InputValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<InputValue, E> {
        Ok(InputValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<InputValue, E> {
        Ok(InputValue::Text(v))
    }
}

impl<'de> Deserialize<'de> for InputValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(InputValueVisitor)
    }
}

impl InputValue {
    /// Numeric value; integers are accepted where a real number is expected.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            InputValue::Int(i) => Some(*i as f64),
            InputValue::Wide(i) => Some(*i as f64),
            InputValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, InputValue::Int(_) | InputValue::Wide(_))
    }

    /// Integer value; floats are never truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            InputValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InputValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            InputValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Bool(b) => write!(f, "{b}"),
            InputValue::Int(i) => write!(f, "{i}"),
            InputValue::Wide(i) => write!(f, "{i}"),
            InputValue::Float(x) => write!(f, "{x}"),
            InputValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Float(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Int(value)
    }
}

impl From<i32> for InputValue {
    fn from(value: i32) -> Self {
        InputValue::Int(value as i64)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Bool(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}
