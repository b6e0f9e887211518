//! Tagged scalar values.

use serde::{Deserialize, Serialize};

use crate::expr::error::ExprError;

/// Static kind of a node or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Float,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
        }
    }

    /// Int or Float.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }

    /// Result kind of a numeric operation mixing `self` and `other`.
    pub fn promote(self, other: ValueType) -> ValueType {
        if self == ValueType::Float || other == ValueType::Float {
            ValueType::Float
        } else {
            ValueType::Int
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scalar flowing through evaluation.
///
/// Float payloads are never NaN: build them through [`Value::float`] or
/// `TryFrom<f64>`, which reject NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Checked Float constructor.
    pub fn float(value: f64) -> Result<Self, ExprError> {
        if value.is_nan() {
            Err(ExprError::NotANumber)
        } else {
            Ok(Value::Float(value))
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value. Bools map to 0.0 / 1.0.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int(i) => *i as f64,
            Value::Float(x) => *x,
        }
    }

    /// True when this value carries a NaN float (never produced by checked constructors).
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(x) if x.is_nan())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// Conversion of host scalars into checked values.
///
/// This is the single entry point through which constants and assignments
/// enter a model, so NaN is rejected here even for a hand-built `Value::Float`.
pub trait IntoValue {
    fn into_value(self) -> Result<Value, ExprError>;
}

impl IntoValue for Value {
    fn into_value(self) -> Result<Value, ExprError> {
        if self.is_nan() {
            Err(ExprError::NotANumber)
        } else {
            Ok(self)
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Result<Value, ExprError> {
        Ok(Value::Bool(self))
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Result<Value, ExprError> {
        Ok(Value::Int(i64::from(self)))
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Result<Value, ExprError> {
        Ok(Value::Int(self))
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Result<Value, ExprError> {
        Ok(Value::Int(i64::from(self)))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Result<Value, ExprError> {
        Value::float(self)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl TryFrom<f64> for Value {
    type Error = ExprError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Value::float(value)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{IntoValue, Value, ValueType};
    use crate::expr::ExprError;

    #[test]
    fn float_rejects_nan() {
        assert_eq!(Value::float(f64::NAN), Err(ExprError::NotANumber));
        assert_eq!(Value::try_from(f64::NAN), Err(ExprError::NotANumber));
        assert_eq!(Value::float(f64::INFINITY), Ok(Value::Float(f64::INFINITY)));
    }

    #[test]
    fn into_value_checks_hand_built_floats() {
        assert_eq!(Value::Float(f64::NAN).into_value(), Err(ExprError::NotANumber));
        assert_eq!(1.5_f64.into_value(), Ok(Value::Float(1.5)));
        assert_eq!(7_i32.into_value(), Ok(Value::Int(7)));
        assert_eq!(u32::MAX.into_value(), Ok(Value::Int(4_294_967_295)));
        assert_eq!(true.into_value(), Ok(Value::Bool(true)));
    }

    #[test]
    fn value_type_follows_payload() {
        assert_eq!(Value::from(true).value_type(), ValueType::Bool);
        assert_eq!(Value::from(3).value_type(), ValueType::Int);
        assert_eq!(Value::from(3_i64).value_type(), ValueType::Int);
        assert_eq!(Value::Float(0.5).value_type(), ValueType::Float);
    }

    #[test]
    fn promote_prefers_float() {
        assert_eq!(ValueType::Int.promote(ValueType::Int), ValueType::Int);
        assert_eq!(ValueType::Int.promote(ValueType::Float), ValueType::Float);
        assert_eq!(ValueType::Float.promote(ValueType::Int), ValueType::Float);
    }

    #[test]
    fn numeric_view() {
        assert_eq!(Value::Bool(true).as_f64(), 1.0);
        assert_eq!(Value::Int(-4).as_f64(), -4.0);
        assert_eq!(Value::Int(2).as_int(), Some(2));
        assert_eq!(Value::Float(2.0).as_int(), None);
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
    }

    #[test]
    fn display_keeps_float_marker() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Int(2).to_string(), "2");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_string(&Value::Int(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&ValueType::Float).unwrap(),
            "\"float\""
        );
    }
}
