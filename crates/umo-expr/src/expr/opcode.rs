//! Operator codes: operand checking, result typing and pure computation.
//!
//! Typing happens once, when a node is built. Computation happens on every
//! evaluation and only ever sees operands that passed the typing step, but it
//! still validates its inputs and never panics.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::expr::error::ExprError;
use crate::expr::value::{Value, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opcode {
    // ── Logical ─────────────────────────────────────────────
    Not,
    /// True when every operand is true.
    And,
    /// True when any operand is true.
    Or,
    /// True when an odd number of operands is true.
    Xor,

    // ── Arithmetic ──────────────────────────────────────────
    Add,
    Sub,
    Mul,
    /// Floor division on two Ints, true division otherwise.
    Div,
    FloorDiv,
    /// Modulo with the sign of the divisor.
    Mod,
    Min,
    Max,
    Sum,
    Prod,
    Pow,
    /// Logarithm of the first operand in the base given by the second.
    Logb,
    Neg,
    Pos,
    Abs,
    Square,
    /// `1 / x`, always Float.
    Inv,
    /// `n!` of a non-negative Int.
    Factorial,
    /// Power with an integer exponent fixed at construction.
    Powi(i32),

    // ── Comparison ──────────────────────────────────────────
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,

    // ── Transcendental ──────────────────────────────────────
    Exp,
    Log,
    Sqrt,
    Cos,
    Sin,
    Tan,
    Acos,
    Asin,
    Atan,
    Cosh,
    Sinh,
    Tanh,
    Acosh,
    Asinh,
    Atanh,

    // ── Rounding ────────────────────────────────────────────
    Floor,
    Ceil,
    Round,
    /// `1` for non-negative operands, `-1` otherwise.
    Sign,
    /// `x - floor(x)`, always Float.
    Frac,
}

/// Number of operands an opcode accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

// i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
const I64_LOWER_AS_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER_AS_F64: f64 = 9_223_372_036_854_775_808.0;

impl Opcode {
    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Not => "not",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::FloorDiv => "floordiv",
            Opcode::Mod => "mod",
            Opcode::Min => "min",
            Opcode::Max => "max",
            Opcode::Sum => "sum",
            Opcode::Prod => "prod",
            Opcode::Pow => "pow",
            Opcode::Logb => "logb",
            Opcode::Neg => "neg",
            Opcode::Pos => "pos",
            Opcode::Abs => "abs",
            Opcode::Square => "square",
            Opcode::Inv => "inv",
            Opcode::Factorial => "factorial",
            Opcode::Powi(_) => "powi",
            Opcode::Eq => "eq",
            Opcode::Ne => "ne",
            Opcode::Le => "le",
            Opcode::Ge => "ge",
            Opcode::Lt => "lt",
            Opcode::Gt => "gt",
            Opcode::Exp => "exp",
            Opcode::Log => "log",
            Opcode::Sqrt => "sqrt",
            Opcode::Cos => "cos",
            Opcode::Sin => "sin",
            Opcode::Tan => "tan",
            Opcode::Acos => "acos",
            Opcode::Asin => "asin",
            Opcode::Atan => "atan",
            Opcode::Cosh => "cosh",
            Opcode::Sinh => "sinh",
            Opcode::Tanh => "tanh",
            Opcode::Acosh => "acosh",
            Opcode::Asinh => "asinh",
            Opcode::Atanh => "atanh",
            Opcode::Floor => "floor",
            Opcode::Ceil => "ceil",
            Opcode::Round => "round",
            Opcode::Sign => "sign",
            Opcode::Frac => "frac",
        }
    }

    /// Infix spelling for operators that have one.
    pub fn infix_symbol(self) -> Option<&'static str> {
        match self {
            Opcode::And => Some("and"),
            Opcode::Or => Some("or"),
            Opcode::Xor => Some("xor"),
            Opcode::Add => Some("+"),
            Opcode::Sub => Some("-"),
            Opcode::Mul => Some("*"),
            Opcode::Div => Some("/"),
            Opcode::FloorDiv => Some("//"),
            Opcode::Mod => Some("%"),
            Opcode::Eq => Some("=="),
            Opcode::Ne => Some("!="),
            Opcode::Le => Some("<="),
            Opcode::Ge => Some(">="),
            Opcode::Lt => Some("<"),
            Opcode::Gt => Some(">"),
            _ => None,
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Min
            | Opcode::Max
            | Opcode::Sum
            | Opcode::Prod => Arity::AtLeast(2),
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::FloorDiv
            | Opcode::Mod
            | Opcode::Pow
            | Opcode::Logb
            | Opcode::Eq
            | Opcode::Ne
            | Opcode::Le
            | Opcode::Ge
            | Opcode::Lt
            | Opcode::Gt => Arity::Exactly(2),
            _ => Arity::Exactly(1),
        }
    }

    /// Whether the opcode takes any number of operands from two up.
    pub fn is_variadic(self) -> bool {
        matches!(self.arity(), Arity::AtLeast(_))
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Opcode::Eq | Opcode::Ne | Opcode::Le | Opcode::Ge | Opcode::Lt | Opcode::Gt
        )
    }

    pub fn is_transcendental(self) -> bool {
        matches!(
            self,
            Opcode::Exp
                | Opcode::Log
                | Opcode::Sqrt
                | Opcode::Cos
                | Opcode::Sin
                | Opcode::Tan
                | Opcode::Acos
                | Opcode::Asin
                | Opcode::Atan
                | Opcode::Cosh
                | Opcode::Sinh
                | Opcode::Tanh
                | Opcode::Acosh
                | Opcode::Asinh
                | Opcode::Atanh
        )
    }

    fn check_arity(self, got: usize) -> Result<(), ExprError> {
        let expected = self.arity();
        if expected.accepts(got) {
            Ok(())
        } else {
            Err(ExprError::InvalidOperandCount {
                op: self,
                expected,
                got,
            })
        }
    }

    /// Check operand kinds and derive the result kind.
    pub fn result_type(self, operands: &[ValueType]) -> Result<ValueType, ExprError> {
        self.check_arity(operands.len())?;
        let mismatch = || ExprError::InvalidOperandTypes {
            op: self,
            operands: operands.to_vec(),
        };
        let all_bool = operands.iter().all(|t| *t == ValueType::Bool);
        let all_numeric = operands.iter().all(|t| t.is_numeric());

        let result = match self {
            Opcode::Not | Opcode::And | Opcode::Or | Opcode::Xor => {
                all_bool.then_some(ValueType::Bool)
            }
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::FloorDiv
            | Opcode::Mod
            | Opcode::Min
            | Opcode::Max
            | Opcode::Sum
            | Opcode::Prod => all_numeric
                .then(|| operands.iter().copied().reduce(ValueType::promote))
                .flatten(),
            Opcode::Pow | Opcode::Logb | Opcode::Inv | Opcode::Frac => {
                all_numeric.then_some(ValueType::Float)
            }
            Opcode::Neg | Opcode::Pos | Opcode::Abs | Opcode::Square => {
                all_numeric.then_some(operands[0])
            }
            Opcode::Factorial => (operands[0] == ValueType::Int).then_some(ValueType::Int),
            Opcode::Powi(exponent) => all_numeric.then(|| {
                if operands[0] == ValueType::Int && exponent >= 0 {
                    ValueType::Int
                } else {
                    ValueType::Float
                }
            }),
            Opcode::Eq | Opcode::Ne | Opcode::Le | Opcode::Ge | Opcode::Lt | Opcode::Gt => {
                (all_bool || all_numeric).then_some(ValueType::Bool)
            }
            Opcode::Floor | Opcode::Ceil | Opcode::Round | Opcode::Sign => {
                all_numeric.then_some(ValueType::Int)
            }
            _ => (operands[0] == ValueType::Float).then_some(ValueType::Float),
        };
        result.ok_or_else(mismatch)
    }

    /// Apply the operator to concrete operand values.
    pub fn apply(self, args: &[Value]) -> Result<Value, ExprError> {
        self.check_arity(args.len())?;
        let result = match self {
            Opcode::Not | Opcode::And | Opcode::Or | Opcode::Xor => self.apply_logical(args)?,
            Opcode::Eq | Opcode::Ne | Opcode::Le | Opcode::Ge | Opcode::Lt | Opcode::Gt => {
                self.apply_comparison(args[0], args[1])?
            }
            Opcode::Min | Opcode::Max | Opcode::Sum | Opcode::Prod => {
                self.apply_variadic_numeric(args)?
            }
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::FloorDiv
            | Opcode::Mod
            | Opcode::Pow
            | Opcode::Logb => self.apply_binary_numeric(args[0], args[1])?,
            Opcode::Neg
            | Opcode::Pos
            | Opcode::Abs
            | Opcode::Square
            | Opcode::Inv
            | Opcode::Factorial
            | Opcode::Powi(_)
            | Opcode::Sign
            | Opcode::Frac => self.apply_unary_numeric(args[0])?,
            Opcode::Floor | Opcode::Ceil | Opcode::Round => self.apply_rounding(args[0])?,
            _ => self.apply_transcendental(args[0])?,
        };
        if result.is_nan() {
            return Err(ExprError::UndefinedResult { op: self });
        }
        Ok(result)
    }

    fn type_error(self, args: &[Value]) -> ExprError {
        ExprError::InvalidOperandTypes {
            op: self,
            operands: args.iter().map(Value::value_type).collect(),
        }
    }

    fn overflow(self) -> ExprError {
        ExprError::IntegerOverflow { op: self }
    }

    fn apply_logical(self, args: &[Value]) -> Result<Value, ExprError> {
        let bools = args
            .iter()
            .map(Value::as_bool)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.type_error(args))?;
        let value = match self {
            Opcode::Not => !bools[0],
            Opcode::And => bools.iter().all(|b| *b),
            Opcode::Or => bools.iter().any(|b| *b),
            _ => bools.iter().fold(false, |acc, b| acc ^ b),
        };
        Ok(Value::Bool(value))
    }

    fn apply_comparison(self, a: Value, b: Value) -> Result<Value, ExprError> {
        let ordering = match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.partial_cmp(&y),
            (Value::Int(x), Value::Int(y)) => x.partial_cmp(&y),
            (Value::Int(x), Value::Float(y)) => cmp_int_float(x, y),
            (Value::Float(x), Value::Int(y)) => cmp_int_float(y, x).map(Ordering::reverse),
            (Value::Float(x), Value::Float(y)) => x.partial_cmp(&y),
            _ => return Err(self.type_error(&[a, b])),
        };
        let ordering = ordering.ok_or(ExprError::UndefinedResult { op: self })?;
        let value = match self {
            Opcode::Eq => ordering.is_eq(),
            Opcode::Ne => ordering.is_ne(),
            Opcode::Le => ordering.is_le(),
            Opcode::Ge => ordering.is_ge(),
            Opcode::Lt => ordering.is_lt(),
            _ => ordering.is_gt(),
        };
        Ok(Value::Bool(value))
    }

    /// Left fold over every operand; Int only when all operands are Int.
    fn apply_variadic_numeric(self, args: &[Value]) -> Result<Value, ExprError> {
        let Some((first, rest)) = args.split_first() else {
            return Err(self.type_error(args));
        };
        if args.iter().any(|arg| arg.value_type() == ValueType::Bool) {
            return Err(self.type_error(args));
        }
        if let (Value::Int(first), Some(rest)) = (
            first,
            rest.iter().map(Value::as_int).collect::<Option<Vec<_>>>(),
        ) {
            return rest
                .into_iter()
                .try_fold(*first, |acc, x| self.int_binary(acc, x))
                .map(Value::Int);
        }
        rest.iter()
            .try_fold(first.as_f64(), |acc, x| self.float_binary(acc, x.as_f64()))
            .map(Value::Float)
    }

    fn apply_binary_numeric(self, a: Value, b: Value) -> Result<Value, ExprError> {
        match (a, b) {
            (Value::Bool(_), _) | (_, Value::Bool(_)) => Err(self.type_error(&[a, b])),
            (Value::Int(x), Value::Int(y)) if !matches!(self, Opcode::Pow | Opcode::Logb) => {
                self.int_binary(x, y).map(Value::Int)
            }
            _ => self.float_binary(a.as_f64(), b.as_f64()).map(Value::Float),
        }
    }

    fn int_binary(self, x: i64, y: i64) -> Result<i64, ExprError> {
        match self {
            Opcode::Add | Opcode::Sum => x.checked_add(y).ok_or_else(|| self.overflow()),
            Opcode::Sub => x.checked_sub(y).ok_or_else(|| self.overflow()),
            Opcode::Mul | Opcode::Prod => x.checked_mul(y).ok_or_else(|| self.overflow()),
            Opcode::Div | Opcode::FloorDiv => floor_div_i64(self, x, y),
            Opcode::Mod => floor_mod_i64(self, x, y),
            Opcode::Min => Ok(x.min(y)),
            Opcode::Max => Ok(x.max(y)),
            _ => Err(self.type_error(&[Value::Int(x), Value::Int(y)])),
        }
    }

    fn float_binary(self, x: f64, y: f64) -> Result<f64, ExprError> {
        let value = match self {
            Opcode::Add | Opcode::Sum => x + y,
            Opcode::Sub => x - y,
            Opcode::Mul | Opcode::Prod => x * y,
            Opcode::Div => {
                if y == 0.0 {
                    return Err(ExprError::DivisionByZero { op: self });
                }
                x / y
            }
            Opcode::FloorDiv => floor_div_mod_f64(self, x, y)?.0,
            Opcode::Mod => floor_div_mod_f64(self, x, y)?.1,
            Opcode::Min => x.min(y),
            Opcode::Max => x.max(y),
            Opcode::Pow => {
                if x == 0.0 && y < 0.0 {
                    return Err(ExprError::DivisionByZero { op: self });
                }
                x.powf(y)
            }
            Opcode::Logb => {
                let base = y.ln();
                if base == 0.0 {
                    return Err(ExprError::DivisionByZero { op: self });
                }
                x.ln() / base
            }
            _ => return Err(self.type_error(&[Value::Float(x), Value::Float(y)])),
        };
        Ok(value)
    }

    fn apply_unary_numeric(self, a: Value) -> Result<Value, ExprError> {
        match a {
            Value::Bool(_) => Err(self.type_error(&[a])),
            Value::Int(x) => match self {
                Opcode::Neg => x.checked_neg().map(Value::Int).ok_or_else(|| self.overflow()),
                Opcode::Pos => Ok(Value::Int(x)),
                Opcode::Abs => x.checked_abs().map(Value::Int).ok_or_else(|| self.overflow()),
                Opcode::Square => x.checked_mul(x).map(Value::Int).ok_or_else(|| self.overflow()),
                Opcode::Powi(exponent) if exponent >= 0 => x
                    .checked_pow(exponent.unsigned_abs())
                    .map(Value::Int)
                    .ok_or_else(|| self.overflow()),
                Opcode::Factorial => factorial_i64(self, x).map(Value::Int),
                Opcode::Sign => Ok(Value::Int(if x >= 0 { 1 } else { -1 })),
                _ => self.float_unary(x as f64).map(Value::Float),
            },
            Value::Float(x) => match self {
                Opcode::Sign => Ok(Value::Int(if x >= 0.0 { 1 } else { -1 })),
                _ => self.float_unary(x).map(Value::Float),
            },
        }
    }

    fn float_unary(self, x: f64) -> Result<f64, ExprError> {
        let value = match self {
            Opcode::Neg => -x,
            Opcode::Pos => x,
            Opcode::Abs => x.abs(),
            Opcode::Square => x * x,
            Opcode::Frac => x - x.floor(),
            Opcode::Inv => {
                if x == 0.0 {
                    return Err(ExprError::DivisionByZero { op: self });
                }
                1.0 / x
            }
            Opcode::Powi(exponent) => {
                if x == 0.0 && exponent < 0 {
                    return Err(ExprError::DivisionByZero { op: self });
                }
                x.powi(exponent)
            }
            _ => return Err(self.type_error(&[Value::Float(x)])),
        };
        Ok(value)
    }

    fn apply_rounding(self, a: Value) -> Result<Value, ExprError> {
        let x = match a {
            Value::Bool(_) => return Err(self.type_error(&[a])),
            Value::Int(x) => return Ok(Value::Int(x)),
            Value::Float(x) => x,
        };
        let rounded = match self {
            Opcode::Floor => x.floor(),
            Opcode::Ceil => x.ceil(),
            _ => x.round(),
        };
        if !(I64_LOWER_AS_F64..I64_UPPER_AS_F64).contains(&rounded) {
            return Err(self.overflow());
        }
        Ok(Value::Int(rounded as i64))
    }

    fn apply_transcendental(self, a: Value) -> Result<Value, ExprError> {
        let Value::Float(x) = a else {
            return Err(self.type_error(&[a]));
        };
        let value = match self {
            Opcode::Exp => x.exp(),
            Opcode::Log => x.ln(),
            Opcode::Sqrt => x.sqrt(),
            Opcode::Cos => x.cos(),
            Opcode::Sin => x.sin(),
            Opcode::Tan => x.tan(),
            Opcode::Acos => x.acos(),
            Opcode::Asin => x.asin(),
            Opcode::Atan => x.atan(),
            Opcode::Cosh => x.cosh(),
            Opcode::Sinh => x.sinh(),
            Opcode::Tanh => x.tanh(),
            Opcode::Acosh => x.acosh(),
            Opcode::Asinh => x.asinh(),
            Opcode::Atanh => x.atanh(),
            _ => return Err(self.type_error(&[a])),
        };
        Ok(Value::Float(value))
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exact ordering of an Int against a Float, without rounding the Int.
fn cmp_int_float(int: i64, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float >= I64_UPPER_AS_F64 {
        return Some(Ordering::Less);
    }
    if float < I64_LOWER_AS_F64 {
        return Some(Ordering::Greater);
    }
    // In range and integral, so the cast is exact.
    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        ordering => Some(ordering),
    }
}

fn factorial_i64(op: Opcode, n: i64) -> Result<i64, ExprError> {
    if n < 0 {
        return Err(ExprError::UndefinedResult { op });
    }
    (2..=n)
        .try_fold(1_i64, |acc, k| acc.checked_mul(k))
        .ok_or(ExprError::IntegerOverflow { op })
}

/// Quotient rounded toward negative infinity.
fn floor_div_i64(op: Opcode, x: i64, y: i64) -> Result<i64, ExprError> {
    if y == 0 {
        return Err(ExprError::DivisionByZero { op });
    }
    let quotient = x
        .checked_div(y)
        .ok_or(ExprError::IntegerOverflow { op })?;
    let remainder = x.wrapping_rem(y);
    if remainder != 0 && ((remainder < 0) != (y < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

/// Remainder carrying the sign of the divisor.
fn floor_mod_i64(op: Opcode, x: i64, y: i64) -> Result<i64, ExprError> {
    if y == 0 {
        return Err(ExprError::DivisionByZero { op });
    }
    let remainder = x.wrapping_rem(y);
    if remainder != 0 && ((remainder < 0) != (y < 0)) {
        Ok(remainder + y)
    } else {
        Ok(remainder)
    }
}

/// Floor quotient and divisor-signed remainder of two floats.
///
/// The quotient is derived from the remainder so that `q * y + r == x` holds
/// as closely as float rounding allows.
fn floor_div_mod_f64(op: Opcode, x: f64, y: f64) -> Result<(f64, f64), ExprError> {
    if y == 0.0 {
        return Err(ExprError::DivisionByZero { op });
    }
    let mut remainder = x % y;
    let mut quotient = (x - remainder) / y;
    if remainder != 0.0 {
        if (y < 0.0) != (remainder < 0.0) {
            remainder += y;
            quotient -= 1.0;
        }
    } else {
        remainder = 0.0_f64.copysign(y);
    }
    let floored = if quotient != 0.0 {
        let mut floored = quotient.floor();
        if quotient - floored > 0.5 {
            floored += 1.0;
        }
        floored
    } else {
        0.0_f64.copysign(x / y)
    };
    Ok((floored, remainder))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{Arity, Opcode};
    use crate::expr::{ErrorKind, ExprError, Value, ValueType};

    use ValueType::{Bool, Float, Int};

    fn int(op: Opcode, a: i64, b: i64) -> Result<Value, ExprError> {
        op.apply(&[Value::Int(a), Value::Int(b)])
    }

    fn float(op: Opcode, a: f64, b: f64) -> Value {
        op.apply(&[Value::Float(a), Value::Float(b)])
            .expect("float op should succeed")
    }

    #[test]
    fn arithmetic_result_types() {
        assert_eq!(Opcode::Add.result_type(&[Int, Int]), Ok(Int));
        assert_eq!(Opcode::Add.result_type(&[Int, Float]), Ok(Float));
        assert_eq!(Opcode::Div.result_type(&[Int, Int]), Ok(Int));
        assert_eq!(Opcode::Div.result_type(&[Float, Int]), Ok(Float));
        assert_eq!(Opcode::Mod.result_type(&[Float, Float]), Ok(Float));
        assert_eq!(Opcode::Pow.result_type(&[Int, Int]), Ok(Float));
        assert_eq!(Opcode::Abs.result_type(&[Int]), Ok(Int));
        assert_eq!(Opcode::Neg.result_type(&[Float]), Ok(Float));
    }

    #[test]
    fn arithmetic_rejects_bool() {
        let err = Opcode::Add.result_type(&[Bool, Int]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(Opcode::Neg.result_type(&[Bool]).is_err());
        assert!(Opcode::Floor.result_type(&[Bool]).is_err());
    }

    #[test]
    fn powi_promotes_negative_exponent() {
        assert_eq!(Opcode::Powi(3).result_type(&[Int]), Ok(Int));
        assert_eq!(Opcode::Powi(0).result_type(&[Int]), Ok(Int));
        assert_eq!(Opcode::Powi(-1).result_type(&[Int]), Ok(Float));
        assert_eq!(Opcode::Powi(2).result_type(&[Float]), Ok(Float));

        assert_eq!(Opcode::Powi(3).apply(&[Value::Int(-2)]), Ok(Value::Int(-8)));
        assert_eq!(
            Opcode::Powi(-2).apply(&[Value::Int(2)]),
            Ok(Value::Float(0.25))
        );
    }

    #[test]
    fn logical_requires_bool() {
        assert_eq!(Opcode::And.result_type(&[Bool, Bool]), Ok(Bool));
        assert_eq!(
            Opcode::And.result_type(&[Float, Float]),
            Err(ExprError::InvalidOperandTypes {
                op: Opcode::And,
                operands: vec![Float, Float],
            })
        );
        assert!(Opcode::Not.result_type(&[Int]).is_err());
    }

    #[test]
    fn comparison_requires_matching_families() {
        assert_eq!(Opcode::Le.result_type(&[Int, Float]), Ok(Bool));
        assert_eq!(Opcode::Eq.result_type(&[Bool, Bool]), Ok(Bool));
        assert!(Opcode::Eq.result_type(&[Bool, Int]).is_err());
    }

    #[test]
    fn transcendental_requires_float() {
        assert_eq!(Opcode::Cos.result_type(&[Float]), Ok(Float));
        assert!(Opcode::Cos.result_type(&[Int]).is_err());
        assert!(Opcode::Exp.result_type(&[Bool]).is_err());
    }

    #[test]
    fn arity_is_checked() {
        assert_eq!(
            Opcode::Add.result_type(&[Int]),
            Err(ExprError::InvalidOperandCount {
                op: Opcode::Add,
                expected: Arity::Exactly(2),
                got: 1,
            })
        );
        assert!(Opcode::Neg.apply(&[Value::Int(1), Value::Int(2)]).is_err());
        assert_eq!(
            Opcode::Sum.result_type(&[Int]),
            Err(ExprError::InvalidOperandCount {
                op: Opcode::Sum,
                expected: Arity::AtLeast(2),
                got: 1,
            })
        );
        assert!(Opcode::Add.result_type(&[Int, Int, Int]).is_err());
        assert!(Opcode::Max.is_variadic());
        assert!(!Opcode::Logb.is_variadic());
    }

    #[test]
    fn integer_floor_division_and_modulo() {
        assert_eq!(int(Opcode::FloorDiv, -7, 2), Ok(Value::Int(-4)));
        assert_eq!(int(Opcode::Div, -7, 2), Ok(Value::Int(-4)));
        assert_eq!(int(Opcode::FloorDiv, 7, -2), Ok(Value::Int(-4)));
        assert_eq!(int(Opcode::FloorDiv, 7, 2), Ok(Value::Int(3)));
        assert_eq!(int(Opcode::Mod, -7, 2), Ok(Value::Int(1)));
        assert_eq!(int(Opcode::Mod, 7, -2), Ok(Value::Int(-1)));
        assert_eq!(int(Opcode::Mod, -6, 3), Ok(Value::Int(0)));
    }

    #[test]
    fn integer_division_identity_holds() {
        for a in -25_i64..=25 {
            for b in (-6_i64..=6).filter(|b| *b != 0) {
                let q = int(Opcode::FloorDiv, a, b).unwrap().as_int().unwrap();
                let r = int(Opcode::Mod, a, b).unwrap().as_int().unwrap();
                assert_eq!(q, (a as f64 / b as f64).floor() as i64, "{a} // {b}");
                assert!(r == 0 || (r < 0) == (b < 0), "{a} % {b} = {r}");
                assert_eq!(q * b + r, a, "{a}, {b}");
            }
        }
    }

    #[test]
    fn division_by_zero_is_arithmetic_error() {
        assert_eq!(
            int(Opcode::Div, 1, 0),
            Err(ExprError::DivisionByZero { op: Opcode::Div })
        );
        assert_eq!(
            int(Opcode::Mod, 1, 0),
            Err(ExprError::DivisionByZero { op: Opcode::Mod })
        );
        let err = Opcode::Div
            .apply(&[Value::Float(1.0), Value::Int(0)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arithmetic);
    }

    #[test]
    fn float_division_is_true_division() {
        assert_eq!(float(Opcode::Div, 7.0, 2.0), Value::Float(3.5));
        assert_eq!(
            Opcode::Div.apply(&[Value::Int(7), Value::Float(2.0)]),
            Ok(Value::Float(3.5))
        );
        assert_eq!(float(Opcode::FloorDiv, -7.5, 2.0), Value::Float(-4.0));
        assert_eq!(float(Opcode::Mod, -7.5, 2.0), Value::Float(0.5));
        assert_eq!(float(Opcode::Mod, 7.5, -2.0), Value::Float(-0.5));
    }

    #[test]
    fn integer_overflow_is_reported() {
        assert_eq!(
            int(Opcode::Add, i64::MAX, 1),
            Err(ExprError::IntegerOverflow { op: Opcode::Add })
        );
        assert_eq!(
            int(Opcode::FloorDiv, i64::MIN, -1),
            Err(ExprError::IntegerOverflow {
                op: Opcode::FloorDiv
            })
        );
        assert_eq!(int(Opcode::Mod, i64::MIN, -1), Ok(Value::Int(0)));
        assert!(Opcode::Abs.apply(&[Value::Int(i64::MIN)]).is_err());
    }

    #[test]
    fn nan_results_are_rejected() {
        assert_eq!(
            Opcode::Sqrt.apply(&[Value::Float(-1.0)]),
            Err(ExprError::UndefinedResult { op: Opcode::Sqrt })
        );
        assert!(Opcode::Cos.apply(&[Value::Float(f64::INFINITY)]).is_err());
        assert!(
            Opcode::Sub
                .apply(&[Value::Float(f64::INFINITY), Value::Float(f64::INFINITY)])
                .is_err()
        );
    }

    #[test]
    fn transcendental_values() {
        assert_eq!(Opcode::Exp.apply(&[Value::Float(0.0)]), Ok(Value::Float(1.0)));
        assert_eq!(Opcode::Cos.apply(&[Value::Float(0.0)]), Ok(Value::Float(1.0)));
        let atan = Opcode::Atan.apply(&[Value::Float(1.0)]).unwrap().as_f64();
        assert!((atan - std::f64::consts::FRAC_PI_4).abs() < 1e-15);
        assert!(Opcode::Exp.apply(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(
            Opcode::Le.apply(&[Value::Int(3), Value::Float(3.0)]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            Opcode::Lt.apply(&[Value::Bool(false), Value::Bool(true)]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            Opcode::Xor.apply(&[Value::Bool(true), Value::Bool(true)]),
            Ok(Value::Bool(false))
        );
        assert_eq!(Opcode::Not.apply(&[Value::Bool(false)]), Ok(Value::Bool(true)));
        assert!(
            Opcode::Eq
                .apply(&[Value::Bool(true), Value::Int(1)])
                .is_err()
        );
    }

    #[test]
    fn rounding_produces_int() {
        assert_eq!(Opcode::Floor.apply(&[Value::Float(-1.5)]), Ok(Value::Int(-2)));
        assert_eq!(Opcode::Ceil.apply(&[Value::Float(-1.5)]), Ok(Value::Int(-1)));
        assert_eq!(Opcode::Round.apply(&[Value::Float(2.5)]), Ok(Value::Int(3)));
        assert_eq!(Opcode::Round.apply(&[Value::Int(4)]), Ok(Value::Int(4)));
        assert!(Opcode::Floor.apply(&[Value::Float(1e300)]).is_err());
    }

    #[test]
    fn min_max_keep_int() {
        assert_eq!(int(Opcode::Min, 3, -2), Ok(Value::Int(-2)));
        assert_eq!(
            Opcode::Max.apply(&[Value::Int(3), Value::Float(3.5)]),
            Ok(Value::Float(3.5))
        );
    }

    #[test]
    fn pow_rejects_zero_to_negative() {
        assert_eq!(
            Opcode::Pow.apply(&[Value::Int(2), Value::Int(3)]),
            Ok(Value::Float(8.0))
        );
        assert!(Opcode::Pow.apply(&[Value::Float(0.0), Value::Float(-1.0)]).is_err());
        assert!(Opcode::Powi(-1).apply(&[Value::Int(0)]).is_err());
    }

    #[test]
    fn variadic_result_types_promote_over_all_operands() {
        assert_eq!(Opcode::Sum.result_type(&[Int, Int, Int, Int]), Ok(Int));
        assert_eq!(Opcode::Prod.result_type(&[Int, Int, Float]), Ok(Float));
        assert_eq!(Opcode::Min.result_type(&[Float, Int, Int]), Ok(Float));
        assert_eq!(Opcode::Or.result_type(&[Bool, Bool, Bool]), Ok(Bool));
        assert!(Opcode::Sum.result_type(&[Int, Bool, Int]).is_err());
        assert!(Opcode::And.result_type(&[Bool, Bool, Int]).is_err());
    }

    #[test]
    fn variadic_arithmetic() {
        let ints = [Value::Int(4), Value::Int(-2), Value::Int(7)];
        assert_eq!(Opcode::Sum.apply(&ints), Ok(Value::Int(9)));
        assert_eq!(Opcode::Prod.apply(&ints), Ok(Value::Int(-56)));
        assert_eq!(Opcode::Min.apply(&ints), Ok(Value::Int(-2)));
        assert_eq!(Opcode::Max.apply(&ints), Ok(Value::Int(7)));

        let mixed = [Value::Int(1), Value::Float(0.5), Value::Int(2)];
        assert_eq!(Opcode::Sum.apply(&mixed), Ok(Value::Float(3.5)));
        assert_eq!(Opcode::Prod.apply(&mixed), Ok(Value::Float(1.0)));
        assert_eq!(Opcode::Min.apply(&mixed), Ok(Value::Float(0.5)));

        assert_eq!(
            Opcode::Prod.apply(&[Value::Int(i64::MAX), Value::Int(1), Value::Int(2)]),
            Err(ExprError::IntegerOverflow { op: Opcode::Prod })
        );
        assert!(
            Opcode::Sum
                .apply(&[Value::Int(1), Value::Bool(true)])
                .is_err()
        );
    }

    #[test]
    fn variadic_logic() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(Opcode::And.apply(&[t, t, t]), Ok(t));
        assert_eq!(Opcode::And.apply(&[t, f, t]), Ok(f));
        assert_eq!(Opcode::Or.apply(&[f, f, t]), Ok(t));
        assert_eq!(Opcode::Or.apply(&[f, f, f]), Ok(f));
        assert_eq!(Opcode::Xor.apply(&[t, t, t]), Ok(t));
        assert_eq!(Opcode::Xor.apply(&[t, f, t, f]), Ok(f));
    }

    #[test]
    fn sign_and_frac() {
        assert_eq!(Opcode::Sign.result_type(&[Float]), Ok(Int));
        assert_eq!(Opcode::Frac.result_type(&[Int]), Ok(Float));
        assert_eq!(Opcode::Sign.apply(&[Value::Float(-0.25)]), Ok(Value::Int(-1)));
        assert_eq!(Opcode::Sign.apply(&[Value::Float(0.0)]), Ok(Value::Int(1)));
        assert_eq!(Opcode::Sign.apply(&[Value::Int(-3)]), Ok(Value::Int(-1)));
        assert_eq!(Opcode::Frac.apply(&[Value::Float(2.75)]), Ok(Value::Float(0.75)));
        assert_eq!(Opcode::Frac.apply(&[Value::Float(-1.25)]), Ok(Value::Float(0.75)));
        assert_eq!(Opcode::Frac.apply(&[Value::Int(5)]), Ok(Value::Float(0.0)));
        assert!(Opcode::Sign.result_type(&[Bool]).is_err());
    }

    #[test]
    fn inverse_is_float_and_rejects_zero() {
        assert_eq!(Opcode::Inv.result_type(&[Int]), Ok(Float));
        assert_eq!(Opcode::Inv.apply(&[Value::Int(4)]), Ok(Value::Float(0.25)));
        assert_eq!(Opcode::Inv.apply(&[Value::Float(-0.5)]), Ok(Value::Float(-2.0)));
        assert_eq!(
            Opcode::Inv.apply(&[Value::Float(0.0)]),
            Err(ExprError::DivisionByZero { op: Opcode::Inv })
        );
    }

    #[test]
    fn factorial_of_int() {
        assert_eq!(Opcode::Factorial.result_type(&[Int]), Ok(Int));
        assert!(Opcode::Factorial.result_type(&[Float]).is_err());
        assert_eq!(Opcode::Factorial.apply(&[Value::Int(0)]), Ok(Value::Int(1)));
        assert_eq!(Opcode::Factorial.apply(&[Value::Int(5)]), Ok(Value::Int(120)));
        assert_eq!(
            Opcode::Factorial.apply(&[Value::Int(20)]),
            Ok(Value::Int(2_432_902_008_176_640_000))
        );
        assert_eq!(
            Opcode::Factorial.apply(&[Value::Int(21)]),
            Err(ExprError::IntegerOverflow {
                op: Opcode::Factorial
            })
        );
        assert_eq!(
            Opcode::Factorial.apply(&[Value::Int(-1)]),
            Err(ExprError::UndefinedResult {
                op: Opcode::Factorial
            })
        );
    }

    #[test]
    fn logarithm_in_given_base() {
        assert_eq!(Opcode::Logb.result_type(&[Int, Int]), Ok(Float));
        let log2 = Opcode::Logb
            .apply(&[Value::Int(8), Value::Int(2)])
            .unwrap()
            .as_f64();
        assert!((log2 - 3.0).abs() < 1e-12);
        assert_eq!(
            Opcode::Logb.apply(&[Value::Float(5.0), Value::Float(1.0)]),
            Err(ExprError::DivisionByZero { op: Opcode::Logb })
        );
        assert_eq!(
            Opcode::Logb.apply(&[Value::Float(-1.0), Value::Float(2.0)]),
            Err(ExprError::UndefinedResult { op: Opcode::Logb })
        );
    }

    #[test]
    fn inverse_hyperbolic_functions() {
        assert_eq!(Opcode::Acosh.apply(&[Value::Float(1.0)]), Ok(Value::Float(0.0)));
        assert_eq!(Opcode::Atanh.apply(&[Value::Float(0.0)]), Ok(Value::Float(0.0)));
        assert!(Opcode::Acosh.apply(&[Value::Float(0.5)]).is_err());
        assert!(Opcode::Atanh.result_type(&[Int]).is_err());
        assert!(Opcode::Acosh.is_transcendental());
    }

    #[test]
    fn int_float_comparison_is_exact() {
        let big = 9_007_199_254_740_993_i64; // 2^53 + 1
        let rounded = Value::Float(9_007_199_254_740_992.0);
        assert_eq!(
            Opcode::Eq.apply(&[Value::Int(big), rounded]),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            Opcode::Gt.apply(&[Value::Int(big), rounded]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            Opcode::Lt.apply(&[rounded, Value::Int(big)]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            Opcode::Lt.apply(&[Value::Int(-3), Value::Float(-2.5)]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            Opcode::Gt.apply(&[Value::Int(-2), Value::Float(-2.5)]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            Opcode::Lt.apply(&[Value::Int(i64::MAX), Value::Float(f64::INFINITY)]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            Opcode::Ge.apply(&[Value::Int(i64::MIN), Value::Float(-9.3e18)]),
            Ok(Value::Bool(true))
        );
    }
}
