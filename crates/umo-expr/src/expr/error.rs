//! Expression construction and evaluation errors.

use crate::expr::opcode::{Arity, Opcode};
use crate::expr::value::ValueType;

/// Failure class shared by every error the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operand or value kind incompatible with the operation.
    Type,
    /// Value outside a declared domain, or NaN.
    Domain,
    /// Division by zero, overflow or undefined result during evaluation.
    Arithmetic,
    /// Lookup of an unset key.
    Key,
    /// Internal structure violated.
    Consistency,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Type => "type",
            ErrorKind::Domain => "domain",
            ErrorKind::Arithmetic => "arithmetic",
            ErrorKind::Key => "key",
            ErrorKind::Consistency => "consistency",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Operator applied to the wrong number of operands.
    InvalidOperandCount {
        op: Opcode,
        expected: Arity,
        got: usize,
    },
    /// Operand kinds not accepted by the operator.
    InvalidOperandTypes { op: Opcode, operands: Vec<ValueType> },
    /// NaN float value.
    NotANumber,
    /// Division or modulo by zero.
    DivisionByZero { op: Opcode },
    /// Integer result does not fit in 64 bits.
    IntegerOverflow { op: Opcode },
    /// Float computation produced NaN.
    UndefinedResult { op: Opcode },
}

impl ExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExprError::InvalidOperandCount { .. } => "EXPR_INVALID_OPERAND_COUNT",
            ExprError::InvalidOperandTypes { .. } => "EXPR_INVALID_OPERAND_TYPES",
            ExprError::NotANumber => "VALUE_NAN",
            ExprError::DivisionByZero { .. } => "EVAL_DIVISION_BY_ZERO",
            ExprError::IntegerOverflow { .. } => "EVAL_INTEGER_OVERFLOW",
            ExprError::UndefinedResult { .. } => "EVAL_UNDEFINED_RESULT",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ExprError::InvalidOperandCount { .. } | ExprError::InvalidOperandTypes { .. } => {
                ErrorKind::Type
            }
            ExprError::NotANumber => ErrorKind::Domain,
            ExprError::DivisionByZero { .. }
            | ExprError::IntegerOverflow { .. }
            | ExprError::UndefinedResult { .. } => ErrorKind::Arithmetic,
        }
    }
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::InvalidOperandCount { op, expected, got } => write!(
                f,
                "[{}] Operator '{}' expects {} operand(s), got {}",
                self.code(),
                op,
                expected,
                got
            ),
            ExprError::InvalidOperandTypes { op, operands } => {
                let kinds = operands
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "[{}] Operator '{}' does not accept operands ({})",
                    self.code(),
                    op,
                    kinds
                )
            }
            ExprError::NotANumber => {
                write!(f, "[{}] Float values cannot be NaN", self.code())
            }
            ExprError::DivisionByZero { op } => {
                write!(f, "[{}] Division by zero in '{}'", self.code(), op)
            }
            ExprError::IntegerOverflow { op } => {
                write!(f, "[{}] Integer overflow in '{}'", self.code(), op)
            }
            ExprError::UndefinedResult { op } => write!(
                f,
                "[{}] Operator '{}' is undefined for the current operands",
                self.code(),
                op
            ),
        }
    }
}

impl std::error::Error for ExprError {}
