//! Typed scalar values, operator codes and expression errors.

pub mod expr;
pub mod ids;

pub use expr::{Arity, ErrorKind, ExprError, IntoValue, Opcode, Value, ValueType};
pub use ids::{ConstraintId, ExprId};
