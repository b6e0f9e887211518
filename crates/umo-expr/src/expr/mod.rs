//! Expression building blocks shared by every model.
//!
//! - `value`: Value and ValueType, the tagged scalars flowing through evaluation
//! - `opcode`: operand checking, result typing and pure computation
//! - `error`: expression construction and evaluation errors

pub mod error;
pub mod opcode;
pub mod value;

pub use error::{ErrorKind, ExprError};
pub use opcode::{Arity, Opcode};
pub use value::{IntoValue, Value, ValueType};
