//! UMO core: typed expression graphs with cached evaluation and constraint status.

pub mod handle;
pub mod logging;
pub mod model;
pub mod params;
pub mod types;

pub use handle::{Expression, IntoOperand, SharedModel};
pub use logging::{LoggingError, enable_logging};
pub use model::{EvalStats, Model, ModelError, Operand};
pub use params::{Parameters, TIME_LIMIT};
pub use types::{Domain, Node, NodeKind, Objective, Sense, SolutionStatus, Variable};

pub use umo_expr::{
    Arity, ConstraintId, ErrorKind, ExprError, ExprId, IntoValue, Opcode, Value, ValueType,
};
