//! Model error types.

use umo_expr::{ErrorKind, ExprError, ExprId, Value, ValueType};

/// Errors that can occur during model operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Operator typing or evaluation failure
    Expr(ExprError),
    /// Expression ID not in this model
    InvalidExprId(ExprId),
    /// Expression handle belongs to another model
    ForeignExpression(ExprId),
    /// Assignment target is not a decision variable
    NotAVariable(ExprId),
    /// Assigned value kind differs from the variable kind
    ValueTypeMismatch {
        id: ExprId,
        expected: ValueType,
        found: ValueType,
    },
    /// Variable declared with lower > upper or NaN bounds
    InvalidDomain { lower: f64, upper: f64 },
    /// Assigned value outside the variable domain
    ValueOutOfDomain { id: ExprId, value: Value },
    /// Constraint expression is not boolean
    ConstraintNotBool { id: ExprId, found: ValueType },
    /// Parameter was never set
    UnknownParameter(String),
    /// Parameter value rejected
    InvalidParameter { key: String, reason: String },
    /// Structural audit failure
    Inconsistent { reason: String },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::Expr(err) => err.code(),
            ModelError::InvalidExprId(_) => "EXPR_INVALID_ID",
            ModelError::ForeignExpression(_) => "EXPR_FOREIGN_MODEL",
            ModelError::NotAVariable(_) => "VARIABLE_NOT_DECISION",
            ModelError::ValueTypeMismatch { .. } => "VARIABLE_TYPE_MISMATCH",
            ModelError::InvalidDomain { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::ValueOutOfDomain { .. } => "VARIABLE_OUT_OF_DOMAIN",
            ModelError::ConstraintNotBool { .. } => "CONSTRAINT_NOT_BOOL",
            ModelError::UnknownParameter(_) => "PARAM_UNKNOWN",
            ModelError::InvalidParameter { .. } => "PARAM_INVALID",
            ModelError::Inconsistent { .. } => "MODEL_INCONSISTENT",
        }
    }

    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::Expr(err) => err.kind(),
            ModelError::NotAVariable(_)
            | ModelError::ValueTypeMismatch { .. }
            | ModelError::ConstraintNotBool { .. } => ErrorKind::Type,
            ModelError::InvalidDomain { .. }
            | ModelError::ValueOutOfDomain { .. }
            | ModelError::InvalidParameter { .. } => ErrorKind::Domain,
            ModelError::UnknownParameter(_) => ErrorKind::Key,
            ModelError::InvalidExprId(_)
            | ModelError::ForeignExpression(_)
            | ModelError::Inconsistent { .. } => ErrorKind::Consistency,
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        ModelError::Inconsistent {
            reason: reason.into(),
        }
    }
}

impl From<ExprError> for ModelError {
    fn from(err: ExprError) -> Self {
        ModelError::Expr(err)
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Expr(err) => write!(f, "{err}"),
            ModelError::InvalidExprId(id) => write!(
                f,
                "[{}] Expression ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::ForeignExpression(id) => write!(
                f,
                "[{}] Expression ID {} belongs to a different model",
                self.code(),
                id.inner()
            ),
            ModelError::NotAVariable(id) => write!(
                f,
                "[{}] Expression ID {} is not a decision variable",
                self.code(),
                id.inner()
            ),
            ModelError::ValueTypeMismatch {
                id,
                expected,
                found,
            } => write!(
                f,
                "[{}] Variable {} is {} but the value is {}",
                self.code(),
                id.inner(),
                expected,
                found
            ),
            ModelError::InvalidDomain { lower, upper } => write!(
                f,
                "[{}] Variable bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::ValueOutOfDomain { id, value } => write!(
                f,
                "[{}] Value {} is outside the domain of variable {}",
                self.code(),
                value,
                id.inner()
            ),
            ModelError::ConstraintNotBool { id, found } => write!(
                f,
                "[{}] Constraint expression {} must be bool (got {})",
                self.code(),
                id.inner(),
                found
            ),
            ModelError::UnknownParameter(key) => {
                write!(f, "[{}] Parameter '{}' is not set", self.code(), key)
            }
            ModelError::InvalidParameter { key, reason } => write!(
                f,
                "[{}] Parameter '{}' invalid: {}",
                self.code(),
                key,
                reason
            ),
            ModelError::Inconsistent { reason } => {
                write!(f, "[{}] Model inconsistent: {}", self.code(), reason)
            }
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Expr(err) => Some(err),
            _ => None,
        }
    }
}
