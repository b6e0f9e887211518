use serde::Serialize;
use umo_expr::{ExprId, Opcode, Value, ValueType};

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Summary of the current assignment against the registered constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionStatus {
    /// Every constraint evaluates to true.
    Valid,
    /// At least one constraint evaluates to false.
    Invalid,
}

impl SolutionStatus {
    pub fn is_valid(self) -> bool {
        matches!(self, SolutionStatus::Valid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Valid => "valid",
            SolutionStatus::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    Bool,
    Int { lower: i64, upper: i64 },
    Float { lower: f64, upper: f64 },
}

impl Domain {
    pub fn value_type(&self) -> ValueType {
        match self {
            Domain::Bool => ValueType::Bool,
            Domain::Int { .. } => ValueType::Int,
            Domain::Float { .. } => ValueType::Float,
        }
    }

    /// Bounds are ordered and not NaN.
    pub fn is_well_formed(&self) -> bool {
        match *self {
            Domain::Bool => true,
            Domain::Int { lower, upper } => lower <= upper,
            Domain::Float { lower, upper } => lower <= upper,
        }
    }

    /// Whether `value` has this domain's kind and lies within its bounds.
    pub fn contains(&self, value: Value) -> bool {
        match (*self, value) {
            (Domain::Bool, Value::Bool(_)) => true,
            (Domain::Int { lower, upper }, Value::Int(v)) => (lower..=upper).contains(&v),
            (Domain::Float { lower, upper }, Value::Float(v)) => lower <= v && v <= upper,
            _ => false,
        }
    }

    /// Value held by a freshly declared variable: `false`, or the in-domain
    /// value closest to zero. Bounds must be well formed.
    pub(crate) fn initial_value(&self) -> Value {
        match *self {
            Domain::Bool => Value::Bool(false),
            Domain::Int { lower, upper } => Value::Int(0_i64.clamp(lower, upper)),
            Domain::Float { lower, upper } => Value::Float(0.0_f64.clamp(lower, upper)),
        }
    }
}

/// A decision variable: static domain plus current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub domain: Domain,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Constant(Value),
    Variable(Variable),
    Operator { op: Opcode, operands: Vec<ExprId> },
}

/// A node of the expression graph. Only a variable's value changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) value_type: ValueType,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, NodeKind::Constant(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, NodeKind::Variable(_))
    }

    pub fn opcode(&self) -> Option<Opcode> {
        match &self.kind {
            NodeKind::Operator { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Operand ids, empty for leaves.
    pub fn operands(&self) -> &[ExprId] {
        match &self.kind {
            NodeKind::Operator { operands, .. } => operands,
            _ => &[],
        }
    }
}

/// An expression registered for minimization or maximization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Objective {
    pub expr: ExprId,
    pub sense: Sense,
}
