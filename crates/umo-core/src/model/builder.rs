//! Model builder methods for constants, decision variables and operators.

use umo_expr::{ExprId, IntoValue, Opcode, Value, ValueType};

use crate::model::error::ModelError;
use crate::model::{Model, NodeKey};
use crate::types::{Domain, Node, NodeKind, Variable};

/// Operand of an operator under construction.
///
/// Scalars only become constant nodes once the operator has type checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Expr(ExprId),
    Scalar(Value),
}

impl From<ExprId> for Operand {
    fn from(id: ExprId) -> Self {
        Operand::Expr(id)
    }
}

impl Model {
    /// Add a constant node, reusing an existing one with the same kind and value.
    pub fn constant<V: IntoValue>(&mut self, value: V) -> Result<ExprId, ModelError> {
        let value = value.into_value()?;
        let key = NodeKey::constant(value);
        if let Some(&existing) = self.interned.get(&key) {
            return Ok(existing);
        }
        let id = self.push_node(Node {
            kind: NodeKind::Constant(value),
            value_type: value.value_type(),
        })?;
        self.interned.insert(key, id);
        tracing::trace!(
            component = "model",
            operation = "add_constant",
            status = "success",
            expr_id = id.inner(),
            value = %value,
            "Added constant"
        );
        Ok(id)
    }

    /// Add a boolean decision variable, initially `false`.
    pub fn bool_var(&mut self) -> Result<ExprId, ModelError> {
        self.add_variable(Domain::Bool)
    }

    /// Add an integer decision variable with inclusive bounds.
    pub fn int_var(&mut self, lower: i64, upper: i64) -> Result<ExprId, ModelError> {
        self.add_variable(Domain::Int { lower, upper })
    }

    /// Add a float decision variable with inclusive bounds (infinite bounds allowed).
    pub fn float_var(&mut self, lower: f64, upper: f64) -> Result<ExprId, ModelError> {
        self.add_variable(Domain::Float { lower, upper })
    }

    /// Add a decision variable with the given domain.
    ///
    /// The variable starts at `false` or at the in-domain value closest to zero.
    pub fn add_variable(&mut self, domain: Domain) -> Result<ExprId, ModelError> {
        if !domain.is_well_formed() {
            let (lower, upper) = match domain {
                Domain::Int { lower, upper } => (lower as f64, upper as f64),
                Domain::Float { lower, upper } => (lower, upper),
                Domain::Bool => (0.0, 1.0),
            };
            return Err(ModelError::InvalidDomain { lower, upper });
        }

        let value_type = domain.value_type();
        let id = self.push_node(Node {
            kind: NodeKind::Variable(Variable {
                domain,
                value: domain.initial_value(),
            }),
            value_type,
        })?;
        self.variables.push(id);

        tracing::debug!(
            component = "model",
            operation = "add_variable",
            status = "success",
            expr_id = id.inner(),
            value_type = value_type.as_str(),
            "Added decision variable"
        );
        Ok(id)
    }

    /// Add an operator node over existing operands.
    ///
    /// Operand kinds are checked and the result kind inferred here, once.
    /// Building the same opcode over the same operand sequence twice returns
    /// the first node.
    pub fn operator(&mut self, op: Opcode, operands: &[ExprId]) -> Result<ExprId, ModelError> {
        let operand_types = operands
            .iter()
            .map(|id| self.value_type(*id))
            .collect::<Result<Vec<_>, _>>()?;
        let value_type = infer_type(op, &operand_types)?;

        let key = NodeKey::Operator(op, operands.to_vec());
        if let Some(&existing) = self.interned.get(&key) {
            tracing::trace!(
                component = "model",
                operation = "add_operator",
                status = "reused",
                op = op.as_str(),
                expr_id = existing.inner(),
                "Reused structurally identical operator"
            );
            return Ok(existing);
        }

        let id = self.push_node(Node {
            kind: NodeKind::Operator {
                op,
                operands: operands.to_vec(),
            },
            value_type,
        })?;
        self.interned.insert(key, id);
        tracing::trace!(
            component = "model",
            operation = "add_operator",
            status = "success",
            op = op.as_str(),
            expr_id = id.inner(),
            value_type = value_type.as_str(),
            "Added operator"
        );
        Ok(id)
    }

    /// Add an operator whose operands may include scalars not yet in the model.
    ///
    /// Types are inferred from the scalars themselves, so a rejected
    /// construction leaves the node table untouched.
    pub fn operator_with(
        &mut self,
        op: Opcode,
        operands: &[Operand],
    ) -> Result<ExprId, ModelError> {
        let operand_types = operands
            .iter()
            .map(|operand| match *operand {
                Operand::Expr(id) => self.value_type(id),
                Operand::Scalar(value) => Ok(value.into_value()?.value_type()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        infer_type(op, &operand_types)?;

        let ids = operands
            .iter()
            .map(|operand| match *operand {
                Operand::Expr(id) => Ok(id),
                Operand::Scalar(value) => self.constant(value),
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.operator(op, &ids)
    }

    /// Integer power `base ** exponent`.
    ///
    /// Int bases keep Int results for non-negative exponents and become Float otherwise.
    pub fn powi(&mut self, base: ExprId, exponent: i32) -> Result<ExprId, ModelError> {
        self.operator(Opcode::Powi(exponent), &[base])
    }
}

fn infer_type(op: Opcode, operand_types: &[ValueType]) -> Result<ValueType, ModelError> {
    op.result_type(operand_types).map_err(|err| {
        tracing::debug!(
            component = "model",
            operation = "add_operator",
            status = "error",
            op = op.as_str(),
            error_code = err.code(),
            "Rejected operator construction"
        );
        ModelError::from(err)
    })
}

macro_rules! binary_builders {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        impl Model {
            $(
                $(#[$doc])*
                pub fn $name(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId, ModelError> {
                    self.operator(Opcode::$op, &[lhs, rhs])
                }
            )*
        }
    };
}

macro_rules! variadic_builders {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        impl Model {
            $(
                $(#[$doc])*
                pub fn $name(&mut self, operands: &[ExprId]) -> Result<ExprId, ModelError> {
                    self.operator(Opcode::$op, operands)
                }
            )*
        }
    };
}

macro_rules! unary_builders {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        impl Model {
            $(
                $(#[$doc])*
                pub fn $name(&mut self, operand: ExprId) -> Result<ExprId, ModelError> {
                    self.operator(Opcode::$op, &[operand])
                }
            )*
        }
    };
}

binary_builders! {
    /// Logical and of two bools.
    and => And,
    /// Logical or of two bools.
    or => Or,
    /// Logical exclusive or of two bools.
    xor => Xor,
    add => Add,
    sub => Sub,
    mul => Mul,
    /// Floor division for two Ints, true division otherwise.
    div => Div,
    /// Division rounded toward negative infinity.
    floor_div => FloorDiv,
    /// Modulo with the sign of the divisor.
    rem => Mod,
    min => Min,
    max => Max,
    /// Real power, always Float.
    pow => Pow,
    /// Logarithm of `lhs` in base `rhs`, always Float.
    logb => Logb,
    eq => Eq,
    ne => Ne,
    le => Le,
    ge => Ge,
    lt => Lt,
    gt => Gt,
}

variadic_builders! {
    /// Sum of two or more numeric operands.
    sum => Sum,
    /// Product of two or more numeric operands.
    product => Prod,
    min_of => Min,
    max_of => Max,
    /// True when every operand is true.
    all_of => And,
    /// True when any operand is true.
    any_of => Or,
    /// True when an odd number of operands is true.
    xor_of => Xor,
}

unary_builders! {
    /// Logical negation of a bool.
    not => Not,
    neg => Neg,
    pos => Pos,
    abs => Abs,
    square => Square,
    /// Reciprocal, always Float.
    inv => Inv,
    /// Factorial of a non-negative Int.
    factorial => Factorial,
    exp => Exp,
    /// Natural logarithm.
    log => Log,
    sqrt => Sqrt,
    cos => Cos,
    sin => Sin,
    tan => Tan,
    acos => Acos,
    asin => Asin,
    atan => Atan,
    cosh => Cosh,
    sinh => Sinh,
    tanh => Tanh,
    acosh => Acosh,
    asinh => Asinh,
    atanh => Atanh,
    /// Largest Int not above the operand.
    floor => Floor,
    /// Smallest Int not below the operand.
    ceil => Ceil,
    /// Nearest Int, halves away from zero.
    round => Round,
    /// `1` for non-negative operands, `-1` otherwise.
    sign => Sign,
    /// Fractional part `x - floor(x)`, always Float.
    frac => Frac,
}
