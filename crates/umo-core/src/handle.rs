//! Shared model handles.
//!
//! [`SharedModel`] puts a [`Model`] behind `Rc<RefCell<..>>` and hands out
//! [`Expression`] handles that each hold a reference to it. The model lives
//! as long as any handle does, so expressions stay usable after the
//! `SharedModel` they came from is dropped.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use umo_expr::{ConstraintId, ExprId, IntoValue, Opcode, Value, ValueType};

use crate::model::{Model, ModelError, Operand};
use crate::params::Parameters;
use crate::types::SolutionStatus;

/// Reference-counted handle to a model.
#[derive(Debug, Clone, Default)]
pub struct SharedModel {
    inner: Rc<RefCell<Model>>,
}

impl SharedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: Parameters) -> Result<Self, ModelError> {
        Model::with_parameters(parameters).map(Self::from)
    }

    /// Borrow the model for inspection.
    ///
    /// Panics if a mutable borrow is outstanding, which only happens when the
    /// guard from [`SharedModel::borrow_mut`] is held across this call.
    pub fn borrow(&self) -> Ref<'_, Model> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Model> {
        self.inner.borrow_mut()
    }

    /// Whether both handles refer to the same model.
    pub fn same_model(&self, other: &SharedModel) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles (models and expressions) sharing this model.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Take the model out if this is the last handle.
    pub fn try_into_model(self) -> Result<Model, SharedModel> {
        Rc::try_unwrap(self.inner)
            .map(RefCell::into_inner)
            .map_err(|inner| SharedModel { inner })
    }

    pub fn constant<V: IntoValue>(&self, value: V) -> Result<Expression, ModelError> {
        let id = self.inner.borrow_mut().constant(value)?;
        self.wrap(id)
    }

    pub fn bool_var(&self) -> Result<Expression, ModelError> {
        let id = self.inner.borrow_mut().bool_var()?;
        self.wrap(id)
    }

    pub fn int_var(&self, lower: i64, upper: i64) -> Result<Expression, ModelError> {
        let id = self.inner.borrow_mut().int_var(lower, upper)?;
        self.wrap(id)
    }

    pub fn float_var(&self, lower: f64, upper: f64) -> Result<Expression, ModelError> {
        let id = self.inner.borrow_mut().float_var(lower, upper)?;
        self.wrap(id)
    }

    /// Wrap an existing node ID of this model.
    pub fn expression(&self, id: ExprId) -> Result<Expression, ModelError> {
        self.wrap(id)
    }

    /// Build an operator node from handles or host scalars.
    ///
    /// Scalars are added as constants only when the operator type checks.
    pub fn operator<I>(&self, op: Opcode, operands: I) -> Result<Expression, ModelError>
    where
        I: IntoIterator,
        I::Item: IntoOperand,
    {
        let operands = operands
            .into_iter()
            .map(|operand| operand.into_operand(self))
            .collect::<Result<Vec<_>, _>>()?;
        let id = self.inner.borrow_mut().operator_with(op, &operands)?;
        self.wrap(id)
    }

    pub fn register_constraint(&self, constraint: &Expression) -> Result<ConstraintId, ModelError> {
        if !constraint.model.same_model(self) {
            return Err(ModelError::ForeignExpression(constraint.id));
        }
        self.inner.borrow_mut().register_constraint(constraint.id)
    }

    pub fn minimize(&self, objective: impl IntoOperand) -> Result<(), ModelError> {
        let id = self.resolve(objective.into_operand(self)?)?;
        self.inner.borrow_mut().minimize(id)
    }

    pub fn maximize(&self, objective: impl IntoOperand) -> Result<(), ModelError> {
        let id = self.resolve(objective.into_operand(self)?)?;
        self.inner.borrow_mut().maximize(id)
    }

    pub fn status(&self) -> Result<SolutionStatus, ModelError> {
        self.inner.borrow().status()
    }

    pub fn violated_constraints(&self) -> Result<Vec<ConstraintId>, ModelError> {
        self.inner.borrow().violated_constraints()
    }

    pub fn check(&self) -> Result<(), ModelError> {
        self.inner.borrow().check()
    }

    pub fn set_param(&self, key: impl Into<String>, value: f64) -> Result<(), ModelError> {
        self.inner.borrow_mut().set_param(key, value)
    }

    pub fn get_param(&self, key: &str) -> Result<f64, ModelError> {
        self.inner.borrow().get_param(key)
    }

    pub fn time_limit(&self) -> f64 {
        self.inner.borrow().time_limit()
    }

    pub fn set_time_limit(&self, seconds: f64) -> Result<(), ModelError> {
        self.inner.borrow_mut().set_time_limit(seconds)
    }

    pub fn set_string_param(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.inner.borrow_mut().set_string_param(key, value)
    }

    pub fn get_string_param(&self, key: &str) -> Result<String, ModelError> {
        self.inner.borrow().get_string_param(key).map(str::to_string)
    }

    fn resolve(&self, operand: Operand) -> Result<ExprId, ModelError> {
        match operand {
            Operand::Expr(id) => Ok(id),
            Operand::Scalar(value) => self.inner.borrow_mut().constant(value),
        }
    }

    fn wrap(&self, id: ExprId) -> Result<Expression, ModelError> {
        let value_type = self.inner.borrow().value_type(id)?;
        Ok(Expression {
            model: self.clone(),
            id,
            value_type,
        })
    }
}

impl From<Model> for SharedModel {
    fn from(model: Model) -> Self {
        Self {
            inner: Rc::new(RefCell::new(model)),
        }
    }
}

/// A value usable as an operand of a model's operators.
///
/// Expressions resolve to their own node, provided they belong to the same
/// model. Host scalars (`bool`, `i32`, `i64`, `u32`, `f64`, [`Value`]) resolve
/// to a checked value that becomes a deduplicated constant once the operator
/// accepts it. Wider unsigned integers have no lossless Int form and are not
/// accepted.
pub trait IntoOperand {
    fn into_operand(self, model: &SharedModel) -> Result<Operand, ModelError>;
}

impl IntoOperand for &Expression {
    fn into_operand(self, model: &SharedModel) -> Result<Operand, ModelError> {
        if self.model.same_model(model) {
            Ok(Operand::Expr(self.id))
        } else {
            Err(ModelError::ForeignExpression(self.id))
        }
    }
}

impl IntoOperand for Expression {
    fn into_operand(self, model: &SharedModel) -> Result<Operand, ModelError> {
        (&self).into_operand(model)
    }
}

macro_rules! scalar_operands {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoOperand for $ty {
                fn into_operand(self, _model: &SharedModel) -> Result<Operand, ModelError> {
                    Ok(Operand::Scalar(self.into_value()?))
                }
            }
        )*
    };
}

scalar_operands!(bool, i32, i64, u32, f64, Value);

/// A node of a shared model.
///
/// Keeps the owning model alive. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Expression {
    model: SharedModel,
    id: ExprId,
    value_type: ValueType,
}

impl Expression {
    pub fn id(&self) -> ExprId {
        self.id
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The owning model.
    pub fn model(&self) -> SharedModel {
        self.model.clone()
    }

    /// Evaluate under the current assignment.
    pub fn value(&self) -> Result<Value, ModelError> {
        self.model.inner.borrow().evaluate(self.id)
    }

    /// Assign a value; only valid for decision variables.
    pub fn set_value<V: IntoValue>(&self, value: V) -> Result<(), ModelError> {
        self.model.inner.borrow_mut().assign(self.id, value)
    }

    pub fn is_variable(&self) -> bool {
        self.model
            .inner
            .borrow()
            .node(self.id)
            .is_ok_and(|node| node.is_variable())
    }

    pub fn set_name(&self, name: impl Into<String>) -> Result<(), ModelError> {
        self.model.inner.borrow_mut().set_name(self.id, name)
    }

    pub fn name(&self) -> Option<String> {
        self.model.inner.borrow().name(self.id).map(str::to_string)
    }

    pub fn render(&self) -> Result<String, ModelError> {
        self.model.inner.borrow().render(self.id)
    }

    /// Integer power with the exponent fixed at construction.
    pub fn powi(&self, exponent: i32) -> Result<Expression, ModelError> {
        self.model.operator(Opcode::Powi(exponent), [self])
    }

    fn binary(&self, op: Opcode, rhs: impl IntoOperand) -> Result<Expression, ModelError> {
        let rhs = rhs.into_operand(&self.model)?;
        let id = self
            .model
            .inner
            .borrow_mut()
            .operator_with(op, &[Operand::Expr(self.id), rhs])?;
        self.model.wrap(id)
    }

    fn unary(&self, op: Opcode) -> Result<Expression, ModelError> {
        self.model.operator(op, [self])
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.model.same_model(&other.model)
    }
}

impl Eq for Expression {}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.render() {
            Ok(text) => write!(f, "{text}"),
            Err(_) => write!(f, "e{}", self.id.inner()),
        }
    }
}

macro_rules! binary_methods {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        impl Expression {
            $(
                $(#[$doc])*
                pub fn $name(&self, rhs: impl IntoOperand) -> Result<Expression, ModelError> {
                    self.binary(Opcode::$op, rhs)
                }
            )*
        }
    };
}

macro_rules! variadic_methods {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        impl SharedModel {
            $(
                $(#[$doc])*
                pub fn $name<I>(&self, operands: I) -> Result<Expression, ModelError>
                where
                    I: IntoIterator,
                    I::Item: IntoOperand,
                {
                    self.operator(Opcode::$op, operands)
                }
            )*
        }
    };
}

macro_rules! unary_methods {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        impl Expression {
            $(
                $(#[$doc])*
                pub fn $name(&self) -> Result<Expression, ModelError> {
                    self.unary(Opcode::$op)
                }
            )*
        }
    };
}

binary_methods! {
    and => And,
    or => Or,
    xor => Xor,
    add => Add,
    sub => Sub,
    mul => Mul,
    /// Floor division for two Ints, true division otherwise.
    div => Div,
    floor_div => FloorDiv,
    /// Modulo with the sign of the divisor.
    rem => Mod,
    min => Min,
    max => Max,
    pow => Pow,
    /// Logarithm in the base given by `rhs`.
    logb => Logb,
    eq => Eq,
    ne => Ne,
    le => Le,
    ge => Ge,
    lt => Lt,
    gt => Gt,
}

variadic_methods! {
    /// Sum of two or more operands.
    sum => Sum,
    /// Product of two or more operands.
    product => Prod,
    min_of => Min,
    max_of => Max,
    all_of => And,
    any_of => Or,
    xor_of => Xor,
}

unary_methods! {
    not => Not,
    neg => Neg,
    pos => Pos,
    abs => Abs,
    square => Square,
    inv => Inv,
    factorial => Factorial,
    exp => Exp,
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
    floor => Floor,
    ceil => Ceil,
    round => Round,
    sign => Sign,
    frac => Frac,
}
