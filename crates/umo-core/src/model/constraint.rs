//! Constraint registry, objectives and solution status.

use umo_expr::{ConstraintId, ExprId, Value, ValueType};

use crate::model::Model;
use crate::model::error::ModelError;
use crate::types::{Objective, Sense, SolutionStatus};

impl Model {
    /// Register a boolean expression as a constraint.
    pub fn register_constraint(&mut self, id: ExprId) -> Result<ConstraintId, ModelError> {
        let found = self.value_type(id)?;
        if found != ValueType::Bool {
            return Err(ModelError::ConstraintNotBool { id, found });
        }

        let constraint_id = u32::try_from(self.constraints.len())
            .map(ConstraintId::new)
            .map_err(|_| ModelError::inconsistent("constraint registry is full"))?;
        self.constraints.push(id);

        tracing::debug!(
            component = "model",
            operation = "register_constraint",
            status = "success",
            constraint_id = constraint_id.inner(),
            expr_id = id.inner(),
            "Registered constraint"
        );
        Ok(constraint_id)
    }

    /// Get the number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Constraint expressions in registration order.
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, ExprId)> + '_ {
        self.constraints
            .iter()
            .enumerate()
            .map(|(idx, id)| (ConstraintId::new(idx as u32), *id))
    }

    /// Expression registered under a constraint ID.
    pub fn constraint_expr(&self, id: ConstraintId) -> Option<ExprId> {
        self.constraints.get(id.index()).copied()
    }

    /// Constraints that evaluate to false under the current assignment.
    pub fn violated_constraints(&self) -> Result<Vec<ConstraintId>, ModelError> {
        let mut violated = Vec::new();
        for (constraint_id, expr) in self.constraints() {
            if self.evaluate(expr)? != Value::Bool(true) {
                violated.push(constraint_id);
            }
        }
        Ok(violated)
    }

    /// Whether the current assignment satisfies every constraint.
    ///
    /// A model without constraints is always valid.
    pub fn status(&self) -> Result<SolutionStatus, ModelError> {
        let violated = self.violated_constraints()?;
        let status = if violated.is_empty() {
            SolutionStatus::Valid
        } else {
            SolutionStatus::Invalid
        };
        tracing::debug!(
            component = "model",
            operation = "status",
            status = status.as_str(),
            constraints = self.constraints.len(),
            violated = violated.len(),
            generation = self.generation,
            "Computed solution status"
        );
        Ok(status)
    }

    /// Register an expression to minimize.
    pub fn minimize(&mut self, id: ExprId) -> Result<(), ModelError> {
        self.add_objective(id, Sense::Minimize)
    }

    /// Register an expression to maximize.
    pub fn maximize(&mut self, id: ExprId) -> Result<(), ModelError> {
        self.add_objective(id, Sense::Maximize)
    }

    fn add_objective(&mut self, id: ExprId, sense: Sense) -> Result<(), ModelError> {
        self.ensure_expr_exists(id)?;
        self.objectives.push(Objective { expr: id, sense });
        tracing::debug!(
            component = "model",
            operation = "add_objective",
            status = "success",
            sense = ?sense,
            expr_id = id.inner(),
            "Added objective"
        );
        Ok(())
    }

    /// Objectives in registration order (lexicographic priority).
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Objective values under the current assignment.
    pub fn objective_values(&self) -> Result<Vec<Value>, ModelError> {
        self.objectives
            .iter()
            .map(|objective| self.evaluate(objective.expr))
            .collect()
    }
}
