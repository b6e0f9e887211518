//! Node table access and the variable store.

use umo_expr::{ExprId, IntoValue, Value, ValueType};

use super::Model;
use super::error::ModelError;
use crate::types::{Node, NodeKind, Variable};

impl Model {
    /// Get the number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of decision variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Get a node by ID.
    pub fn node(&self, id: ExprId) -> Result<&Node, ModelError> {
        self.nodes.get(id.index()).ok_or(ModelError::InvalidExprId(id))
    }

    /// Iterate nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (ExprId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (ExprId::new(idx as u32), node))
    }

    /// Result kind of a node.
    pub fn value_type(&self, id: ExprId) -> Result<ValueType, ModelError> {
        self.node(id).map(Node::value_type)
    }

    /// Decision variable IDs in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = ExprId> + '_ {
        self.variables.iter().copied()
    }

    /// Get a decision variable by ID.
    pub fn variable(&self, id: ExprId) -> Result<&Variable, ModelError> {
        match &self.node(id)?.kind {
            NodeKind::Variable(variable) => Ok(variable),
            _ => Err(ModelError::NotAVariable(id)),
        }
    }

    /// Current value of a decision variable.
    pub fn read(&self, id: ExprId) -> Result<Value, ModelError> {
        self.variable(id).map(|variable| variable.value)
    }

    /// Assign a decision variable.
    ///
    /// The value must have the variable's kind and lie within its domain. An
    /// Int assigned to a Float variable is widened first; no other conversion
    /// happens. Every successful assignment invalidates all cached evaluation
    /// results.
    pub fn assign<V: IntoValue>(&mut self, id: ExprId, value: V) -> Result<(), ModelError> {
        self.ensure_expr_exists(id)?;
        let value = value.into_value()?;
        let NodeKind::Variable(variable) = &mut self.nodes[id.index()].kind else {
            return Err(ModelError::NotAVariable(id));
        };

        let expected = variable.domain.value_type();
        let value = match (expected, value) {
            (ValueType::Float, Value::Int(int)) => Value::Float(int as f64),
            _ => value,
        };
        if value.value_type() != expected {
            return Err(ModelError::ValueTypeMismatch {
                id,
                expected,
                found: value.value_type(),
            });
        }
        if !variable.domain.contains(value) {
            return Err(ModelError::ValueOutOfDomain { id, value });
        }

        variable.value = value;
        self.generation += 1;
        tracing::trace!(
            component = "model",
            operation = "assign",
            status = "success",
            expr_id = id.inner(),
            value = %value,
            generation = self.generation,
            "Assigned decision variable"
        );
        Ok(())
    }

    pub(crate) fn push_node(&mut self, node: Node) -> Result<ExprId, ModelError> {
        let id = self.next_id()?;
        self.nodes.push(node);
        Ok(id)
    }
}
