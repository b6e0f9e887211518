//! Structural self-audit.

use umo_expr::{ExprId, ValueType};

use crate::model::error::ModelError;
use crate::model::{Model, NodeKey};
use crate::types::{Node, NodeKind};

fn node_key(node: &Node) -> Option<NodeKey> {
    match &node.kind {
        NodeKind::Constant(value) => Some(NodeKey::constant(*value)),
        NodeKind::Operator { op, operands } => Some(NodeKey::Operator(*op, operands.clone())),
        NodeKind::Variable(_) => None,
    }
}

impl Model {
    /// Verify the graph invariants without modifying the model.
    ///
    /// Fails with a consistency error on the first violation found: operands
    /// that are dangling or not strictly earlier than their user, recorded
    /// types that differ from re-inferred ones, variable values outside their
    /// domain, a deduplication index out of sync with the node table, or
    /// non-boolean constraints.
    pub fn check(&self) -> Result<(), ModelError> {
        let result = self.check_nodes().and_then(|interned| {
            self.check_index(interned)?;
            self.check_registries()
        });
        match &result {
            Ok(()) => tracing::debug!(
                component = "model",
                operation = "check",
                status = "success",
                nodes = self.nodes.len(),
                "Model structure verified"
            ),
            Err(err) => tracing::debug!(
                component = "model",
                operation = "check",
                status = "error",
                error = %err,
                "Model structure check failed"
            ),
        }
        result
    }

    /// Returns the number of nodes that must appear in the deduplication index.
    fn check_nodes(&self) -> Result<usize, ModelError> {
        let mut interned = 0usize;
        let mut variables = 0usize;

        for (id, node) in self.nodes() {
            match &node.kind {
                NodeKind::Constant(value) => {
                    if value.is_nan() {
                        return Err(ModelError::inconsistent(format!(
                            "constant {} is NaN",
                            id.inner()
                        )));
                    }
                    if value.value_type() != node.value_type {
                        return Err(type_mismatch(id, node.value_type, value.value_type()));
                    }
                    interned += 1;
                }
                NodeKind::Variable(variable) => {
                    if !variable.domain.is_well_formed() {
                        return Err(ModelError::inconsistent(format!(
                            "variable {} has malformed bounds",
                            id.inner()
                        )));
                    }
                    if variable.domain.value_type() != node.value_type {
                        return Err(type_mismatch(
                            id,
                            node.value_type,
                            variable.domain.value_type(),
                        ));
                    }
                    if !variable.domain.contains(variable.value) {
                        return Err(ModelError::inconsistent(format!(
                            "variable {} holds {} outside its domain",
                            id.inner(),
                            variable.value
                        )));
                    }
                    variables += 1;
                }
                NodeKind::Operator { op, operands } => {
                    let mut operand_types = Vec::with_capacity(operands.len());
                    for operand in operands {
                        if operand.index() >= self.nodes.len() {
                            return Err(ModelError::inconsistent(format!(
                                "expression {} references missing operand {}",
                                id.inner(),
                                operand.inner()
                            )));
                        }
                        if *operand >= id {
                            return Err(ModelError::inconsistent(format!(
                                "expression {} references operand {} that is not earlier",
                                id.inner(),
                                operand.inner()
                            )));
                        }
                        operand_types.push(self.nodes[operand.index()].value_type);
                    }
                    let inferred = op.result_type(&operand_types).map_err(|err| {
                        ModelError::inconsistent(format!(
                            "expression {} no longer type checks: {}",
                            id.inner(),
                            err
                        ))
                    })?;
                    if inferred != node.value_type {
                        return Err(type_mismatch(id, node.value_type, inferred));
                    }
                    interned += 1;
                }
            }
        }

        if variables != self.variables.len() {
            return Err(ModelError::inconsistent(format!(
                "{} variable nodes but {} registered variables",
                variables,
                self.variables.len()
            )));
        }
        if self.cache.borrow().len() > self.nodes.len() {
            return Err(ModelError::inconsistent(
                "evaluation cache is larger than the node table",
            ));
        }
        Ok(interned)
    }

    fn check_index(&self, expected: usize) -> Result<(), ModelError> {
        if self.interned.len() != expected {
            return Err(ModelError::inconsistent(format!(
                "deduplication index has {} entries for {} shareable nodes",
                self.interned.len(),
                expected
            )));
        }
        for (key, id) in &self.interned {
            let node = self.node(*id).map_err(|_| {
                ModelError::inconsistent(format!(
                    "deduplication index points at missing expression {}",
                    id.inner()
                ))
            })?;
            if node_key(node).as_ref() != Some(key) {
                return Err(ModelError::inconsistent(format!(
                    "deduplication index entry for expression {} does not match the node",
                    id.inner()
                )));
            }
        }
        Ok(())
    }

    fn check_registries(&self) -> Result<(), ModelError> {
        for id in &self.variables {
            if !self.node(*id).is_ok_and(Node::is_variable) {
                return Err(ModelError::inconsistent(format!(
                    "registered variable {} is not a variable node",
                    id.inner()
                )));
            }
        }
        for (constraint_id, expr) in self.constraints() {
            match self.value_type(expr) {
                Ok(ValueType::Bool) => {}
                _ => {
                    return Err(ModelError::inconsistent(format!(
                        "constraint {} refers to expression {} which is not a bool",
                        constraint_id.inner(),
                        expr.inner()
                    )));
                }
            }
        }
        for objective in &self.objectives {
            if self.node(objective.expr).is_err() {
                return Err(ModelError::inconsistent(format!(
                    "objective refers to missing expression {}",
                    objective.expr.inner()
                )));
            }
        }
        if let Some(key) = self.parameters.first_nan() {
            return Err(ModelError::inconsistent(format!(
                "parameter '{key}' is NaN"
            )));
        }
        Ok(())
    }
}

fn type_mismatch(id: ExprId, recorded: ValueType, inferred: ValueType) -> ModelError {
    ModelError::inconsistent(format!(
        "expression {} is recorded as {} but infers {}",
        id.inner(),
        recorded,
        inferred
    ))
}
