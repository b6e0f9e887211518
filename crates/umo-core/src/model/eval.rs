//! Evaluation with a generation-stamped cache.
//!
//! Each computed node value is stored with the model generation it was
//! computed at. Assignments bump the generation, so every older entry is stale
//! without walking the dependents of the assigned variable.

use umo_expr::{ExprId, Value};

use crate::model::Model;
use crate::model::error::ModelError;
use crate::types::NodeKind;

/// Counters describing evaluator work since the model was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Operator applications performed.
    pub computed: u64,
    /// Top-level requests answered straight from the cache.
    pub reused: u64,
}

#[derive(Debug, Clone, Copy)]
struct CachedValue {
    generation: u64,
    value: Value,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EvalCache {
    entries: Vec<Option<CachedValue>>,
    stats: EvalStats,
}

impl EvalCache {
    fn get(&self, id: ExprId, generation: u64) -> Option<Value> {
        self.entries
            .get(id.index())
            .copied()
            .flatten()
            .filter(|cached| cached.generation == generation)
            .map(|cached| cached.value)
    }

    fn store(&mut self, id: ExprId, generation: u64, value: Value) {
        if let Some(slot) = self.entries.get_mut(id.index()) {
            *slot = Some(CachedValue { generation, value });
        }
    }

    fn ensure_len(&mut self, len: usize) {
        if self.entries.len() < len {
            self.entries.resize(len, None);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

enum Visit {
    Enter(ExprId),
    Exit(ExprId),
}

impl Model {
    /// Evaluate a node under the current variable assignment.
    ///
    /// Operands are resolved bottom-up with an explicit stack, so deep graphs
    /// do not consume call stack. Division or modulo by zero, integer overflow
    /// and NaN-producing float operations fail with an arithmetic error.
    pub fn evaluate(&self, id: ExprId) -> Result<Value, ModelError> {
        self.ensure_expr_exists(id)?;
        let generation = self.generation;
        let mut cache = self.cache.borrow_mut();
        cache.ensure_len(self.nodes.len());

        if let Some(value) = cache.get(id, generation) {
            cache.stats.reused += 1;
            return Ok(value);
        }

        let mut stack = vec![Visit::Enter(id)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(current) => {
                    if cache.get(current, generation).is_some() {
                        continue;
                    }
                    match &self.nodes[current.index()].kind {
                        NodeKind::Constant(value) => cache.store(current, generation, *value),
                        NodeKind::Variable(variable) => {
                            cache.store(current, generation, variable.value)
                        }
                        NodeKind::Operator { operands, .. } => {
                            stack.push(Visit::Exit(current));
                            for operand in operands.iter().rev() {
                                if cache.get(*operand, generation).is_none() {
                                    stack.push(Visit::Enter(*operand));
                                }
                            }
                        }
                    }
                }
                Visit::Exit(current) => {
                    if cache.get(current, generation).is_some() {
                        continue;
                    }
                    let NodeKind::Operator { op, operands } = &self.nodes[current.index()].kind
                    else {
                        continue;
                    };
                    let args = operands
                        .iter()
                        .map(|operand| {
                            cache.get(*operand, generation).ok_or_else(|| {
                                ModelError::inconsistent(format!(
                                    "operand {} of expression {} was not evaluated",
                                    operand.inner(),
                                    current.inner()
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    let value = op.apply(&args).map_err(|err| {
                        tracing::debug!(
                            component = "model",
                            operation = "evaluate",
                            status = "error",
                            op = op.as_str(),
                            expr_id = current.inner(),
                            error_code = err.code(),
                            "Evaluation failed"
                        );
                        ModelError::from(err)
                    })?;
                    cache.stats.computed += 1;
                    cache.store(current, generation, value);
                }
            }
        }

        cache.get(id, generation).ok_or_else(|| {
            ModelError::inconsistent(format!("expression {} was not evaluated", id.inner()))
        })
    }

    /// Evaluate several nodes, sharing cached intermediate results.
    pub fn evaluate_all(&self, ids: &[ExprId]) -> Result<Vec<Value>, ModelError> {
        ids.iter().map(|id| self.evaluate(*id)).collect()
    }

    /// Evaluator work counters.
    pub fn eval_stats(&self) -> EvalStats {
        self.cache.borrow().stats
    }
}
