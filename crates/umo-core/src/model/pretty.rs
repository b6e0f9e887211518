//! Human-readable expression rendering.

use std::collections::HashMap;

use umo_expr::{ExprId, Opcode};

use crate::model::Model;
use crate::model::error::ModelError;
use crate::types::NodeKind;

impl Model {
    /// Render the subgraph rooted at `id` as an expression string.
    ///
    /// Named nodes render as their name and unnamed variables as `e<id>`.
    /// Operators render infix or as function calls, e.g. `(x + 2)`, `cos(y)`,
    /// `powi(x, 3)`, `(a and b and c)`, `sum(x, y, 1)`.
    pub fn render(&self, id: ExprId) -> Result<String, ModelError> {
        self.ensure_expr_exists(id)?;
        let mut rendered: HashMap<ExprId, String> = HashMap::new();
        let mut stack = vec![(id, false)];

        while let Some((current, expanded)) = stack.pop() {
            if rendered.contains_key(&current) {
                continue;
            }
            if let Some(name) = self.name(current) {
                rendered.insert(current, name.to_string());
                continue;
            }
            match &self.nodes[current.index()].kind {
                NodeKind::Constant(value) => {
                    rendered.insert(current, value.to_string());
                }
                NodeKind::Variable(_) => {
                    rendered.insert(current, format!("e{}", current.inner()));
                }
                NodeKind::Operator { operands, .. } if !expanded => {
                    stack.push((current, true));
                    stack.extend(operands.iter().rev().map(|operand| (*operand, false)));
                }
                NodeKind::Operator { op, operands } => {
                    let args = operands
                        .iter()
                        .map(|operand| {
                            rendered.get(operand).map(String::as_str).ok_or_else(|| {
                                ModelError::inconsistent(format!(
                                    "operand {} of expression {} was not rendered",
                                    operand.inner(),
                                    current.inner()
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    let text = format_operator(*op, &args);
                    rendered.insert(current, text);
                }
            }
        }

        rendered.remove(&id).ok_or_else(|| {
            ModelError::inconsistent(format!("expression {} was not rendered", id.inner()))
        })
    }
}

fn format_operator(op: Opcode, args: &[&str]) -> String {
    match (op, args) {
        (Opcode::Not, [operand]) => format!("(not {operand})"),
        (Opcode::Neg, [operand]) => format!("(-{operand})"),
        (Opcode::Pos, [operand]) => format!("(+{operand})"),
        (Opcode::Powi(exponent), [base]) => format!("powi({base}, {exponent})"),
        _ => match op.infix_symbol() {
            Some(symbol) if args.len() >= 2 => {
                let separator = format!(" {symbol} ");
                format!("({})", args.join(separator.as_str()))
            }
            _ => format!("{}({})", op.as_str(), args.join(", ")),
        },
    }
}
