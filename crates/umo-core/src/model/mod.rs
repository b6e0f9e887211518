//! Model module for building and evaluating expression graphs.
//!
//! This module provides the core [`Model`] type: an append-only table of typed
//! nodes together with the constraint registry and parameter store.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - [`builder`]: Constants, decision variables and deduplicated operators
//! - [`storage`]: Node table access and the variable store
//! - [`eval`]: Generation-stamped evaluation cache
//! - [`constraint`]: Constraints, objectives and solution status
//! - [`check`]: Structural self-audit
//! - [`parameters`]: Float and string parameters
//! - [`metadata`]: Node names and metadata
//! - [`pretty`]: Human-readable expression rendering

mod builder;
mod check;
mod constraint;
mod error;
mod eval;
mod metadata;
mod parameters;
mod pretty;
mod storage;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use umo_expr::{ExprId, Opcode, Value};

use crate::params::Parameters;
use crate::types::{Node, Objective};

pub use builder::Operand;
pub use error::ModelError;
pub use eval::EvalStats;

use eval::EvalCache;

/// Deduplication key of a node.
///
/// Floats are keyed by bit pattern, so `0.0` and `-0.0` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum NodeKey {
    Bool(bool),
    Int(i64),
    Float(u64),
    Operator(Opcode, Vec<ExprId>),
}

impl NodeKey {
    pub(crate) fn constant(value: Value) -> Self {
        match value {
            Value::Bool(b) => NodeKey::Bool(b),
            Value::Int(i) => NodeKey::Int(i),
            Value::Float(x) => NodeKey::Float(x.to_bits()),
        }
    }
}

/// An expression graph with decision variables, constraints and parameters.
///
/// Nodes are only ever appended: an [`ExprId`] stays valid, with the same
/// type, for the lifetime of the model. Operands always precede the nodes
/// that use them, so the graph is acyclic by construction.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) nodes: Vec<Node>,
    pub(crate) interned: HashMap<NodeKey, ExprId>,
    pub(crate) variables: Vec<ExprId>,
    pub(crate) constraints: Vec<ExprId>,
    pub(crate) objectives: Vec<Objective>,
    pub(crate) parameters: Parameters,
    // Bumped on every assignment; cached values from older generations are stale.
    pub(crate) generation: u64,
    pub(crate) cache: RefCell<EvalCache>,
    // Lazy-allocated metadata storage
    pub(crate) names: Option<BTreeMap<ExprId, String>>,
    pub(crate) metadata: Option<BTreeMap<ExprId, serde_json::Value>>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            interned: HashMap::new(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objectives: Vec::new(),
            parameters: Parameters::new(),
            generation: 0,
            cache: RefCell::new(EvalCache::default()),
            names: None,
            metadata: None,
        }
    }

    /// Create a new model with preset parameters.
    ///
    /// Missing defaults (such as the time limit) are kept.
    pub fn with_parameters(parameters: Parameters) -> Result<Self, ModelError> {
        if let Some(key) = parameters.first_nan() {
            return Err(ModelError::InvalidParameter {
                key: key.to_string(),
                reason: "value is NaN".to_string(),
            });
        }
        let mut model = Self::new();
        for (key, value) in parameters.floats() {
            model.parameters.insert_float(key.to_string(), value);
        }
        for (key, value) in parameters.strings() {
            model
                .parameters
                .insert_string(key.to_string(), value.to_string());
        }
        Ok(model)
    }

    /// Current assignment generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn ensure_expr_exists(&self, id: ExprId) -> Result<(), ModelError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(ModelError::InvalidExprId(id))
        }
    }

    pub(crate) fn next_id(&self) -> Result<ExprId, ModelError> {
        u32::try_from(self.nodes.len())
            .map(ExprId::new)
            .map_err(|_| ModelError::inconsistent("node table is full"))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
