//! Metadata methods for node naming.

use std::collections::BTreeMap;

use umo_expr::ExprId;

use crate::model::Model;
use crate::model::error::ModelError;

impl Model {
    /// Set name for a node.
    pub fn set_name(&mut self, id: ExprId, name: impl Into<String>) -> Result<(), ModelError> {
        self.ensure_expr_exists(id)?;
        self.names
            .get_or_insert_with(BTreeMap::new)
            .insert(id, name.into());
        Ok(())
    }

    /// Get name for a node.
    pub fn name(&self, id: ExprId) -> Option<&str> {
        self.names
            .as_ref()
            .and_then(|names| names.get(&id).map(|s| s.as_str()))
    }

    /// Lookup a node by name.
    ///
    /// Names are not required to be unique; the lowest ID wins.
    pub fn get_by_name(&self, name: &str) -> Option<ExprId> {
        self.names.as_ref().and_then(|names| {
            names
                .iter()
                .find_map(|(id, value)| (value == name).then_some(*id))
        })
    }

    /// Set metadata for a node.
    pub fn set_metadata(
        &mut self,
        id: ExprId,
        metadata: serde_json::Value,
    ) -> Result<(), ModelError> {
        self.ensure_expr_exists(id)?;
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(id, metadata);
        Ok(())
    }

    /// Get metadata for a node.
    pub fn metadata(&self, id: ExprId) -> Option<&serde_json::Value> {
        self.metadata.as_ref().and_then(|meta| meta.get(&id))
    }
}
