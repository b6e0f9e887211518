//! Parameter store methods.

use crate::model::Model;
use crate::model::error::ModelError;
use crate::params::{Parameters, TIME_LIMIT};

impl Model {
    /// Set a float parameter. NaN is rejected.
    pub fn set_param(&mut self, key: impl Into<String>, value: f64) -> Result<(), ModelError> {
        let key = key.into();
        if value.is_nan() {
            return Err(ModelError::InvalidParameter {
                key,
                reason: "value is NaN".to_string(),
            });
        }
        tracing::debug!(
            component = "model",
            operation = "set_param",
            status = "success",
            key = %key,
            value,
            "Set parameter"
        );
        self.parameters.insert_float(key, value);
        Ok(())
    }

    /// Get a float parameter.
    pub fn get_param(&self, key: &str) -> Result<f64, ModelError> {
        self.parameters
            .float(key)
            .ok_or_else(|| ModelError::UnknownParameter(key.to_string()))
    }

    /// Time limit in seconds (+infinity unless set).
    pub fn time_limit(&self) -> f64 {
        self.parameters.float(TIME_LIMIT).unwrap_or(f64::INFINITY)
    }

    pub fn set_time_limit(&mut self, seconds: f64) -> Result<(), ModelError> {
        self.set_param(TIME_LIMIT, seconds)
    }

    /// Set a string parameter.
    pub fn set_string_param(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ModelError> {
        let key = key.into();
        let value = value.into();
        tracing::debug!(
            component = "model",
            operation = "set_string_param",
            status = "success",
            key = %key,
            value = %value,
            "Set string parameter"
        );
        self.parameters.insert_string(key, value);
        Ok(())
    }

    /// Get a string parameter.
    pub fn get_string_param(&self, key: &str) -> Result<&str, ModelError> {
        self.parameters
            .string(key)
            .ok_or_else(|| ModelError::UnknownParameter(key.to_string()))
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}
