//! Free-form model parameters.
//!
//! Parameters do not influence evaluation. They are carried by the model for
//! whatever external solver consumes it; `time_limit` is the only key with a
//! default.

use std::collections::BTreeMap;

/// Key of the distinguished time limit parameter, in seconds.
pub const TIME_LIMIT: &str = "time_limit";

/// String-keyed float and string parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    floats: BTreeMap<String, f64>,
    strings: BTreeMap<String, String>,
}

impl Parameters {
    /// Parameters with only the defaults set.
    pub fn new() -> Self {
        let mut floats = BTreeMap::new();
        floats.insert(TIME_LIMIT.to_string(), f64::INFINITY);
        Self {
            floats,
            strings: BTreeMap::new(),
        }
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.floats.insert(TIME_LIMIT.to_string(), seconds);
        self
    }

    /// Set an arbitrary float parameter.
    pub fn with_float(mut self, key: impl Into<String>, value: f64) -> Self {
        self.floats.insert(key.into(), value);
        self
    }

    /// Set an arbitrary string parameter.
    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(key.into(), value.into());
        self
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.floats.get(key).copied()
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub(crate) fn insert_float(&mut self, key: String, value: f64) {
        self.floats.insert(key, value);
    }

    pub(crate) fn insert_string(&mut self, key: String, value: String) {
        self.strings.insert(key, value);
    }

    /// Iterate float parameters in key order.
    pub fn floats(&self) -> impl Iterator<Item = (&str, f64)> {
        self.floats.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterate string parameters in key order.
    pub fn strings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.strings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First NaN float parameter, if any.
    pub(crate) fn first_nan(&self) -> Option<&str> {
        self.floats
            .iter()
            .find_map(|(k, v)| v.is_nan().then_some(k.as_str()))
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}
