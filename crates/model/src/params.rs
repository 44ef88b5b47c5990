//! The read-only map of parameter values for a single compilation request.

use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime parameter values, keyed by parameter name.
///
/// Passes consult this read-only; any pass that bases a rewrite decision on a
/// value found here must mark the compilation non-cacheable, since the
/// decision is only valid for this exact binding.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterValues {
    values: HashMap<String, Value>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

impl FromIterator<(String, Value)> for ParameterValues {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
