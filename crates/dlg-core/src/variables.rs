use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DialogueError;
use crate::value::Value;

/// Named script variables, stored without their `$` sigil.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    values: BTreeMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Result<&Value, DialogueError> {
        self.values
            .get(name)
            .ok_or_else(|| DialogueError::undefined_variable(name))
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_fails_for_missing_variable() {
        let store = VariableStore::new();
        let error = store.get("Gold").expect_err("missing variable should fail");
        assert_eq!(error.code(), "VARIABLE_UNDEFINED");
    }

    #[test]
    fn set_overwrites_existing_value_and_type() {
        let mut store = VariableStore::new();
        store.set("Gold", 10);
        store.set("Gold", "plenty");
        assert_eq!(store.get("Gold").expect("gold"), &Value::from("plenty"));
        assert_eq!(store.len(), 1);
    }
}
