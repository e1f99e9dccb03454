use serde::{Deserialize, Serialize};

use crate::error::DialogueError;
use crate::types::ValueType;
use crate::value::Value;
use crate::variables::VariableStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Argument {
    Literal(Value),
    /// `$name` reference, resolved right before the call.
    Variable(String),
}

impl Argument {
    pub fn resolve(&self, variables: &VariableStore) -> Result<Value, DialogueError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Variable(name) => variables.get(name).cloned(),
        }
    }

    /// Type the argument has against the current variable state.
    pub fn current_type(&self, variables: &VariableStore) -> Result<ValueType, DialogueError> {
        match self {
            Self::Literal(value) => Ok(value.value_type()),
            Self::Variable(name) => Ok(variables.get(name)?.value_type()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandCall {
    pub name: String,
    pub args: Vec<Argument>,
}

impl CommandCall {
    pub fn new(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A command call gating a branch arm or an option. Its command returns a
/// boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition {
    pub call: CommandCall,
}

impl Condition {
    pub fn new(call: CommandCall) -> Self {
        Self { call }
    }
}
