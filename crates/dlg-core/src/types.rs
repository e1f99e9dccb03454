use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DialogueError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of one command parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamType {
    Integer,
    Float,
    Boolean,
    Text,
    /// Integer or float.
    Number,
    Any,
}

impl ParamType {
    pub fn accepts(self, ty: ValueType) -> bool {
        match self {
            Self::Integer => ty == ValueType::Integer,
            Self::Float => ty == ValueType::Float,
            Self::Boolean => ty == ValueType::Boolean,
            Self::Text => ty == ValueType::Text,
            Self::Number => ty.is_numeric(),
            Self::Any => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Number => "number",
            Self::Any => "any",
        }
    }
}

impl From<ValueType> for ParamType {
    fn from(value: ValueType) -> Self {
        match value {
            ValueType::Integer => Self::Integer,
            ValueType::Float => Self::Float,
            ValueType::Boolean => Self::Boolean,
            ValueType::Text => Self::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSignature {
    pub params: Vec<ParamType>,
    pub returns: Option<ValueType>,
}

impl CommandSignature {
    pub fn new(params: Vec<ParamType>, returns: Option<ValueType>) -> Self {
        Self { params, returns }
    }

    pub fn accepts(&self, found: &[ValueType]) -> bool {
        self.params.len() == found.len()
            && self
                .params
                .iter()
                .zip(found)
                .all(|(param, ty)| param.accepts(*ty))
    }

    /// Checks arity and per-position compatibility of `found` argument types.
    pub fn check(&self, name: &str, found: &[ValueType]) -> Result<(), DialogueError> {
        if self.accepts(found) {
            return Ok(());
        }
        Err(DialogueError::new(ErrorKind::SignatureMismatch {
            name: name.to_string(),
            expected: self.describe_params(),
            found: found
                .iter()
                .map(|ty| ty.name())
                .collect::<Vec<_>>()
                .join(", "),
        }))
    }

    pub fn describe_params(&self) -> String {
        self.params
            .iter()
            .map(|param| param.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
