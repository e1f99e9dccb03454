use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::call::{Argument, CommandCall};
use crate::error::{DialogueError, ErrorKind};
use crate::types::{CommandSignature, ParamType, ValueType};
use crate::value::Value;
use crate::variables::VariableStore;

pub const ASSIGN_COMMAND: &str = "=";

/// Host callable. Errors are plain messages; the table wraps them with the
/// command name.
pub type CommandFn = dyn Fn(&[Value]) -> Result<Option<Value>, String>;

enum CommandBody {
    /// `$name = value`; writes the store instead of reading the left operand.
    Assign,
    /// `<`, `<=`, `>`, `>=` over two numbers of the same variant.
    Ordering(&'static str),
    Native(Box<CommandFn>),
}

struct CommandEntry {
    signature: CommandSignature,
    body: CommandBody,
}

/// Named commands callable from script text, with the comparison and
/// assignment built-ins pre-registered.
pub struct CommandTable {
    entries: HashMap<String, CommandEntry>,
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTable")
            .field("names", &self.names())
            .finish()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    pub fn new() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.install_builtins();
        table
    }

    /// Registers `name`, replacing any previous registration.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        params: Vec<ParamType>,
        returns: Option<ValueType>,
        callable: F,
    ) where
        F: Fn(&[Value]) -> Result<Option<Value>, String> + 'static,
    {
        let name = name.into();
        let entry = CommandEntry {
            signature: CommandSignature::new(params, returns),
            body: CommandBody::Native(Box::new(callable)),
        };
        if self.entries.insert(name.clone(), entry).is_some() {
            log::debug!("command `{}` re-registered", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn signature(&self, name: &str) -> Result<&CommandSignature, DialogueError> {
        self.entries
            .get(name)
            .map(|entry| &entry.signature)
            .ok_or_else(|| DialogueError::unknown_command(name))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names = self.entries.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn call(
        &self,
        call: &CommandCall,
        variables: &mut VariableStore,
    ) -> Result<Option<Value>, DialogueError> {
        self.invoke(&call.name, &call.args, variables)
    }

    /// Resolves `$` arguments from `variables`, checks them against the
    /// signature and runs the command.
    pub fn invoke(
        &self,
        name: &str,
        args: &[Argument],
        variables: &mut VariableStore,
    ) -> Result<Option<Value>, DialogueError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| DialogueError::unknown_command(name))?;

        match &entry.body {
            CommandBody::Assign => {
                let [Argument::Variable(target), source] = args else {
                    return Err(DialogueError::new(ErrorKind::SignatureMismatch {
                        name: name.to_string(),
                        expected: "$variable, any".to_string(),
                        found: describe_arguments(args),
                    }));
                };
                let value = source.resolve(variables)?;
                log::trace!("${} = {:?}", target, value);
                variables.set(target.clone(), value);
                Ok(None)
            }
            CommandBody::Ordering(op) => {
                let values = resolve_arguments(args, variables)?;
                let types = values.iter().map(Value::value_type).collect::<Vec<_>>();
                entry.signature.check(name, &types)?;
                let result = compare_ordered(op, &values).ok_or_else(|| {
                    DialogueError::new(ErrorKind::SignatureMismatch {
                        name: name.to_string(),
                        expected: "two numbers of the same type".to_string(),
                        found: types
                            .iter()
                            .map(|ty| ty.name())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
                })?;
                Ok(Some(Value::Boolean(result)))
            }
            CommandBody::Native(callable) => {
                let values = resolve_arguments(args, variables)?;
                let types = values.iter().map(Value::value_type).collect::<Vec<_>>();
                entry.signature.check(name, &types)?;

                let result = callable(&values).map_err(|message| {
                    DialogueError::new(ErrorKind::CommandFailed {
                        name: name.to_string(),
                        message,
                    })
                })?;

                let returned = result.as_ref().map(Value::value_type);
                if returned != entry.signature.returns {
                    return Err(DialogueError::new(ErrorKind::CommandFailed {
                        name: name.to_string(),
                        message: format!(
                            "declared return {} but produced {}",
                            describe_return(entry.signature.returns),
                            describe_return(returned)
                        ),
                    }));
                }
                Ok(result)
            }
        }
    }

    fn install_builtins(&mut self) {
        for op in ["<", "<=", ">", ">="] {
            self.entries.insert(
                op.to_string(),
                CommandEntry {
                    signature: CommandSignature::new(
                        vec![ParamType::Number, ParamType::Number],
                        Some(ValueType::Boolean),
                    ),
                    body: CommandBody::Ordering(op),
                },
            );
        }
        self.register(
            "==",
            vec![ParamType::Any, ParamType::Any],
            Some(ValueType::Boolean),
            |args| Ok(Some(Value::Boolean(matches!(args, [left, right] if left == right)))),
        );
        self.register(
            "!=",
            vec![ParamType::Any, ParamType::Any],
            Some(ValueType::Boolean),
            |args| Ok(Some(Value::Boolean(matches!(args, [left, right] if left != right)))),
        );
        self.entries.insert(
            ASSIGN_COMMAND.to_string(),
            CommandEntry {
                signature: CommandSignature::new(vec![ParamType::Any, ParamType::Any], None),
                body: CommandBody::Assign,
            },
        );
    }
}

/// `None` when the operands are not two numbers of the same variant.
fn compare_ordered(op: &str, args: &[Value]) -> Option<bool> {
    let ordering = match args {
        [Value::Integer(left), Value::Integer(right)] => Some(left.cmp(right)),
        [Value::Float(left), Value::Float(right)] => left.partial_cmp(right),
        _ => return None,
    };

    let Some(ordering) = ordering else {
        return Some(false);
    };
    Some(match op {
        "<" => ordering == Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        ">" => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    })
}

fn resolve_arguments(
    args: &[Argument],
    variables: &VariableStore,
) -> Result<Vec<Value>, DialogueError> {
    args.iter().map(|arg| arg.resolve(variables)).collect()
}

fn describe_arguments(args: &[Argument]) -> String {
    args.iter()
        .map(|arg| match arg {
            Argument::Literal(value) => value.type_name().to_string(),
            Argument::Variable(name) => format!("${}", name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_return(ty: Option<ValueType>) -> &'static str {
    ty.map(ValueType::name).unwrap_or("nothing")
}
