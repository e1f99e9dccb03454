use std::sync::OnceLock;

use dlg_core::{
    parse_literal, Argument, CommandCall, CommandTable, Condition, DialogueError, ErrorKind,
    ValueType, VariableStore, ASSIGN_COMMAND,
};
use regex::Regex;

use crate::inline::{split_top_level, split_top_level_word};

const ORDERING_COMMANDS: [&str; 4] = ["<", "<=", ">", ">="];

/// Parses inline command blocks and conditions into call descriptors,
/// validated against the registered commands and declared variables.
pub struct ExpressionParser<'a> {
    commands: &'a CommandTable,
    variables: &'a VariableStore,
}

impl<'a> ExpressionParser<'a> {
    pub fn new(commands: &'a CommandTable, variables: &'a VariableStore) -> Self {
        Self {
            commands,
            variables,
        }
    }

    /// `Print("a"); $Met = true`
    pub fn parse_commands(&self, block: &str) -> Result<Vec<CommandCall>, DialogueError> {
        split_top_level(block, ';')
            .into_iter()
            .map(str::trim)
            .filter(|source| !source.is_empty())
            .map(|source| self.parse_command(source))
            .collect()
    }

    pub fn parse_command(&self, source: &str) -> Result<CommandCall, DialogueError> {
        let source = source.trim();
        if let Some(call) = self.parse_call_syntax(source)? {
            self.validate(&call)?;
            return Ok(call);
        }

        if let Some(captures) = assignment_regex().captures(source) {
            let target = &captures[1];
            if !self.variables.contains(target) {
                return Err(DialogueError::undefined_variable(target));
            }
            let value = self.parse_argument(&captures[2])?;
            let call = CommandCall::new(
                ASSIGN_COMMAND,
                vec![Argument::Variable(target.to_string()), value],
            );
            self.validate(&call)?;
            return Ok(call);
        }

        Err(DialogueError::new(ErrorKind::Structure(format!(
            "`{}` is not a valid command",
            source
        ))))
    }

    /// `$A == 1 and Ready()`
    pub fn parse_conditions(&self, source: &str) -> Result<Vec<Condition>, DialogueError> {
        split_top_level_word(source.trim(), "and")
            .into_iter()
            .map(|conjunct| self.parse_condition(conjunct))
            .collect()
    }

    pub fn parse_condition(&self, source: &str) -> Result<Condition, DialogueError> {
        let source = source.trim();
        let call = if let Some(call) = self.parse_call_syntax(source)? {
            call
        } else if let Some(captures) = comparison_regex().captures(source) {
            CommandCall::new(
                &captures[2],
                vec![
                    self.parse_argument(&captures[1])?,
                    self.parse_argument(&captures[3])?,
                ],
            )
        } else {
            return Err(DialogueError::new(ErrorKind::Structure(format!(
                "`{}` is not a valid condition",
                source
            ))));
        };

        self.validate(&call)?;
        let returns = self.commands.signature(&call.name)?.returns;
        if returns != Some(ValueType::Boolean) {
            return Err(DialogueError::new(ErrorKind::NonBooleanCondition {
                name: call.name,
                found: returns.map(ValueType::name).unwrap_or("nothing").to_string(),
            }));
        }
        Ok(Condition::new(call))
    }

    /// `$name` becomes a variable reference; anything else a literal.
    pub fn parse_argument(&self, raw: &str) -> Result<Argument, DialogueError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DialogueError::new(ErrorKind::Structure(
                "empty command argument".to_string(),
            )));
        }

        if let Some(name) = raw.strip_prefix('$') {
            if !self.variables.contains(name) {
                return Err(DialogueError::undefined_variable(name));
            }
            return Ok(Argument::Variable(name.to_string()));
        }

        Ok(Argument::Literal(parse_literal(raw)))
    }

    fn parse_call_syntax(&self, source: &str) -> Result<Option<CommandCall>, DialogueError> {
        let Some(captures) = call_regex().captures(source) else {
            return Ok(None);
        };
        let inner = captures[2].trim();
        let args = if inner.is_empty() {
            Vec::new()
        } else {
            split_top_level(inner, ',')
                .into_iter()
                .map(|arg| self.parse_argument(arg))
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(Some(CommandCall::new(&captures[1], args)))
    }

    fn validate(&self, call: &CommandCall) -> Result<(), DialogueError> {
        let signature = self.commands.signature(&call.name)?;
        let types = call
            .args
            .iter()
            .map(|arg| arg.current_type(self.variables))
            .collect::<Result<Vec<_>, _>>()?;
        signature.check(&call.name, &types)?;

        if let [left, right] = types.as_slice() {
            if ORDERING_COMMANDS.contains(&call.name.as_str()) && left != right {
                return Err(DialogueError::new(ErrorKind::SignatureMismatch {
                    name: call.name.clone(),
                    expected: "two numbers of the same type".to_string(),
                    found: format!("{}, {}", left, right),
                }));
            }
        }
        Ok(())
    }
}

fn call_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(\w+)\s*\((.*)\)$").expect("command call regex"))
}

fn assignment_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\$(\w+)\s*=\s*([^=\s].*)$").expect("assignment regex"))
}

fn comparison_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"^("[^"]*"|[^\s=!<>"]+)\s*(==|!=|<=|>=|<|>)\s*("[^"]*"|[^\s=!<>"]+)$"#)
            .expect("comparison regex")
    })
}
