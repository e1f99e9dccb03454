use dlg_api::{create_engine, CreateEngineOptions};
use dlg_core::{parse_literal, CommandTable, ParamType, Value};
use dlg_runtime::DialogueEngine;

use crate::{CliError, LoadedScript};

/// Commands available to every script run from the CLI.
pub(crate) fn host_commands() -> CommandTable {
    let mut commands = CommandTable::new();
    commands.register("Print", vec![ParamType::Text], None, |args| {
        for value in args {
            println!("[print] {}", value);
        }
        Ok(None)
    });
    commands
}

/// Parses a `--var` override such as `Gold=10` or `$Name="Alex"`.
pub(crate) fn parse_var_assignment(raw: &str) -> Result<(String, Value), CliError> {
    let invalid = || {
        CliError::new(
            "CLI_VAR_INVALID",
            format!("expected NAME=LITERAL but got `{}`", raw),
        )
    };
    let (name, literal) = raw.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    let name = name.strip_prefix('$').unwrap_or(name);
    if name.is_empty() || !name.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        return Err(invalid());
    }
    Ok((name.to_string(), parse_literal(literal.trim())))
}

/// Builds an engine over `script` with the host commands and applies the
/// `--var` overrides on top of the declared variables. An override must keep
/// the declared type. The session is not started.
pub(crate) fn create_engine_for_script(
    script: &LoadedScript,
    vars: &[String],
) -> Result<DialogueEngine, CliError> {
    let overrides = vars
        .iter()
        .map(|raw| parse_var_assignment(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut engine = create_engine(CreateEngineOptions {
        source_lines: script.lines.clone(),
        commands: Some(host_commands()),
        ..CreateEngineOptions::default()
    })
    .map_err(|error| scoped(script, error.into()))?;

    for (name, value) in overrides {
        if let Ok(declared) = engine.variables().get(&name) {
            if declared.value_type() != value.value_type() {
                return Err(CliError::new(
                    "CLI_VAR_INVALID",
                    format!(
                        "`{}` is declared as {} but the override is {}",
                        name,
                        declared.value_type(),
                        value.value_type()
                    ),
                ));
            }
        }
        log::debug!("override ${} = {}", name, value);
        engine.variables_mut().set(name, value);
    }
    Ok(engine)
}

/// Prefixes the script label so multi-file reports name the failing file.
pub(crate) fn scoped(script: &LoadedScript, error: CliError) -> CliError {
    CliError::new(error.code, format!("{}: {}", script.label, error.message))
}
