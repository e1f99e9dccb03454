use dlg_compiler::compile_script;
use dlg_core::{CommandTable, DialogueError, DialogueGraph, VariableStore};
use dlg_runtime::DialogueEngine;

#[derive(Debug, Default)]
pub struct CreateEngineOptions {
    pub source_lines: Vec<String>,
    pub commands: Option<CommandTable>,
    pub variables: Option<VariableStore>,
    /// Started right away when set; otherwise the caller calls `start`.
    pub entry_dialogue: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileDialoguesResult {
    pub graph: DialogueGraph,
    /// Variables declared by the script's `$name = literal` lines.
    pub variables: VariableStore,
}

/// Splits script text into the lines `compile_dialogues` expects.
pub fn source_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

pub fn compile_dialogues<S: AsRef<str>>(
    source_lines: &[S],
    commands: &CommandTable,
) -> Result<CompileDialoguesResult, DialogueError> {
    let mut variables = VariableStore::new();
    let graph = compile_script(source_lines, commands, &mut variables)?;
    Ok(CompileDialoguesResult { graph, variables })
}

pub fn create_engine(options: CreateEngineOptions) -> Result<DialogueEngine, DialogueError> {
    let commands = options.commands.unwrap_or_default();
    let mut variables = options.variables.unwrap_or_default();
    let graph = compile_script(&options.source_lines, &commands, &mut variables)?;
    log::debug!(
        "engine built over {} dialogue(s), {} variable(s)",
        graph.dialogue_count(),
        variables.len()
    );

    let mut engine = DialogueEngine::new(graph, commands, variables);
    if let Some(entry) = options.entry_dialogue {
        engine.start(&entry)?;
    }
    Ok(engine)
}
