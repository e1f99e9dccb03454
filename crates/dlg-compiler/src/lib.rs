mod declarations;
mod expression;
mod inline;
mod source_line;
mod state;

use dlg_core::{CommandTable, DialogueError, DialogueGraph, VariableStore};

pub use expression::ExpressionParser;

use declarations::take_variable_declarations;
use source_line::read_source_line;
use state::CompilerState;

/// Compiles dialogue script lines into a graph.
///
/// Top-level `$name = literal` declarations are registered in `variables`
/// before any dialogue is read. Commands and conditions are checked against
/// `commands` and the declared variables. Errors carry the 1-based line
/// they were raised on.
pub fn compile_script<S: AsRef<str>>(
    lines: &[S],
    commands: &CommandTable,
    variables: &mut VariableStore,
) -> Result<DialogueGraph, DialogueError> {
    let remaining = take_variable_declarations(lines, variables);
    let variables = &*variables;
    let mut state = CompilerState::new(ExpressionParser::new(commands, variables));

    for (index, raw) in remaining.iter().enumerate() {
        let Some(line) = read_source_line(index + 1, raw) else {
            continue;
        };
        state
            .apply(&line)
            .map_err(|error| error.at_line(line.number))?;
    }

    state.finish()
}
