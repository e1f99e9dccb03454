use dlg_core::{
    ChoiceItem, CommandTable, DialogueError, DialogueGraph, DialogueOutput, LineId, LineView,
    OptionId, VariableStore,
};

use crate::interpolate::interpolate;
use crate::walker::Walker;

mod boundary;
mod lifecycle;
mod step;


#[derive(Debug, Clone, PartialEq)]
enum Cursor {
    Idle,
    /// Resolved but not yet presented; its commands have not run.
    At(LineId),
    /// Commands have run but the line could not be presented yet.
    Prepared(LineId),
    /// Presented as a plain line.
    Shown(LineId),
    AwaitingChoice {
        line: LineId,
        view: LineView,
        items: Vec<ChoiceItem>,
    },
    Ended,
}

/// Owns a compiled graph together with the commands and variables it runs
/// against, and drives one dialogue session at a time.
#[derive(Debug)]
pub struct DialogueEngine {
    graph: DialogueGraph,
    commands: CommandTable,
    variables: VariableStore,
    dialogue: Option<String>,
    cursor: Cursor,
}
