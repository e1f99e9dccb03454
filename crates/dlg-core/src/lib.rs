pub mod call;
pub mod commands;
pub mod error;
pub mod graph;
pub mod output;
pub mod types;
pub mod value;
pub mod variables;

pub use call::{Argument, CommandCall, Condition};
pub use commands::{CommandFn, CommandTable, ASSIGN_COMMAND};
pub use error::{DialogueError, ErrorKind};
pub use graph::*;
pub use output::{ChoiceItem, DialogueOutput, LineView};
pub use types::*;
pub use value::*;
pub use variables::VariableStore;
