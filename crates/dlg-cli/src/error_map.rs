use std::fmt::{self, Display};

use dlg_core::DialogueError;

/// Failure reported by the CLI: a stable code plus a human message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CliError {
    pub(crate) code: String,
    pub(crate) message: String,
}

impl CliError {
    pub(crate) fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<DialogueError> for CliError {
    fn from(error: DialogueError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}

fn map_error(code: &'static str, error: impl Display) -> CliError {
    CliError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: CliError) -> i32 {
    log::debug!("command failed with {}", error.code);
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).expect("string json")
    );
    1
}

pub(crate) fn map_player_io(error: std::io::Error) -> CliError {
    map_error("PLAYER_IO", error)
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> CliError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: walkdir::Error) -> CliError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> CliError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_dump(error: serde_json::Error) -> CliError {
    map_error("CLI_DUMP", error)
}
