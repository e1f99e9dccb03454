use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("{0}")]
    Structure(String),
    #[error("script does not declare any dialogue")]
    EmptyScript,
    #[error("command `{0}` is not registered")]
    UnknownCommand(String),
    #[error("command `{name}` expects ({expected}) but got ({found})")]
    SignatureMismatch {
        name: String,
        expected: String,
        found: String,
    },
    #[error("condition `{name}` must return boolean but returns {found}")]
    NonBooleanCondition { name: String, found: String },
    #[error("variable `${0}` is not defined")]
    UndefinedVariable(String),
    #[error("command `{name}` failed: {message}")]
    CommandFailed { name: String, message: String },
    #[error("dialogue `{0}` does not exist")]
    UnknownDialogue(String),
    #[error("branch has no applicable arm")]
    NoApplicableArm,
    #[error("traversal passed {0} relay lines without reaching text")]
    TraversalGuard(usize),
    #[error("{0}")]
    Session(String),
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Structure(_) => "SCRIPT_STRUCTURE",
            Self::EmptyScript => "SCRIPT_EMPTY",
            Self::UnknownCommand(_) => "COMMAND_UNKNOWN",
            Self::SignatureMismatch { .. } => "COMMAND_SIGNATURE_MISMATCH",
            Self::NonBooleanCondition { .. } => "CONDITION_NOT_BOOLEAN",
            Self::UndefinedVariable(_) => "VARIABLE_UNDEFINED",
            Self::CommandFailed { .. } => "COMMAND_FAILED",
            Self::UnknownDialogue(_) => "DIALOGUE_NOT_FOUND",
            Self::NoApplicableArm => "BRANCH_NO_ARM",
            Self::TraversalGuard(_) => "TRAVERSAL_GUARD_EXCEEDED",
            Self::Session(_) => "SESSION_STATE",
        }
    }
}

/// Error raised by compilation, command invocation or traversal.
///
/// `line` is the 1-based source line when the failure can be attributed to
/// one.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{}{kind}", line_prefix(.line))]
pub struct DialogueError {
    pub kind: ErrorKind,
    pub line: Option<usize>,
}

fn line_prefix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("line {}: ", line),
        None => String::new(),
    }
}

impl DialogueError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, line: None }
    }

    pub fn structure(line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Structure(message.into()),
            line: Some(line),
        }
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Session(message.into()))
    }

    pub fn unknown_command(name: &str) -> Self {
        Self::new(ErrorKind::UnknownCommand(name.to_string()))
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVariable(name.to_string()))
    }

    /// Attaches a source line unless one is already recorded.
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl From<ErrorKind> for DialogueError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
