#[derive(Debug, Clone)]
pub(crate) struct LoadedScript {
    /// Path shown in reports; relative to the scanned directory when there
    /// is one.
    pub(crate) label: String,
    pub(crate) lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineCommandAction {
    NotHandled,
    Continue,
    RefreshBoundary,
    Quit,
}
