use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::call::{CommandCall, Condition};
use crate::error::{DialogueError, ErrorKind};

pub const DEFAULT_EXPRESSION: &str = "neutral";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(usize);

impl LineId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl BranchId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl OptionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A spoken line, or a text-less relay line inserted by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub speaker: Option<String>,
    pub text: Option<String>,
    pub expression: String,
    pub commands: Vec<CommandCall>,
    pub next: Option<LineId>,
    pub branch: Option<BranchId>,
    pub options: Vec<OptionId>,
}

impl Line {
    pub fn spoken(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: Some(speaker.into()),
            text: Some(text.into()),
            ..Self::relay()
        }
    }

    pub fn relay() -> Self {
        Self {
            speaker: None,
            text: None,
            expression: DEFAULT_EXPRESSION.to_string(),
            commands: Vec::new(),
            next: None,
            branch: None,
            options: Vec::new(),
        }
    }

    pub fn is_relay(&self) -> bool {
        self.text.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    pub conditions: Vec<Condition>,
    pub body: Option<LineId>,
}

impl Arm {
    pub fn is_default(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub arms: Vec<Arm>,
}

impl Branch {
    pub fn has_default_arm(&self) -> bool {
        self.arms.iter().any(Arm::is_default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueOption {
    pub text: String,
    pub conditions: Vec<Condition>,
    pub commands: Vec<CommandCall>,
    pub next: Option<LineId>,
    pub branch: Option<BranchId>,
    /// Line the option was declared under; target of return markers.
    pub root: LineId,
    pub was_selected: bool,
}

impl DialogueOption {
    pub fn new(text: impl Into<String>, root: LineId) -> Self {
        Self {
            text: text.into(),
            conditions: Vec::new(),
            commands: Vec::new(),
            next: None,
            branch: None,
            root,
            was_selected: false,
        }
    }
}

/// Arena holding every node of a compiled script plus the dialogue entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueGraph {
    entries: BTreeMap<String, LineId>,
    lines: Vec<Line>,
    branches: Vec<Branch>,
    options: Vec<DialogueOption>,
}

impl DialogueGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: Line) -> LineId {
        self.lines.push(line);
        LineId(self.lines.len() - 1)
    }

    pub fn add_branch(&mut self, branch: Branch) -> BranchId {
        self.branches.push(branch);
        BranchId(self.branches.len() - 1)
    }

    pub fn add_option(&mut self, option: DialogueOption) -> OptionId {
        self.options.push(option);
        OptionId(self.options.len() - 1)
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.0]
    }

    pub fn line_mut(&mut self, id: LineId) -> &mut Line {
        &mut self.lines[id.0]
    }

    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id.0]
    }

    pub fn branch_mut(&mut self, id: BranchId) -> &mut Branch {
        &mut self.branches[id.0]
    }

    pub fn option(&self, id: OptionId) -> &DialogueOption {
        &self.options[id.0]
    }

    pub fn option_mut(&mut self, id: OptionId) -> &mut DialogueOption {
        &mut self.options[id.0]
    }

    pub fn insert_entry(&mut self, dialogue: impl Into<String>, line: LineId) {
        self.entries.insert(dialogue.into(), line);
    }

    pub fn entry(&self, dialogue: &str) -> Result<LineId, DialogueError> {
        self.entries
            .get(dialogue)
            .copied()
            .ok_or_else(|| DialogueError::new(ErrorKind::UnknownDialogue(dialogue.to_string())))
    }

    pub fn contains_dialogue(&self, dialogue: &str) -> bool {
        self.entries.contains_key(dialogue)
    }

    /// Dialogue identifiers in sorted order.
    pub fn dialogue_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn dialogue_count(&self) -> usize {
        self.entries.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_ids_address_inserted_nodes() {
        let mut graph = DialogueGraph::new();
        let first = graph.add_line(Line::spoken("NPC", "Hello there"));
        let relay = graph.add_line(Line::relay());
        graph.line_mut(relay).next = Some(first);
        graph.insert_entry("D", relay);

        assert_eq!(graph.entry("D").expect("entry"), relay);
        assert!(graph.line(relay).is_relay());
        assert_eq!(graph.line(first).expression, DEFAULT_EXPRESSION);
        assert_eq!(graph.line_count(), 2);
    }

    #[test]
    fn entry_reports_unknown_dialogue() {
        let graph = DialogueGraph::new();
        let error = graph.entry("missing").expect_err("unknown dialogue should fail");
        assert_eq!(error.code(), "DIALOGUE_NOT_FOUND");
    }

    #[test]
    fn branch_default_arm_detection() {
        let mut branch = Branch::default();
        assert!(!branch.has_default_arm());
        branch.arms.push(Arm::default());
        assert!(branch.has_default_arm());
    }
}
