use serde::{Deserialize, Serialize};

use crate::graph::OptionId;

/// A line as it is shown to the player, with placeholders already filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub speaker: String,
    pub text: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceItem {
    /// Position in the presented list, which skips unavailable options.
    pub index: usize,
    pub option: OptionId,
    pub text: String,
    pub was_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogueOutput {
    Line(LineView),
    Choices {
        line: LineView,
        items: Vec<ChoiceItem>,
    },
    End,
}
