use std::sync::OnceLock;

use dlg_core::{DialogueError, ErrorKind, DEFAULT_EXPRESSION};
use regex::Regex;

const RETURN_MARKER: &str = "<-";
const END_MARKER: &str = "[[end]]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineParts<'a> {
    pub(crate) speaker: String,
    pub(crate) text: String,
    pub(crate) expression: String,
    pub(crate) command_block: Option<&'a str>,
    pub(crate) return_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionParts<'a> {
    pub(crate) text: String,
    pub(crate) condition_source: Option<&'a str>,
    pub(crate) command_block: Option<&'a str>,
    /// `[[end]]` options finish the dialogue when selected.
    pub(crate) terminal: bool,
}

fn malformed(message: String) -> DialogueError {
    DialogueError::new(ErrorKind::Structure(message))
}

pub(crate) fn parse_line(content: &str) -> Result<LineParts<'_>, DialogueError> {
    let (rest, trailing_markers) = take_return_markers(content);
    let (rest, command_block) = split_trailing_group(rest);
    let (rest, inner_markers) = take_return_markers(rest);
    let (rest, expression) = take_expression_tag(rest);

    let Some((speaker, text)) = rest.split_once(':') else {
        return Err(malformed(format!(
            "`{}` is not formatted as `speaker: text`",
            content
        )));
    };
    let speaker = speaker.trim();
    let text = text.trim();
    if speaker.is_empty() || text.is_empty() {
        return Err(malformed(format!(
            "`{}` needs both a speaker and a text",
            content
        )));
    }

    Ok(LineParts {
        speaker: speaker.to_string(),
        text: text.replace("\\n", "\n"),
        expression: expression.unwrap_or_else(|| DEFAULT_EXPRESSION.to_string()),
        command_block,
        return_depth: trailing_markers + inner_markers,
    })
}

pub(crate) fn parse_option(content: &str) -> Result<OptionParts<'_>, DialogueError> {
    let body = content.strip_prefix('>').unwrap_or(content).trim();
    let (body, command_block) = split_trailing_group(body);
    let (body, terminal) = match body.strip_suffix(END_MARKER) {
        Some(stripped) => (stripped.trim_end(), true),
        None => (body, false),
    };
    let (condition_source, text) = take_leading_condition(body)?;
    if text.is_empty() {
        return Err(malformed(format!("option `{}` has no text", content)));
    }

    Ok(OptionParts {
        text: text.to_string(),
        condition_source,
        command_block,
        terminal,
    })
}

/// Condition text of an `(if ...)` or `(else if ...)` line; `None` for a
/// bare `(else)`.
pub(crate) fn branch_condition(content: &str) -> Result<Option<&str>, DialogueError> {
    let wrapped = content.starts_with('(') && matching_close(content, 0) == Some(content.len() - 1);
    if !wrapped {
        return Err(malformed(format!(
            "`{}` must be a single parenthesised branch",
            content
        )));
    }
    let inner = content[1..content.len() - 1].trim();

    let condition = if let Some(rest) = inner.strip_prefix("else") {
        let rest = rest.trim();
        if rest.is_empty() {
            return Ok(None);
        }
        rest.strip_prefix("if")
    } else {
        inner.strip_prefix("if")
    };

    match condition.map(str::trim) {
        Some(condition) if !condition.is_empty() => Ok(Some(condition)),
        _ => Err(malformed(format!("`{}` is missing its condition", content))),
    }
}

fn take_leading_condition(body: &str) -> Result<(Option<&str>, &str), DialogueError> {
    if !body.starts_with("(if") {
        return Ok((None, body));
    }
    let close = matching_close(body, 0)
        .ok_or_else(|| malformed(format!("condition of option `{}` is not closed", body)))?;
    let condition = body[1..close].trim_start_matches("if").trim();
    if condition.is_empty() {
        return Err(malformed(format!("option `{}` has an empty condition", body)));
    }
    Ok((Some(condition), body[close + 1..].trim()))
}

fn take_return_markers(text: &str) -> (&str, usize) {
    let mut rest = text.trim_end();
    let mut depth = 0usize;
    while let Some(stripped) = rest.strip_suffix(RETURN_MARKER) {
        depth += 1;
        rest = stripped.trim_end();
    }
    (rest, depth)
}

fn take_expression_tag(text: &str) -> (String, Option<String>) {
    let Some(captures) = expression_tag_regex().captures(text) else {
        return (text.to_string(), None);
    };
    let Some(whole) = captures.get(0) else {
        return (text.to_string(), None);
    };
    let tag = captures
        .get(1)
        .map(|inner| inner.as_str().trim())
        .filter(|inner| !inner.is_empty())
        .map(str::to_string);
    let rest = format!("{}{}", &text[..whole.start()], &text[whole.end()..]);
    (rest, tag)
}

/// Splits off the last top-level `( ... )` group closing `text`. A group
/// opening at the very start is part of the body, not a command block.
pub(crate) fn split_trailing_group(text: &str) -> (&str, Option<&str>) {
    let text = text.trim_end();
    if !text.ends_with(')') {
        return (text, None);
    }

    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut group_start = None;
    for (index, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => {
                if depth == 0 {
                    group_start = Some(index);
                }
                depth += 1;
            }
            ')' if !in_quotes => {
                if depth == 0 {
                    return (text, None);
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    match group_start {
        Some(start) if depth == 0 && !in_quotes && start > 0 => (
            text[..start].trim_end(),
            Some(&text[start + 1..text.len() - 1]),
        ),
        _ => (text, None),
    }
}

/// Splits on `separator` outside quotes and parentheses.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth = depth.saturating_sub(1),
            _ if ch == separator && !in_quotes && depth == 0 => {
                parts.push(&text[start..index]);
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Splits on `word` standing alone between whitespace, outside quotes and
/// parentheses. Parts keep their surrounding whitespace.
pub(crate) fn split_top_level_word<'t>(text: &'t str, word: &str) -> Vec<&'t str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0usize;
    let mut previous = None;
    for (index, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth = depth.saturating_sub(1),
            _ if !in_quotes
                && depth == 0
                && index >= start
                && previous.is_some_and(char::is_whitespace)
                && text[index..].starts_with(word)
                && text[index + word.len()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_whitespace) =>
            {
                parts.push(&text[start..index]);
                start = index + word.len();
            }
            _ => {}
        }
        previous = Some(ch);
    }
    parts.push(&text[start..]);
    parts
}

fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    for (index, ch) in text[open..].char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + index);
                }
            }
            _ => {}
        }
    }
    None
}

fn expression_tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\[\[(.*?)\]\]").expect("expression tag regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_extracts_every_inline_part() {
        let parts = parse_line(r#"Alice [[happy]]: Hi\nthere (Print("x"); $Met = true) <- <-"#)
            .expect("line should parse");
        assert_eq!(parts.speaker, "Alice");
        assert_eq!(parts.text, "Hi\nthere");
        assert_eq!(parts.expression, "happy");
        assert_eq!(parts.command_block, Some(r#"Print("x"); $Met = true"#));
        assert_eq!(parts.return_depth, 2);
    }

    #[test]
    fn parse_line_defaults_expression_and_rejects_missing_parts() {
        let parts = parse_line("NPC: Line 4").expect("line should parse");
        assert_eq!(parts.expression, "neutral");
        assert_eq!(parts.return_depth, 0);
        assert!(parts.command_block.is_none());

        assert!(parse_line("Line 2").is_err());
        assert!(parse_line(":").is_err());
        assert!(parse_line("NPC:   ").is_err());
    }

    #[test]
    fn parse_option_reads_leading_condition_and_trailing_commands() {
        let parts = parse_option("> (if SkillCheck(10)) Do skill check. (IncreaseSkill(5))")
            .expect("option should parse");
        assert_eq!(parts.text, "Do skill check.");
        assert_eq!(parts.condition_source, Some("SkillCheck(10)"));
        assert_eq!(parts.command_block, Some("IncreaseSkill(5)"));
        assert!(!parts.terminal);
    }

    #[test]
    fn parse_option_recognises_end_marker() {
        let parts = parse_option("> Goodbye. [[end]]").expect("option should parse");
        assert_eq!(parts.text, "Goodbye.");
        assert!(parts.terminal);

        assert!(parse_option(">   ").is_err());
        assert!(parse_option("> (if Ready())").is_err());
    }

    #[test]
    fn branch_condition_handles_if_else_if_and_else() {
        assert_eq!(
            branch_condition("(if $Test == true)").expect("if"),
            Some("$Test == true")
        );
        assert_eq!(
            branch_condition("(else if Ready() and $A == 1)").expect("else if"),
            Some("Ready() and $A == 1")
        );
        assert_eq!(branch_condition("(else)").expect("else"), None);
        assert!(branch_condition("(if)").is_err());
        assert!(branch_condition("(if A()) trailing").is_err());
        assert!(branch_condition("(elsewhere)").is_err());
    }

    #[test]
    fn split_helpers_respect_quotes_and_nesting() {
        assert_eq!(
            split_top_level(r#"Print("a;b"); Give(Item(1), 2)"#, ';'),
            vec![r#"Print("a;b")"#, " Give(Item(1), 2)"]
        );
        assert_eq!(
            split_top_level_word(r#"$A == "x and y" and Ready($B and 1) and $C"#, "and"),
            vec![r#"$A == "x and y" "#, " Ready($B and 1) ", " $C"]
        );
        assert_eq!(split_top_level_word("$Band == 1", "and"), vec!["$Band == 1"]);
        assert_eq!(split_trailing_group("(smiles)"), ("(smiles)", None));
        assert_eq!(
            split_trailing_group(r#"NPC: Hi (Print(")"))"#),
            ("NPC: Hi", Some(r#"Print(")")"#))
        );
    }
}
