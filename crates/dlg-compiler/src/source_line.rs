#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Declaration,
    Option,
    IfBranch,
    ElseBranch,
    Line,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceLine<'a> {
    /// 1-based.
    pub(crate) number: usize,
    pub(crate) indent: usize,
    pub(crate) content: &'a str,
    pub(crate) kind: LineKind,
}

/// Strips the comment and indentation of `raw`. Blank lines yield `None`.
pub(crate) fn read_source_line(number: usize, raw: &str) -> Option<SourceLine<'_>> {
    let without_comment = strip_comment(raw);
    let indent = without_comment
        .chars()
        .take_while(|ch| *ch == '\t')
        .count();
    let content = without_comment.trim_start_matches('\t').trim();
    if content.is_empty() {
        return None;
    }

    Some(SourceLine {
        number,
        indent,
        content,
        kind: classify(content),
    })
}

pub(crate) fn strip_comment(raw: &str) -> &str {
    match raw.find("//") {
        Some(index) => &raw[..index],
        None => raw,
    }
}

fn classify(content: &str) -> LineKind {
    if content.starts_with('-') {
        LineKind::Declaration
    } else if content.starts_with('>') {
        LineKind::Option
    } else if content.starts_with("(if") {
        LineKind::IfBranch
    } else if content.starts_with("(else") {
        LineKind::ElseBranch
    } else {
        LineKind::Line
    }
}
