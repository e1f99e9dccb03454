use std::sync::OnceLock;

use dlg_core::{DialogueError, VariableStore};
use regex::Regex;

/// Replaces every `{$name}` in `text` with the current value of `name`.
pub fn interpolate(text: &str, variables: &VariableStore) -> Result<String, DialogueError> {
    let mut rendered = String::with_capacity(text.len());
    let mut last = 0usize;
    for captures in placeholder_regex().captures_iter(text) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        rendered.push_str(&text[last..whole.start()]);
        rendered.push_str(&variables.get(name.as_str())?.to_string());
        last = whole.end();
    }
    rendered.push_str(&text[last..]);
    Ok(rendered)
}

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\{\$([^{}]*)\}").expect("placeholder regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_replaces_placeholders_with_display_values() {
        let mut variables = VariableStore::new();
        variables.set("Name", "Alex");
        variables.set("Gold", 12);
        variables.set("Met", true);

        let rendered = interpolate("{$Name} has {$Gold} gold ({$Met}).", &variables)
            .expect("interpolate");
        assert_eq!(rendered, "Alex has 12 gold (true).");
        assert_eq!(
            interpolate("no placeholders", &variables).expect("plain"),
            "no placeholders"
        );
    }

    #[test]
    fn interpolate_fails_on_undefined_variable() {
        let variables = VariableStore::new();
        let error = interpolate("Hi {$Missing}", &variables).expect_err("undefined");
        assert_eq!(error.code(), "VARIABLE_UNDEFINED");
    }
}
