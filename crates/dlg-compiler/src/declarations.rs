use std::sync::OnceLock;

use dlg_core::{parse_literal, Value, VariableStore};
use regex::Regex;

/// Registers top-level `$name = literal` lines in `variables` and returns
/// the source with those lines blanked, so line numbers stay stable.
/// A trailing `//` comment is allowed after the value; inside a quoted value
/// `//` is plain text.
pub(crate) fn take_variable_declarations<S: AsRef<str>>(
    lines: &[S],
    variables: &mut VariableStore,
) -> Vec<String> {
    lines
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            let Some(captures) = declaration_regex().captures(raw.trim_end()) else {
                return raw.to_string();
            };
            let value = declared_value(&captures[2]);
            log::trace!("declared ${} = {:?}", &captures[1], value);
            variables.set(&captures[1], value);
            String::new()
        })
        .collect()
}

fn declared_value(raw: &str) -> Value {
    if raw.starts_with('"') {
        return Value::Text(raw.trim_matches('"').to_string());
    }
    parse_literal(raw)
}

fn declaration_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"^\$(\w+)\s*=\s*("[^"]*"|-?[\w.]+)\s*(?://.*)?$"#)
            .expect("variable declaration regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_are_registered_and_blanked() {
        let mut variables = VariableStore::new();
        let lines = [
            "$Gold = 10",
            "$Name = \"Alex Smith\" // hero",
            "$Met=false",
            "- D",
            "\t$Nested = 1",
            "NPC: Hi ($Gold = 2)",
        ];

        let remaining = take_variable_declarations(&lines, &mut variables);

        assert_eq!(remaining[..3], ["", "", ""]);
        assert_eq!(remaining[3], "- D");
        assert_eq!(remaining[4], "\t$Nested = 1");
        assert_eq!(variables.get("Gold").expect("gold"), &Value::Integer(10));
        assert_eq!(
            variables.get("Name").expect("name"),
            &Value::from("Alex Smith")
        );
        assert_eq!(variables.get("Met").expect("met"), &Value::Boolean(false));
        assert!(!variables.contains("Nested"));
    }

    #[test]
    fn quoted_values_may_contain_comment_markers() {
        let mut variables = VariableStore::new();
        let lines = ["$Url = \"http://x\"", "$Note = \"a//b\" // trailing", "$Max = 3 //cap"];

        let remaining = take_variable_declarations(&lines, &mut variables);

        assert_eq!(remaining, ["", "", ""]);
        assert_eq!(variables.get("Url").expect("url"), &Value::from("http://x"));
        assert_eq!(variables.get("Note").expect("note"), &Value::from("a//b"));
        assert_eq!(variables.get("Max").expect("max"), &Value::Integer(3));
    }
}
