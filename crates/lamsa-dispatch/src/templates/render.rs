//! `{{variable}}` substitution.

use serde_json::Value;

use lamsa_entity::notification::{Language, RenderedMessage, Template};

/// Render a template for one language with the given variables.
///
/// Unknown tokens are left literally in place. A `{{name}}` surviving
/// into output flags a caller that forgot a variable, which is easier
/// to spot than silently empty text.
pub fn render(template: &Template, language: Language, variables: &Value) -> RenderedMessage {
    RenderedMessage {
        title: substitute(template.title.get(language), variables),
        body: substitute(template.body.get(language), variables),
        action_text: template
            .action_text
            .as_ref()
            .map(|t| substitute(t.get(language), variables)),
    }
}

fn substitute(text: &str, variables: &Value) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match variables.get(name).and_then(stringify) {
                    Some(value) => out.push_str(&value),
                    None => {
                        // Keep the literal token.
                        out.push_str(&rest[start..start + 2 + end + 2]);
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated token, emit the remainder as-is.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Variables arrive as JSON; strings are used verbatim, numbers and
/// booleans are formatted, anything structured is rejected.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_known_variables() {
        assert_eq!(
            substitute("Hi {{name}}", &json!({"name": "Sara"})),
            "Hi Sara"
        );
        assert_eq!(
            substitute("Booking #{{ref}} at {{time}}", &json!({"ref": 42, "time": "15:30"})),
            "Booking #42 at 15:30"
        );
    }

    #[test]
    fn missing_variable_keeps_literal_token() {
        assert_eq!(substitute("Hi {{name}}", &json!({})), "Hi {{name}}");
        assert_eq!(
            substitute("Hi {{name}}", &json!({"name": null})),
            "Hi {{name}}"
        );
    }

    #[test]
    fn unterminated_token_passes_through() {
        assert_eq!(substitute("Hi {{name", &json!({"name": "Sara"})), "Hi {{name");
    }

    #[test]
    fn structured_values_are_not_substituted() {
        assert_eq!(
            substitute("x={{v}}", &json!({"v": {"nested": true}})),
            "x={{v}}"
        );
    }
}
