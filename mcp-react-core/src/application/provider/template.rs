use serde::Deserialize;
use serde_json::{Map, Value};

/// Prompt as handed over by the harness: plain text or a prompt object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PromptInput {
    Text(String),
    Object(Map<String, Value>),
}

impl PromptInput {
    /// The prompt text: the string itself, else `raw`, else `label`, else the object as JSON.
    pub fn text(&self) -> String {
        match self {
            PromptInput::Text(text) => text.clone(),
            PromptInput::Object(map) => ["raw", "label"]
                .iter()
                .find_map(|key| {
                    map.get(*key)
                        .and_then(Value::as_str)
                        .filter(|value| !value.is_empty())
                })
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
        }
    }
}

impl From<&str> for PromptInput {
    fn from(value: &str) -> Self {
        PromptInput::Text(value.to_string())
    }
}

impl From<String> for PromptInput {
    fn from(value: String) -> Self {
        PromptInput::Text(value)
    }
}

/// Per-call context; `vars` fill `{{key}}` placeholders in the prompt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallContext {
    #[serde(default)]
    pub vars: Map<String, Value>,
}

impl CallContext {
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

/// Replace every `{{key}}` with its variable. Strings are inserted verbatim,
/// other values as JSON. Placeholders without a variable are left untouched.
pub fn substitute(template: &str, vars: &Map<String, Value>) -> String {
    vars.iter().fold(template.to_string(), |text, (key, value)| {
        let placeholder = format!("{{{{{key}}}}}");
        let replacement = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        text.replace(&placeholder, &replacement)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replaces_every_occurrence() {
        let context = CallContext::default().with_var("city", "Paris");
        assert_eq!(
            substitute("Weather in {{city}}? Is {{city}} sunny?", &context.vars),
            "Weather in Paris? Is Paris sunny?"
        );
    }

    #[test]
    fn leaves_unmatched_placeholders() {
        let context = CallContext::default().with_var("a", "1");
        assert_eq!(substitute("{{a}} and {{b}}", &context.vars), "1 and {{b}}");
    }

    #[test]
    fn non_string_values_are_inserted_as_json() {
        let context = CallContext::default()
            .with_var("n", 3)
            .with_var("flags", json!(["x", "y"]));
        assert_eq!(
            substitute("{{n}} {{flags}}", &context.vars),
            "3 [\"x\",\"y\"]"
        );
    }

    #[test]
    fn prompt_object_prefers_raw_then_label() {
        let raw: PromptInput =
            serde_json::from_value(json!({ "raw": "raw text", "label": "label" })).expect("prompt");
        assert_eq!(raw.text(), "raw text");

        let label: PromptInput = serde_json::from_value(json!({ "label": "label only" })).expect("prompt");
        assert_eq!(label.text(), "label only");

        let other: PromptInput = serde_json::from_value(json!({ "id": 7 })).expect("prompt");
        assert_eq!(other.text(), "{\"id\":7}");
    }

    #[test]
    fn plain_string_prompt_is_used_as_is() {
        let prompt: PromptInput = serde_json::from_value(json!("hello")).expect("prompt");
        assert_eq!(prompt.text(), "hello");
    }
}
