use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::search::SEARCH_MARKER;

/// A record that the provider invoked an auxiliary capability (e.g. web
/// search) while generating a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStep {
    pub tool: String,
    #[serde(default)]
    pub result: Value,
}

/// Pull the canonical text payload out of a provider response, whatever its
/// shape. Prefers chat-completion style `choices[0].message.content`, falls
/// back to a top-level `content` string, then to empty. Never fails; the
/// caller decides whether an empty reply is an error.
pub fn extract_text(raw: &Value) -> String {
    if let Some(text) = raw
        .get("choices")
        .and_then(|choices| choices.as_array())
        .and_then(|choices| choices.first())
        .and_then(|first| first.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
    {
        return text.to_string();
    }

    raw.get("content")
        .and_then(|content| content.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Return the tool invocations recorded in a provider response, or an empty
/// sequence when the `steps` field is absent or not an array.
pub fn extract_tool_steps(raw: &Value) -> Vec<ToolStep> {
    let Some(steps) = raw.get("steps").and_then(|steps| steps.as_array()) else {
        return Vec::new();
    };

    steps
        .iter()
        .map(|step| ToolStep {
            tool: step
                .get("tool")
                .and_then(|tool| tool.as_str())
                .unwrap_or_default()
                .to_string(),
            result: step.get("result").cloned().unwrap_or(Value::Null),
        })
        .collect()
}

/// Derived, never stored: a search ran iff the text carries the search
/// context marker or the provider recorded tool steps.
pub fn search_performed(text: &str, steps: &[ToolStep]) -> bool {
    text.contains(SEARCH_MARKER) || !steps.is_empty()
}

/// Convert the system prompt and conversation history to the wire format
/// shared by all chat-completions style APIs (OpenAI, Groq, XAI).
pub fn messages_to_chat_spec(system: &str, messages: &[Message]) -> Vec<Value> {
    let mut spec = vec![json!({
        "role": "system",
        "content": system
    })];
    for message in messages {
        spec.push(json!({
            "role": message.role,
            "content": message.content
        }));
    }
    spec
}

pub fn check_context_length_error(error: &Value) -> Option<ProviderError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ProviderError::ContextLengthExceeded(message))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_chat_completion_shape() {
        let raw = json!({"choices": [{"message": {"content": "hi"}}]});
        assert_eq!(extract_text(&raw), "hi");
    }

    #[test]
    fn test_extract_text_plain_content_shape() {
        let raw = json!({"content": "hi"});
        assert_eq!(extract_text(&raw), "hi");
    }

    #[test]
    fn test_extract_text_prefers_choices() {
        let raw = json!({
            "choices": [{"message": {"content": "from choices"}}],
            "content": "from content"
        });
        assert_eq!(extract_text(&raw), "from choices");
    }

    #[test]
    fn test_extract_text_empty_object() {
        assert_eq!(extract_text(&json!({})), "");
    }

    #[test]
    fn test_extract_text_empty_choices_falls_back() {
        let raw = json!({"choices": [], "content": "fallback"});
        assert_eq!(extract_text(&raw), "fallback");
    }

    #[test]
    fn test_extract_tool_steps() {
        let raw = json!({"steps": [{"tool": "search"}]});
        let steps = extract_tool_steps(&raw);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].tool, "search");
        assert_eq!(steps[0].result, Value::Null);
    }

    #[test]
    fn test_extract_tool_steps_absent() {
        assert_eq!(extract_tool_steps(&json!({})).len(), 0);
        assert_eq!(extract_tool_steps(&json!({"steps": "nope"})).len(), 0);
    }

    #[test]
    fn test_search_performed_from_marker() {
        let text = "SEARCH RESULTS FOR: eigenvalues\n...";
        assert!(search_performed(text, &[]));
    }

    #[test]
    fn test_search_performed_from_steps() {
        let steps = vec![ToolStep {
            tool: "search".to_string(),
            result: Value::Null,
        }];
        assert!(search_performed("no marker here", &steps));
    }

    #[test]
    fn test_search_not_performed() {
        assert!(!search_performed("plain reply", &[]));
    }

    #[test]
    fn test_messages_to_chat_spec() {
        let messages = vec![Message::user("Hello"), Message::assistant("Hi!")];
        let spec = messages_to_chat_spec("You are helpful.", &messages);

        assert_eq!(spec.len(), 3);
        assert_eq!(spec[0]["role"], "system");
        assert_eq!(spec[0]["content"], "You are helpful.");
        assert_eq!(spec[1]["role"], "user");
        assert_eq!(spec[2]["role"], "assistant");
        assert_eq!(spec[2]["content"], "Hi!");
    }

    #[test]
    fn test_check_context_length_error() {
        let error = json!({
            "code": "context_length_exceeded",
            "message": "This message is too long"
        });
        let result = check_context_length_error(&error);
        assert!(matches!(
            result,
            Some(ProviderError::ContextLengthExceeded(_))
        ));

        let error = json!({"code": "other_error", "message": "Some other error"});
        assert!(check_context_length_error(&error).is_none());
    }
}
