//! The conversation transcript: roles, content parts, tool calls and
//! tool results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The system prompt. At most one, and first, per transcript.
    System,
    /// The human (or upstream caller) turn.
    User,
    /// A model reply, possibly carrying tool calls.
    Assistant,
    /// The folded-back result of one tool invocation.
    Tool,
}

/// One part of a message's content.
///
/// Text-only content is the common case and should not allocate beyond the
/// string itself; image parts are the exception, not the rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// An image referenced by URL.
    ImageUrl {
        /// The image's URL.
        url: String,
        /// Optional rendering detail hint forwarded to the backend.
        detail: Option<String>,
    },
    /// An inline base64-encoded image.
    ImageBase64 {
        /// Base64-encoded image bytes.
        data: String,
        /// The image's MIME type, e.g. `image/png`.
        mime: String,
    },
}

impl ContentPart {
    /// Build a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Content of a message: a bare string or a sequence of content parts.
///
/// Serializes untagged so a plain string on the wire deserializes straight
/// into [`Content::Text`] without a wrapper object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// The common case: text only, stored without the `Vec` wrapper.
    Text(String),
    /// A heterogeneous sequence of parts (text plus images).
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Construct from plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The concatenated text of this content, ignoring non-text parts.
    pub fn as_text(&self) -> String {
        match self {
            Content::Text(t) => t.clone(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_owned())
    }
}

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique within the run.
    pub id: String,
    /// The tool's registered name.
    pub name: String,
    /// Arguments as a JSON object.
    pub arguments: Value,
}

/// The outcome of dispatching one [`ToolCall`].
///
/// `result` and `error` are mutually exclusive: a successful dispatch
/// carries `result` (possibly JSON `null`) and no `error`; a failed one
/// carries `error` and no `result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The [`ToolCall::id`] this result answers.
    pub call_id: String,
    /// The tool's name, echoed for convenience.
    pub name: String,
    /// The tool's return value, on success.
    pub result: Option<Value>,
    /// A human-readable failure message, on failure.
    pub error: Option<String>,
}

impl ToolResult {
    /// Build a successful result.
    pub fn ok(call_id: impl Into<String>, name: impl Into<String>, result: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            result: Some(result),
            error: None,
        }
    }

    /// Build a failed result.
    pub fn failed(call_id: impl Into<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    /// Whether this result represents a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One entry in a run's transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who said it.
    pub role: Role,
    /// What was said.
    pub content: Content,
    /// Present on `assistant` messages that requested tool calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Present on `tool` messages: the call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Present on `tool` messages: the tool's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Build a system message.
    pub fn system(content: impl Into<Content>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<Content>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Build an assistant message with no tool calls.
    pub fn assistant(content: impl Into<Content>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Build an assistant message carrying tool calls.
    pub fn assistant_with_tool_calls(content: impl Into<Content>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            name: None,
        }
    }

    /// Build a `tool` message folding a [`ToolResult`] back into the
    /// transcript.
    ///
    /// The content is the JSON-serialized result value, or the error
    /// message on failure, matching the executor's fold-never-raise
    /// contract.
    pub fn tool_result(result: &ToolResult) -> Self {
        let content = match (&result.result, &result.error) {
            (Some(value), _) => value.to_string(),
            (None, Some(err)) => err.clone(),
            (None, None) => "null".to_string(),
        };
        Self {
            role: Role::Tool,
            content: Content::Text(content),
            tool_calls: None,
            tool_call_id: Some(result.call_id.clone()),
            name: Some(result.name.clone()),
        }
    }

    /// `true` for assistant messages with a non-empty `tool_calls` list.
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|tc| !tc.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_content_serializes_as_bare_string() {
        let msg = Message::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"], serde_json::json!("hello"));
    }

    #[test]
    fn tool_result_fold_uses_error_when_present() {
        let failed = ToolResult::failed("call_1", "search", "Tool not found: search");
        let msg = Message::tool_result(&failed);
        assert_eq!(msg.content.as_text(), "Tool not found: search");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn tool_result_fold_serializes_json_result() {
        let ok = ToolResult::ok("call_2", "calc", serde_json::json!({"sum": 4}));
        let msg = Message::tool_result(&ok);
        assert_eq!(msg.content.as_text(), r#"{"sum":4}"#);
    }

    #[test]
    fn has_tool_calls_false_for_empty_list() {
        let msg = Message::assistant_with_tool_calls("", vec![]);
        assert!(!msg.has_tool_calls());
    }
}
