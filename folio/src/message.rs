//! Message types for agent-model communication.
//!
//! A [`Message`] carries a [`Role`] and optional [`Content`], which is either
//! plain text or a list of [`ContentPart`]s. Uploaded files travel as
//! [`ContentPart::InlineData`] holding a [`Blob`] until a plugin moves them
//! into the artifact store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing instructions.
    System,
    /// User message.
    #[default]
    User,
    /// Assistant (model) message.
    Assistant,
    /// Tool result message.
    Tool,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// Raw bytes with a declared media type, as uploaded by a user or loaded
/// from the artifact store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// MIME type of the data (e.g. `application/pdf`).
    pub mime_type: String,
    /// Raw bytes; base64-encoded when serialized.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// Human-readable file name, if the uploader supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Blob {
    /// Create a blob without a display name.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
            display_name: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Size of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Payloads can be megabytes; keep them out of debug logs.
impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob")
            .field("mime_type", &self.mime_type)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("display_name", &self.display_name)
            .finish()
    }
}

mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// A single part of multi-part message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Inline binary data (an uploaded file).
    InlineData {
        /// The blob.
        inline_data: Blob,
    },
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an inline data part.
    #[must_use]
    pub const fn inline_data(blob: Blob) -> Self {
        Self::InlineData { inline_data: blob }
    }

    /// Get the text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::InlineData { .. } => None,
        }
    }

    /// Get the blob if this is an inline data part.
    #[must_use]
    pub const fn as_inline_data(&self) -> Option<&Blob> {
        match self {
            Self::InlineData { inline_data } => Some(inline_data),
            Self::Text { .. } => None,
        }
    }
}

/// Message content: plain text or a list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text.
    Text(String),
    /// Multi-part content.
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Concatenated text of this content, ignoring non-text parts.
    ///
    /// Returns `None` when there is no text at all.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Parts(parts) => {
                let texts: Vec<&str> = parts.iter().filter_map(ContentPart::as_text).collect();
                (!texts.is_empty()).then(|| texts.concat())
            }
        }
    }

    /// Returns the content as a list of parts.
    #[must_use]
    pub fn into_parts(self) -> Vec<ContentPart> {
        match self {
            Self::Text(text) => vec![ContentPart::text(text)],
            Self::Parts(parts) => parts,
        }
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, echoed back in the tool result message.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments as a JSON value.
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A conversation message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The author role.
    pub role: Role,

    /// Message content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// For tool messages: the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// For tool messages: the name of the tool that produced the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn with_text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(Content::Text(content.into())),
            ..Self::default()
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_text(Role::System, content)
    }

    /// Create a user text message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_text(Role::User, content)
    }

    /// Create a user message from parts (text and uploaded files).
    #[must_use]
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: Some(Content::Parts(parts)),
            ..Self::default()
        }
    }

    /// Create an assistant text message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_text(Role::Assistant, content)
    }

    /// Create an assistant message that requests tool calls.
    #[must_use]
    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            tool_calls: Some(calls),
            ..Self::default()
        }
    }

    /// Create a tool result message.
    #[must_use]
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: Some(Content::Text(content.into())),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }

    /// Concatenated text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.content.as_ref().and_then(Content::text)
    }

    /// Returns `true` if the message requests at least one tool call.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Iterate over the inline data blobs carried by this message.
    pub fn inline_data(&self) -> impl Iterator<Item = &Blob> {
        let parts: &[ContentPart] = match &self.content {
            Some(Content::Parts(parts)) => parts,
            _ => &[],
        };
        parts.iter().filter_map(ContentPart::as_inline_data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod blob {
        use super::*;

        #[test]
        fn serializes_data_as_base64() {
            let blob = Blob::new("application/pdf", b"%PDF".to_vec()).with_display_name("a.pdf");
            let json = serde_json::to_value(&blob).unwrap();
            assert_eq!(json["data"], "JVBERg==");
            assert_eq!(json["mime_type"], "application/pdf");
            assert_eq!(json["display_name"], "a.pdf");

            let back: Blob = serde_json::from_value(json).unwrap();
            assert_eq!(back, blob);
        }

        #[test]
        fn rejects_invalid_base64() {
            let json = serde_json::json!({"mime_type": "text/plain", "data": "***"});
            assert!(serde_json::from_value::<Blob>(json).is_err());
        }

        #[test]
        fn debug_hides_payload() {
            let blob = Blob::new("text/plain", vec![b'x'; 4096]);
            let rendered = format!("{blob:?}");
            assert!(rendered.contains("<4096 bytes>"));
            assert!(!rendered.contains("xxxx"));
        }
    }

    mod message {
        use super::*;

        #[test]
        fn constructors_set_roles() {
            assert_eq!(Message::system("s").role, Role::System);
            assert_eq!(Message::user("u").role, Role::User);
            assert_eq!(Message::assistant("a").role, Role::Assistant);
            assert_eq!(Message::tool("id", "t", "r").role, Role::Tool);
        }

        #[test]
        fn tool_message_carries_call_id_and_name() {
            let msg = Message::tool("call_0", "extract_title_with_gemini", "\"Title\"");
            assert_eq!(msg.tool_call_id.as_deref(), Some("call_0"));
            assert_eq!(msg.name.as_deref(), Some("extract_title_with_gemini"));
            assert_eq!(msg.text().as_deref(), Some("\"Title\""));
        }

        #[test]
        fn text_concatenates_text_parts_only() {
            let msg = Message::user_parts(vec![
                ContentPart::text("Here is "),
                ContentPart::inline_data(Blob::new("application/pdf", vec![1, 2])),
                ContentPart::text("my file"),
            ]);
            assert_eq!(msg.text().as_deref(), Some("Here is my file"));
            assert_eq!(msg.inline_data().count(), 1);
        }

        #[test]
        fn text_is_none_for_data_only_message() {
            let msg = Message::user_parts(vec![ContentPart::inline_data(Blob::new(
                "image/png",
                vec![0],
            ))]);
            assert!(msg.text().is_none());
        }

        #[test]
        fn has_tool_calls_ignores_empty_list() {
            assert!(!Message::assistant_tool_calls(Vec::new()).has_tool_calls());
            let call = ToolCall::new("c", "t", serde_json::json!({}));
            assert!(Message::assistant_tool_calls(vec![call]).has_tool_calls());
        }

        #[test]
        fn serde_skips_none_fields() {
            let json = serde_json::to_value(Message::user("hi")).unwrap();
            assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
        }
    }
}
