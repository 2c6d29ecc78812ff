use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role for conversation messages and event attribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    System,
    User,
    #[default]
    Assistant,
    Tool,
}

/// A message in a conversation, discriminated by `role`.
///
/// User content is modeled as segments even when the wire carries a plain
/// string; see [`UserContent`] for the normalization rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// Instructions from the application developer.
    Developer {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: String,
    },
    /// System-level instructions.
    System {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: String,
    },
    /// End-user input, possibly multimodal.
    User {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: UserContent,
    },
    /// Agent output, optionally carrying tool calls.
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: String,
        #[serde(rename = "toolCalls", skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    /// Result of a tool execution, correlated by `toolCallId`.
    Tool {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: String,
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Message {
    /// Create a developer message.
    pub fn developer(content: impl Into<String>) -> Self {
        Self::Developer {
            id: None,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            id: None,
            content: content.into(),
        }
    }

    /// Create a user message with a single text segment.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            id: None,
            content: UserContent::text(content),
        }
    }

    /// Create a user message from explicit content segments.
    pub fn user_with_parts(parts: Vec<ContentPart>) -> Self {
        Self::User {
            id: None,
            content: UserContent::from_parts(parts),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            id: None,
            content: content.into(),
            tool_calls: None,
        }
    }

    /// Create an assistant message carrying tool calls.
    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Self {
        Self::Assistant {
            id: None,
            content: content.into(),
            tool_calls: Some(tool_calls),
        }
    }

    /// Create a tool result message.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            id: None,
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            error: None,
        }
    }

    /// Create a failed tool result message.
    pub fn tool_error(
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::Tool {
            id: None,
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            error: Some(error.into()),
        }
    }

    /// Set the message id.
    #[must_use]
    pub fn with_id(mut self, message_id: impl Into<String>) -> Self {
        match &mut self {
            Self::Developer { id, .. }
            | Self::System { id, .. }
            | Self::User { id, .. }
            | Self::Assistant { id, .. }
            | Self::Tool { id, .. } => *id = Some(message_id.into()),
        }
        self
    }

    /// Role of this message.
    pub fn role(&self) -> Role {
        match self {
            Self::Developer { .. } => Role::Developer,
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }

    /// Message id, if assigned.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Developer { id, .. }
            | Self::System { id, .. }
            | Self::User { id, .. }
            | Self::Assistant { id, .. }
            | Self::Tool { id, .. } => id.as_deref(),
        }
    }

    /// Plain-text view of the content, joining user segments with newlines.
    pub fn text(&self) -> String {
        match self {
            Self::Developer { content, .. }
            | Self::System { content, .. }
            | Self::Assistant { content, .. }
            | Self::Tool { content, .. } => content.clone(),
            Self::User { content, .. } => content.joined_text(),
        }
    }
}

/// A tool call recorded on an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Unique identifier for this tool call.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ToolCallKind,
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function-kind tool call. `arguments` is JSON text.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ToolCallKind::Function,
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Kind discriminator for [`ToolCall`]; only functions exist today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallKind {
    #[default]
    Function,
}

/// The function invocation inside a tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the function to call.
    pub name: String,
    /// Arguments encoded as a JSON string.
    pub arguments: String,
}

/// One segment of user message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    /// Plain text.
    Text { text: String },
    /// Binary attachment referenced inline, by URL, or by opaque id.
    Binary {
        #[serde(rename = "mimeType")]
        mime_type: String,
        #[serde(flatten)]
        source: BinarySource,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
}

impl ContentPart {
    /// Create a text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a binary segment.
    pub fn binary(mime_type: impl Into<String>, source: BinarySource) -> Self {
        Self::Binary {
            mime_type: mime_type.into(),
            source,
            filename: None,
        }
    }
}

/// Where a binary segment's bytes live. Exactly one of these keys appears on
/// the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BinarySource {
    /// Base64-encoded bytes carried inline.
    #[serde(rename = "data")]
    Data(String),
    /// Fetchable URL.
    #[serde(rename = "url")]
    Url(String),
    /// Opaque identifier resolved out of band.
    #[serde(rename = "id")]
    Id(String),
}

/// Content of a user message as an ordered list of segments.
///
/// Wire compatibility requires a plain string when the content is exactly one
/// text segment and an array for every other shape; decoding accepts both and
/// normalizes to segments. Nothing outside the codec sees the string form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserContent(Vec<ContentPart>);

impl UserContent {
    /// Single text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self(vec![ContentPart::text(text)])
    }

    /// From explicit segments.
    pub fn from_parts(parts: Vec<ContentPart>) -> Self {
        Self(parts)
    }

    /// The content segments in order.
    pub fn parts(&self) -> &[ContentPart] {
        &self.0
    }

    /// The single text segment, when the content is exactly that.
    pub fn as_single_text(&self) -> Option<&str> {
        match self.0.as_slice() {
            [ContentPart::Text { text }] => Some(text),
            _ => None,
        }
    }

    /// All text segments joined with newlines; binary segments are skipped.
    pub fn joined_text(&self) -> String {
        self.0
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Binary { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serialize for UserContent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // A lone text segment encodes as a plain string for compatibility
        // with peers that predate multimodal content.
        match self.as_single_text() {
            Some(text) => serializer.serialize_str(text),
            None => self.0.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for UserContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Parts(Vec<ContentPart>),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Ok(Self::text(text)),
            Repr::Parts(parts) => Ok(Self(parts)),
        }
    }
}

impl From<&str> for UserContent {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for UserContent {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

/// Context entry forwarded by the client alongside a run request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextEntry {
    /// Human-readable description of the context.
    pub description: String,
    /// The context value.
    pub value: Value,
}

/// Tool definition advertised by the client for this run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for tool parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}
