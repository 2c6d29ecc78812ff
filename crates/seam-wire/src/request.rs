use crate::interrupt::Resume;
use crate::message::{ContextEntry, Message, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to execute one run on a thread.
///
/// A resume request is the same envelope with `resume` set; it is otherwise a
/// brand-new call, not a continuation of a previous stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAgentInput {
    /// Thread identifier.
    #[serde(rename = "threadId")]
    pub thread_id: String,
    /// Run identifier.
    #[serde(rename = "runId")]
    pub run_id: String,
    /// Parent run ID (for sub-runs).
    #[serde(rename = "parentRunId", skip_serializing_if = "Option::is_none")]
    pub parent_run_id: Option<String>,
    /// Conversation messages.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Tools the client makes available for this run.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    /// Client-readable context entries.
    #[serde(default)]
    pub context: Vec<ContextEntry>,
    /// Initial state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    /// Additional forwarded properties from client runtimes.
    #[serde(
        rename = "forwardedProps",
        alias = "forwarded_props",
        skip_serializing_if = "Option::is_none"
    )]
    pub forwarded_props: Option<Value>,
    /// Answer to a pending interrupt, making this a resume call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<Resume>,
}

impl RunAgentInput {
    /// Create a new request with minimal required fields.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            parent_run_id: None,
            messages: Vec::new(),
            tools: Vec::new(),
            context: Vec::new(),
            state: None,
            forwarded_props: None,
            resume: None,
        }
    }

    /// Add a message.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add messages.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Set initial state.
    #[must_use]
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Set forwarded props.
    #[must_use]
    pub fn with_forwarded_props(mut self, forwarded_props: Value) -> Self {
        self.forwarded_props = Some(forwarded_props);
        self
    }

    /// Mark this request as a resume call.
    #[must_use]
    pub fn with_resume(mut self, resume: Resume) -> Self {
        self.resume = Some(resume);
        self
    }

    /// Whether this request answers a pending interrupt.
    pub fn is_resume(&self) -> bool {
        self.resume.is_some()
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.thread_id.is_empty() {
            return Err(RequestError::invalid_field("threadId cannot be empty"));
        }
        if self.run_id.is_empty() {
            return Err(RequestError::invalid_field("runId cannot be empty"));
        }
        if let Some(resume) = &self.resume {
            if resume.interrupt_id.is_empty() {
                return Err(RequestError::invalid_field(
                    "resume.interruptId cannot be empty",
                ));
            }
        }
        Ok(())
    }
}

/// Error type for request processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestError {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

impl RequestError {
    /// Create an invalid field error.
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self {
            code: "INVALID_FIELD".into(),
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: "VALIDATION_ERROR".into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RequestError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_rejects_empty_ids() {
        assert!(RunAgentInput::new("", "r1").validate().is_err());
        assert!(RunAgentInput::new("t1", "").validate().is_err());
        assert!(RunAgentInput::new("t1", "r1").validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_resume_target() {
        let request = RunAgentInput::new("t1", "r1").with_resume(Resume::new(""));
        assert!(request.validate().is_err());
    }

    #[test]
    fn request_decodes_camel_case_envelope() {
        let request: RunAgentInput = serde_json::from_value(json!({
            "threadId": "t1",
            "runId": "r1",
            "messages": [{"role": "user", "content": "hi"}],
            "tools": [{"name": "lookup", "description": "find things"}],
            "context": [{"description": "page", "value": "/home"}],
            "state": {"count": 0},
            "forwardedProps": {"locale": "en"},
            "resume": {"interruptId": "i1", "payload": {"approved": false}}
        }))
        .unwrap();
        assert_eq!(request.thread_id, "t1");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.tools[0].name, "lookup");
        assert!(request.is_resume());
        assert_eq!(request.resume.unwrap().interrupt_id, "i1");
    }

    #[test]
    fn forwarded_props_accepts_snake_case_alias() {
        let request: RunAgentInput = serde_json::from_value(json!({
            "threadId": "t1",
            "runId": "r1",
            "forwarded_props": {"k": 1}
        }))
        .unwrap();
        assert_eq!(request.forwarded_props, Some(json!({"k": 1})));
    }
}
