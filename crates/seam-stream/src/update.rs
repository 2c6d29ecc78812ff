use crate::interrupt::PauseRequest;
use seam_wire::Event;
use serde_json::Value;

/// One unit of the generic chat-delta stream exchanged with the producer.
///
/// This is the abstraction both translators share: the outbound translator
/// consumes it and emits wire events; the inbound translator reconstructs it
/// from wire events.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentUpdate {
    /// Incremental assistant text for the message identified by `message_id`.
    TextDelta { message_id: String, delta: String },
    /// A complete function invocation; arguments arrive fully assembled.
    FunctionCall {
        id: String,
        name: String,
        arguments: Value,
    },
    /// Result of a function invocation.
    FunctionResult {
        call_id: String,
        /// Id for the message carrying the result; synthesized when absent.
        message_id: Option<String>,
        content: Value,
    },
    /// Incremental reasoning text for the reasoning message `message_id`.
    ReasoningDelta { message_id: String, delta: String },
    /// Full state replacement.
    StateSnapshot { snapshot: Value },
    /// RFC 6902 operations against the previously accepted state.
    StatePatch { ops: Vec<Value> },
    /// Request to pause the run for an external answer.
    Pause(PauseRequest),
    /// Already-framed wire event forwarded verbatim.
    Passthrough(Event),
}

impl AgentUpdate {
    /// Incremental text helper.
    pub fn text(message_id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::TextDelta {
            message_id: message_id.into(),
            delta: delta.into(),
        }
    }

    /// Complete function call helper.
    pub fn call(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self::FunctionCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Function result helper.
    pub fn result(call_id: impl Into<String>, content: Value) -> Self {
        Self::FunctionResult {
            call_id: call_id.into(),
            message_id: None,
            content,
        }
    }

    /// Incremental reasoning helper.
    pub fn reasoning(message_id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::ReasoningDelta {
            message_id: message_id.into(),
            delta: delta.into(),
        }
    }
}

/// Identities and forwarded properties for one run.
///
/// Passed alongside the delta stream as an explicit struct; nothing in the
/// translation core reads cross-cutting context out of an untyped map.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Thread identifier (conversation scope).
    pub thread_id: String,
    /// Current run identifier.
    pub run_id: String,
    /// Parent run ID (for sub-runs).
    pub parent_run_id: Option<String>,
    /// Opaque properties forwarded by the client runtime.
    pub forwarded_props: Option<Value>,
}

impl RunContext {
    /// Create a context for a top-level run.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            parent_run_id: None,
            forwarded_props: None,
        }
    }

    /// Set the parent run.
    #[must_use]
    pub fn with_parent_run_id(mut self, parent_run_id: impl Into<String>) -> Self {
        self.parent_run_id = Some(parent_run_id.into());
        self
    }

    /// Attach forwarded client properties.
    #[must_use]
    pub fn with_forwarded_props(mut self, forwarded_props: Value) -> Self {
        self.forwarded_props = Some(forwarded_props);
        self
    }
}
