//! The persisted unit of a thread: messages, state, and pending interrupts.

use seam_stream::PauseRequest;
use seam_wire::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything a thread carries across runs.
///
/// Loaded before a run, mutated only by the run pipeline, and written back in
/// one piece after the run's event stream has fully drained. Interrupted runs
/// leave their pending markers here; a resume is only valid against a marker
/// that is still present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Thread identifier.
    pub id: String,
    /// Conversation history in order.
    pub messages: Vec<Message>,
    /// Out-of-band structured state, when any run has published one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    /// Unresolved interrupts keyed by interrupt id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pending_interrupts: BTreeMap<String, PendingInterrupt>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

/// A marker for an interrupt that has been issued but not yet answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInterrupt {
    /// Interrupt id the client must echo back as `interruptId`.
    pub id: String,
    /// Run that raised the interrupt.
    pub run_id: String,
    /// The original pause request; shapes how the resume payload is read.
    pub request: PauseRequest,
    /// Creation timestamp (unix millis).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}

impl PendingInterrupt {
    /// Create a marker for a pause raised by `run_id`.
    pub fn new(run_id: impl Into<String>, request: PauseRequest) -> Self {
        Self {
            id: request.id().to_string(),
            run_id: run_id.into(),
            request,
            created_at: Some(now_millis()),
        }
    }
}

/// Session bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Creation timestamp (unix millis).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    /// Last update timestamp (unix millis).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
    /// Custom metadata.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Session {
    /// Create an empty session for `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            state: None,
            pending_interrupts: BTreeMap::new(),
            metadata: SessionMetadata {
                created_at: Some(now_millis()),
                updated_at: None,
                extra: serde_json::Map::new(),
            },
        }
    }

    /// Append a message.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Append multiple messages.
    #[must_use]
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Set the out-of-band state.
    #[must_use]
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Number of messages in the history.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Record an interrupt awaiting its answer.
    pub fn record_interrupt(&mut self, marker: PendingInterrupt) {
        self.pending_interrupts.insert(marker.id.clone(), marker);
    }

    /// The pending marker for `interrupt_id`, if still unresolved.
    pub fn pending_interrupt(&self, interrupt_id: &str) -> Option<&PendingInterrupt> {
        self.pending_interrupts.get(interrupt_id)
    }

    /// Consume the pending marker for `interrupt_id`.
    ///
    /// Returns `None` when the id is unknown or was already resolved, which
    /// the caller must treat as a rejected resume.
    pub fn resolve_interrupt(&mut self, interrupt_id: &str) -> Option<PendingInterrupt> {
        self.pending_interrupts.remove(interrupt_id)
    }

    /// Stamp the last-update time; call before persisting.
    pub fn touch(&mut self) {
        self.metadata.updated_at = Some(now_millis());
    }
}

fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interrupt_markers_resolve_exactly_once() {
        let mut session = Session::new("t1");
        let request = PauseRequest::approval("int_1", "rm", json!({"path": "/a"}));
        session.record_interrupt(PendingInterrupt::new("run_1", request));

        assert!(session.pending_interrupt("int_1").is_some());
        let marker = session.resolve_interrupt("int_1").unwrap();
        assert_eq!(marker.run_id, "run_1");
        assert!(marker.request.is_approval());
        // Second resolve fails: the marker is gone.
        assert!(session.resolve_interrupt("int_1").is_none());
    }

    #[test]
    fn unknown_interrupt_does_not_resolve() {
        let mut session = Session::new("t1");
        assert!(session.resolve_interrupt("nope").is_none());
    }

    #[test]
    fn serialized_form_round_trips_with_markers() {
        let mut session = Session::new("t1")
            .with_message(Message::user("hello"))
            .with_state(json!({"step": 2}));
        session.record_interrupt(PendingInterrupt::new(
            "run_9",
            PauseRequest::input("int_2", Some(json!({"question": "go on?"}))),
        ));

        let text = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&text).unwrap();
        assert_eq!(back.id, "t1");
        assert_eq!(back.message_count(), 1);
        assert_eq!(back.state, Some(json!({"step": 2})));
        assert_eq!(
            back.pending_interrupt("int_2"),
            session.pending_interrupt("int_2")
        );
    }

    #[test]
    fn empty_collections_stay_off_the_wire() {
        let session = Session::new("t1");
        let value = serde_json::to_value(&session).unwrap();
        assert!(value.get("pendingInterrupts").is_none());
        assert!(value.get("pending_interrupts").is_none());
        assert!(value.get("state").is_none());
    }
}
