use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pause marker emitted when a run suspends awaiting an external answer.
///
/// The id is the correlation key a later [`Resume`] must present. The payload
/// is opaque to the wire model; its conventional shapes are resolved by the
/// interrupt codec, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interrupt {
    /// Stable identifier for this pause point.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Interrupt {
    /// Create an interrupt with no payload.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Answer to a previously emitted [`Interrupt`], carried by a new run request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resume {
    /// Id of the interrupt being answered.
    #[serde(rename = "interruptId")]
    pub interrupt_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Resume {
    /// Create a resume envelope with no payload.
    pub fn new(interrupt_id: impl Into<String>) -> Self {
        Self {
            interrupt_id: interrupt_id.into(),
            payload: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}
