//! Bidirectional mapping between pause/resume domain objects and the wire
//! interrupt envelope.
//!
//! The wire carries no tag for the two request shapes; the payload itself is
//! the discriminator. A `functionName` key marks a function-approval request,
//! anything else is a free-form input request. Correlation state lives in the
//! session store, never here.

use seam_wire::{Interrupt, Resume};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A request from the producer to pause the run for an external answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PauseRequest {
    /// Ask the user to approve executing a function.
    Approval {
        /// Pending call id; doubles as the interrupt id on the wire.
        id: String,
        function_name: String,
        function_arguments: Value,
    },
    /// Ask the user for free-form input.
    Input {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

impl PauseRequest {
    /// Approval request helper.
    pub fn approval(
        id: impl Into<String>,
        function_name: impl Into<String>,
        function_arguments: Value,
    ) -> Self {
        Self::Approval {
            id: id.into(),
            function_name: function_name.into(),
            function_arguments,
        }
    }

    /// Free-form input request helper.
    pub fn input(id: impl Into<String>, payload: Option<Value>) -> Self {
        Self::Input {
            id: id.into(),
            payload,
        }
    }

    /// The interrupt id this request pauses on.
    pub fn id(&self) -> &str {
        match self {
            Self::Approval { id, .. } | Self::Input { id, .. } => id,
        }
    }

    /// Whether this request expects an approval-shaped answer.
    pub fn is_approval(&self) -> bool {
        matches!(self, Self::Approval { .. })
    }
}

/// The answer supplied when a paused run resumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResumeAnswer {
    /// Answer to an approval request.
    Approval { interrupt_id: String, approved: bool },
    /// Answer to a free-form input request.
    Input { interrupt_id: String, payload: Value },
}

impl ResumeAnswer {
    /// The interrupt id this answer resolves.
    pub fn interrupt_id(&self) -> &str {
        match self {
            Self::Approval { interrupt_id, .. } | Self::Input { interrupt_id, .. } => interrupt_id,
        }
    }
}

/// Encode a pause request into the wire interrupt envelope.
pub fn pause_to_wire(request: &PauseRequest) -> Interrupt {
    match request {
        PauseRequest::Approval {
            id,
            function_name,
            function_arguments,
        } => Interrupt::new(id).with_payload(json!({
            "functionName": function_name,
            "functionArguments": function_arguments,
        })),
        PauseRequest::Input { id, payload } => {
            let interrupt = Interrupt::new(id);
            match payload {
                Some(payload) => interrupt.with_payload(payload.clone()),
                None => interrupt,
            }
        }
    }
}

/// Decode the wire interrupt envelope back into a pause request.
///
/// The interrupt id becomes the pending call id for approval requests.
pub fn pause_from_wire(interrupt: &Interrupt) -> PauseRequest {
    if let Some(payload) = &interrupt.payload {
        if let Some(name) = payload.get("functionName").and_then(Value::as_str) {
            let arguments = payload
                .get("functionArguments")
                .cloned()
                .unwrap_or(Value::Null);
            return PauseRequest::Approval {
                id: interrupt.id.clone(),
                function_name: name.to_string(),
                function_arguments: arguments,
            };
        }
    }
    PauseRequest::Input {
        id: interrupt.id.clone(),
        payload: interrupt.payload.clone(),
    }
}

/// Encode a resume answer into the wire resume envelope.
pub fn resume_to_wire(answer: &ResumeAnswer) -> Resume {
    match answer {
        ResumeAnswer::Approval {
            interrupt_id,
            approved,
        } => Resume::new(interrupt_id).with_payload(json!({ "approved": approved })),
        ResumeAnswer::Input {
            interrupt_id,
            payload,
        } => Resume::new(interrupt_id).with_payload(payload.clone()),
    }
}

/// Decode a wire resume into the answer shape the pending request expects.
///
/// An approval request reads `{approved: bool}` from the payload; a missing
/// or malformed flag counts as not approved. A free-form request takes the
/// payload as-is.
pub fn resume_from_wire(resume: &Resume, pending: &PauseRequest) -> ResumeAnswer {
    match pending {
        PauseRequest::Approval { .. } => {
            let approved = resume
                .payload
                .as_ref()
                .and_then(|p| p.get("approved"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            ResumeAnswer::Approval {
                interrupt_id: resume.interrupt_id.clone(),
                approved,
            }
        }
        PauseRequest::Input { .. } => ResumeAnswer::Input {
            interrupt_id: resume.interrupt_id.clone(),
            payload: resume.payload.clone().unwrap_or(Value::Null),
        },
    }
}
