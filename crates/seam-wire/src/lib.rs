//! Wire model for the seam agent streaming protocol.
//!
//! Events, conversation messages, interrupt/resume envelopes, and the run
//! request, with discriminator-driven encoding and strict decoding.
#![allow(missing_docs)]

pub mod codec;
pub mod error;
pub mod events;
pub mod interrupt;
pub mod message;
pub mod request;

pub use codec::{decode_event, decode_message, encode_event, encode_message};
pub use error::WireError;
pub use events::{BaseEvent, Event, RunOutcome};
pub use interrupt::{Interrupt, Resume};
pub use message::{
    BinarySource, ContentPart, ContextEntry, FunctionCall, Message, Role, ToolCall, ToolCallKind,
    ToolDefinition, UserContent,
};
pub use request::{RequestError, RunAgentInput};
