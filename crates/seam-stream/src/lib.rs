//! Translation core between agent delta streams and the wire protocol.
//!
//! The outbound [`RunEncoder`] turns a producer's deltas into a compliant
//! wire event sequence; the inbound [`RunDecoder`] validates such a sequence
//! and reconstructs the deltas. [`TranscriptBuilder`] folds a run's events
//! into the messages a session persists.
#![allow(missing_docs)]

mod builders;
mod chunks;
mod decoder;
mod encoder;
mod error;
mod interrupt;
mod transcode;
mod transcript;
mod update;

pub use builders::{
    parse_result_content, CompletedCall, CompletedReasoning, CompletedText, ReasoningBuilder,
    TextBuilder, ToolCallBuilder,
};
pub use chunks::ChunkExpander;
pub use decoder::RunDecoder;
pub use encoder::RunEncoder;
pub use error::StreamError;
pub use interrupt::{
    pause_from_wire, pause_to_wire, resume_from_wire, resume_to_wire, PauseRequest, ResumeAnswer,
};
pub use transcode::Transcode;
pub use transcript::TranscriptBuilder;
pub use update::{AgentUpdate, RunContext};
