//! The boundary between the hosting surface and whatever produces a run.

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use seam_stream::{AgentUpdate, ResumeAnswer, RunContext};
use seam_wire::{ContextEntry, Message, ToolDefinition};
use serde_json::Value;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::Mutex;

/// Failure raised by a producer, before or during its stream.
///
/// This is the one error category that reaches the peer over the open
/// stream, as a `RUN_ERROR` event carrying `message` and `code`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProducerError {
    /// Human-readable description.
    pub message: String,
    /// Optional machine-readable code forwarded on the wire.
    pub code: Option<String>,
}

impl ProducerError {
    /// Create an error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attach a machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Stream of deltas for one run.
pub type UpdateStream = BoxStream<'static, Result<AgentUpdate, ProducerError>>;

/// Everything a producer sees for one run.
///
/// `messages` is the merged history (persisted session plus the request's
/// new messages); `resume` carries the decoded answer when the run resumes
/// a pending interrupt, with the marker already resolved.
#[derive(Debug, Clone)]
pub struct ProducerRequest {
    /// Identity of the run being produced.
    pub context: RunContext,
    /// Conversation history to produce against.
    pub messages: Vec<Message>,
    /// Tools the client exposes for this run.
    pub tools: Vec<ToolDefinition>,
    /// Client-supplied context entries.
    pub client_context: Vec<ContextEntry>,
    /// Initial or session state, request value winning over the session's.
    pub state: Option<Value>,
    /// Decoded answer when this run resumes a pending interrupt.
    pub resume: Option<ResumeAnswer>,
}

impl ProducerRequest {
    /// Create a request with just an identity.
    pub fn new(context: RunContext) -> Self {
        Self {
            context,
            messages: Vec::new(),
            tools: Vec::new(),
            client_context: Vec::new(),
            state: None,
            resume: None,
        }
    }

    /// Set the conversation history.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Mark the request as a resume call.
    #[must_use]
    pub fn with_resume(mut self, resume: ResumeAnswer) -> Self {
        self.resume = Some(resume);
        self
    }
}

/// Source of deltas for runs.
#[async_trait]
pub trait UpdateProducer: Send + Sync {
    /// Start one run and stream its deltas.
    ///
    /// An error here, or on any stream item, ends the run with a
    /// `RUN_ERROR` wire event and nothing is persisted for the run.
    async fn produce(&self, request: ProducerRequest) -> Result<UpdateStream, ProducerError>;
}

/// Reference producer replaying a configured sequence of turns.
///
/// Each run consumes the next turn; turns cycle once exhausted so a demo
/// server stays responsive. A resume call is acknowledged with a leading
/// text delta echoing the decoded answer.
pub struct ScriptedProducer {
    turns: Mutex<VecDeque<Vec<AgentUpdate>>>,
}

impl ScriptedProducer {
    /// Producer playing `turns` in order, cycling.
    pub fn new(turns: Vec<Vec<AgentUpdate>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
        }
    }

    /// Producer with a single repeated turn.
    pub fn single(updates: Vec<AgentUpdate>) -> Self {
        Self::new(vec![updates])
    }

    fn resume_echo(answer: &ResumeAnswer) -> AgentUpdate {
        let text = match answer {
            ResumeAnswer::Approval { approved: true, .. } => "approved".to_string(),
            ResumeAnswer::Approval {
                approved: false, ..
            } => "denied".to_string(),
            ResumeAnswer::Input { payload, .. } => payload.to_string(),
        };
        AgentUpdate::text(format!("msg_ack_{}", answer.interrupt_id()), text)
    }
}

#[async_trait]
impl UpdateProducer for ScriptedProducer {
    async fn produce(&self, request: ProducerRequest) -> Result<UpdateStream, ProducerError> {
        let mut turns = self.turns.lock().await;
        let mut updates = match turns.pop_front() {
            Some(turn) => {
                turns.push_back(turn.clone());
                turn
            }
            None => Vec::new(),
        };
        drop(turns);
        if let Some(answer) = &request.resume {
            updates.insert(0, Self::resume_echo(answer));
        }
        let items: Vec<Result<AgentUpdate, ProducerError>> = updates.into_iter().map(Ok).collect();
        Ok(Box::pin(stream::iter(items)))
    }
}
