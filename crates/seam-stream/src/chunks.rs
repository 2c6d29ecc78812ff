//! Normalizes compact chunk events into explicit start/content/end framing.

use crate::error::StreamError;
use seam_wire::Event;
use uuid::Uuid;

/// Tracks which chunk-opened bracket is live, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OpenChunk {
    Text { message_id: String },
    Reasoning { message_id: String },
    Tool { tool_call_id: String },
}

/// Rewrites chunk events into the canonical triad framing.
///
/// Chunks are a producer convenience: a bare delta opens a bracket implicitly,
/// repeats continue it, and anything else closes it. Downstream accumulators
/// only ever see explicit framing, so they need exactly one code path.
#[derive(Debug, Default)]
pub struct ChunkExpander {
    open: Option<OpenChunk>,
}

impl ChunkExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand one event. Non-chunk events close any chunk-opened bracket and
    /// then pass through untouched.
    pub fn push(&mut self, event: &Event) -> Result<Vec<Event>, StreamError> {
        let mut out = Vec::new();
        match event {
            Event::TextMessageChunk {
                message_id, delta, ..
            } => {
                let id = match self.continues_text(message_id) {
                    Some(open) => open,
                    None => {
                        self.close(&mut out);
                        let id = message_id
                            .clone()
                            .unwrap_or_else(|| format!("msg_{}", Uuid::new_v4().simple()));
                        out.push(Event::text_message_start(&id));
                        self.open = Some(OpenChunk::Text {
                            message_id: id.clone(),
                        });
                        id
                    }
                };
                if let Some(delta) = delta {
                    if !delta.is_empty() {
                        out.push(Event::text_message_content(id, delta));
                    }
                }
            }

            Event::ReasoningMessageChunk {
                message_id, delta, ..
            } => {
                let id = match self.continues_reasoning(message_id) {
                    Some(open) => open,
                    None => {
                        self.close(&mut out);
                        let id = message_id
                            .clone()
                            .unwrap_or_else(|| format!("rsn_{}", Uuid::new_v4().simple()));
                        out.push(Event::reasoning_start(&id));
                        out.push(Event::reasoning_message_start(&id));
                        self.open = Some(OpenChunk::Reasoning {
                            message_id: id.clone(),
                        });
                        id
                    }
                };
                if let Some(delta) = delta {
                    if !delta.is_empty() {
                        out.push(Event::reasoning_message_content(id, delta));
                    }
                }
            }

            Event::ToolCallChunk {
                tool_call_id,
                tool_call_name,
                parent_message_id,
                delta,
                ..
            } => {
                let id = match self.continues_tool(tool_call_id) {
                    Some(open) => open,
                    None => {
                        // A fresh tool bracket cannot be named retroactively.
                        let Some(name) = tool_call_name else {
                            return Err(StreamError::BadChunk(
                                "tool call chunk opened without toolCallName",
                            ));
                        };
                        self.close(&mut out);
                        let id = tool_call_id
                            .clone()
                            .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));
                        out.push(Event::tool_call_start(&id, name, parent_message_id.clone()));
                        self.open = Some(OpenChunk::Tool {
                            tool_call_id: id.clone(),
                        });
                        id
                    }
                };
                if let Some(delta) = delta {
                    if !delta.is_empty() {
                        out.push(Event::tool_call_args(id, delta));
                    }
                }
            }

            other => {
                self.close(&mut out);
                out.push(other.clone());
            }
        }
        Ok(out)
    }

    /// Close any open chunk bracket; call once the event stream is exhausted.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut out = Vec::new();
        self.close(&mut out);
        out
    }

    /// Open text bracket id when the chunk continues it, else `None`.
    fn continues_text(&self, message_id: &Option<String>) -> Option<String> {
        match &self.open {
            Some(OpenChunk::Text { message_id: open })
                if message_id.is_none() || message_id.as_deref() == Some(open.as_str()) =>
            {
                Some(open.clone())
            }
            _ => None,
        }
    }

    fn continues_reasoning(&self, message_id: &Option<String>) -> Option<String> {
        match &self.open {
            Some(OpenChunk::Reasoning { message_id: open })
                if message_id.is_none() || message_id.as_deref() == Some(open.as_str()) =>
            {
                Some(open.clone())
            }
            _ => None,
        }
    }

    fn continues_tool(&self, tool_call_id: &Option<String>) -> Option<String> {
        match &self.open {
            Some(OpenChunk::Tool { tool_call_id: open })
                if tool_call_id.is_none() || tool_call_id.as_deref() == Some(open.as_str()) =>
            {
                Some(open.clone())
            }
            _ => None,
        }
    }

    fn close(&mut self, out: &mut Vec<Event>) {
        match self.open.take() {
            Some(OpenChunk::Text { message_id }) => {
                out.push(Event::text_message_end(message_id));
            }
            Some(OpenChunk::Reasoning { message_id }) => {
                out.push(Event::reasoning_message_end(&message_id));
                out.push(Event::reasoning_end(message_id));
            }
            Some(OpenChunk::Tool { tool_call_id }) => {
                out.push(Event::tool_call_end(tool_call_id));
            }
            None => {}
        }
    }
}
