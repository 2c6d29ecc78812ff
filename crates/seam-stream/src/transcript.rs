//! Folds one run's wire events into conversation messages for persistence.

use crate::builders::{TextBuilder, ToolCallBuilder};
use crate::chunks::ChunkExpander;
use crate::error::StreamError;
use seam_wire::{Event, Message, ToolCall};

const TEXT: &str = "text message";
const TOOL: &str = "tool call";

/// Accumulates the messages a finished run appends to its thread.
///
/// Feed it the same event sequence the client receives; once the stream has
/// fully drained, [`TranscriptBuilder::finish`] yields the messages in
/// conversation order. Reasoning, state, and lifecycle events leave no trace
/// in the transcript.
#[derive(Debug, Default)]
pub struct TranscriptBuilder {
    chunks: ChunkExpander,
    text: TextBuilder,
    tool: ToolCallBuilder,
    messages: Vec<Message>,
    /// Completed calls awaiting their results; flushed as one assistant
    /// message so parallel calls stay grouped.
    pending_calls: Vec<ToolCall>,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the transcript.
    pub fn push(&mut self, event: &Event) -> Result<(), StreamError> {
        for canonical in self.chunks.push(event)? {
            self.apply(&canonical)?;
        }
        Ok(())
    }

    /// Messages folded so far, in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Close out the transcript and return the accumulated messages.
    ///
    /// Errors when a framing bracket never closed, which means the stream was
    /// cut off and the transcript would silently drop content.
    pub fn finish(mut self) -> Result<Vec<Message>, StreamError> {
        for canonical in self.chunks.flush() {
            self.apply(&canonical)?;
        }
        if let Some(id) = self.text.open_id() {
            return Err(StreamError::UnclosedFraming {
                family: TEXT,
                id: id.to_string(),
            });
        }
        if let Some(id) = self.tool.open_id() {
            return Err(StreamError::UnclosedFraming {
                family: TOOL,
                id: id.to_string(),
            });
        }
        self.flush_calls();
        Ok(self.messages)
    }

    fn apply(&mut self, event: &Event) -> Result<(), StreamError> {
        match event {
            Event::TextMessageStart { message_id, .. } => {
                self.text.start(message_id)?;
            }
            Event::TextMessageContent {
                message_id, delta, ..
            } => {
                self.text.content(message_id, delta)?;
            }
            Event::TextMessageEnd { message_id, .. } => {
                let done = self.text.end(message_id)?;
                self.messages
                    .push(Message::assistant(done.text).with_id(done.message_id));
            }

            Event::ToolCallStart {
                tool_call_id,
                tool_call_name,
                ..
            } => {
                self.tool.start(tool_call_id, tool_call_name)?;
            }
            Event::ToolCallArgs {
                tool_call_id,
                delta,
                ..
            } => {
                self.tool.args(tool_call_id, delta)?;
            }
            Event::ToolCallEnd { tool_call_id, .. } => {
                let call = self.tool.end(tool_call_id)?;
                let arguments = if call.arguments.is_null() {
                    "{}".to_string()
                } else {
                    call.arguments.to_string()
                };
                self.pending_calls
                    .push(ToolCall::function(call.id, call.name, arguments));
            }
            Event::ToolCallResult {
                message_id,
                tool_call_id,
                content,
                ..
            } => {
                self.flush_calls();
                self.messages
                    .push(Message::tool(tool_call_id, content).with_id(message_id));
            }

            Event::RunFinished { .. } | Event::RunError { .. } => {
                self.flush_calls();
            }

            // Not part of the conversation record.
            _ => {}
        }
        Ok(())
    }

    /// Emit buffered calls as a single assistant message.
    fn flush_calls(&mut self) {
        if self.pending_calls.is_empty() {
            return;
        }
        let calls = std::mem::take(&mut self.pending_calls);
        let id = format!("msg_{}", calls[0].id);
        self.messages
            .push(Message::assistant_with_tool_calls("", calls).with_id(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seam_wire::Role;
    use serde_json::json;

    fn fold(events: &[Event]) -> Vec<Message> {
        let mut builder = TranscriptBuilder::new();
        for event in events {
            builder.push(event).unwrap();
        }
        builder.finish().unwrap()
    }

    #[test]
    fn text_run_folds_to_assistant_message() {
        let messages = fold(&[
            Event::run_started("t1", "r1", None),
            Event::text_message_start("m1"),
            Event::text_message_content("m1", "Hel"),
            Event::text_message_content("m1", "lo"),
            Event::text_message_end("m1"),
            Event::run_finished("t1", "r1", None),
        ]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), Role::Assistant);
        assert_eq!(messages[0].id(), Some("m1"));
        assert_eq!(messages[0].text(), "Hello");
    }

    #[test]
    fn call_and_result_fold_to_two_messages() {
        let messages = fold(&[
            Event::run_started("t1", "r1", None),
            Event::tool_call_start("c1", "lookup", None),
            Event::tool_call_args("c1", r#"{"q":"x"}"#),
            Event::tool_call_end("c1"),
            Event::tool_call_result("m2", "c1", r#"{"rows":3}"#),
            Event::run_finished("t1", "r1", None),
        ]);
        assert_eq!(messages.len(), 2);

        let Message::Assistant {
            id, tool_calls, ..
        } = &messages[0]
        else {
            panic!("expected assistant message, got {:?}", messages[0]);
        };
        assert_eq!(id.as_deref(), Some("msg_c1"));
        let calls = tool_calls.as_ref().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "lookup");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&calls[0].function.arguments).unwrap(),
            json!({"q": "x"})
        );

        let Message::Tool {
            id,
            content,
            tool_call_id,
            ..
        } = &messages[1]
        else {
            panic!("expected tool message, got {:?}", messages[1]);
        };
        assert_eq!(id.as_deref(), Some("m2"));
        assert_eq!(tool_call_id, "c1");
        assert_eq!(content, r#"{"rows":3}"#);
    }

    #[test]
    fn parallel_calls_group_into_one_assistant_message() {
        let messages = fold(&[
            Event::run_started("t1", "r1", None),
            Event::tool_call_start("c1", "read", None),
            Event::tool_call_end("c1"),
            Event::tool_call_start("c2", "write", None),
            Event::tool_call_end("c2"),
            Event::tool_call_result("m1", "c1", "ok"),
            Event::tool_call_result("m2", "c2", "ok"),
            Event::run_finished("t1", "r1", None),
        ]);
        assert_eq!(messages.len(), 3);
        let Message::Assistant { tool_calls, .. } = &messages[0] else {
            panic!("expected assistant message");
        };
        assert_eq!(tool_calls.as_ref().unwrap().len(), 2);
        assert_eq!(messages[1].role(), Role::Tool);
        assert_eq!(messages[2].role(), Role::Tool);
    }

    #[test]
    fn unresolved_calls_flush_at_the_terminal() {
        let messages = fold(&[
            Event::run_started("t1", "r1", None),
            Event::tool_call_start("c1", "ask_user", None),
            Event::tool_call_end("c1"),
            Event::run_finished("t1", "r1", None),
        ]);
        assert_eq!(messages.len(), 1);
        let Message::Assistant { tool_calls, .. } = &messages[0] else {
            panic!("expected assistant message");
        };
        assert_eq!(tool_calls.as_ref().unwrap()[0].function.arguments, "{}");
    }

    #[test]
    fn reasoning_and_state_leave_no_trace() {
        let messages = fold(&[
            Event::run_started("t1", "r1", None),
            Event::reasoning_start("rs1"),
            Event::reasoning_message_start("rs1"),
            Event::reasoning_message_content("rs1", "thinking"),
            Event::reasoning_message_end("rs1"),
            Event::reasoning_end("rs1"),
            Event::state_snapshot(json!({"step": 1})),
            Event::run_finished("t1", "r1", None),
        ]);
        assert!(messages.is_empty());
    }

    #[test]
    fn chunked_text_folds_like_explicit_framing() {
        let messages = fold(&[
            Event::run_started("t1", "r1", None),
            Event::text_message_chunk(Some("m1".into()), None, Some("Hi".into())),
            Event::run_finished("t1", "r1", None),
        ]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text(), "Hi");
    }

    #[test]
    fn truncated_bracket_fails_finish() {
        let mut builder = TranscriptBuilder::new();
        builder.push(&Event::run_started("t1", "r1", None)).unwrap();
        builder.push(&Event::text_message_start("m1")).unwrap();
        builder.push(&Event::text_message_content("m1", "lost")).unwrap();
        assert!(matches!(
            builder.finish(),
            Err(StreamError::UnclosedFraming { .. })
        ));
    }

    #[test]
    fn interleaved_text_and_calls_stay_ordered() {
        let messages = fold(&[
            Event::run_started("t1", "r1", None),
            Event::text_message_start("m1"),
            Event::text_message_content("m1", "Let me check."),
            Event::text_message_end("m1"),
            Event::tool_call_start("c1", "check", None),
            Event::tool_call_end("c1"),
            Event::tool_call_result("m2", "c1", "fine"),
            Event::text_message_start("m3"),
            Event::text_message_content("m3", "All fine."),
            Event::text_message_end("m3"),
            Event::run_finished("t1", "r1", None),
        ]);
        let roles: Vec<Role> = messages.iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            vec![Role::Assistant, Role::Assistant, Role::Tool, Role::Assistant]
        );
        assert_eq!(messages[3].text(), "All fine.");
    }
}
