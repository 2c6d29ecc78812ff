//! Delta accumulators: small state machines that reassemble chunked wire
//! content into complete units.
//!
//! Each builder is `idle` or `open(id)`. Out-of-order transitions are
//! protocol violations, never silently recovered.

use crate::error::StreamError;
use serde_json::Value;

const TEXT: &str = "text message";
const TOOL: &str = "tool call";
const REASONING_MSG: &str = "reasoning message";
const REASONING_SESSION: &str = "reasoning session";

/// A text message reassembled from its start/content/end bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedText {
    pub message_id: String,
    pub text: String,
}

/// Reassembles one text message at a time.
#[derive(Debug, Default)]
pub struct TextBuilder {
    open: Option<CompletedText>,
}

impl TextBuilder {
    /// Open a bracket for `id`. Errors if one is already open.
    pub fn start(&mut self, id: &str) -> Result<(), StreamError> {
        if let Some(open) = &self.open {
            return Err(StreamError::DoubleStart {
                family: TEXT,
                id: id.to_string(),
                open: open.message_id.clone(),
            });
        }
        self.open = Some(CompletedText {
            message_id: id.to_string(),
            text: String::new(),
        });
        Ok(())
    }

    /// Append a content delta; `id` must match the open bracket.
    pub fn content(&mut self, id: &str, delta: &str) -> Result<(), StreamError> {
        if delta.is_empty() {
            return Err(StreamError::EmptyDelta { id: id.to_string() });
        }
        match &mut self.open {
            None => Err(StreamError::ContentBeforeStart {
                family: TEXT,
                id: id.to_string(),
            }),
            Some(open) if open.message_id != id => Err(StreamError::IdMismatch {
                family: TEXT,
                id: id.to_string(),
                open: open.message_id.clone(),
            }),
            Some(open) => {
                open.text.push_str(delta);
                Ok(())
            }
        }
    }

    /// Close the bracket and return the completed message.
    pub fn end(&mut self, id: &str) -> Result<CompletedText, StreamError> {
        match self.open.take() {
            None => Err(StreamError::EndWithoutStart {
                family: TEXT,
                id: id.to_string(),
            }),
            Some(open) if open.message_id != id => {
                let err = StreamError::IdMismatch {
                    family: TEXT,
                    id: id.to_string(),
                    open: open.message_id.clone(),
                };
                self.open = Some(open);
                Err(err)
            }
            Some(open) => Ok(open),
        }
    }

    /// Id of the open bracket, if any.
    pub fn open_id(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.message_id.as_str())
    }
}

/// A tool call reassembled from its start/args/end bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCall {
    pub id: String,
    pub name: String,
    /// Parsed argument object; `Null` when no args were streamed.
    pub arguments: Value,
}

#[derive(Debug)]
struct OpenCall {
    id: String,
    name: String,
    args: String,
}

/// Reassembles one tool call at a time, buffering argument fragments.
#[derive(Debug, Default)]
pub struct ToolCallBuilder {
    open: Option<OpenCall>,
}

impl ToolCallBuilder {
    /// Open a bracket for call `id`. Errors if one is already open.
    pub fn start(&mut self, id: &str, name: &str) -> Result<(), StreamError> {
        if let Some(open) = &self.open {
            return Err(StreamError::DoubleStart {
                family: TOOL,
                id: id.to_string(),
                open: open.id.clone(),
            });
        }
        self.open = Some(OpenCall {
            id: id.to_string(),
            name: name.to_string(),
            args: String::new(),
        });
        Ok(())
    }

    /// Append an argument fragment in arrival order.
    pub fn args(&mut self, id: &str, delta: &str) -> Result<(), StreamError> {
        match &mut self.open {
            None => Err(StreamError::ContentBeforeStart {
                family: TOOL,
                id: id.to_string(),
            }),
            Some(open) if open.id != id => Err(StreamError::IdMismatch {
                family: TOOL,
                id: id.to_string(),
                open: open.id.clone(),
            }),
            Some(open) => {
                open.args.push_str(delta);
                Ok(())
            }
        }
    }

    /// Close the bracket, parsing the buffered fragments as one JSON value.
    ///
    /// An empty buffer means the call takes no arguments.
    pub fn end(&mut self, id: &str) -> Result<CompletedCall, StreamError> {
        match self.open.take() {
            None => Err(StreamError::EndWithoutStart {
                family: TOOL,
                id: id.to_string(),
            }),
            Some(open) if open.id != id => {
                let err = StreamError::IdMismatch {
                    family: TOOL,
                    id: id.to_string(),
                    open: open.id.clone(),
                };
                self.open = Some(open);
                Err(err)
            }
            Some(open) => {
                let arguments = if open.args.is_empty() {
                    Value::Null
                } else {
                    serde_json::from_str(&open.args).map_err(|source| {
                        StreamError::BadArguments {
                            id: open.id.clone(),
                            source,
                        }
                    })?
                };
                Ok(CompletedCall {
                    id: open.id,
                    name: open.name,
                    arguments,
                })
            }
        }
    }

    /// Id of the open bracket, if any.
    pub fn open_id(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.id.as_str())
    }
}

/// A reasoning message reassembled from its bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedReasoning {
    pub message_id: String,
    pub text: String,
}

/// Reassembles reasoning content: an outer session bracket around inner
/// per-message brackets.
///
/// The session may be opened implicitly by the first inner message; switching
/// to a new message id closes the previous inner message first.
#[derive(Debug, Default)]
pub struct ReasoningBuilder {
    session: Option<String>,
    message: Option<CompletedReasoning>,
}

impl ReasoningBuilder {
    /// Open the session bracket explicitly.
    pub fn start_session(&mut self, id: &str) -> Result<(), StreamError> {
        if let Some(open) = &self.session {
            return Err(StreamError::DoubleStart {
                family: REASONING_SESSION,
                id: id.to_string(),
                open: open.clone(),
            });
        }
        self.session = Some(id.to_string());
        Ok(())
    }

    /// Open an inner message bracket, implicitly opening the session when
    /// none is open. Returns the previous message when the id switched.
    pub fn start_message(&mut self, id: &str) -> Result<Option<CompletedReasoning>, StreamError> {
        if self.session.is_none() {
            self.session = Some(id.to_string());
        }
        let previous = match self.message.take() {
            Some(open) if open.message_id == id => {
                let err = StreamError::DoubleStart {
                    family: REASONING_MSG,
                    id: id.to_string(),
                    open: open.message_id.clone(),
                };
                self.message = Some(open);
                return Err(err);
            }
            Some(open) => Some(open),
            None => None,
        };
        self.message = Some(CompletedReasoning {
            message_id: id.to_string(),
            text: String::new(),
        });
        Ok(previous)
    }

    /// Append a content delta to the open inner message.
    pub fn content(&mut self, id: &str, delta: &str) -> Result<(), StreamError> {
        match &mut self.message {
            None => Err(StreamError::ContentBeforeStart {
                family: REASONING_MSG,
                id: id.to_string(),
            }),
            Some(open) if open.message_id != id => Err(StreamError::IdMismatch {
                family: REASONING_MSG,
                id: id.to_string(),
                open: open.message_id.clone(),
            }),
            Some(open) => {
                open.text.push_str(delta);
                Ok(())
            }
        }
    }

    /// Close the open inner message.
    pub fn end_message(&mut self, id: &str) -> Result<CompletedReasoning, StreamError> {
        match self.message.take() {
            None => Err(StreamError::EndWithoutStart {
                family: REASONING_MSG,
                id: id.to_string(),
            }),
            Some(open) if open.message_id != id => {
                let err = StreamError::IdMismatch {
                    family: REASONING_MSG,
                    id: id.to_string(),
                    open: open.message_id.clone(),
                };
                self.message = Some(open);
                Err(err)
            }
            Some(open) => Ok(open),
        }
    }

    /// Close the session bracket, implicitly closing any open inner message.
    pub fn end_session(&mut self, id: &str) -> Result<Option<CompletedReasoning>, StreamError> {
        match self.session.take() {
            None => Err(StreamError::EndWithoutStart {
                family: REASONING_SESSION,
                id: id.to_string(),
            }),
            Some(open) if open != id => {
                let err = StreamError::IdMismatch {
                    family: REASONING_SESSION,
                    id: id.to_string(),
                    open: open.clone(),
                };
                self.session = Some(open);
                Err(err)
            }
            Some(_) => Ok(self.message.take()),
        }
    }

    /// Id of the open session, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Id of the open inner message, if any.
    pub fn message_id(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.message_id.as_str())
    }
}

/// Interpret tool result content: JSON when the text parses, literal string
/// otherwise.
pub fn parse_result_content(content: &str) -> Value {
    serde_json::from_str(content).unwrap_or_else(|_| Value::String(content.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_builder_accumulates_in_order() {
        let mut builder = TextBuilder::default();
        builder.start("m1").unwrap();
        builder.content("m1", "Hel").unwrap();
        builder.content("m1", "lo").unwrap();
        let done = builder.end("m1").unwrap();
        assert_eq!(done.message_id, "m1");
        assert_eq!(done.text, "Hello");
        assert!(builder.open_id().is_none());
    }

    #[test]
    fn text_content_before_start_is_fatal() {
        let mut builder = TextBuilder::default();
        let err = builder.content("m1", "x").unwrap_err();
        assert!(matches!(err, StreamError::ContentBeforeStart { .. }));
    }

    #[test]
    fn text_double_start_is_fatal() {
        let mut builder = TextBuilder::default();
        builder.start("m1").unwrap();
        let err = builder.start("m2").unwrap_err();
        assert!(matches!(err, StreamError::DoubleStart { .. }));
    }

    #[test]
    fn text_end_for_wrong_id_is_fatal_and_keeps_bracket() {
        let mut builder = TextBuilder::default();
        builder.start("m1").unwrap();
        assert!(matches!(
            builder.end("m2"),
            Err(StreamError::IdMismatch { .. })
        ));
        // The open bracket survives the failed close.
        assert_eq!(builder.open_id(), Some("m1"));
    }

    #[test]
    fn empty_text_delta_is_fatal() {
        let mut builder = TextBuilder::default();
        builder.start("m1").unwrap();
        assert!(matches!(
            builder.content("m1", ""),
            Err(StreamError::EmptyDelta { .. })
        ));
    }

    #[test]
    fn tool_builder_concatenates_fragments() {
        let mut builder = ToolCallBuilder::default();
        builder.start("c1", "lookup").unwrap();
        builder.args("c1", r#"{"q":"#).unwrap();
        builder.args("c1", r#""x"}"#).unwrap();
        let done = builder.end("c1").unwrap();
        assert_eq!(done.name, "lookup");
        assert_eq!(done.arguments, json!({"q": "x"}));
    }

    #[test]
    fn tool_empty_buffer_means_no_arguments() {
        let mut builder = ToolCallBuilder::default();
        builder.start("c1", "ping").unwrap();
        let done = builder.end("c1").unwrap();
        assert_eq!(done.arguments, Value::Null);
    }

    #[test]
    fn tool_malformed_arguments_are_fatal() {
        let mut builder = ToolCallBuilder::default();
        builder.start("c1", "lookup").unwrap();
        builder.args("c1", "{not json").unwrap();
        assert!(matches!(
            builder.end("c1"),
            Err(StreamError::BadArguments { .. })
        ));
    }

    #[test]
    fn tool_args_for_unopened_call_are_fatal() {
        let mut builder = ToolCallBuilder::default();
        assert!(matches!(
            builder.args("c1", "{}"),
            Err(StreamError::ContentBeforeStart { .. })
        ));
    }

    #[test]
    fn reasoning_session_opens_implicitly() {
        let mut builder = ReasoningBuilder::default();
        builder.start_message("r1").unwrap();
        assert_eq!(builder.session_id(), Some("r1"));
        builder.content("r1", "think").unwrap();
        let done = builder.end_message("r1").unwrap();
        assert_eq!(done.text, "think");
    }

    #[test]
    fn reasoning_message_switch_closes_previous() {
        let mut builder = ReasoningBuilder::default();
        builder.start_session("r1").unwrap();
        builder.start_message("r1").unwrap();
        builder.content("r1", "first").unwrap();
        let previous = builder.start_message("r2").unwrap().unwrap();
        assert_eq!(previous.message_id, "r1");
        assert_eq!(previous.text, "first");
        assert_eq!(builder.message_id(), Some("r2"));
    }

    #[test]
    fn reasoning_session_end_closes_inner_message() {
        let mut builder = ReasoningBuilder::default();
        builder.start_message("r1").unwrap();
        builder.content("r1", "tail").unwrap();
        let inner = builder.end_session("r1").unwrap().unwrap();
        assert_eq!(inner.text, "tail");
        assert!(builder.session_id().is_none());
    }

    #[test]
    fn reasoning_session_end_for_wrong_id_is_fatal() {
        let mut builder = ReasoningBuilder::default();
        builder.start_session("r1").unwrap();
        assert!(matches!(
            builder.end_session("r9"),
            Err(StreamError::IdMismatch { .. })
        ));
    }

    #[test]
    fn result_content_parses_json_or_stays_literal() {
        assert_eq!(parse_result_content(r#"{"ok":true}"#), json!({"ok": true}));
        assert_eq!(parse_result_content("42"), json!(42));
        assert_eq!(
            parse_result_content("plain words"),
            Value::String("plain words".into())
        );
    }
}
