//! Inbound translator: wire events in, generic chat deltas out.

use crate::builders::{parse_result_content, ReasoningBuilder, TextBuilder, ToolCallBuilder};
use crate::chunks::ChunkExpander;
use crate::error::StreamError;
use crate::interrupt::{pause_from_wire, PauseRequest};
use crate::transcode::Transcode;
use crate::update::AgentUpdate;
use seam_wire::{Event, RunOutcome};
use serde_json::Value;

const TEXT: &str = "text message";
const TOOL: &str = "tool call";
const REASONING_MSG: &str = "reasoning message";
const REASONING_SESSION: &str = "reasoning session";

/// Validates one run's wire event sequence and reconstructs the delta stream.
///
/// Exact inverse of the outbound translator: ordering violations are fatal,
/// chunk events are normalized before accumulation, and the terminal event
/// must name the same run as `RUN_STARTED`. Call [`Transcode::finish`] once
/// the stream ends to detect truncation.
#[derive(Debug, Default)]
pub struct RunDecoder {
    /// `(thread_id, run_id)` from the opening event.
    run: Option<(String, String)>,
    chunks: ChunkExpander,
    text: TextBuilder,
    tool: ToolCallBuilder,
    reasoning: ReasoningBuilder,
    /// Last accepted state snapshot with all deltas applied.
    state: Option<Value>,
    pause: Option<PauseRequest>,
    finished: bool,
}

impl RunDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identities announced by `RUN_STARTED`, once seen.
    pub fn identity(&self) -> Option<(&str, &str)> {
        self.run
            .as_ref()
            .map(|(thread, run)| (thread.as_str(), run.as_str()))
    }

    /// The state value tracked across snapshot and delta events.
    pub fn current_state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    /// The pause request carried by the terminal event, when the run paused.
    pub fn pause(&self) -> Option<&PauseRequest> {
        self.pause.as_ref()
    }

    /// Whether a terminal event has been accepted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply one canonical (chunk-free) event.
    fn apply(&mut self, event: &Event, out: &mut Vec<AgentUpdate>) -> Result<(), StreamError> {
        if self.finished {
            return Err(StreamError::EventAfterTerminal {
                got: event.type_name(),
            });
        }
        if self.run.is_none() && !matches!(event, Event::RunStarted { .. }) {
            return Err(StreamError::MissingRunStart {
                got: event.type_name(),
            });
        }
        match event {
            Event::RunStarted {
                thread_id, run_id, ..
            } => {
                if self.run.is_some() {
                    return Err(StreamError::DuplicateRunStart {
                        run_id: run_id.clone(),
                    });
                }
                self.run = Some((thread_id.clone(), run_id.clone()));
            }

            Event::TextMessageStart { message_id, .. } => {
                self.text.start(message_id)?;
            }
            Event::TextMessageContent {
                message_id, delta, ..
            } => {
                self.text.content(message_id, delta)?;
                out.push(AgentUpdate::text(message_id, delta));
            }
            Event::TextMessageEnd { message_id, .. } => {
                self.text.end(message_id)?;
            }

            Event::ReasoningStart { message_id, .. } => {
                self.reasoning.start_session(message_id)?;
            }
            Event::ReasoningMessageStart { message_id, .. } => {
                self.reasoning.start_message(message_id)?;
            }
            Event::ReasoningMessageContent {
                message_id, delta, ..
            } => {
                self.reasoning.content(message_id, delta)?;
                out.push(AgentUpdate::reasoning(message_id, delta));
            }
            Event::ReasoningMessageEnd { message_id, .. } => {
                self.reasoning.end_message(message_id)?;
            }
            Event::ReasoningEnd { message_id, .. } => {
                self.reasoning.end_session(message_id)?;
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
                out.push(AgentUpdate::FunctionCall {
                    id: call.id,
                    name: call.name,
                    arguments: call.arguments,
                });
            }
            Event::ToolCallResult {
                message_id,
                tool_call_id,
                content,
                ..
            } => {
                out.push(AgentUpdate::FunctionResult {
                    call_id: tool_call_id.clone(),
                    message_id: Some(message_id.clone()),
                    content: parse_result_content(content),
                });
            }

            Event::StateSnapshot { snapshot, .. } => {
                self.state = Some(snapshot.clone());
                out.push(AgentUpdate::StateSnapshot {
                    snapshot: snapshot.clone(),
                });
            }
            Event::StateDelta { delta, .. } => {
                let Some(state) = self.state.as_mut() else {
                    return Err(StreamError::PatchWithoutSnapshot);
                };
                let patch: json_patch::Patch =
                    serde_json::from_value(Value::Array(delta.clone()))
                        .map_err(StreamError::BadPatch)?;
                json_patch::patch(state, &patch)
                    .map_err(|err| StreamError::PatchFailed(err.to_string()))?;
                out.push(AgentUpdate::StatePatch { ops: delta.clone() });
            }

            Event::RunFinished {
                thread_id,
                run_id,
                outcome,
                interrupt,
                ..
            } => {
                self.check_terminal(thread_id, run_id)?;
                if *outcome == Some(RunOutcome::Interrupt) {
                    let Some(interrupt) = interrupt else {
                        return Err(StreamError::MissingInterrupt);
                    };
                    let pause = pause_from_wire(interrupt);
                    self.pause = Some(pause.clone());
                    out.push(AgentUpdate::Pause(pause));
                }
                self.finished = true;
            }
            Event::RunError { .. } => {
                // Errors carry no run identity, so there is nothing to match;
                // open brackets simply die with the run.
                self.finished = true;
                out.push(AgentUpdate::Passthrough(event.clone()));
            }

            Event::StepStarted { .. }
            | Event::StepFinished { .. }
            | Event::MessagesSnapshot { .. }
            | Event::Raw { .. }
            | Event::Custom { .. } => {
                out.push(AgentUpdate::Passthrough(event.clone()));
            }

            // The expander rewrites chunks before they reach this point.
            Event::TextMessageChunk { .. }
            | Event::ReasoningMessageChunk { .. }
            | Event::ToolCallChunk { .. } => {
                return Err(StreamError::BadChunk("chunk event escaped normalization"));
            }
        }
        Ok(())
    }

    /// Reject a terminal event that names a different run or leaves framing
    /// open.
    fn check_terminal(&self, thread_id: &str, run_id: &str) -> Result<(), StreamError> {
        match &self.run {
            Some((thread, run)) if thread == thread_id && run == run_id => {}
            _ => {
                return Err(StreamError::TerminalMismatch {
                    thread_id: thread_id.to_string(),
                    run_id: run_id.to_string(),
                });
            }
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
        if let Some(id) = self.reasoning.message_id() {
            return Err(StreamError::UnclosedFraming {
                family: REASONING_MSG,
                id: id.to_string(),
            });
        }
        if let Some(id) = self.reasoning.session_id() {
            return Err(StreamError::UnclosedFraming {
                family: REASONING_SESSION,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl Transcode for RunDecoder {
    type Input = Event;
    type Output = AgentUpdate;
    type Error = StreamError;

    fn transcode(&mut self, event: &Event) -> Result<Vec<AgentUpdate>, StreamError> {
        let mut out = Vec::new();
        for canonical in self.chunks.push(event)? {
            self.apply(&canonical, &mut out)?;
        }
        Ok(out)
    }

    fn finish(&mut self) -> Result<Vec<AgentUpdate>, StreamError> {
        if !self.finished {
            return Err(StreamError::TruncatedRun);
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drain(events: &[Event]) -> Result<Vec<AgentUpdate>, StreamError> {
        let mut decoder = RunDecoder::new();
        let mut out = Vec::new();
        for event in events {
            out.extend(decoder.transcode(event)?);
        }
        out.extend(decoder.finish()?);
        Ok(out)
    }

    fn simple_run(body: Vec<Event>) -> Vec<Event> {
        let mut events = vec![Event::run_started("t1", "r1", None)];
        events.extend(body);
        events.push(Event::run_finished("t1", "r1", None));
        events
    }

    #[test]
    fn text_run_reconstructs_deltas() {
        let updates = drain(&simple_run(vec![
            Event::text_message_start("m1"),
            Event::text_message_content("m1", "Hel"),
            Event::text_message_content("m1", "lo"),
            Event::text_message_end("m1"),
        ]))
        .unwrap();
        assert_eq!(
            updates,
            vec![
                AgentUpdate::text("m1", "Hel"),
                AgentUpdate::text("m1", "lo"),
            ]
        );
    }

    #[test]
    fn tool_call_surfaces_once_complete() {
        let updates = drain(&simple_run(vec![
            Event::tool_call_start("c1", "lookup", None),
            Event::tool_call_args("c1", r#"{"q":"#),
            Event::tool_call_args("c1", r#""x"}"#),
            Event::tool_call_end("c1"),
        ]))
        .unwrap();
        assert_eq!(
            updates,
            vec![AgentUpdate::call("c1", "lookup", json!({"q": "x"}))]
        );
    }

    #[test]
    fn first_event_must_open_the_run() {
        let err = drain(&[Event::text_message_start("m1")]).unwrap_err();
        assert!(matches!(
            err,
            StreamError::MissingRunStart {
                got: "TEXT_MESSAGE_START"
            }
        ));
    }

    #[test]
    fn duplicate_run_start_is_fatal() {
        let err = drain(&[
            Event::run_started("t1", "r1", None),
            Event::run_started("t1", "r1", None),
        ])
        .unwrap_err();
        assert!(matches!(err, StreamError::DuplicateRunStart { .. }));
    }

    #[test]
    fn events_after_terminal_are_fatal() {
        let err = drain(&[
            Event::run_started("t1", "r1", None),
            Event::run_finished("t1", "r1", None),
            Event::text_message_start("m1"),
        ])
        .unwrap_err();
        assert!(matches!(err, StreamError::EventAfterTerminal { .. }));
    }

    #[test]
    fn terminal_for_another_run_is_fatal() {
        let err = drain(&[
            Event::run_started("t1", "r1", None),
            Event::run_finished("t1", "other", None),
        ])
        .unwrap_err();
        assert!(matches!(err, StreamError::TerminalMismatch { .. }));
    }

    #[test]
    fn terminal_with_open_bracket_is_fatal() {
        let err = drain(&[
            Event::run_started("t1", "r1", None),
            Event::text_message_start("m1"),
            Event::run_finished("t1", "r1", None),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            StreamError::UnclosedFraming { family: "text message", .. }
        ));
    }

    #[test]
    fn truncated_stream_is_fatal() {
        let mut decoder = RunDecoder::new();
        decoder
            .transcode(&Event::run_started("t1", "r1", None))
            .unwrap();
        assert!(matches!(decoder.finish(), Err(StreamError::TruncatedRun)));
    }

    #[test]
    fn interrupt_finish_surfaces_the_pause() {
        let interrupt = seam_wire::Interrupt::new("i1")
            .with_payload(json!({"functionName": "drop_table", "functionArguments": {"t": "x"}}));
        let updates = drain(&[
            Event::run_started("t1", "r1", None),
            Event::run_interrupted("t1", "r1", interrupt),
        ])
        .unwrap();
        assert_eq!(updates.len(), 1);
        let AgentUpdate::Pause(pause) = &updates[0] else {
            panic!("expected pause, got {updates:?}");
        };
        assert!(pause.is_approval());
        assert_eq!(pause.id(), "i1");
    }

    #[test]
    fn interrupt_outcome_without_payload_is_fatal() {
        let terminal = Event::RunFinished {
            thread_id: "t1".into(),
            run_id: "r1".into(),
            result: None,
            outcome: Some(RunOutcome::Interrupt),
            interrupt: None,
            base: Default::default(),
        };
        let err = drain(&[Event::run_started("t1", "r1", None), terminal]).unwrap_err();
        assert!(matches!(err, StreamError::MissingInterrupt));
    }

    #[test]
    fn state_delta_requires_a_snapshot() {
        let err = drain(&simple_run(vec![Event::state_delta(vec![
            json!({"op": "add", "path": "/a", "value": 1}),
        ])]))
        .unwrap_err();
        assert!(matches!(err, StreamError::PatchWithoutSnapshot));
    }

    #[test]
    fn state_deltas_apply_to_tracked_state() {
        let mut decoder = RunDecoder::new();
        for event in [
            Event::run_started("t1", "r1", None),
            Event::state_snapshot(json!({"count": 1})),
            Event::state_delta(vec![json!({"op": "replace", "path": "/count", "value": 2})]),
        ] {
            decoder.transcode(&event).unwrap();
        }
        assert_eq!(decoder.current_state(), Some(&json!({"count": 2})));
    }

    #[test]
    fn malformed_patch_operations_are_fatal() {
        let err = drain(&simple_run(vec![
            Event::state_snapshot(json!({})),
            Event::state_delta(vec![json!({"op": "no-such-op", "path": "/a"})]),
        ]))
        .unwrap_err();
        assert!(matches!(err, StreamError::BadPatch(_)));
    }

    #[test]
    fn unapplicable_patch_is_fatal() {
        let err = drain(&simple_run(vec![
            Event::state_snapshot(json!({})),
            Event::state_delta(vec![
                json!({"op": "replace", "path": "/missing", "value": 1}),
            ]),
        ]))
        .unwrap_err();
        assert!(matches!(err, StreamError::PatchFailed(_)));
    }

    #[test]
    fn chunked_text_normalizes_before_validation() {
        let updates = drain(&[
            Event::run_started("t1", "r1", None),
            Event::text_message_chunk(Some("m1".into()), None, Some("Hel".into())),
            Event::text_message_chunk(None, None, Some("lo".into())),
            Event::run_finished("t1", "r1", None),
        ])
        .unwrap();
        assert_eq!(
            updates,
            vec![
                AgentUpdate::text("m1", "Hel"),
                AgentUpdate::text("m1", "lo"),
            ]
        );
    }

    #[test]
    fn tool_result_carries_parsed_content() {
        let updates = drain(&simple_run(vec![Event::tool_call_result(
            "m2",
            "c1",
            r#"{"rows": 3}"#,
        )]))
        .unwrap();
        assert_eq!(
            updates,
            vec![AgentUpdate::FunctionResult {
                call_id: "c1".into(),
                message_id: Some("m2".into()),
                content: json!({"rows": 3}),
            }]
        );
    }

    #[test]
    fn steps_and_custom_events_pass_through() {
        let updates = drain(&simple_run(vec![
            Event::step_started("plan"),
            Event::custom("tick", json!(1)),
            Event::step_finished("plan"),
        ]))
        .unwrap();
        assert_eq!(updates.len(), 3);
        assert!(updates
            .iter()
            .all(|u| matches!(u, AgentUpdate::Passthrough(_))));
    }

    #[test]
    fn run_error_terminates_without_identity_check() {
        let mut decoder = RunDecoder::new();
        decoder
            .transcode(&Event::run_started("t1", "r1", None))
            .unwrap();
        let updates = decoder
            .transcode(&Event::run_error("producer failed", Some("PRODUCER".into())))
            .unwrap();
        assert!(matches!(updates[0], AgentUpdate::Passthrough(_)));
        assert!(decoder.is_finished());
        assert!(decoder.finish().is_ok());
    }
}
