//! Outbound translator: generic chat deltas in, ordered wire events out.

use crate::error::StreamError;
use crate::interrupt::{pause_to_wire, PauseRequest};
use crate::transcode::Transcode;
use crate::update::{AgentUpdate, RunContext};
use seam_wire::Event;
use tracing::warn;

/// Translates one run's delta stream into the canonical wire event sequence.
///
/// Stateful over a single run: synthesizes the lifecycle wrapper, keeps text
/// and reasoning framing mutually exclusive, and latches after a terminal
/// event so nothing further is emitted. Persisting the resulting history is
/// the caller's job, after the stream has fully drained.
#[derive(Debug)]
pub struct RunEncoder {
    context: RunContext,
    started: bool,
    finished: bool,
    /// Message id of the open text bracket.
    open_text: Option<String>,
    /// Id of the open reasoning session; reuses the first inner message id.
    reasoning_session: Option<String>,
    /// Message id of the open inner reasoning bracket.
    open_reasoning: Option<String>,
    pause: Option<PauseRequest>,
}

impl RunEncoder {
    /// Create an encoder for one run.
    pub fn new(context: RunContext) -> Self {
        Self {
            context,
            started: false,
            finished: false,
            open_text: None,
            reasoning_session: None,
            open_reasoning: None,
            pause: None,
        }
    }

    /// The run identities this encoder stamps on lifecycle events.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Whether a terminal event has been emitted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The pause request that suspended this run, when it did.
    pub fn pause(&self) -> Option<&PauseRequest> {
        self.pause.as_ref()
    }

    fn ensure_started(&mut self, out: &mut Vec<Event>) {
        if !self.started {
            out.push(Event::run_started(
                &self.context.thread_id,
                &self.context.run_id,
                self.context.parent_run_id.clone(),
            ));
            self.started = true;
        }
    }

    fn close_text(&mut self, out: &mut Vec<Event>) {
        if let Some(id) = self.open_text.take() {
            out.push(Event::text_message_end(id));
        }
    }

    fn close_reasoning(&mut self, out: &mut Vec<Event>) {
        if let Some(id) = self.open_reasoning.take() {
            out.push(Event::reasoning_message_end(id));
        }
        if let Some(id) = self.reasoning_session.take() {
            out.push(Event::reasoning_end(id));
        }
    }
}

impl Transcode for RunEncoder {
    type Input = AgentUpdate;
    type Output = Event;
    type Error = StreamError;

    fn transcode(&mut self, update: &AgentUpdate) -> Result<Vec<Event>, StreamError> {
        // After the terminal event, suppress everything.
        if self.finished {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        match update {
            AgentUpdate::TextDelta { message_id, delta } => {
                if delta.is_empty() {
                    return Ok(out);
                }
                self.ensure_started(&mut out);
                // Text and reasoning are mutually exclusive message streams.
                self.close_reasoning(&mut out);
                if self.open_text.as_deref() != Some(message_id.as_str()) {
                    self.close_text(&mut out);
                    out.push(Event::text_message_start(message_id));
                    self.open_text = Some(message_id.clone());
                }
                out.push(Event::text_message_content(message_id, delta));
            }

            AgentUpdate::FunctionCall {
                id,
                name,
                arguments,
            } => {
                self.ensure_started(&mut out);
                self.close_reasoning(&mut out);
                self.close_text(&mut out);
                out.push(Event::tool_call_start(id, name, None));
                // Arguments arrive complete upstream, so they go out as one
                // JSON blob rather than token-by-token fragments.
                if !arguments.is_null() {
                    let blob = match serde_json::to_string(arguments) {
                        Ok(blob) => blob,
                        Err(err) => {
                            warn!(error = %err, tool_call_id = %id, "failed to serialize tool arguments");
                            "{}".to_string()
                        }
                    };
                    out.push(Event::tool_call_args(id, blob));
                }
                out.push(Event::tool_call_end(id));
            }

            AgentUpdate::FunctionResult {
                call_id,
                message_id,
                content,
            } => {
                self.ensure_started(&mut out);
                let msg_id = message_id
                    .clone()
                    .unwrap_or_else(|| format!("result_{call_id}"));
                let content = match serde_json::to_string(content) {
                    Ok(content) => content,
                    Err(err) => {
                        warn!(error = %err, tool_call_id = %call_id, "failed to serialize tool result");
                        r#"{"error":"failed to serialize tool result"}"#.to_string()
                    }
                };
                out.push(Event::tool_call_result(msg_id, call_id, content));
            }

            AgentUpdate::ReasoningDelta { message_id, delta } => {
                if delta.is_empty() {
                    return Ok(out);
                }
                self.ensure_started(&mut out);
                self.close_text(&mut out);
                if self.reasoning_session.is_none() {
                    out.push(Event::reasoning_start(message_id));
                    self.reasoning_session = Some(message_id.clone());
                }
                if self.open_reasoning.as_deref() != Some(message_id.as_str()) {
                    if let Some(open) = self.open_reasoning.take() {
                        out.push(Event::reasoning_message_end(open));
                    }
                    out.push(Event::reasoning_message_start(message_id));
                    self.open_reasoning = Some(message_id.clone());
                }
                out.push(Event::reasoning_message_content(message_id, delta));
            }

            AgentUpdate::StateSnapshot { snapshot } => {
                self.ensure_started(&mut out);
                // Passed through unvalidated; patch semantics are the
                // consumer's concern.
                out.push(Event::state_snapshot(snapshot.clone()));
            }

            AgentUpdate::StatePatch { ops } => {
                self.ensure_started(&mut out);
                out.push(Event::state_delta(ops.clone()));
            }

            AgentUpdate::Pause(request) => {
                self.ensure_started(&mut out);
                self.close_reasoning(&mut out);
                self.close_text(&mut out);
                let interrupt = pause_to_wire(request);
                out.push(Event::run_interrupted(
                    &self.context.thread_id,
                    &self.context.run_id,
                    interrupt,
                ));
                self.pause = Some(request.clone());
                self.finished = true;
            }

            AgentUpdate::Passthrough(event) => {
                if !self.started {
                    if let Event::RunStarted { .. } = event {
                        // The upstream supplied its own lifecycle opener.
                        self.started = true;
                        out.push(event.clone());
                        return Ok(out);
                    }
                }
                self.ensure_started(&mut out);
                if event.is_terminal() {
                    self.close_reasoning(&mut out);
                    self.close_text(&mut out);
                    self.finished = true;
                }
                out.push(event.clone());
            }
        }
        Ok(out)
    }

    fn finish(&mut self) -> Result<Vec<Event>, StreamError> {
        if self.finished {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        self.ensure_started(&mut out);
        self.close_reasoning(&mut out);
        self.close_text(&mut out);
        out.push(Event::run_finished(
            &self.context.thread_id,
            &self.context.run_id,
            None,
        ));
        self.finished = true;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn encoder() -> RunEncoder {
        RunEncoder::new(RunContext::new("t1", "r1"))
    }

    fn types(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .map(|e| {
                serde_json::to_value(e).unwrap()["type"]
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect()
    }

    fn drain(encoder: &mut RunEncoder, updates: &[AgentUpdate]) -> Vec<Event> {
        let mut events = Vec::new();
        for update in updates {
            events.extend(encoder.transcode(update).unwrap());
        }
        events.extend(encoder.finish().unwrap());
        events
    }

    #[test]
    fn single_text_fragment_produces_full_framing() {
        let events = drain(&mut encoder(), &[AgentUpdate::text("m1", "Hello")]);
        assert_eq!(
            types(&events),
            vec![
                "RUN_STARTED",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "RUN_FINISHED",
            ]
        );
        let content = serde_json::to_value(&events[2]).unwrap();
        assert_eq!(content["messageId"], "m1");
        assert_eq!(content["delta"], "Hello");
    }

    #[test]
    fn function_call_expands_to_bracket_with_single_blob() {
        let events = drain(
            &mut encoder(),
            &[AgentUpdate::call("c1", "lookup", json!({"q": "x"}))],
        );
        assert_eq!(
            types(&events),
            vec![
                "RUN_STARTED",
                "TOOL_CALL_START",
                "TOOL_CALL_ARGS",
                "TOOL_CALL_END",
                "RUN_FINISHED",
            ]
        );
        let args = serde_json::to_value(&events[2]).unwrap();
        assert_eq!(args["toolCallId"], "c1");
        assert_eq!(args["delta"], r#"{"q":"x"}"#);
    }

    #[test]
    fn null_arguments_skip_the_args_event() {
        let events = drain(&mut encoder(), &[AgentUpdate::call("c1", "ping", Value::Null)]);
        assert_eq!(
            types(&events),
            vec!["RUN_STARTED", "TOOL_CALL_START", "TOOL_CALL_END", "RUN_FINISHED"]
        );
    }

    #[test]
    fn text_id_change_closes_previous_message() {
        let events = drain(
            &mut encoder(),
            &[AgentUpdate::text("m1", "one"), AgentUpdate::text("m2", "two")],
        );
        assert_eq!(
            types(&events),
            vec![
                "RUN_STARTED",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "RUN_FINISHED",
            ]
        );
        let first_end = serde_json::to_value(&events[3]).unwrap();
        assert_eq!(first_end["messageId"], "m1");
        let second_start = serde_json::to_value(&events[4]).unwrap();
        assert_eq!(second_start["messageId"], "m2");
    }

    #[test]
    fn same_text_id_keeps_one_bracket() {
        let events = drain(
            &mut encoder(),
            &[AgentUpdate::text("m1", "a"), AgentUpdate::text("m1", "b")],
        );
        assert_eq!(
            types(&events),
            vec![
                "RUN_STARTED",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "RUN_FINISHED",
            ]
        );
    }

    #[test]
    fn reasoning_closes_before_text_opens() {
        let events = drain(
            &mut encoder(),
            &[
                AgentUpdate::reasoning("rs1", "thinking"),
                AgentUpdate::text("m1", "answer"),
            ],
        );
        assert_eq!(
            types(&events),
            vec![
                "RUN_STARTED",
                "REASONING_START",
                "REASONING_MESSAGE_START",
                "REASONING_MESSAGE_CONTENT",
                "REASONING_MESSAGE_END",
                "REASONING_END",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "RUN_FINISHED",
            ]
        );
    }

    #[test]
    fn reasoning_message_switch_stays_in_one_session() {
        let events = drain(
            &mut encoder(),
            &[
                AgentUpdate::reasoning("rs1", "first"),
                AgentUpdate::reasoning("rs2", "second"),
            ],
        );
        assert_eq!(
            types(&events),
            vec![
                "RUN_STARTED",
                "REASONING_START",
                "REASONING_MESSAGE_START",
                "REASONING_MESSAGE_CONTENT",
                "REASONING_MESSAGE_END",
                "REASONING_MESSAGE_START",
                "REASONING_MESSAGE_CONTENT",
                "REASONING_MESSAGE_END",
                "REASONING_END",
                "RUN_FINISHED",
            ]
        );
        // Session id sticks to the first inner message.
        let session_end = serde_json::to_value(&events[8]).unwrap();
        assert_eq!(session_end["messageId"], "rs1");
    }

    #[test]
    fn pause_emits_terminal_interrupt_and_latches() {
        let mut enc = encoder();
        let mut events = enc.transcode(&AgentUpdate::text("m1", "checking")).unwrap();
        events.extend(
            enc.transcode(&AgentUpdate::Pause(PauseRequest::approval(
                "i1",
                "delete_file",
                json!({"path": "/a"}),
            )))
            .unwrap(),
        );
        assert_eq!(
            types(&events),
            vec![
                "RUN_STARTED",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "RUN_FINISHED",
            ]
        );
        let terminal = serde_json::to_value(events.last().unwrap()).unwrap();
        assert_eq!(terminal["outcome"], "interrupt");
        assert_eq!(terminal["interrupt"]["payload"]["functionName"], "delete_file");
        assert!(enc.pause().is_some());

        // Nothing more after the terminal event, including the epilogue.
        assert!(enc.transcode(&AgentUpdate::text("m2", "late")).unwrap().is_empty());
        assert!(enc.finish().unwrap().is_empty());
    }

    #[test]
    fn empty_input_still_produces_a_complete_lifecycle() {
        let events = drain(&mut encoder(), &[]);
        assert_eq!(types(&events), vec!["RUN_STARTED", "RUN_FINISHED"]);
    }

    #[test]
    fn passthrough_run_started_is_not_duplicated() {
        let events = drain(
            &mut encoder(),
            &[
                AgentUpdate::Passthrough(Event::run_started("t1", "r1", None)),
                AgentUpdate::text("m1", "hi"),
            ],
        );
        assert_eq!(types(&events)[0], "RUN_STARTED");
        assert_eq!(
            types(&events).iter().filter(|t| *t == "RUN_STARTED").count(),
            1
        );
    }

    #[test]
    fn passthrough_terminal_suppresses_synthesized_finish() {
        let events = drain(
            &mut encoder(),
            &[
                AgentUpdate::text("m1", "partial"),
                AgentUpdate::Passthrough(Event::run_error("upstream exploded", None)),
            ],
        );
        assert_eq!(
            types(&events),
            vec![
                "RUN_STARTED",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "RUN_ERROR",
            ]
        );
    }

    #[test]
    fn state_events_pass_through_unvalidated() {
        let events = drain(
            &mut encoder(),
            &[
                AgentUpdate::StateSnapshot {
                    snapshot: json!({"step": 1}),
                },
                AgentUpdate::StatePatch {
                    ops: vec![json!({"op": "replace", "path": "/step", "value": 2})],
                },
            ],
        );
        assert_eq!(
            types(&events),
            vec!["RUN_STARTED", "STATE_SNAPSHOT", "STATE_DELTA", "RUN_FINISHED"]
        );
    }

    #[test]
    fn empty_text_delta_is_dropped() {
        let events = drain(&mut encoder(), &[AgentUpdate::text("m1", "")]);
        assert_eq!(types(&events), vec!["RUN_STARTED", "RUN_FINISHED"]);
    }

    #[test]
    fn result_message_id_is_synthesized_when_absent() {
        let events = drain(&mut encoder(), &[AgentUpdate::result("c1", json!(42))]);
        let result = serde_json::to_value(&events[1]).unwrap();
        assert_eq!(result["type"], "TOOL_CALL_RESULT");
        assert_eq!(result["messageId"], "result_c1");
        assert_eq!(result["content"], "42");
        assert_eq!(result["role"], "tool");
    }
}
