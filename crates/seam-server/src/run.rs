//! The run pipeline: lock, load, resume, produce, translate, stream, persist.

use bytes::Bytes;
use futures::StreamExt;
use seam_session::{PendingInterrupt, Session};
use seam_stream::{
    resume_from_wire, AgentUpdate, ResumeAnswer, RunContext, RunEncoder, Transcode,
    TranscriptBuilder,
};
use seam_wire::{Event, Message, RunAgentInput};
use std::collections::HashSet;
use tokio::sync::{mpsc, OwnedMutexGuard};
use tracing::{debug, error, warn};

use crate::producer::{ProducerError, ProducerRequest};
use crate::service::{ApiError, AppState};
use crate::sse::event_frame;

/// Resolve the pending marker a resume call answers.
///
/// The marker leaves the in-memory session immediately but only leaves the
/// persisted session when the run's save completes, so a failed run keeps
/// the interrupt resolvable by a retry.
pub(crate) fn prepare_resume(
    session: &mut Session,
    request: &RunAgentInput,
) -> Result<Option<ResumeAnswer>, ApiError> {
    let Some(resume) = &request.resume else {
        return Ok(None);
    };
    let pending = session
        .resolve_interrupt(&resume.interrupt_id)
        .ok_or_else(|| ApiError::UnknownInterrupt(resume.interrupt_id.clone()))?;
    Ok(Some(resume_from_wire(resume, &pending.request)))
}

/// Drive one run in the background, returning its framed event stream.
///
/// The guard serializes runs per thread id and is held until the session is
/// saved or the run is abandoned.
pub(crate) fn spawn_run(
    state: AppState,
    request: RunAgentInput,
    session: Session,
    resume: Option<ResumeAnswer>,
    guard: OwnedMutexGuard<()>,
) -> mpsc::Receiver<Bytes> {
    let (tx, rx) = mpsc::channel::<Bytes>(64);
    tokio::spawn(async move {
        let _guard = guard;
        drive(state, request, session, resume, tx).await;
    });
    rx
}

async fn drive(
    state: AppState,
    request: RunAgentInput,
    mut session: Session,
    resume: Option<ResumeAnswer>,
    tx: mpsc::Sender<Bytes>,
) {
    let context = run_context(&request);
    let mut encoder = RunEncoder::new(context.clone());
    let mut transcript = TranscriptBuilder::new();
    let mut sent = 0usize;

    merge_request_messages(&mut session, &request.messages);

    let producer_request = ProducerRequest {
        context,
        messages: session.messages.clone(),
        tools: request.tools.clone(),
        client_context: request.context.clone(),
        state: request.state.clone().or_else(|| session.state.clone()),
        resume,
    };

    let mut updates = match state.producer.produce(producer_request).await {
        Ok(stream) => stream,
        Err(error) => {
            fail(&tx, &request, sent, error).await;
            return;
        }
    };

    while let Some(item) = updates.next().await {
        let update = match item {
            Ok(update) => update,
            Err(error) => {
                fail(&tx, &request, sent, error).await;
                return;
            }
        };
        if let AgentUpdate::StateSnapshot { snapshot } = &update {
            session.state = Some(snapshot.clone());
        }
        let events = match encoder.transcode(&update) {
            Ok(events) => events,
            Err(error) => {
                error!(%error, thread_id = %request.thread_id, "outbound translation failed");
                let failure = ProducerError::new("outbound translation failed")
                    .with_code("TRANSLATION_FAILURE");
                fail(&tx, &request, sent, failure).await;
                return;
            }
        };
        if !emit(&tx, &mut transcript, &events, &mut sent, &request).await {
            return;
        }
    }

    let epilogue = match encoder.finish() {
        Ok(events) => events,
        Err(error) => {
            error!(%error, thread_id = %request.thread_id, "outbound translation failed");
            let failure =
                ProducerError::new("outbound translation failed").with_code("TRANSLATION_FAILURE");
            fail(&tx, &request, sent, failure).await;
            return;
        }
    };
    if !emit(&tx, &mut transcript, &epilogue, &mut sent, &request).await {
        return;
    }

    persist(&state, &request, session, &encoder, transcript).await;
}

/// Send frames and mirror them into the transcript.
///
/// Returns false when the client is gone; the run is then abandoned and the
/// session stays as of its last completed save.
async fn emit(
    tx: &mpsc::Sender<Bytes>,
    transcript: &mut TranscriptBuilder,
    events: &[Event],
    sent: &mut usize,
    request: &RunAgentInput,
) -> bool {
    for event in events {
        if let Err(error) = transcript.push(event) {
            error!(%error, thread_id = %request.thread_id, "transcript rejected outbound event");
        }
        let Some(frame) = event_frame(event) else {
            continue;
        };
        if tx.send(frame).await.is_err() {
            debug!(
                thread_id = %request.thread_id,
                run_id = %request.run_id,
                "client disconnected; abandoning run"
            );
            return false;
        }
        *sent += 1;
    }
    true
}

/// End the stream with a `RUN_ERROR`, synthesizing `RUN_STARTED` when the
/// failure precedes the first frame. Nothing is persisted for a failed run.
async fn fail(tx: &mpsc::Sender<Bytes>, request: &RunAgentInput, sent: usize, error: ProducerError) {
    warn!(
        %error,
        thread_id = %request.thread_id,
        run_id = %request.run_id,
        "producer failed; ending run"
    );
    if sent == 0 {
        let started = Event::run_started(
            &request.thread_id,
            &request.run_id,
            request.parent_run_id.clone(),
        );
        match event_frame(&started) {
            Some(frame) => {
                if tx.send(frame).await.is_err() {
                    return;
                }
            }
            None => return,
        }
    }
    let event = Event::run_error(error.message, error.code);
    if let Some(frame) = event_frame(&event) {
        let _ = tx.send(frame).await;
    }
}

async fn persist(
    state: &AppState,
    request: &RunAgentInput,
    mut session: Session,
    encoder: &RunEncoder,
    transcript: TranscriptBuilder,
) {
    if let Some(pause) = encoder.pause() {
        session.record_interrupt(PendingInterrupt::new(&request.run_id, pause.clone()));
    }
    match transcript.finish() {
        Ok(messages) => session.messages.extend(messages),
        Err(error) => {
            error!(%error, thread_id = %request.thread_id, "transcript folding failed; run not persisted");
            return;
        }
    }
    session.touch();
    match state.store.save(&session).await {
        Ok(committed) => debug!(
            thread_id = %request.thread_id,
            run_id = %request.run_id,
            version = committed.version,
            "session saved"
        ),
        Err(error) => {
            error!(%error, thread_id = %request.thread_id, "session save failed")
        }
    }
}

fn run_context(request: &RunAgentInput) -> RunContext {
    let mut context = RunContext::new(&request.thread_id, &request.run_id);
    if let Some(parent) = &request.parent_run_id {
        context = context.with_parent_run_id(parent);
    }
    if let Some(props) = &request.forwarded_props {
        context = context.with_forwarded_props(props.clone());
    }
    context
}

/// Fold the request's messages into the session, skipping ids already in
/// the history. Messages without ids are always appended.
fn merge_request_messages(session: &mut Session, incoming: &[Message]) {
    let known: HashSet<String> = session
        .messages
        .iter()
        .filter_map(|m| m.id().map(str::to_string))
        .collect();
    for message in incoming {
        if message.id().is_some_and(|id| known.contains(id)) {
            continue;
        }
        session.messages.push(message.clone());
    }
}
