use thiserror::Error;

/// Protocol violations raised by the translators and accumulators.
///
/// Every variant is fatal for the stream that raised it: the peer is
/// non-compliant and further reconstruction would be unsound, so nothing here
/// is retried or repaired.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Content or args arrived for an id with no open bracket.
    #[error("{family} content for '{id}' arrived before its start")]
    ContentBeforeStart { family: &'static str, id: String },

    /// A start arrived while a bracket of the same family was still open.
    #[error("{family} start for '{id}' while '{open}' is still open")]
    DoubleStart {
        family: &'static str,
        id: String,
        open: String,
    },

    /// An event named a different id than the open bracket.
    #[error("{family} event for '{id}' does not match open '{open}'")]
    IdMismatch {
        family: &'static str,
        id: String,
        open: String,
    },

    /// An end arrived with no open bracket.
    #[error("{family} end for '{id}' with nothing open")]
    EndWithoutStart { family: &'static str, id: String },

    /// A text content event carried an empty delta.
    #[error("text content for '{id}' carried an empty delta")]
    EmptyDelta { id: String },

    /// The first event of a run was not RUN_STARTED.
    #[error("run must begin with RUN_STARTED, got {got}")]
    MissingRunStart { got: &'static str },

    /// A second RUN_STARTED arrived within the same run.
    #[error("duplicate RUN_STARTED for run '{run_id}'")]
    DuplicateRunStart { run_id: String },

    /// An event arrived after the terminal event.
    #[error("{got} arrived after the run terminated")]
    EventAfterTerminal { got: &'static str },

    /// The terminal event identified a different run than RUN_STARTED.
    #[error("terminal event for thread '{thread_id}' run '{run_id}' does not match this run")]
    TerminalMismatch { thread_id: String, run_id: String },

    /// The run terminated while a framing bracket was still open.
    #[error("run terminated while {family} '{id}' was still open")]
    UnclosedFraming { family: &'static str, id: String },

    /// RUN_FINISHED declared an interrupt outcome without an interrupt.
    #[error("interrupt outcome without an interrupt payload")]
    MissingInterrupt,

    /// The stream ended before any terminal event.
    #[error("stream ended without a terminal event")]
    TruncatedRun,

    /// Accumulated tool arguments did not parse as JSON.
    #[error("tool call '{id}' arguments are not valid JSON: {source}")]
    BadArguments {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A chunk event could not be expanded into canonical framing.
    #[error("chunk event cannot be expanded: {0}")]
    BadChunk(&'static str),

    /// A state delta arrived before any snapshot established a base state.
    #[error("state delta without a prior snapshot")]
    PatchWithoutSnapshot,

    /// State delta operations did not parse as an RFC 6902 patch.
    #[error("state delta operations are malformed: {0}")]
    BadPatch(#[source] serde_json::Error),

    /// A state delta could not be applied to the tracked state.
    #[error("state delta could not be applied: {0}")]
    PatchFailed(String),
}
