use thiserror::Error;

/// A generator produced a malformed question, or failed outright.
///
/// Fatal to that question only: the engine does not cache the failed index,
/// so navigating back retries generation. The session itself keeps going.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("generator produced no options")]
    EmptyOptions,
    #[error("generator produced {0} options, expected 2 to 6")]
    OptionCountOutOfRange(usize),
    #[error("correct answer {0:?} missing from options")]
    CorrectAnswerMissing(String),
    #[error("duplicate option {0:?}")]
    DuplicateOption(String),
    #[error("generator failed: {0}")]
    Failed(String),
}

/// A telemetry call could not reach or was rejected by the backend.
///
/// Always caught at the call site, logged, and dropped. Never retried,
/// never surfaced to the learner, never blocks local state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("telemetry transport failed: {0}")]
    Transport(String),
    #[error("telemetry backend rejected request with status {0}")]
    Backend(u16),
    #[error("telemetry channel closed")]
    ChannelClosed,
}
