use thiserror::Error;

/// Errors from Tutor Service operations.
///
/// Everything a session or client can fail with funnels through this one
/// taxonomy; callers match on the variant to decide between rollback,
/// silent degradation, and user-facing notification.
#[derive(Debug, Error)]
pub enum TutorError {
    /// Message was empty after trimming; rejected before any network call.
    #[error("message is empty")]
    EmptyMessage,

    /// A turn is already outstanding on this session.
    #[error("a turn is already in flight for this session")]
    TurnInFlight,

    /// Connection-level failure (refused, reset, stalled past the read
    /// timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status before streaming.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body failed mid-read.
    #[error("stream error: {0}")]
    Stream(String),

    /// The service signaled a hard failure via an `error` record.
    #[error("tutor reported failure: {0}")]
    Server(String),

    /// The stream ended without a completion record.
    #[error("stream ended before the turn completed")]
    Truncated,

    /// The caller cancelled the in-flight turn.
    #[error("turn cancelled")]
    Cancelled,

    /// A buffered response body did not match the expected shape.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The requested student does not exist.
    #[error("student not found")]
    StudentNotFound,
}

impl TutorError {
    /// Whether this error retracted an optimistic transcript update.
    ///
    /// Pre-flight rejections (`EmptyMessage`, `TurnInFlight`) never touch
    /// the transcript, so there is nothing to resubmit-after-rollback.
    pub fn rolled_back(&self) -> bool {
        !matches!(self, TutorError::EmptyMessage | TutorError::TurnInFlight)
    }
}
