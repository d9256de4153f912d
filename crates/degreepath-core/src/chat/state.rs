//! Session state machine with pure transition functions.
//!
//! A turn moves `Idle -> Sending -> Streaming* -> Idle` on success, or
//! `-> Failed -> Idle` on any error, where `Failed` exists only between
//! detecting the failure and the rollback that recovers from it. Every
//! transition here is pure with respect to the transcript and buffer --
//! no I/O -- so the rollback path is testable without a network.

use chrono::{DateTime, Utc};

use degreepath_types::chat::{Message, MessageRole};
use degreepath_types::error::TutorError;

use super::transcript::Transcript;

use std::fmt;

/// Where a session is in its turn lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No turn outstanding. Initial state, and the rest state between turns.
    #[default]
    Idle,
    /// A turn was submitted; no answer fragment has arrived yet.
    Sending,
    /// At least one answer fragment has arrived and is buffered.
    Streaming,
    /// The turn failed; the optimistic update has not been rolled back yet.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Sending => write!(f, "sending"),
            SessionState::Streaming => write!(f, "streaming"),
            SessionState::Failed => write!(f, "failed"),
        }
    }
}

/// Turn-scoped mutable state: the transcript, the in-flight answer buffer,
/// and the lifecycle state guarding them.
#[derive(Debug, Default)]
pub struct TurnState {
    state: SessionState,
    transcript: Transcript,
    buffer: String,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The live partial answer, observable while a turn is outstanding.
    ///
    /// Consumers render this as a provisional, still-growing message; it is
    /// not part of the transcript until the turn finishes.
    pub fn partial(&self) -> Option<&str> {
        match self.state {
            SessionState::Sending | SessionState::Streaming => Some(&self.buffer),
            SessionState::Idle | SessionState::Failed => None,
        }
    }

    /// Start a turn: validate, optimistically append the student message,
    /// and enter `Sending`.
    ///
    /// Rejection (empty text, turn already outstanding) leaves the
    /// transcript and buffer untouched. Returns the trimmed message text
    /// on success.
    pub fn begin_turn(&mut self, text: &str) -> Result<String, TutorError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TutorError::EmptyMessage);
        }
        if self.state != SessionState::Idle {
            return Err(TutorError::TurnInFlight);
        }
        self.transcript.push(Message::now(MessageRole::Student, trimmed));
        self.state = SessionState::Sending;
        Ok(trimmed.to_string())
    }

    /// Append an answer fragment to the in-flight buffer.
    pub fn apply_delta(&mut self, fragment: &str) {
        debug_assert!(
            matches!(self.state, SessionState::Sending | SessionState::Streaming),
            "delta applied in state {}",
            self.state
        );
        self.buffer.push_str(fragment);
        self.state = SessionState::Streaming;
    }

    /// Flush the buffer into exactly one committed tutor message and
    /// return to `Idle`.
    ///
    /// `timestamp` comes from the completion record when the server sent
    /// one; otherwise the message is stamped with local receipt time.
    pub fn finish_turn(&mut self, timestamp: Option<DateTime<Utc>>) -> Message {
        let content = std::mem::take(&mut self.buffer);
        let message = Message {
            role: MessageRole::Tutor,
            content,
            timestamp: timestamp.unwrap_or_else(Utc::now),
        };
        self.transcript.push(message.clone());
        self.state = SessionState::Idle;
        message
    }

    /// Mark the outstanding turn as failed. The optimistic update stays in
    /// place until [`recover`](Self::recover) rolls it back.
    pub fn fail_turn(&mut self) {
        self.state = SessionState::Failed;
    }

    /// Roll back a failed turn: discard the buffer, retract the optimistic
    /// student message, and return to `Idle`.
    ///
    /// Returns the retracted message so callers can offer it back for
    /// resubmission.
    pub fn recover(&mut self) -> Option<Message> {
        self.buffer.clear();
        let retracted = self.transcript.retract_last();
        self.state = SessionState::Idle;
        retracted
    }

    /// Swap in a new transcript (history load, clear). Only meaningful
    /// while `Idle`; the driver enforces that.
    pub fn replace_transcript(&mut self, messages: Vec<Message>) {
        self.transcript.replace(messages);
    }
}
