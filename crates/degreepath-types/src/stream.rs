//! Streaming turn event types.
//!
//! The Tutor Service's streaming endpoint frames its response as
//! newline-terminated `data: ` lines, each carrying one JSON object with
//! optional fields. [`StreamRecord`] is the raw wire shape; [`TurnEvent`]
//! is the decoded event the session state machine consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The JSON object carried on one `data: ` line.
///
/// All fields are optional; a typical record carries exactly one. Fields
/// are acted on in declaration order (`content`, then `done`, then
/// `error`) when several appear together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Incremental answer fragment to append to the in-flight buffer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Marks the turn complete when `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,

    /// ISO-8601 instant for the finalized message. Absent means "stamp
    /// with local receipt time".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Hard failure of this turn, with the server's diagnostic text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Events decoded from the streaming response body.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// An answer fragment arrived; append it to the live partial answer.
    Delta(String),

    /// The turn completed; finalize the buffered answer.
    Done { timestamp: Option<DateTime<Utc>> },

    /// The server signaled a hard failure for this turn.
    Failed(String),
}
