//! Transcript and chat wire types for the DegreePath Tutor client.
//!
//! These types model one student's conversation with the tutor: the
//! in-memory transcript owned by a session, and the JSON shapes the Tutor
//! Service speaks on its buffered chat and history endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Who authored a transcript message.
///
/// The Tutor Service uses the literal strings `"student"` and `"tutor"`
/// in its history payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Student,
    Tutor,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::Student => write!(f, "student"),
            MessageRole::Tutor => write!(f, "tutor"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(MessageRole::Student),
            "tutor" => Ok(MessageRole::Tutor),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single committed transcript message.
///
/// Immutable once appended. The transcript's append order is authoritative;
/// `timestamp` is display metadata, not an ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the local receipt time.
    pub fn now(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Request body for one conversation turn (`POST /chat/stream` and
/// `POST /chat`). At most one is outstanding per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    pub student_id: String,
    pub message: String,
}

/// Buffered (non-streaming) chat response from `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub student_id: String,
    pub message: String,
    pub response: String,
    pub timestamp: String,
}

/// One message as it appears in a history payload.
///
/// The role is a plain string on the wire; entries with roles this client
/// does not recognize are dropped during conversion rather than failing
/// the whole fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HistoryMessage {
    /// Convert to a transcript [`Message`], if the role is recognized.
    ///
    /// An unparseable timestamp falls back to the local receipt time, the
    /// same default the streaming path uses for a missing `timestamp`.
    pub fn into_message(self) -> Option<Message> {
        let role = self.role.parse().ok()?;
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(parse_instant)
            .unwrap_or_else(Utc::now);
        Some(Message {
            role,
            content: self.content,
            timestamp,
        })
    }
}

/// Response from `GET /chat/{student_id}/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    pub student_id: String,
    pub messages: Vec<HistoryMessage>,
    pub total_messages: usize,
}

/// Response from `DELETE /chat/{student_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearReceipt {
    pub status: String,
    pub student_id: String,
}

/// Parse an ISO-8601 instant as the Tutor Service writes them.
///
/// The service emits `datetime.utcnow().isoformat()` -- RFC 3339 minus the
/// trailing offset -- so both offset-bearing and naive forms are accepted.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
