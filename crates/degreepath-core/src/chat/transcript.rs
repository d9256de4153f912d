//! Append-only message transcript.

use degreepath_types::chat::Message;

/// The ordered message log for one student's session.
///
/// Append-only during normal operation; the single exception is
/// [`retract_last`](Self::retract_last), which undoes an optimistic append
/// when its turn fails. Arrival order is authoritative -- entries are
/// never reordered by timestamp.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove and return the most recently appended message.
    pub fn retract_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    /// Replace the whole log (history load, clear).
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
