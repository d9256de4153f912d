//! `data: ` record parsing.
//!
//! Each meaningful line carries the literal prefix `data: ` followed by
//! one JSON object. Lines without the prefix (blank separators, comments)
//! are ignored outright. Lines whose JSON fails to parse are expected --
//! the server can cut an object mid-write at a chunk boundary that the
//! upstream read loop never reassembles -- so they are skipped rather than
//! failing the turn, but each skip is counted so a persistently malformed
//! stream is distinguishable from ordinary fragmentation.

use degreepath_types::chat::parse_instant;
use degreepath_types::stream::{StreamRecord, TurnEvent};

/// Literal prefix of a meaningful stream line.
pub const DATA_PREFIX: &str = "data: ";

/// Per-turn record parser with a malformed-line counter.
#[derive(Debug, Default)]
pub struct RecordParser {
    skipped_records: u64,
}

impl RecordParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `data: ` lines whose JSON failed to parse so far.
    pub fn skipped_records(&self) -> u64 {
        self.skipped_records
    }

    /// Parse one decoded line into its events, in wire-field priority:
    /// `content`, then `done`, then `error`.
    pub fn parse_line(&mut self, line: &str) -> Vec<TurnEvent> {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return Vec::new();
        };

        let record: StreamRecord = match serde_json::from_str(payload) {
            Ok(record) => record,
            Err(err) => {
                self.skipped_records += 1;
                tracing::debug!(error = %err, "unparseable stream record, skipping");
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        if let Some(content) = record.content {
            events.push(TurnEvent::Delta(content));
        }
        if record.done == Some(true) {
            let timestamp = record.timestamp.as_deref().and_then(parse_instant);
            events.push(TurnEvent::Done { timestamp });
        }
        if let Some(error) = record.error {
            events.push(TurnEvent::Failed(error));
        }
        events
    }
}
