//! Turn driver for one student's chat session.
//!
//! `ChatSession` owns the transcript and the in-flight buffer through a
//! [`TurnState`] and drives one request/response cycle at a time over a
//! [`TutorTransport`]: optimistic append, incremental decode of the
//! response body, finalize on completion, rollback on anything else.

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use degreepath_types::chat::{Message, TurnRequest};
use degreepath_types::error::TutorError;
use degreepath_types::stream::TurnEvent;

use crate::stream::{RecordParser, Utf8LineDecoder};
use crate::transport::TutorTransport;

use super::state::{SessionState, TurnState};
use super::transcript::Transcript;

/// Resolution of a successful turn.
#[derive(Debug, Clone)]
pub struct TurnReceipt {
    /// The committed tutor message.
    pub reply: Message,
    /// `data: ` lines skipped as malformed during this turn.
    pub skipped_records: u64,
}

/// One student's conversation with the Tutor Service.
///
/// Exactly one turn may be outstanding at a time; the state machine
/// rejects a second `send_turn` (and any history operation) until the
/// first resolves. All mutation runs on the caller's task -- dropping the
/// `send_turn` future releases the connection and leaves the rollback to
/// the next caller-visible error path.
pub struct ChatSession {
    student_id: String,
    turn: TurnState,
    skipped_records: u64,
}

impl ChatSession {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            turn: TurnState::new(),
            skipped_records: 0,
        }
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn state(&self) -> SessionState {
        self.turn.state()
    }

    pub fn transcript(&self) -> &Transcript {
        self.turn.transcript()
    }

    /// The live partial answer while a turn is streaming.
    pub fn partial(&self) -> Option<&str> {
        self.turn.partial()
    }

    /// Cumulative malformed-record count across the session's lifetime.
    pub fn skipped_records(&self) -> u64 {
        self.skipped_records
    }

    /// Drive one conversation turn to completion.
    ///
    /// Appends the student message optimistically, streams the response,
    /// and commits the tutor's answer on a completion record. Any failure
    /// -- transport error, server-signaled `error`, truncation, or
    /// cancellation -- rolls the transcript back to its pre-turn state and
    /// surfaces exactly one error; the caller resubmits if desired.
    ///
    /// `on_delta` observes each fragment as it is applied, in delivery
    /// order, so callers can render the provisional answer while it grows.
    /// Nothing the callback sees is committed until the turn finishes.
    pub async fn send_turn<T: TutorTransport>(
        &mut self,
        transport: &T,
        text: &str,
        cancel: &CancellationToken,
        mut on_delta: impl FnMut(&str),
    ) -> Result<TurnReceipt, TutorError> {
        let message = self.turn.begin_turn(text)?;
        let request = TurnRequest {
            student_id: self.student_id.clone(),
            message,
        };

        let mut body = transport.stream_turn(request);
        let mut decoder = Utf8LineDecoder::new();
        let mut parser = RecordParser::new();

        let outcome: Result<Option<DateTime<Utc>>, TutorError> = 'read: loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'read Err(TutorError::Cancelled),
                chunk = body.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    for line in decoder.push(&bytes) {
                        if let Some(resolution) = self.apply_line(&mut parser, &line, &mut on_delta)
                        {
                            break 'read resolution;
                        }
                    }
                }
                Some(Err(err)) => break 'read Err(err),
                None => {
                    // Connection closed. A final record may still be
                    // sitting in the decoder without its newline.
                    if let Some(line) = decoder.flush() {
                        if let Some(resolution) = self.apply_line(&mut parser, &line, &mut on_delta)
                        {
                            break 'read resolution;
                        }
                    }
                    break 'read Err(TutorError::Truncated);
                }
            }
        };

        let skipped = parser.skipped_records();
        self.skipped_records += skipped;
        if skipped > 0 {
            debug!(skipped, "malformed stream records skipped this turn");
        }

        match outcome {
            Ok(timestamp) => {
                let reply = self.turn.finish_turn(timestamp);
                Ok(TurnReceipt {
                    reply,
                    skipped_records: skipped,
                })
            }
            Err(err) => {
                self.turn.fail_turn();
                let retracted = self.turn.recover();
                warn!(
                    error = %err,
                    retracted = retracted.is_some(),
                    "turn failed, transcript rolled back"
                );
                Err(err)
            }
        }
    }

    /// Apply one decoded line. Returns `Some` when the turn resolves.
    fn apply_line(
        &mut self,
        parser: &mut RecordParser,
        line: &str,
        on_delta: &mut impl FnMut(&str),
    ) -> Option<Result<Option<DateTime<Utc>>, TutorError>> {
        for event in parser.parse_line(line) {
            match event {
                TurnEvent::Delta(fragment) => {
                    self.turn.apply_delta(&fragment);
                    on_delta(&fragment);
                }
                TurnEvent::Done { timestamp } => return Some(Ok(timestamp)),
                TurnEvent::Failed(message) => return Some(Err(TutorError::Server(message))),
            }
        }
        None
    }

    /// Replace the local transcript with the persisted one.
    ///
    /// History is best-effort: any fetch failure degrades to an empty
    /// transcript without surfacing an error. Rejected while a turn is
    /// outstanding.
    pub async fn load_history<T: TutorTransport>(
        &mut self,
        transport: &T,
    ) -> Result<(), TutorError> {
        if self.turn.state() != SessionState::Idle {
            return Err(TutorError::TurnInFlight);
        }
        match transport.fetch_history(&self.student_id).await {
            Ok(history) => {
                let messages: Vec<Message> = history
                    .messages
                    .into_iter()
                    .filter_map(|m| m.into_message())
                    .collect();
                self.turn.replace_transcript(messages);
            }
            Err(err) => {
                debug!(error = %err, "history fetch failed, starting with empty transcript");
                self.turn.replace_transcript(Vec::new());
            }
        }
        Ok(())
    }

    /// Delete the server-side history, then clear the local transcript.
    ///
    /// On failure the local transcript is left untouched and the error is
    /// surfaced. Rejected while a turn is outstanding.
    pub async fn clear_history<T: TutorTransport>(
        &mut self,
        transport: &T,
    ) -> Result<(), TutorError> {
        if self.turn.state() != SessionState::Idle {
            return Err(TutorError::TurnInFlight);
        }
        transport.clear_history(&self.student_id).await?;
        self.turn.replace_transcript(Vec::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use bytes::Bytes;
    use futures_util::{Stream, stream};

    use degreepath_types::chat::{ChatHistory, ClearReceipt, HistoryMessage, MessageRole};

    /// Transport serving canned byte chunks and canned history responses.
    struct FakeTransport {
        chunks: Vec<Result<Vec<u8>, TutorError>>,
        /// Keep the stream open forever after the canned chunks.
        hang_after_chunks: bool,
        history: Option<ChatHistory>,
        clear_ok: bool,
        cleared: AtomicBool,
    }

    impl FakeTransport {
        fn with_chunks(chunks: Vec<&[u8]>) -> Self {
            Self {
                chunks: chunks.into_iter().map(|c| Ok(c.to_vec())).collect(),
                hang_after_chunks: false,
                history: None,
                clear_ok: true,
                cleared: AtomicBool::new(false),
            }
        }
    }

    impl TutorTransport for FakeTransport {
        fn stream_turn(
            &self,
            _request: TurnRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<Bytes, TutorError>> + Send + 'static>> {
            let items: Vec<Result<Bytes, TutorError>> = self
                .chunks
                .iter()
                .map(|chunk| match chunk {
                    Ok(bytes) => Ok(Bytes::from(bytes.clone())),
                    Err(err) => Err(TutorError::Stream(err.to_string())),
                })
                .collect();
            if self.hang_after_chunks {
                Box::pin(stream::iter(items).chain(stream::pending()))
            } else {
                Box::pin(stream::iter(items))
            }
        }

        async fn fetch_history(&self, student_id: &str) -> Result<ChatHistory, TutorError> {
            match &self.history {
                Some(history) => Ok(history.clone()),
                None => Err(TutorError::Status {
                    status: 404,
                    body: format!("Student not found: {student_id}"),
                }),
            }
        }

        async fn clear_history(&self, student_id: &str) -> Result<ClearReceipt, TutorError> {
            if self.clear_ok {
                self.cleared.store(true, Ordering::SeqCst);
                Ok(ClearReceipt {
                    status: "cleared".to_string(),
                    student_id: student_id.to_string(),
                })
            } else {
                Err(TutorError::Transport("connection refused".to_string()))
            }
        }
    }

    fn contents(session: &ChatSession) -> Vec<(MessageRole, String)> {
        session
            .transcript()
            .messages()
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_fragments_then_done_commit_one_tutor_message() {
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"content\": \"Hel\"}\n",
            b"data: {\"content\": \"lo, \"}\n",
            b"data: {\"content\": \"world!\"}\n",
            b"data: {\"done\": true}\n\n",
        ]);
        let mut session = ChatSession::new("demo001");
        let receipt = session
            .send_turn(&transport, "say hello", &CancellationToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(receipt.reply.content, "Hello, world!");
        assert_eq!(receipt.skipped_records, 0);
        assert_eq!(
            contents(&session),
            vec![
                (MessageRole::Student, "say hello".to_string()),
                (MessageRole::Tutor, "Hello, world!".to_string()),
            ]
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.partial().is_none());
    }

    #[tokio::test]
    async fn test_delta_observer_sees_fragments_in_delivery_order() {
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"content\": \"Hel\"}\n",
            b"data: {\"content\": \"lo\"}\n",
            b"data: {\"done\": true}\n",
        ]);
        let mut session = ChatSession::new("demo001");
        let mut observed = Vec::new();
        session
            .send_turn(&transport, "q", &CancellationToken::new(), |fragment| {
                observed.push(fragment.to_string());
            })
            .await
            .unwrap();
        assert_eq!(observed, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_record_split_across_chunks_reassembles() {
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"cont",
            b"ent\": \"x\"}\ndata: {\"done\": true}\n",
        ]);
        let mut session = ChatSession::new("demo001");
        let receipt = session
            .send_turn(&transport, "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert_eq!(receipt.reply.content, "x");
        assert_eq!(receipt.skipped_records, 0);
    }

    #[tokio::test]
    async fn test_malformed_lines_are_no_ops() {
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"content\": \"a\"}\n",
            b"data: {\"content\": \"b\"\n",
            b"garbage without prefix\n",
            b"data: {\"content\": \"b\"}\n",
            b"data: {\"done\": true}\n",
        ]);
        let mut session = ChatSession::new("demo001");
        let receipt = session
            .send_turn(&transport, "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap();

        // Identical to the run with the bad lines removed, and counted.
        assert_eq!(receipt.reply.content, "ab");
        assert_eq!(receipt.skipped_records, 1);
        assert_eq!(session.skipped_records(), 1);
    }

    #[tokio::test]
    async fn test_truncated_stream_rolls_back() {
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"content\": \"partial ans\"}\n",
        ]);
        let mut session = ChatSession::new("demo001");
        let err = session
            .send_turn(&transport, "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, TutorError::Truncated));
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.partial().is_none());
    }

    #[tokio::test]
    async fn test_error_after_content_discards_partial() {
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"content\": \"some \"}\n",
            b"data: {\"content\": \"tokens\"}\n",
            b"data: {\"error\": \"backend down\"}\n",
        ]);
        let mut session = ChatSession::new("demo001");
        let err = session
            .send_turn(&transport, "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();

        match err {
            TutorError::Server(message) => assert_eq!(message, "backend down"),
            other => panic!("expected Server error, got {other:?}"),
        }
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_error_as_only_chunk_rolls_back_to_pre_turn_state() {
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"done\": true}\n",
        ]);
        let mut session = ChatSession::new("demo001");
        session
            .send_turn(&transport, "first", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        let before = contents(&session);

        let failing = FakeTransport::with_chunks(vec![b"data: {\"error\": \"backend down\"}\n"]);
        let err = session
            .send_turn(&failing, "second", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::Server(_)));
        assert_eq!(contents(&session), before);
    }

    #[tokio::test]
    async fn test_transport_error_mid_stream_rolls_back() {
        let transport = FakeTransport {
            chunks: vec![
                Ok(b"data: {\"content\": \"a\"}\n".to_vec()),
                Err(TutorError::Stream("connection reset".to_string())),
            ],
            hang_after_chunks: false,
            history: None,
            clear_ok: true,
            cleared: AtomicBool::new(false),
        };
        let mut session = ChatSession::new("demo001");
        let err = session
            .send_turn(&transport, "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::Stream(_)));
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_mutation() {
        let transport = FakeTransport::with_chunks(vec![]);
        let mut session = ChatSession::new("demo001");
        let err = session
            .send_turn(&transport, "   ", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::EmptyMessage));
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_cancellation_rolls_back_without_finalizing() {
        let transport = FakeTransport {
            chunks: vec![Ok(b"data: {\"content\": \"stale tokens\"}\n".to_vec())],
            hang_after_chunks: true,
            history: None,
            clear_ok: true,
            cleared: AtomicBool::new(false),
        };
        let mut session = ChatSession::new("demo001");
        let cancel = CancellationToken::new();

        let cancel_trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            cancel_trigger.cancel();
        });

        let err = session
            .send_turn(&transport, "q", &cancel, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::Cancelled));
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_done_without_trailing_newline_still_finalizes() {
        // The last record arrives without its line terminator; the flush
        // path must still complete the turn.
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"content\": \"ok\"}\ndata: {\"done\": true}",
        ]);
        let mut session = ChatSession::new("demo001");
        let receipt = session
            .send_turn(&transport, "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert_eq!(receipt.reply.content, "ok");
    }

    #[tokio::test]
    async fn test_done_timestamp_stamps_reply() {
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"content\": \"ok\"}\n",
            b"data: {\"done\": true, \"timestamp\": \"2025-03-14T09:26:53+00:00\"}\n",
        ]);
        let mut session = ChatSession::new("demo001");
        let receipt = session
            .send_turn(&transport, "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert_eq!(
            receipt.reply.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2025-03-14T09:26:53"
        );
    }

    #[tokio::test]
    async fn test_multibyte_answer_split_mid_character() {
        // "café" with the é split across two network chunks, inside the
        // JSON string of a single record.
        let transport = FakeTransport::with_chunks(vec![
            b"data: {\"content\": \"caf\xC3",
            b"\xA9\"}\n",
            b"data: {\"done\": true}\n",
        ]);
        let mut session = ChatSession::new("demo001");
        let receipt = session
            .send_turn(&transport, "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert_eq!(receipt.reply.content, "caf\u{e9}");
    }

    #[tokio::test]
    async fn test_load_history_replaces_transcript() {
        let transport = FakeTransport {
            chunks: vec![],
            hang_after_chunks: false,
            history: Some(ChatHistory {
                student_id: "demo001".to_string(),
                messages: vec![
                    HistoryMessage {
                        role: "student".to_string(),
                        content: "old question".to_string(),
                        timestamp: Some("2025-03-14T09:00:00".to_string()),
                    },
                    HistoryMessage {
                        role: "tutor".to_string(),
                        content: "old answer".to_string(),
                        timestamp: Some("2025-03-14T09:00:05".to_string()),
                    },
                ],
                total_messages: 2,
            }),
            clear_ok: true,
            cleared: AtomicBool::new(false),
        };
        let mut session = ChatSession::new("demo001");
        session.load_history(&transport).await.unwrap();
        assert_eq!(
            contents(&session),
            vec![
                (MessageRole::Student, "old question".to_string()),
                (MessageRole::Tutor, "old answer".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_history_failure_degrades_to_empty() {
        let transport = FakeTransport::with_chunks(vec![b"data: {\"done\": true}\n"]);
        let mut session = ChatSession::new("demo001");
        session
            .send_turn(&transport, "leftover", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert!(!session.transcript().is_empty());

        // history is None in this fake -> fetch fails -> empty, no error.
        session.load_history(&transport).await.unwrap();
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_clear_history_success_empties_transcript() {
        let transport = FakeTransport::with_chunks(vec![b"data: {\"done\": true}\n"]);
        let mut session = ChatSession::new("demo001");
        session
            .send_turn(&transport, "something", &CancellationToken::new(), |_| {})
            .await
            .unwrap();

        session.clear_history(&transport).await.unwrap();
        assert!(session.transcript().is_empty());
        assert!(transport.cleared.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_clear_history_failure_leaves_transcript_unchanged() {
        let ok_transport = FakeTransport::with_chunks(vec![b"data: {\"done\": true}\n"]);
        let mut session = ChatSession::new("demo001");
        session
            .send_turn(&ok_transport, "keep me", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        let before = contents(&session);

        let failing = FakeTransport {
            chunks: vec![],
            hang_after_chunks: false,
            history: None,
            clear_ok: false,
            cleared: AtomicBool::new(false),
        };
        let err = session.clear_history(&failing).await.unwrap_err();
        assert!(matches!(err, TutorError::Transport(_)));
        assert_eq!(contents(&session), before);
    }

    #[tokio::test]
    async fn test_fake_transport_is_shareable() {
        // The transport seam must allow Arc sharing across sessions.
        let transport = Arc::new(FakeTransport::with_chunks(vec![b"data: {\"done\": true}\n"]));
        let mut session = ChatSession::new("demo001");
        session
            .send_turn(transport.as_ref(), "q", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert_eq!(session.transcript().len(), 2);
    }
}
