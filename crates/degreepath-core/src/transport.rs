//! TutorTransport trait definition.
//!
//! This is the seam between the session state machine and the network.
//! Uses RPITIT for the buffered calls, and `Pin<Box<dyn Stream>>` for
//! `stream_turn` (the stream needs to be a concrete return type so fake
//! transports in tests can hand back `stream::iter` chunks).

use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use degreepath_types::chat::{ChatHistory, ClearReceipt, TurnRequest};
use degreepath_types::error::TutorError;

/// Trait for Tutor Service backends.
///
/// The production implementation (`TutorClient` in `degreepath-client`)
/// speaks HTTP; tests implement it over in-memory byte chunks. The
/// streaming call yields *raw body bytes* -- decoding stays in this crate
/// so chunk-boundary handling is exercised by the same code in both cases.
pub trait TutorTransport: Send + Sync {
    /// Open a streaming turn against the service.
    ///
    /// Yields the response body incrementally. Implementations must
    /// surface a non-success response as an `Err` item before any bytes.
    fn stream_turn(
        &self,
        request: TurnRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<Bytes, TutorError>> + Send + 'static>>;

    /// Fetch the persisted transcript for a student (buffered).
    fn fetch_history(
        &self,
        student_id: &str,
    ) -> impl std::future::Future<Output = Result<ChatHistory, TutorError>> + Send;

    /// Delete the server-side history for a student (idempotent).
    fn clear_history(
        &self,
        student_id: &str,
    ) -> impl std::future::Future<Output = Result<ClearReceipt, TutorError>> + Send;
}
