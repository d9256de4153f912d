//! Incremental decoding of the Tutor Service's streaming response body.
//!
//! Raw bytes -> UTF-8 text -> newline-delimited lines -> `data: ` records
//! -> [`TurnEvent`]s, with chunk boundaries allowed to fall anywhere,
//! including inside a multi-byte character.
//!
//! [`TurnEvent`]: degreepath_types::stream::TurnEvent

mod decoder;
mod record;

pub use decoder::Utf8LineDecoder;
pub use record::{DATA_PREFIX, RecordParser};
