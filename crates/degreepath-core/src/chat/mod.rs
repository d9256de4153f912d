//! Chat session ownership: transcript, turn state machine, and the
//! turn driver that reconciles the streaming response into the transcript.

pub mod session;
pub mod state;
pub mod transcript;

pub use session::{ChatSession, TurnReceipt};
pub use state::{SessionState, TurnState};
pub use transcript::Transcript;
