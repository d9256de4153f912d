//! Shared domain types for the DegreePath Tutor client.
//!
//! This crate contains the types used across the client toolkit:
//! transcript messages, streaming turn events, student profiles, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod stream;
pub mod student;
