//! Session state machine and stream decoding for the DegreePath Tutor client.
//!
//! This crate is free of I/O: the HTTP implementation lives in
//! `degreepath-client` behind the [`transport::TutorTransport`] trait, so
//! every piece of turn sequencing here is testable against fake byte
//! sources.

pub mod chat;
pub mod stream;
pub mod transport;
