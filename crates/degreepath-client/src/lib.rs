//! HTTP infrastructure for the DegreePath Tutor client.
//!
//! `TutorClient` implements the `TutorTransport` seam from
//! `degreepath-core` over reqwest, and adds the buffered endpoints
//! (students, health, non-streaming chat) the terminal front end uses.

pub mod config;
pub mod http;

pub use http::TutorClient;
