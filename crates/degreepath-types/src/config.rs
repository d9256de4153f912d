//! Client configuration types.
//!
//! `ClientConfig` represents the `[tutor]` table of `config.toml`. All
//! fields have defaults so a missing or partial file still yields a
//! working client.

use serde::{Deserialize, Serialize};

/// Connection settings for the Tutor Service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Tutor Service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Idle-read timeout in seconds. A stream that goes silent for this
    /// long (including the wait for the first byte) fails the turn instead
    /// of hanging it.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}
