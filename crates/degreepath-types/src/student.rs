//! Student profile and service health wire types.

use serde::{Deserialize, Serialize};

/// A student profile as served by `GET /students/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: String,
    pub name: String,
    pub degree: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default)]
    pub completed_units: Vec<String>,
    #[serde(default)]
    pub enrolled_units: Vec<String>,
}

/// Liveness payload from `GET /health`.
///
/// Only `status` is guaranteed; the backend flags are informational and
/// tolerated when absent (older service builds omit them).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub lm_studio: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part1_api: Option<String>,
}
