//! Job DTOs for the ClientIntegration API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::JobStatus;

fn default_success() -> bool {
    true
}

/// Response of `GET Status/{id}`
///
/// Only `status` and `details` drive the job lifecycle; the remaining fields
/// are carried for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub job_id: Uuid,
    pub repository_id: Uuid,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub total_queue_time_in_sec: f64,
    #[serde(default)]
    pub total_processing_time_in_sec: f64,
}

/// Name/value pair attached to an input file on submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub value: String,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
