//! Error types for a runner invocation
//!
//! Nothing is recovered locally: every variant is fatal to the job that
//! raised it and, through the fan-out barrier, to the whole run.

use cis_client::ClientError;
use cis_core::domain::job::JobStatus;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, RunError>;

#[derive(Debug, Error)]
pub enum RunError {
    /// The input directory holds no files
    #[error("No files in Input folder to submit. Exiting.")]
    NoInputFiles,

    /// The environment lists no repository to submit to
    #[error("No repositories available.")]
    NoRepositories,

    /// Any failure of a remote call
    #[error(transparent)]
    Transport(#[from] ClientError),

    /// The service finished the job without success
    #[error("Job completed with status: {status}. Details: {details}")]
    JobFailed { status: JobStatus, details: String },

    /// The job was still running after the configured number of checks
    #[error("Job {job_id} did not complete after {attempts} status checks")]
    PollLimitExceeded { job_id: Uuid, attempts: u32 },

    /// Local filesystem failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A concurrent job task panicked or was cancelled
    #[error("Job task failed: {0}")]
    TaskFailed(String),
}

impl RunError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Message shown to the operator before the process exits
    pub fn user_message(&self) -> String {
        match self {
            RunError::Transport(ClientError::ApiError { status, message }) => {
                format!("API error: {}. Status: {}", message, status)
            }
            RunError::NoInputFiles => self.to_string(),
            other => format!("Error: {}", other),
        }
    }
}
