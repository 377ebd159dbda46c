//! Job domain types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Prefix shared by every terminal status
pub const TERMINAL_STATUS_PREFIX: &str = "Completed";

/// The only terminal status that counts as success
pub const SUCCESSFUL_STATUS: &str = "CompletedSuccessful";

/// Status string reported by the remote system
///
/// The vocabulary is open-ended. Only the `Completed` prefix and the exact
/// `CompletedSuccessful` value carry meaning for the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobStatus(String);

impl JobStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the job will not change state any further
    pub fn is_terminal(&self) -> bool {
        self.0.starts_with(TERMINAL_STATUS_PREFIX)
    }

    /// Whether the job reached the success terminal
    pub fn is_successful(&self) -> bool {
        self.0 == SUCCESSFUL_STATUS
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobStatus {
    fn from(status: &str) -> Self {
        Self::new(status)
    }
}

/// Ordered, non-empty set of input files submitted together as one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    files: Vec<PathBuf>,
}

impl Batch {
    /// Creates a batch, or `None` if `files` is empty
    pub fn new(files: Vec<PathBuf>) -> Option<Self> {
        if files.is_empty() {
            None
        } else {
            Some(Self { files })
        }
    }

    /// Creates a batch holding a single file
    pub fn single(file: PathBuf) -> Self {
        Self { files: vec![file] }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always false for a constructed batch
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Base names of the files, in batch order
    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|p| display_name(p)).collect()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Submitting,
    Polling,
    Validating,
    Downloading,
    Releasing,
    Done,
    Failed,
}

impl JobState {
    /// Whether no further transitions are possible
    pub fn is_final(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobState::Submitting => "Submitting",
            JobState::Polling => "Polling",
            JobState::Validating => "Validating",
            JobState::Downloading => "Downloading",
            JobState::Releasing => "Releasing",
            JobState::Done => "Done",
            JobState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// One unit of work tracked through submit, poll, download and release
#[derive(Debug, Clone)]
pub struct Job {
    /// Assigned by the remote system once the batch is submitted
    pub id: Option<Uuid>,
    pub repository_id: Uuid,
    pub batch: Batch,
    pub state: JobState,
    /// Last status observed while polling
    pub status: JobStatus,
    /// Last detail text supplied with a status
    pub details: String,
    /// Correlates logs of concurrent jobs; `None` in single-job mode
    pub batch_index: Option<usize>,
}

impl Job {
    pub fn new(repository_id: Uuid, batch: Batch, batch_index: Option<usize>) -> Self {
        Self {
            id: None,
            repository_id,
            batch,
            state: JobState::Submitting,
            status: JobStatus::default(),
            details: String::new(),
            batch_index,
        }
    }
}
