//! Startup preconditions
//!
//! Lays out the working directory and discovers the input files before any
//! job is created.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, RunError};

const RUN_LOG_FILE: &str = "log.txt";
const JOB_LOG_DIRECTORY: &str = "JobLogs";
const INPUT_DIRECTORY: &str = "Input";
const OUTPUT_DIRECTORY: &str = "Output";

/// Locations the runner reads from and writes to
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Per-run failure log
    pub run_log: PathBuf,
    /// Scanned once, non-recursively, for input files
    pub input_dir: PathBuf,
    /// Receives one subdirectory per completed job
    pub output_dir: PathBuf,
    /// Per-job log files
    pub job_log_dir: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            run_log: root.join(RUN_LOG_FILE),
            input_dir: root.join(INPUT_DIRECTORY),
            output_dir: root.join(OUTPUT_DIRECTORY),
            job_log_dir: root.join(JOB_LOG_DIRECTORY),
        }
    }

    /// Download directory of a job (`Output/<job-id>`)
    pub fn job_output_dir(&self, job_id: Uuid) -> PathBuf {
        self.output_dir.join(job_id.to_string())
    }

    /// Log file of a job: `joblog.txt` in single-job mode, `joblog_<n>.txt` otherwise
    pub fn job_log_file(&self, batch_index: Option<usize>) -> PathBuf {
        match batch_index {
            None => self.job_log_dir.join("joblog.txt"),
            Some(i) => self.job_log_dir.join(format!("joblog_{}.txt", i)),
        }
    }

    /// Truncates the run log, creates the directories and clears old job logs
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::write(&self.run_log, b"")
            .await
            .map_err(|e| RunError::io(&self.run_log, e))?;

        for dir in [&self.input_dir, &self.output_dir, &self.job_log_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| RunError::io(dir, e))?;
        }

        if let Err(e) = clear_directory(&self.job_log_dir).await {
            warn!("Failed to clear {}: {}", self.job_log_dir.display(), e);
            println!("Error clearing {} directory: {}", self.job_log_dir.display(), e);
        }

        Ok(())
    }

    /// Lists the input files, failing if there are none
    pub async fn input_files(&self) -> Result<Vec<PathBuf>> {
        let files = discover_files(&self.input_dir).await?;
        if files.is_empty() {
            return Err(RunError::NoInputFiles);
        }

        debug!("Discovered {} input file(s)", files.len());
        Ok(files)
    }
}

/// Regular files directly inside `dir`, sorted by path
pub async fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| RunError::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| RunError::io(dir, e))?
    {
        let path = entry.path();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| RunError::io(&path, e))?;
        if metadata.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

async fn clear_directory(dir: &Path) -> std::io::Result<()> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
        }
    }
    Ok(())
}
