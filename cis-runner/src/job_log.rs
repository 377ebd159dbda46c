//! Per-job log sink
//!
//! Every lifecycle message goes to the console and to the job's own log
//! file. Concurrent jobs are told apart by their batch index.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::bootstrap::WorkspaceLayout;

#[derive(Debug, Clone)]
pub struct JobLog {
    batch_index: Option<usize>,
    path: PathBuf,
}

impl JobLog {
    pub fn new(layout: &WorkspaceLayout, batch_index: Option<usize>) -> Self {
        Self {
            batch_index,
            path: layout.job_log_file(batch_index),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Console rendering of a message
    pub fn console_line(&self, message: &str) -> String {
        match self.batch_index {
            None => message.to_string(),
            Some(i) => format!("Thread: {}, {}", i, message),
        }
    }

    /// Log-file rendering of a message
    pub fn file_line(at: DateTime<Local>, message: &str) -> String {
        format!("{}: {}\n", at.to_rfc3339(), message.trim())
    }

    /// Writes a message to the console and appends it to the job log file
    ///
    /// A failed append is reported but does not affect the job.
    pub async fn write(&self, message: &str) {
        println!("{}", self.console_line(message));

        if let Err(e) = self.append(message).await {
            warn!("Failed to write job log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(Self::file_line(Local::now(), message).as_bytes())
            .await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_line_is_tagged_in_concurrent_mode() {
        let layout = WorkspaceLayout::new(Path::new("/work"));

        assert_eq!(JobLog::new(&layout, None).console_line("Job Released."), "Job Released.");
        assert_eq!(
            JobLog::new(&layout, Some(4)).console_line("Job Released."),
            "Thread: 4, Job Released."
        );
    }

    #[test]
    fn test_file_line_trims_message() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00+02:00")
            .unwrap()
            .with_timezone(&Local);
        let line = JobLog::file_line(at, "Submitted. Job ID: 42\n");

        assert!(line.ends_with(": Submitted. Job ID: 42\n"));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[tokio::test]
    async fn test_write_appends_to_batch_file() {
        let root = tempfile::tempdir().unwrap();
        let layout = WorkspaceLayout::new(root.path());
        std::fs::create_dir_all(&layout.job_log_dir).unwrap();

        let log = JobLog::new(&layout, Some(1));
        log.write("first").await;
        log.write("second\n").await;

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": first"));
        assert!(lines[1].ends_with(": second"));
        assert_eq!(log.path(), layout.job_log_dir.join("joblog_1.txt"));
    }

    #[tokio::test]
    async fn test_write_survives_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let layout = WorkspaceLayout::new(root.path());

        JobLog::new(&layout, None).write("still printed").await;
        assert!(!layout.job_log_file(None).exists());
    }
}
