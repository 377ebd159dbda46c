//! Failure escalation
//!
//! Turns an unrecovered error into a visible failure: the message is printed
//! and appended to the run log, then a countdown keeps it on screen before
//! the caller exits with a failure status.

use chrono::{DateTime, Local};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub struct FailureEscalation {
    run_log: PathBuf,
    close_seconds: u64,
    tick: Duration,
}

impl FailureEscalation {
    pub fn new(run_log: PathBuf, close_seconds: u64) -> Self {
        Self {
            run_log,
            close_seconds,
            tick: Duration::from_secs(1),
        }
    }

    /// Reports `message` and returns once the countdown has ended
    pub async fn escalate(&self, message: &str) {
        debug!("Escalating failure: {}", message);
        println!("{}", message.red());

        if let Err(e) = append_run_log(&self.run_log, message).await {
            warn!("Failed to write {}: {}", self.run_log.display(), e);
        }

        self.countdown().await;
    }

    async fn countdown(&self) {
        let mut stdout = std::io::stdout();
        for remaining in (0..=self.close_seconds).rev() {
            print!("\rClosing in {} seconds...", remaining);
            let _ = stdout.flush();
            if remaining != 0 {
                tokio::time::sleep(self.tick).await;
            }
        }
        println!();
    }
}

/// Run-log rendering of a failure message
pub fn run_log_line(at: DateTime<Local>, message: &str) -> String {
    format!("{}: {}\n", at.to_rfc3339(), message)
}

/// Appends a timestamped failure message to the run log
pub async fn append_run_log(path: &Path, message: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(run_log_line(Local::now(), message).as_bytes())
        .await?;
    file.flush().await
}
