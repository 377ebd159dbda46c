//! Scheduler layer for the runner
//!
//! Selects the target repository, partitions the input files into batches
//! and drives each batch through the job lifecycle:
//!
//! - `lifecycle`: one job from submit to release
//! - `fanout`: one job for all files, or one concurrent job per file

pub mod fanout;
pub mod lifecycle;
#[cfg(test)]
pub(crate) mod testing;

pub use fanout::FanOut;
pub use lifecycle::JobReport;

use cis_client::ClientIntegration;
use cis_core::domain::environment::Repository;
use cis_core::dto::job::FileMetadata;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::bootstrap::WorkspaceLayout;
use crate::config::Config;
use crate::error::{Result, RunError};

/// Immutable settings shared by every job of a run
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Fixed delay before each status check
    pub poll_interval: Duration,
    /// Upper bound on non-terminal status checks; `None` polls forever
    pub max_poll_attempts: Option<u32>,
    /// One job per input file when there is more than one file
    pub separate_jobs: bool,
    /// Metadata attached to every submitted file
    pub file_metadata: Vec<FileMetadata>,
    pub layout: WorkspaceLayout,
}

impl JobSettings {
    pub fn from_config(config: &Config, layout: WorkspaceLayout) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_poll_attempts: config.max_poll_attempts,
            separate_jobs: config.separate_jobs,
            file_metadata: config.file_metadata.clone(),
            layout,
        }
    }
}

/// Entry point of a run once preconditions hold
pub struct Scheduler {
    client: Arc<dyn ClientIntegration>,
    settings: Arc<JobSettings>,
}

impl Scheduler {
    pub fn new(client: Arc<dyn ClientIntegration>, settings: Arc<JobSettings>) -> Self {
        Self { client, settings }
    }

    /// Picks the first repository of the environment
    pub async fn select_repository(&self) -> Result<Repository> {
        let environment = self.client.get_environment().await?;
        environment
            .first_repository()
            .ok_or(RunError::NoRepositories)
    }

    /// Runs every input file to completion
    ///
    /// Succeeds only if every job succeeds.
    pub async fn run(&self, files: Vec<PathBuf>) -> Result<Vec<JobReport>> {
        let repository = self.select_repository().await?;
        println!("Using repository: {}", repository);
        info!("Submitting to repository {}", repository.id);

        FanOut::new(Arc::clone(&self.client), Arc::clone(&self.settings))
            .run(repository.id, files)
            .await
    }
}
