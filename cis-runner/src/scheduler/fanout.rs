//! Fan-out coordinator
//!
//! Decides between one job for every input file and one job per file. In
//! the latter case the jobs run as independent tasks joined by an
//! all-must-succeed barrier: the first failure is returned and the
//! remaining tasks are aborted.

use cis_client::ClientIntegration;
use cis_core::domain::job::Batch;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};
use uuid::Uuid;

use super::JobSettings;
use super::lifecycle::{JobLifecycle, JobReport};
use crate::error::{Result, RunError};

/// Partitions the input files into job batches
///
/// One batch with every file unless `separate_jobs` is set and there is more
/// than one file, in which case every file gets its own batch.
pub fn plan_batches(files: &[PathBuf], separate_jobs: bool) -> Vec<Batch> {
    if separate_jobs && files.len() > 1 {
        files.iter().cloned().map(Batch::single).collect()
    } else {
        Batch::new(files.to_vec()).into_iter().collect()
    }
}

pub struct FanOut {
    client: Arc<dyn ClientIntegration>,
    settings: Arc<JobSettings>,
}

impl FanOut {
    pub fn new(client: Arc<dyn ClientIntegration>, settings: Arc<JobSettings>) -> Self {
        Self { client, settings }
    }

    /// Runs every batch, returning reports ordered by batch index
    pub async fn run(&self, repository_id: Uuid, files: Vec<PathBuf>) -> Result<Vec<JobReport>> {
        let mut batches = plan_batches(&files, self.settings.separate_jobs);

        if batches.len() > 1 {
            println!("Submitting as multiple jobs.\n");
            return self.run_concurrent(repository_id, batches).await;
        }

        println!("Submitting as same job.\n");
        let batch = batches.pop().ok_or(RunError::NoInputFiles)?;
        let report = JobLifecycle::new(
            Arc::clone(&self.client),
            Arc::clone(&self.settings),
            repository_id,
            batch,
            None,
        )
        .run()
        .await?;

        Ok(vec![report])
    }

    async fn run_concurrent(
        &self,
        repository_id: Uuid,
        batches: Vec<Batch>,
    ) -> Result<Vec<JobReport>> {
        info!("Launching {} concurrent jobs", batches.len());

        let mut tasks = JoinSet::new();
        for (index, batch) in batches.into_iter().enumerate() {
            let mut lifecycle = JobLifecycle::new(
                Arc::clone(&self.client),
                Arc::clone(&self.settings),
                repository_id,
                batch,
                Some(index),
            );
            tasks.spawn(async move { lifecycle.run().await });
        }

        let mut reports = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let report = joined.map_err(|e| RunError::TaskFailed(e.to_string()))??;
            debug!(
                "Job {} (batch {:?}) finished into {}",
                report.job_id,
                report.batch_index,
                report.output_dir.display()
            );
            reports.push(report);
        }

        reports.sort_by_key(|r| r.batch_index);
        Ok(reports)
    }
}
