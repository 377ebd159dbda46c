//! Job lifecycle
//!
//! Drives one batch through `Submitting -> Polling -> Validating ->
//! Downloading -> Releasing -> Done`. Any error moves the job to `Failed`
//! and is returned unchanged; there is no retry at any step.

use cis_client::ClientIntegration;
use cis_core::domain::job::{Batch, Job, JobState, JobStatus};
use cis_core::dto::job::JobStatusResponse;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::JobSettings;
use crate::error::{Result, RunError};
use crate::job_log::JobLog;

/// Outcome of a job that went all the way to release
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: Uuid,
    pub batch_index: Option<usize>,
    pub status: JobStatus,
    /// `Output/<job-id>`
    pub output_dir: PathBuf,
    /// The file written by the download
    pub downloaded: PathBuf,
}

/// Drives a single job using the transport
pub struct JobLifecycle {
    client: Arc<dyn ClientIntegration>,
    settings: Arc<JobSettings>,
    job: Job,
    log: JobLog,
}

impl JobLifecycle {
    pub fn new(
        client: Arc<dyn ClientIntegration>,
        settings: Arc<JobSettings>,
        repository_id: Uuid,
        batch: Batch,
        batch_index: Option<usize>,
    ) -> Self {
        let log = JobLog::new(&settings.layout, batch_index);
        Self {
            client,
            settings,
            job: Job::new(repository_id, batch, batch_index),
            log,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Runs the job to completion
    pub async fn run(&mut self) -> Result<JobReport> {
        match self.drive().await {
            Ok(report) => Ok(report),
            Err(e) => {
                debug!(
                    "Job {:?} (batch {:?}) failed while {}, see {}: {}",
                    self.job().id,
                    self.job.batch_index,
                    self.job.state,
                    self.log.path().display(),
                    e
                );
                self.transition(JobState::Failed);
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<JobReport> {
        let job_id = self.submit().await?;

        self.transition(JobState::Polling);
        let status = self.poll(job_id).await?;

        self.transition(JobState::Validating);
        self.validate(job_id, &status).await?;

        self.transition(JobState::Downloading);
        let (output_dir, downloaded) = self.download(job_id).await?;

        self.transition(JobState::Releasing);
        self.release(job_id).await?;

        self.transition(JobState::Done);
        Ok(JobReport {
            job_id,
            batch_index: self.job.batch_index,
            status: status.status,
            output_dir,
            downloaded,
        })
    }

    fn transition(&mut self, next: JobState) {
        debug!(
            "Job {:?} (batch {:?}): {} -> {}",
            self.job.id, self.job.batch_index, self.job.state, next
        );
        self.job.state = next;
    }

    async fn submit(&mut self) -> Result<Uuid> {
        let names = self.job.batch.file_names();
        let message = match names.as_slice() {
            [single] => format!("Submitting file: {}...", single),
            many => format!("Submitting {} files ({}) ", many.len(), many.join(", ")),
        };
        self.log.write(&message).await;

        let job_id = self
            .client
            .submit(
                self.job.repository_id,
                self.job.batch.files(),
                &self.settings.file_metadata,
            )
            .await?;

        self.job.id = Some(job_id);
        self.log
            .write(&format!("Submitted. Job ID: {}\n", job_id))
            .await;
        Ok(job_id)
    }

    /// Sleeps the poll interval before every check until the status is terminal
    async fn poll(&mut self, job_id: Uuid) -> Result<JobStatusResponse> {
        let mut attempts: u32 = 0;

        loop {
            tokio::time::sleep(self.settings.poll_interval).await;

            let response = self.client.get_status(job_id).await?;
            attempts += 1;

            self.log
                .write(&format!("Status: {}. ID: {}", response.status, job_id))
                .await;
            self.job.status = response.status.clone();
            self.job.details = response.details.clone();

            if response.status.is_terminal() {
                return Ok(response);
            }

            if let Some(max) = self.settings.max_poll_attempts {
                if attempts >= max {
                    return Err(RunError::PollLimitExceeded { job_id, attempts });
                }
            }
        }
    }

    async fn validate(&mut self, job_id: Uuid, status: &JobStatusResponse) -> Result<()> {
        if !status.status.is_successful() {
            return Err(RunError::JobFailed {
                status: status.status.clone(),
                details: status.details.clone(),
            });
        }

        self.log
            .write(&format!("Job {} completed successfully.\n", job_id))
            .await;
        Ok(())
    }

    async fn download(&mut self, job_id: Uuid) -> Result<(PathBuf, PathBuf)> {
        let location = self.settings.layout.job_output_dir(job_id);
        tokio::fs::create_dir_all(&location)
            .await
            .map_err(|e| RunError::io(&location, e))?;

        self.log
            .write(&format!("Downloading files from Job: {}", job_id))
            .await;
        let downloaded = self.client.download(job_id, &location).await?;
        self.log
            .write(&format!(
                "Download complete. Location: {}\n",
                location.display()
            ))
            .await;

        Ok((location, downloaded))
    }

    async fn release(&mut self, job_id: Uuid) -> Result<()> {
        self.log
            .write(&format!("Releasing Job: {}", job_id))
            .await;
        self.client.release(job_id).await?;
        self.log.write("Job Released.\n").await;
        Ok(())
    }
}
