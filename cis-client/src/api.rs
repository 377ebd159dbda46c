//! Transport abstraction consumed by the job runner
//!
//! The runner only talks to the service through this trait, which keeps the
//! lifecycle logic independent of HTTP and lets tests substitute a fake.

use async_trait::async_trait;
use cis_core::dto::environment::EnvironmentResponse;
use cis_core::dto::job::{FileMetadata, JobStatusResponse};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::CisClient;
use crate::error::Result;

/// Remote operations of the ClientIntegration API
#[async_trait]
pub trait ClientIntegration: Send + Sync {
    /// Fetches the environment (available repositories)
    async fn get_environment(&self) -> Result<EnvironmentResponse>;

    /// Submits a batch of files and returns the assigned job identifier
    async fn submit(
        &self,
        repository_id: Uuid,
        files: &[PathBuf],
        metadata: &[FileMetadata],
    ) -> Result<Uuid>;

    /// Fetches the current status of a job
    async fn get_status(&self, job_id: Uuid) -> Result<JobStatusResponse>;

    /// Downloads the job result into `output_dir` and returns the written path
    async fn download(&self, job_id: Uuid, output_dir: &Path) -> Result<PathBuf>;

    /// Releases server-side resources held for a job
    async fn release(&self, job_id: Uuid) -> Result<()>;
}

#[async_trait]
impl ClientIntegration for CisClient {
    async fn get_environment(&self) -> Result<EnvironmentResponse> {
        CisClient::get_environment(self).await
    }

    async fn submit(
        &self,
        repository_id: Uuid,
        files: &[PathBuf],
        metadata: &[FileMetadata],
    ) -> Result<Uuid> {
        CisClient::submit(self, repository_id, files, metadata).await
    }

    async fn get_status(&self, job_id: Uuid) -> Result<JobStatusResponse> {
        CisClient::get_status(self, job_id).await
    }

    async fn download(&self, job_id: Uuid, output_dir: &Path) -> Result<PathBuf> {
        CisClient::download(self, job_id, output_dir).await
    }

    async fn release(&self, job_id: Uuid) -> Result<()> {
        CisClient::release(self, job_id).await
    }
}
