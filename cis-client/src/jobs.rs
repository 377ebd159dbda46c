//! Job-related API endpoints

use crate::error::{ClientError, Result};
use crate::{CisClient, disposition};
use cis_core::dto::job::{FileMetadata, JobStatusResponse};
use reqwest::Method;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

impl CisClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit input files as a new job
    ///
    /// # Arguments
    /// * `repository_id` - Repository that will process the job
    /// * `files` - Input files, uploaded in order as `InputFiles[i]`
    /// * `metadata` - Name/value pairs attached to every file
    ///
    /// # Returns
    /// The job identifier assigned by the service
    pub async fn submit(
        &self,
        repository_id: Uuid,
        files: &[PathBuf],
        metadata: &[FileMetadata],
    ) -> Result<Uuid> {
        if files.is_empty() {
            return Err(ClientError::InvalidRequest(
                "A job needs at least one input file".to_string(),
            ));
        }

        let mut form = Form::new().text("RepositoryId", repository_id.to_string());

        for (i, path) in files.iter().enumerate() {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| ClientError::io(path, e))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("file{}", i));

            debug!("Adding {} ({} bytes) as InputFiles[{}]", file_name, data.len(), i);

            let part = Part::bytes(data)
                .file_name(file_name)
                .mime_str("application/octet-stream")?;
            form = form.part(format!("InputFiles[{}].InputFile", i), part);

            for (j, item) in metadata.iter().enumerate() {
                form = form
                    .text(
                        format!("InputFiles[{}].FileMetadata[{}].Name", i, j),
                        item.name.clone(),
                    )
                    .text(
                        format!("InputFiles[{}].FileMetadata[{}].Value", i, j),
                        item.value.clone(),
                    );
            }
        }

        let response = self
            .request(Method::POST, "Submit")
            .multipart(form)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the current status of a job
    pub async fn get_status(&self, job_id: Uuid) -> Result<JobStatusResponse> {
        let response = self
            .request(Method::GET, &format!("Status/{}", job_id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Download the result of a completed job
    ///
    /// The file is written into `output_dir`, named after the response's
    /// Content-Disposition filename or `<job-id>.unknown` when there is none.
    ///
    /// # Returns
    /// Path of the written file
    pub async fn download(&self, job_id: Uuid, output_dir: &Path) -> Result<PathBuf> {
        let response = self
            .request(Method::GET, &format!("Download/{}", job_id))
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition::filename)
            .unwrap_or_else(|| format!("{}.unknown", job_id));

        let body = response.bytes().await?;
        let path = output_dir.join(file_name);

        debug!("Writing {} bytes to {}", body.len(), path.display());
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| ClientError::io(&path, e))?;

        Ok(path)
    }

    /// Release a job so the service can free its resources
    pub async fn release(&self, job_id: Uuid) -> Result<()> {
        let response = self
            .request(Method::PUT, &format!("Release/{}", job_id))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
