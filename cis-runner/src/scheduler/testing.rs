//! In-memory transport used by the scheduler tests

use async_trait::async_trait;
use cis_client::{ClientError, ClientIntegration, Result};
use cis_core::domain::job::JobStatus;
use cis_core::dto::environment::{EnvironmentResponse, RepositoryDto};
use cis_core::dto::job::{FileMetadata, JobStatusResponse};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;
use uuid::Uuid;

use super::JobSettings;
use crate::bootstrap::WorkspaceLayout;

type Script = Vec<(String, String)>;

#[derive(Debug, Clone)]
pub struct Submission {
    pub job_id: Uuid,
    pub repository_id: Uuid,
    pub files: Vec<PathBuf>,
    pub metadata: Vec<FileMetadata>,
}

#[derive(Default)]
struct FakeState {
    submissions: Vec<Submission>,
    queues: HashMap<Uuid, VecDeque<(String, String)>>,
    delays: HashMap<Uuid, Duration>,
    status_calls: HashMap<Uuid, u32>,
    downloads: Vec<Uuid>,
    releases: Vec<Uuid>,
}

/// Scripted stand-in for the service
///
/// Each submitted job replays a status script; the last entry repeats
/// forever. Scripts can be chosen per first file name.
pub struct FakeIntegration {
    repository_id: Uuid,
    repositories: bool,
    fail_environment: bool,
    fail_submit: bool,
    fail_release: bool,
    download_name: Option<String>,
    default_script: Script,
    file_scripts: HashMap<String, Script>,
    file_delays: HashMap<String, Duration>,
    status_barrier: Option<Barrier>,
    state: Mutex<FakeState>,
}

fn script(entries: &[(&str, &str)]) -> Script {
    entries
        .iter()
        .map(|(s, d)| (s.to_string(), d.to_string()))
        .collect()
}

impl FakeIntegration {
    pub fn new() -> Self {
        Self {
            repository_id: Uuid::new_v4(),
            repositories: true,
            fail_environment: false,
            fail_submit: false,
            fail_release: false,
            download_name: None,
            default_script: script(&[("Processing", ""), ("CompletedSuccessful", "")]),
            file_scripts: HashMap::new(),
            file_delays: HashMap::new(),
            status_barrier: None,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn without_repositories(mut self) -> Self {
        self.repositories = false;
        self
    }

    pub fn failing_environment(mut self) -> Self {
        self.fail_environment = true;
        self
    }

    pub fn failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    pub fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    pub fn with_download_name(mut self, name: &str) -> Self {
        self.download_name = Some(name.to_string());
        self
    }

    pub fn with_script(mut self, entries: &[(&str, &str)]) -> Self {
        self.default_script = script(entries);
        self
    }

    pub fn with_file_script(mut self, file_name: &str, entries: &[(&str, &str)]) -> Self {
        self.file_scripts
            .insert(file_name.to_string(), script(entries));
        self
    }

    /// Delays every status check of the job whose first file is `file_name`
    pub fn with_status_delay(mut self, file_name: &str, delay: Duration) -> Self {
        self.file_delays.insert(file_name.to_string(), delay);
        self
    }

    /// Holds every status check until `parties` checks are waiting at once
    pub fn with_status_barrier(mut self, parties: usize) -> Self {
        self.status_barrier = Some(Barrier::new(parties));
        self
    }

    pub fn repository_id(&self) -> Uuid {
        self.repository_id
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn downloads(&self) -> Vec<Uuid> {
        self.state.lock().unwrap().downloads.clone()
    }

    pub fn releases(&self) -> Vec<Uuid> {
        self.state.lock().unwrap().releases.clone()
    }

    pub fn status_calls(&self, job_id: Uuid) -> u32 {
        self.state
            .lock()
            .unwrap()
            .status_calls
            .get(&job_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_status_calls(&self) -> u32 {
        self.state.lock().unwrap().status_calls.values().sum()
    }
}

#[async_trait]
impl ClientIntegration for FakeIntegration {
    async fn get_environment(&self) -> Result<EnvironmentResponse> {
        if self.fail_environment {
            return Err(ClientError::api_error(503, "Service Unavailable"));
        }

        let repositories = if self.repositories {
            vec![
                RepositoryDto {
                    id: self.repository_id,
                    name: "Primary".to_string(),
                    kind: "Default".to_string(),
                    workspace_id: None,
                    workspace_name: String::new(),
                },
                RepositoryDto {
                    id: Uuid::new_v4(),
                    name: "Secondary".to_string(),
                    kind: "Default".to_string(),
                    workspace_id: None,
                    workspace_name: String::new(),
                },
            ]
        } else {
            Vec::new()
        };

        Ok(EnvironmentResponse {
            success: true,
            message: String::new(),
            repositories,
            global_variables: Vec::new(),
            last_changed: None,
        })
    }

    async fn submit(
        &self,
        repository_id: Uuid,
        files: &[PathBuf],
        metadata: &[FileMetadata],
    ) -> Result<Uuid> {
        if self.fail_submit {
            return Err(ClientError::api_error(500, "Internal Server Error"));
        }

        let job_id = Uuid::new_v4();
        let first = files
            .first()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let script = self
            .file_scripts
            .get(&first)
            .unwrap_or(&self.default_script)
            .clone();

        let mut state = self.state.lock().unwrap();
        state.queues.insert(job_id, script.into_iter().collect());
        if let Some(delay) = self.file_delays.get(&first) {
            state.delays.insert(job_id, *delay);
        }
        state.submissions.push(Submission {
            job_id,
            repository_id,
            files: files.to_vec(),
            metadata: metadata.to_vec(),
        });
        Ok(job_id)
    }

    async fn get_status(&self, job_id: Uuid) -> Result<JobStatusResponse> {
        if let Some(barrier) = &self.status_barrier {
            barrier.wait().await;
        }
        let delay = self.state.lock().unwrap().delays.get(&job_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        *state.status_calls.entry(job_id).or_insert(0) += 1;

        let queue = state
            .queues
            .get_mut(&job_id)
            .ok_or_else(|| ClientError::api_error(404, "Unknown job"))?;
        let (status, details) = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };

        Ok(JobStatusResponse {
            success: true,
            message: String::new(),
            job_id,
            repository_id: self.repository_id,
            status: JobStatus::new(status),
            details,
            total_queue_time_in_sec: 0.0,
            total_processing_time_in_sec: 0.0,
        })
    }

    async fn download(&self, job_id: Uuid, output_dir: &Path) -> Result<PathBuf> {
        let name = self
            .download_name
            .clone()
            .unwrap_or_else(|| format!("{}.unknown", job_id));
        let path = output_dir.join(name);
        tokio::fs::write(&path, b"result")
            .await
            .map_err(|e| ClientError::io(&path, e))?;

        self.state.lock().unwrap().downloads.push(job_id);
        Ok(path)
    }

    async fn release(&self, job_id: Uuid) -> Result<()> {
        if self.fail_release {
            return Err(ClientError::api_error(409, "Conflict"));
        }

        self.state.lock().unwrap().releases.push(job_id);
        Ok(())
    }
}

/// Settings rooted at `root` with a 1 ms poll interval
pub fn settings(root: &Path, separate_jobs: bool) -> Arc<JobSettings> {
    settings_with(root, separate_jobs, None)
}

pub fn settings_with(
    root: &Path,
    separate_jobs: bool,
    max_poll_attempts: Option<u32>,
) -> Arc<JobSettings> {
    let layout = WorkspaceLayout::new(root);
    for dir in [&layout.input_dir, &layout.output_dir, &layout.job_log_dir] {
        std::fs::create_dir_all(dir).unwrap();
    }

    Arc::new(JobSettings {
        poll_interval: Duration::from_millis(1),
        max_poll_attempts,
        separate_jobs,
        file_metadata: vec![FileMetadata::new("Source", "tests")],
        layout,
    })
}

/// Creates the named files in `root/Input` and returns their paths
pub fn input_files(root: &Path, names: &[&str]) -> Vec<PathBuf> {
    let input = WorkspaceLayout::new(root).input_dir;
    std::fs::create_dir_all(&input).unwrap();

    names
        .iter()
        .map(|name| {
            let path = input.join(name);
            std::fs::write(&path, name.as_bytes()).unwrap();
            path
        })
        .collect()
}
