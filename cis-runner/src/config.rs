//! Runner configuration
//!
//! Settings are read from a JSON file (`appsettings.json` by default). A
//! missing file is created with placeholder values so the operator only has
//! to fill in the endpoint and credential.

use anyhow::{Context, Result};
use cis_client::ApiKey;
use cis_core::dto::job::FileMetadata;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Countdown used when no valid configuration is available
pub const DEFAULT_ERROR_CLOSE_SECONDS: u64 = 5;

const DEFAULT_POLLING_RATE_SECONDS: i64 = 7;

fn default_error_close_seconds() -> i64 {
    DEFAULT_ERROR_CLOSE_SECONDS as i64
}

fn default_polling_rate_seconds() -> i64 {
    DEFAULT_POLLING_RATE_SECONDS
}

/// Runner configuration
///
/// Loaded once at startup and shared read-only with every job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service base URL (e.g., "https://localhost:60204")
    #[serde(default)]
    pub base_url: String,

    /// Credential value
    #[serde(default)]
    pub api_key: String,

    /// Name of the header carrying the credential
    #[serde(default)]
    pub api_key_header: String,

    /// Seconds the failure message stays on screen before exiting
    #[serde(default = "default_error_close_seconds")]
    pub error_close_seconds: i64,

    /// Seconds between two status checks of a job
    #[serde(default = "default_polling_rate_seconds")]
    pub polling_rate_seconds: i64,

    /// Submit one job per input file instead of one job for all files
    #[serde(default)]
    pub separate_jobs: bool,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub trust_certs: bool,

    /// Give up on a job after this many non-terminal statuses (unset = never)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,

    /// Metadata attached to every submitted file
    #[serde(default)]
    pub file_metadata: Vec<FileMetadata>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:60204".to_string(),
            api_key: "your-api-key-here".to_string(),
            api_key_header: "X-Api-Key".to_string(),
            error_close_seconds: default_error_close_seconds(),
            polling_rate_seconds: DEFAULT_POLLING_RATE_SECONDS,
            separate_jobs: false,
            trust_certs: false,
            max_poll_attempts: None,
            file_metadata: vec![FileMetadata::new(
                "Rust Sample App Submission",
                "Test file uploaded via Rust sample app",
            )],
        }
    }
}

impl Config {
    /// Loads the configuration file, writing a default one first if absent
    ///
    /// The returned configuration has been validated.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default = serde_json::to_string_pretty(&Config::default())?;
            std::fs::write(path, default)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            println!("Created default {} with default values.", path.display());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid {}", path.display()))?;

        Ok(config)
    }

    /// Parses a configuration document without validating it
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!("base_url must start with http:// or https://");
        }

        if self.api_key.is_empty() {
            anyhow::bail!("api_key cannot be empty");
        }

        if self.api_key_header.is_empty() {
            anyhow::bail!("api_key_header cannot be empty");
        }

        if self.error_close_seconds <= 0 {
            anyhow::bail!("error_close_seconds must be greater than 0");
        }

        if self.polling_rate_seconds <= 0 {
            anyhow::bail!("polling_rate_seconds must be greater than 0");
        }

        if self.max_poll_attempts == Some(0) {
            anyhow::bail!("max_poll_attempts must be greater than 0 when set");
        }

        Ok(())
    }

    /// Credential header injected into every request
    pub fn api_key(&self) -> ApiKey {
        ApiKey::new(self.api_key_header.clone(), self.api_key.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling_rate_seconds.max(0) as u64)
    }

    pub fn error_close_seconds(&self) -> u64 {
        self.error_close_seconds.max(0) as u64
    }
}
