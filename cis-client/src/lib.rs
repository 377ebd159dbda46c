//! CIS HTTP Client
//!
//! A small, type-safe HTTP client for the CIS ClientIntegration API (v2).
//!
//! The runner drives jobs exclusively through the [`ClientIntegration`] trait;
//! [`CisClient`] is its reqwest-backed implementation.
//!
//! # Example
//!
//! ```no_run
//! use cis_client::{ApiKey, CisClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CisClient::new(
//!         "https://localhost:60204",
//!         ApiKey::new("X-Api-Key", "secret"),
//!         false,
//!     )?;
//!
//!     let env = client.get_environment().await?;
//!     println!("{} repositories available", env.repositories.len());
//!     Ok(())
//! }
//! ```

mod api;
pub mod disposition;
mod environment;
pub mod error;
mod jobs;

// Re-export commonly used types
pub use api::ClientIntegration;
pub use cis_core::dto::environment::EnvironmentResponse;
pub use cis_core::dto::job::{FileMetadata, JobStatusResponse};
pub use error::{ClientError, Result};

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Path appended to the base URL for every endpoint
const API_PATH: &str = "api/v2/ClientIntegration";

/// Static credential sent as a header on every request
#[derive(Debug, Clone)]
pub struct ApiKey {
    /// Header name (e.g., "X-Api-Key")
    pub header: String,
    /// Header value
    pub value: String,
}

impl ApiKey {
    pub fn new(header: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            value: value.into(),
        }
    }
}

/// HTTP client for the CIS ClientIntegration API
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CisClient {
    /// Base URL of the service without trailing slash
    base_url: String,
    /// Credential header name
    key_header: HeaderName,
    /// Credential header value
    key_value: HeaderValue,
    /// HTTP client instance
    client: Client,
}

impl CisClient {
    /// Create a new CIS client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the service (e.g., "https://localhost:60204")
    /// * `api_key` - Credential header injected into every call
    /// * `skip_certificate_verification` - Accept invalid TLS certificates
    pub fn new(
        base_url: impl Into<String>,
        api_key: ApiKey,
        skip_certificate_verification: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(skip_certificate_verification)
            .build()?;

        Self::with_client(base_url, api_key, client)
    }

    /// Create a new CIS client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: ApiKey,
        client: Client,
    ) -> Result<Self> {
        let base_url = base_url.into();

        let key_header = HeaderName::from_bytes(api_key.header.as_bytes()).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid API key header name: {}", e))
        })?;
        let mut key_value = HeaderValue::from_str(&api_key.value).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid API key header value: {}", e))
        })?;
        key_value.set_sensitive(true);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key_header,
            key_value,
            client,
        })
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint below the ClientIntegration path
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PATH, path)
    }

    /// Start a request with the credential header attached
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .header(self.key_header.clone(), self.key_value.clone())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Return the response if its status is a success, an `ApiError` otherwise
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .ok()
                .filter(|t| !t.is_empty())
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await.map(|_| ())
    }
}
