//! Environment endpoint

use crate::CisClient;
use crate::error::Result;
use cis_core::dto::environment::EnvironmentResponse;
use reqwest::Method;
use tracing::debug;

impl CisClient {
    /// Fetch the environment (available repositories and global variables)
    ///
    /// # Returns
    /// The environment as published by the service
    pub async fn get_environment(&self) -> Result<EnvironmentResponse> {
        debug!("Fetching environment from {}", self.base_url());
        let response = self.request(Method::GET, "Environment").send().await?;

        self.handle_response(response).await
    }
}
