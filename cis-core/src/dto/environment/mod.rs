//! Environment DTOs

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::environment::Repository;

fn default_success() -> bool {
    true
}

/// Parse an RFC 3339 timestamp, or one without an offset taken as UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|t| t.and_utc())
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
        .transpose()
}

/// Response of `GET Environment`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub repositories: Vec<RepositoryDto>,
    #[serde(default)]
    pub global_variables: Vec<GlobalVariableDto>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_changed: Option<DateTime<Utc>>,
}

impl EnvironmentResponse {
    /// The repository new jobs are submitted to
    pub fn first_repository(&self) -> Option<Repository> {
        self.repositories.first().cloned().map(Repository::from)
    }
}

/// Repository descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDto {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub workspace_name: String,
}

/// Global variable published by the environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVariableDto {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}
