//! Environment domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::environment::RepositoryDto;

/// A repository jobs can be submitted to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Identifier sent as `RepositoryId` on submit
    pub id: Uuid,

    /// Display name
    pub name: String,
}

impl From<RepositoryDto> for Repository {
    fn from(dto: RepositoryDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}
